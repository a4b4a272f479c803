//! netcast-remote library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does netcast-remote do? (for beginners)
//!
//! NetCast-era LG televisions expose a small HTTP control API.  This crate
//! drives it:
//!
//! 1. The [`application::connection::ConnectionManager`] runs an unattended
//!    connect loop against a TV: it probes liveness when it already holds a
//!    pairing token, performs the pairing handshake when it does not, and
//!    retries transport failures with exponential backoff.
//! 2. Every state transition is emitted on a status stream that the caller
//!    (here, the CLI in `main.rs`) consumes and renders.
//! 3. While the status is `Connected`, the caller dispatches remote key
//!    presses, which the manager forwards as `HandleKeyInput` commands.
//!
//! The HTTP I/O sits behind the [`application::connection::TvTransport`]
//! trait so the whole state machine is testable against a recording mock.

/// Application layer: the connection/authentication state machine.
pub mod application;

/// Infrastructure layer: HTTP transport and config storage.
pub mod infrastructure;
