//! # netcast-core
//!
//! Shared library for the NetCast remote containing the XML protocol codec,
//! the connection-status domain model, and the remote key code table.
//!
//! This crate is used by the connection manager and the CLI application.
//! It has zero dependencies on network sockets, timers, or UI frameworks.
//!
//! # How a NetCast TV is controlled (for beginners)
//!
//! NetCast-era LG televisions embed a small HTTP server on port 8080.  A
//! remote-control app talks to it with three requests:
//!
//! - **Pairing** (`POST /udap/api/pairing`) – without a PIN the TV displays a
//!   pairing code on screen (`AuthKeyReq`); with a PIN the TV verifies it
//!   (`AuthReq`) and from then on accepts that PIN as a bearer token.
//! - **Liveness** (`GET /udap/api/data?target=volume_info`) – an authorized
//!   probe whose response body is ignored; only the status code matters.
//! - **Key input** (`POST /udap/api/command`) – a `HandleKeyInput` document
//!   carrying one of the fixed numeric key codes from the TV firmware.
//!
//! This crate defines:
//!
//! - **`protocol`** – The XML documents that travel over the wire, plus the
//!   port, endpoint paths, and header names of the TV's control API.
//! - **`domain`** – The [`ConnectionStatus`] model that the connection
//!   manager reports to its caller.
//! - **`keymap`** – The [`RemoteKey`] enumeration and its 1:1 mapping to the
//!   TV's numeric key codes.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `netcast_core::RemoteKey` instead of `netcast_core::keymap::RemoteKey`.
pub use domain::status::ConnectionStatus;
pub use keymap::{key_code, ParseKeyError, RemoteKey};
pub use protocol::codec::{build_key_command, build_pairing_request};
