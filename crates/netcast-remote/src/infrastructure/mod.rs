//! Infrastructure layer for the NetCast remote.
//!
//! Contains the outward-facing adapters: the HTTP client that talks to the
//! TV's control API and the TOML config storage used by the CLI.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `netcast_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`http`** – [`http::HttpTransport`], the reqwest implementation of the
//!   [`crate::application::connection::TvTransport`] seam, plus a recording
//!   mock for tests.
//!
//! - **`storage`** – TOML persistence of the last-known TV address and
//!   pairing key.  Only the CLI caller touches this; the connection manager
//!   itself never reads or writes persistent state.

pub mod http;
pub mod storage;
