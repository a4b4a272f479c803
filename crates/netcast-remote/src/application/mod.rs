//! Application layer for the NetCast remote.
//!
//! - **`connection`** – The connection manager: owns the authentication and
//!   session state machine, the reconnect loop with exponential backoff, and
//!   the heartbeat polling once authenticated.  Network I/O is delegated to
//!   an injected [`crate::infrastructure::http::TvTransport`].

pub mod connection;
