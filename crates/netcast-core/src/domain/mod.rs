//! Domain model for the NetCast remote.
//!
//! Pure data types with no infrastructure dependencies.  The central concept
//! is the [`status::ConnectionStatus`] reported by the connection manager:
//! exactly one variant is current at any time, and transitions are streamed
//! to the caller as they occur.

pub mod status;
