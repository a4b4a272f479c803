//! Config storage for the CLI caller.
//!
//! The connection manager itself is stateless across runs; remembering the
//! TV's address and pairing key between launches is the caller's job, done
//! here with a TOML file in the platform config directory.

pub mod config;
