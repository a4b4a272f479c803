//! Wire protocol for the TV's embedded control API.
//!
//! Transport is plain HTTP to port [`CONTROL_PORT`]; payloads are the small
//! XML documents built by [`codec`].  Response bodies are ignored by the
//! protocol (only HTTP status codes carry meaning), so there is no decoder.

pub mod codec;

pub use codec::{build_key_command, build_pairing_request};

/// TCP port of the TV's embedded HTTP control server.
pub const CONTROL_PORT: u16 = 8080;

/// Pairing endpoint: `AuthKeyReq` / `AuthReq` documents are POSTed here.
pub const PAIRING_PATH: &str = "/udap/api/pairing";

/// Key input endpoint: `HandleKeyInput` documents are POSTed here.
pub const COMMAND_PATH: &str = "/udap/api/command";

/// Authorized liveness probe; the response body is ignored.
pub const LIVENESS_PATH: &str = "/udap/api/data?target=volume_info";

/// Content type the TV expects on every POSTed document.
pub const CONTENT_TYPE: &str = "application/atom+xml";

/// Header carrying the pairing token once the TV has accepted it.
pub const AUTH_HEADER: &str = "X-Auth-Token";
