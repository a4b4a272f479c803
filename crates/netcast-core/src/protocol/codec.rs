//! Builders for the XML documents of the TV's control API.
//!
//! Wire format, reproduced for compatibility with the TV firmware:
//!
//! ```text
//! pairing, no PIN:   <?xml version="1.0"?><auth><type>AuthKeyReq</type></auth>
//! pairing, with PIN: <?xml version="1.0"?><auth><type>AuthReq</type><value>{pin}</value></auth>
//! key input:         <?xml version="1.0" encoding="utf-8"?><command><name>HandleKeyInput</name><value>{code}</value></command>
//! ```
//!
//! All builders are pure and stateless.  The PIN is the only caller-supplied
//! text that lands inside a document; it is whitespace-trimmed and
//! XML-escaped, nothing more; the TV itself rejects malformed values.

use crate::keymap::{key_code, RemoteKey};

/// Builds the pairing request document.
///
/// With a non-empty `pin` this is an `AuthReq` carrying the PIN the TV
/// displayed on screen; once the TV answers 200 the same PIN becomes usable
/// as a bearer token.  Without a PIN this is an `AuthKeyReq`, which asks the
/// TV to display a PIN.
pub fn build_pairing_request(pin: Option<&str>) -> String {
    match pin.map(str::trim).filter(|p| !p.is_empty()) {
        Some(pin) => format!(
            "<?xml version=\"1.0\"?><auth><type>AuthReq</type><value>{}</value></auth>",
            xml_escape(pin)
        ),
        None => "<?xml version=\"1.0\"?><auth><type>AuthKeyReq</type></auth>".to_string(),
    }
}

/// Builds the `HandleKeyInput` command document for `key`.
///
/// The code lookup is total (see [`key_code`]), so this cannot fail.
pub fn build_key_command(key: RemoteKey) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?><command><name>HandleKeyInput</name><value>{}</value></command>",
        key_code(key)
    )
}

/// Escapes the five XML-reserved characters in text content.
fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
