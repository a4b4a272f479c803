//! Remote key identifiers and the NetCast key code table.
//!
//! The TV firmware understands a fixed set of numeric key codes.  The table
//! below is an external protocol contract: the values are baked into the TV
//! and must be reproduced exactly.
//!
//! | Key          | Code | Key          | Code |
//! |--------------|------|--------------|------|
//! | power        | 1    | channelUp    | 27   |
//! | up           | 12   | channelDown  | 28   |
//! | down         | 13   | info         | 45   |
//! | left         | 14   | input        | 47   |
//! | right        | 15   | red          | 403  |
//! | ok           | 20   | green        | 404  |
//! | home         | 21   | yellow       | 405  |
//! | settings     | 22   | blue         | 406  |
//! | back         | 23   | exit         | 412  |
//! | volumeUp     | 24   |              |      |
//! | volumeDown   | 25   |              |      |
//! | mute         | 26   |              |      |

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical remote-control key.
///
/// Closed enumeration; every variant has exactly one numeric code in the TV
/// firmware (see [`key_code`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteKey {
    Up,
    Down,
    Left,
    Right,
    Ok,
    Home,
    Settings,
    Info,
    Back,
    Exit,
    VolumeUp,
    VolumeDown,
    Mute,
    ChannelUp,
    ChannelDown,
    Input,
    Power,
    Red,
    Green,
    Yellow,
    Blue,
}

impl RemoteKey {
    /// Every key, in display order.  Used by the CLI help text and by tests
    /// that must cover the whole table.
    pub const ALL: [RemoteKey; 21] = [
        RemoteKey::Up,
        RemoteKey::Down,
        RemoteKey::Left,
        RemoteKey::Right,
        RemoteKey::Ok,
        RemoteKey::Home,
        RemoteKey::Settings,
        RemoteKey::Info,
        RemoteKey::Back,
        RemoteKey::Exit,
        RemoteKey::VolumeUp,
        RemoteKey::VolumeDown,
        RemoteKey::Mute,
        RemoteKey::ChannelUp,
        RemoteKey::ChannelDown,
        RemoteKey::Input,
        RemoteKey::Power,
        RemoteKey::Red,
        RemoteKey::Green,
        RemoteKey::Yellow,
        RemoteKey::Blue,
    ];

    /// Canonical lowercase name, accepted back by [`RemoteKey::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            RemoteKey::Up => "up",
            RemoteKey::Down => "down",
            RemoteKey::Left => "left",
            RemoteKey::Right => "right",
            RemoteKey::Ok => "ok",
            RemoteKey::Home => "home",
            RemoteKey::Settings => "settings",
            RemoteKey::Info => "info",
            RemoteKey::Back => "back",
            RemoteKey::Exit => "exit",
            RemoteKey::VolumeUp => "volume_up",
            RemoteKey::VolumeDown => "volume_down",
            RemoteKey::Mute => "mute",
            RemoteKey::ChannelUp => "channel_up",
            RemoteKey::ChannelDown => "channel_down",
            RemoteKey::Input => "input",
            RemoteKey::Power => "power",
            RemoteKey::Red => "red",
            RemoteKey::Green => "green",
            RemoteKey::Yellow => "yellow",
            RemoteKey::Blue => "blue",
        }
    }
}

/// Translates a [`RemoteKey`] to the numeric code the TV firmware expects.
///
/// The lookup is total: every variant has a code, so this cannot fail.
pub fn key_code(key: RemoteKey) -> u32 {
    match key {
        RemoteKey::Power => 1,

        RemoteKey::Up => 12,
        RemoteKey::Down => 13,
        RemoteKey::Left => 14,
        RemoteKey::Right => 15,
        RemoteKey::Ok => 20,

        RemoteKey::Home => 21,
        RemoteKey::Settings => 22,
        RemoteKey::Back => 23,

        RemoteKey::VolumeUp => 24,
        RemoteKey::VolumeDown => 25,
        RemoteKey::Mute => 26,

        RemoteKey::ChannelUp => 27,
        RemoteKey::ChannelDown => 28,

        RemoteKey::Info => 45,
        RemoteKey::Input => 47,

        RemoteKey::Red => 403,
        RemoteKey::Green => 404,
        RemoteKey::Yellow => 405,
        RemoteKey::Blue => 406,
        RemoteKey::Exit => 412,
    }
}

/// Error returned when a key name cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown key name: {0}")]
pub struct ParseKeyError(pub String);

impl FromStr for RemoteKey {
    type Err = ParseKeyError;

    /// Parses a canonical key name as produced by [`RemoteKey::name`].
    /// Matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        RemoteKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// The full firmware table, written out independently of `key_code` so a
    /// typo in either place fails the test.
    const FIRMWARE_TABLE: [(RemoteKey, u32); 21] = [
        (RemoteKey::Power, 1),
        (RemoteKey::Up, 12),
        (RemoteKey::Down, 13),
        (RemoteKey::Left, 14),
        (RemoteKey::Right, 15),
        (RemoteKey::Ok, 20),
        (RemoteKey::Home, 21),
        (RemoteKey::Settings, 22),
        (RemoteKey::Back, 23),
        (RemoteKey::VolumeUp, 24),
        (RemoteKey::VolumeDown, 25),
        (RemoteKey::Mute, 26),
        (RemoteKey::ChannelUp, 27),
        (RemoteKey::ChannelDown, 28),
        (RemoteKey::Info, 45),
        (RemoteKey::Input, 47),
        (RemoteKey::Red, 403),
        (RemoteKey::Green, 404),
        (RemoteKey::Yellow, 405),
        (RemoteKey::Blue, 406),
        (RemoteKey::Exit, 412),
    ];

    #[test]
    fn test_key_code_matches_firmware_table_exactly() {
        for (key, expected) in FIRMWARE_TABLE {
            assert_eq!(
                key_code(key),
                expected,
                "{key:?} must map to firmware code {expected}"
            );
        }
    }

    #[test]
    fn test_firmware_table_covers_every_variant() {
        assert_eq!(FIRMWARE_TABLE.len(), RemoteKey::ALL.len());
        for key in RemoteKey::ALL {
            assert!(
                FIRMWARE_TABLE.iter().any(|(k, _)| *k == key),
                "{key:?} missing from the reference table"
            );
        }
    }

    #[test]
    fn test_key_codes_are_unique() {
        for (i, a) in RemoteKey::ALL.iter().enumerate() {
            for b in &RemoteKey::ALL[i + 1..] {
                assert_ne!(
                    key_code(*a),
                    key_code(*b),
                    "{a:?} and {b:?} share a key code"
                );
            }
        }
    }

    #[test]
    fn test_name_round_trips_through_from_str() {
        for key in RemoteKey::ALL {
            assert_eq!(key.name().parse::<RemoteKey>(), Ok(key));
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive_and_trims() {
        assert_eq!("  Volume_Up ".parse::<RemoteKey>(), Ok(RemoteKey::VolumeUp));
        assert_eq!("OK".parse::<RemoteKey>(), Ok(RemoteKey::Ok));
    }

    #[test]
    fn test_from_str_rejects_unknown_names() {
        let err = "rewind".parse::<RemoteKey>().unwrap_err();
        assert_eq!(err, ParseKeyError("rewind".to_string()));
    }
}
