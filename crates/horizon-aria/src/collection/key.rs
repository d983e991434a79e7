//! Stable item identifiers.

use std::fmt;

/// An opaque identifier naming one item in a collection.
///
/// Keys are stable across snapshots of the same logical item; the engine
/// compares and stores them but never interprets their content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// String identifier.
    Text(String),
    /// Numeric identifier.
    Index(u64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Text(s) => f.write_str(s),
            Key::Index(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(value)
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Key::Index(value)
    }
}
