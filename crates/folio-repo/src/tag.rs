//! Normalized item labels.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Error returned when a tag cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// The name is empty after trimming.
    #[error("Cannot create a tag from an empty string")]
    Empty,
}

/// A label attached to content items.
///
/// Names are trimmed and lowercased, so `" Rust "` and `"rust"` are the same
/// tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Tag {
    name: String,
}

impl Tag {
    /// Create a tag from a raw name.
    pub fn new(name: &str) -> Result<Self, TagError> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(TagError::Empty);
        }
        Ok(Self { name })
    }

    /// Normalized tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Tag {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
