//! Note identifiers
//!
//! Identifiers are public tokens embedded in note URLs. Anything that makes it
//! into a [`NoteId`] has been validated, so it can be used directly as a file
//! name inside the storage directory.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

/// Maximum accepted identifier length.
pub const MAX_LEN: usize = 64;

/// Length of generated identifiers.
pub const GENERATED_LEN: usize = 5;

/// Characters used for generated identifiers. Leaves out glyphs that are easy
/// to confuse when read off a screen (0/o, 1/i/l, 6, 8, u/v).
const ALPHABET: &[u8] = b"234579abcdefghjkmnpqrstwxyz";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid note id: {0:?}")]
pub struct InvalidNoteId(pub String);

/// A validated note identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteId(String);

impl NoteId {
    /// Validate an externally supplied identifier.
    ///
    /// Accepts 1..=64 characters from `[A-Za-z0-9_-]`.
    pub fn parse(candidate: &str) -> Result<Self, InvalidNoteId> {
        let valid = !candidate.is_empty()
            && candidate.len() <= MAX_LEN
            && candidate
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

        if valid {
            Ok(Self(candidate.to_string()))
        } else {
            Err(InvalidNoteId(candidate.to_string()))
        }
    }

    /// Generate a fresh random identifier.
    ///
    /// There is no check against existing notes; with 27^5 possible ids a
    /// collision just means landing on somebody else's note.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..GENERATED_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NoteId {
    type Err = InvalidNoteId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
