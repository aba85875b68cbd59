//! Strong password generation, entropy-based strength estimation, and a history of chosen
//! passwords that only ever stores one-way digests.

use serde::{Serialize, Serializer};
use zeroize::Zeroize;

pub mod charset;
pub mod export;
pub mod history;
pub mod password_generation;
pub mod strength;

pub use charset::{CharacterClass, ClassSet};
pub use history::{HistoryError, HistoryRecord, JsonFileStore, Ledger, LedgerStore};
pub use password_generation::GeneratedPassword;
pub use strength::{analyze, StrengthReport, StrengthTier};

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;
pub const DEFAULT_LENGTH: usize = 12;

pub const MIN_COUNT: usize = 1;
pub const MAX_COUNT: usize = 100;
pub const DEFAULT_COUNT: usize = 3;

/// What to generate: how long, from which character classes, and whether visually confusing
/// characters are filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub length: usize,
    pub classes: ClassSet,
    pub exclude_confusing: bool,
}

impl GenerationConfig {
    /// Build a config, rejecting lengths outside `MIN_LENGTH..=MAX_LENGTH`.
    ///
    /// The class set is not checked here; an unusable alphabet is reported by
    /// [`password_generation::generate`] as a [`ConfigurationError`].
    pub fn new(
        length: usize,
        classes: ClassSet,
        exclude_confusing: bool,
    ) -> Result<GenerationConfig, ValidationError> {
        validate_length(length)?;
        Ok(GenerationConfig {
            length,
            classes,
            exclude_confusing,
        })
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            length: DEFAULT_LENGTH,
            classes: ClassSet::all(),
            exclude_confusing: false,
        }
    }
}

pub fn validate_length(length: usize) -> Result<(), ValidationError> {
    if (MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        Ok(())
    } else {
        Err(ValidationError::LengthOutOfRange(length))
    }
}

pub fn validate_count(count: usize) -> Result<(), ValidationError> {
    if (MIN_COUNT..=MAX_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(ValidationError::CountOutOfRange(count))
    }
}

/// A request that is out of bounds; raised before anything is generated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("password length must be between {min} and {max} (got {0})", min = MIN_LENGTH, max = MAX_LENGTH)]
    LengthOutOfRange(usize),
    #[error("password count must be between {min} and {max} (got {0})", min = MIN_COUNT, max = MAX_COUNT)]
    CountOutOfRange(usize),
}

/// The configured character classes leave nothing to draw from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no character classes are enabled; enable at least one")]
    NoClassesEnabled,
    #[error(
        "excluding confusing characters left no usable characters in any enabled character class"
    )]
    AllCharactersExcluded,
}

/// A generated password. The contents are wiped from memory on drop and hidden from `Debug`.
#[derive(Clone, Eq, PartialEq)]
pub struct Password(String);

opaque_debug::implement!(Password);

impl Password {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl From<String> for Password {
    fn from(s: String) -> Password {
        Password(s)
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Serialize for Password {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
