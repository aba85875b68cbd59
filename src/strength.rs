//! Brute-force strength estimation.
//!
//! Strength is judged only by the characters that actually appear in a password: the search
//! space is the combined size of every character class present, raised to the password length.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::charset::CharacterClass;

/// Assumed attacker throughput.
pub const GUESSES_PER_SECOND: f64 = 1e12;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;
const YEAR: f64 = 31_536_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthTier {
    ExtremelyWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
    ExtremelyStrong,
}

/// Upper (exclusive) entropy bound of each tier below `ExtremelyStrong`.
const TIER_LIMITS: [(f64, StrengthTier); 5] = [
    (28.0, StrengthTier::ExtremelyWeak),
    (36.0, StrengthTier::Weak),
    (60.0, StrengthTier::Moderate),
    (80.0, StrengthTier::Strong),
    (100.0, StrengthTier::VeryStrong),
];

impl StrengthTier {
    pub fn from_entropy(entropy: f64) -> StrengthTier {
        TIER_LIMITS
            .iter()
            .find(|(limit, _)| entropy < *limit)
            .map(|(_, tier)| *tier)
            .unwrap_or(StrengthTier::ExtremelyStrong)
    }

    pub fn label(self) -> &'static str {
        match self {
            StrengthTier::ExtremelyWeak => "Extremely weak",
            StrengthTier::Weak => "Weak",
            StrengthTier::Moderate => "Moderate",
            StrengthTier::Strong => "Strong",
            StrengthTier::VeryStrong => "Very strong",
            StrengthTier::ExtremelyStrong => "Extremely strong",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrengthTier::ExtremelyWeak => "easily brute-forced",
            StrengthTier::Weak => "could be cracked within hours",
            StrengthTier::Moderate => "withstands casual attacks",
            StrengthTier::Strong => "withstands most attacks",
            StrengthTier::VeryStrong => "very secure",
            StrengthTier::ExtremelyStrong => "practically impossible to brute-force",
        }
    }
}

/// Read-only analysis of one password. Never contains the password itself.
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthReport {
    /// Length in characters.
    pub length: usize,
    /// Entropy in bits, rounded to two decimal places.
    pub entropy: f64,
    /// Combined size of the classes present.
    pub charset_size: usize,
    pub tier: StrengthTier,
    pub crack_time: String,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_digits: bool,
    pub has_special: bool,
}

impl StrengthReport {
    pub fn has(&self, class: CharacterClass) -> bool {
        match class {
            CharacterClass::Uppercase => self.has_uppercase,
            CharacterClass::Lowercase => self.has_lowercase,
            CharacterClass::Digit => self.has_digits,
            CharacterClass::Special => self.has_special,
        }
    }
}

impl Serialize for StrengthReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("StrengthReport", 11)?;
        s.serialize_field("length", &self.length)?;
        s.serialize_field("entropy", &self.entropy)?;
        s.serialize_field("charset_size", &self.charset_size)?;
        s.serialize_field("strength", &self.tier)?;
        s.serialize_field("label", self.tier.label())?;
        s.serialize_field("description", self.tier.description())?;
        s.serialize_field("crack_time", &self.crack_time)?;
        s.serialize_field("has_uppercase", &self.has_uppercase)?;
        s.serialize_field("has_lowercase", &self.has_lowercase)?;
        s.serialize_field("has_digits", &self.has_digits)?;
        s.serialize_field("has_special", &self.has_special)?;
        s.end()
    }
}

pub fn analyze(password: &str) -> StrengthReport {
    let present = CharacterClass::ALL.map(|class| password.chars().any(|c| class.contains(c)));
    let charset_size = CharacterClass::ALL
        .iter()
        .zip(present)
        .filter(|(_, is_present)| *is_present)
        .map(|(class, _)| class.size())
        .sum();
    let length = password.chars().count();
    let entropy = entropy_bits(length, charset_size);

    StrengthReport {
        length,
        entropy,
        charset_size,
        tier: StrengthTier::from_entropy(entropy),
        crack_time: crack_time_estimate(entropy),
        has_uppercase: present[CharacterClass::Uppercase as usize],
        has_lowercase: present[CharacterClass::Lowercase as usize],
        has_digits: present[CharacterClass::Digit as usize],
        has_special: present[CharacterClass::Special as usize],
    }
}

/// `length * log2(charset_size)`, rounded to two decimals; zero for an empty charset.
pub fn entropy_bits(length: usize, charset_size: usize) -> f64 {
    if charset_size == 0 {
        return 0.0;
    }
    let bits = length as f64 * (charset_size as f64).log2();
    (bits * 100.0).round() / 100.0
}

/// Expected time to exhaust `2^entropy` guesses at [`GUESSES_PER_SECOND`].
pub fn crack_time_estimate(entropy: f64) -> String {
    format_duration(2f64.powf(entropy) / GUESSES_PER_SECOND)
}

fn format_duration(seconds: f64) -> String {
    if seconds < 1.0 {
        "instantly".to_owned()
    } else if seconds < MINUTE {
        format!("{:.1} seconds", seconds)
    } else if seconds < HOUR {
        format!("{:.1} minutes", seconds / MINUTE)
    } else if seconds < DAY {
        format!("{:.1} hours", seconds / HOUR)
    } else if seconds < YEAR {
        format!("{:.1} days", seconds / DAY)
    } else if seconds < YEAR * 100.0 {
        format!("{:.1} years", seconds / YEAR)
    } else if seconds < YEAR * 1e6 {
        format!("{:.1} thousand years", seconds / YEAR / 1e3)
    } else if seconds < YEAR * 1e9 {
        format!("{:.1} million years", seconds / YEAR / 1e6)
    } else {
        "longer than the age of the universe".to_owned()
    }
}
