//! Character classes and the alphabet they contribute to a password.

use serde::{Deserialize, Serialize};

use crate::GenerationConfig;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SPECIAL: &str = "!@#$%^&*_+-=[]{}|;:,.<>?";

/// Characters easily mistaken for one another in common fonts.
pub const CONFUSING: &str = "0O1lI|";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Uppercase,
        CharacterClass::Lowercase,
        CharacterClass::Digit,
        CharacterClass::Special,
    ];

    /// The fixed, unfiltered symbol set of this class.
    pub fn symbols(self) -> &'static str {
        match self {
            CharacterClass::Uppercase => UPPERCASE,
            CharacterClass::Lowercase => LOWERCASE,
            CharacterClass::Digit => DIGITS,
            CharacterClass::Special => SPECIAL,
        }
    }

    /// Number of symbols in the unfiltered set.
    pub fn size(self) -> usize {
        self.symbols().chars().count()
    }

    pub fn contains(self, c: char) -> bool {
        self.symbols().contains(c)
    }

    pub fn name(self) -> &'static str {
        match self {
            CharacterClass::Uppercase => "uppercase",
            CharacterClass::Lowercase => "lowercase",
            CharacterClass::Digit => "digits",
            CharacterClass::Special => "special",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

pub fn is_confusing(c: char) -> bool {
    CONFUSING.contains(c)
}

/// A subset of [`CharacterClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassSet(u8);

impl ClassSet {
    pub const fn empty() -> ClassSet {
        ClassSet(0)
    }

    pub const fn all() -> ClassSet {
        ClassSet(0b1111)
    }

    pub fn contains(&self, class: CharacterClass) -> bool {
        self.0 & class.bit() != 0
    }

    pub fn insert(&mut self, class: CharacterClass) {
        self.0 |= class.bit();
    }

    pub fn remove(&mut self, class: CharacterClass) {
        self.0 &= !class.bit();
    }

    pub fn without(mut self, class: CharacterClass) -> ClassSet {
        self.remove(class);
        self
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = CharacterClass> {
        CharacterClass::ALL
            .into_iter()
            .filter(move |class| self.contains(*class))
    }
}

impl FromIterator<CharacterClass> for ClassSet {
    fn from_iter<I: IntoIterator<Item = CharacterClass>>(iter: I) -> ClassSet {
        let mut set = ClassSet::empty();
        for class in iter {
            set.insert(class);
        }
        set
    }
}

/// The symbols each class contributes under a given config. Disabled classes, and classes the
/// confusing-character filter emptied, hold no symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    sets: [Vec<char>; 4],
}

impl Charset {
    pub fn class(&self, class: CharacterClass) -> &[char] {
        &self.sets[class as usize]
    }

    /// Classes that contribute at least one symbol, with their symbols.
    pub fn non_empty_classes(&self) -> impl Iterator<Item = (CharacterClass, &[char])> + '_ {
        CharacterClass::ALL
            .into_iter()
            .map(move |class| (class, self.class(class)))
            .filter(|(_, symbols)| !symbols.is_empty())
    }

    /// The union of all class sets, in class order.
    pub fn alphabet(&self) -> Vec<char> {
        self.sets.concat()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(Vec::is_empty)
    }
}

pub fn build_charset(config: &GenerationConfig) -> Charset {
    let sets = CharacterClass::ALL.map(|class| {
        if !config.classes.contains(class) {
            return Vec::new();
        }
        class
            .symbols()
            .chars()
            .filter(|c| !(config.exclude_confusing && is_confusing(*c)))
            .collect()
    });
    Charset { sets }
}
