//! Utilities for generating passwords.

use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};
use zeroize::Zeroize;

use crate::charset::build_charset;
use crate::strength::{analyze, StrengthReport};
use crate::{ConfigurationError, GenerationConfig, Password};

/// Generate one password for `config`.
///
/// One character is drawn from every enabled, non-empty class, the rest are drawn from the whole
/// alphabet, and the result is shuffled so the guaranteed characters land in unpredictable
/// positions. If `config.length` is smaller than the number of contributing classes, the
/// guarantee is dropped and every character is drawn from the whole alphabet.
///
/// `rng` must be a cryptographically secure generator such as `rand::rngs::OsRng`. Note that
/// `rand`'s uniform sampler re-samples rather than taking a modulus, so draws are unbiased.
pub fn generate<R>(rng: &mut R, config: &GenerationConfig) -> Result<Password, ConfigurationError>
where
    R: Rng + CryptoRng,
{
    if config.classes.is_empty() {
        return Err(ConfigurationError::NoClassesEnabled);
    }
    let charset = build_charset(config);
    let alphabet = charset.alphabet();
    if alphabet.is_empty() {
        return Err(ConfigurationError::AllCharactersExcluded);
    }

    let mut chars = charset
        .non_empty_classes()
        .map(|(_, symbols)| pick(rng, symbols))
        .collect::<Vec<char>>();

    if config.length < chars.len() {
        // Wipes and empties the buffer.
        chars.zeroize();
    }
    let fill = config.length - chars.len();
    chars.extend((0..fill).map(|_| pick(rng, &alphabet)));
    chars.shuffle(rng);

    let password = chars.iter().collect::<String>();
    chars.zeroize();
    tracing::trace!(length = config.length, "generated password");
    Ok(Password::from(password))
}

/// A password together with its strength report.
#[derive(Debug, Clone)]
pub struct GeneratedPassword {
    pub password: Password,
    pub report: StrengthReport,
}

/// Generate and analyze `count` passwords. Fails before producing anything if the config has no
/// usable alphabet.
pub fn generate_batch<R>(
    rng: &mut R,
    config: &GenerationConfig,
    count: usize,
) -> Result<Vec<GeneratedPassword>, ConfigurationError>
where
    R: Rng + CryptoRng,
{
    let mut batch = Vec::with_capacity(count);
    for _ in 0..count {
        let password = generate(rng, config)?;
        let report = analyze(password.as_str());
        batch.push(GeneratedPassword { password, report });
    }
    tracing::debug!(count, length = config.length, "generated password batch");
    Ok(batch)
}

// `symbols` is never empty here: callers only pass non-empty class sets or a non-empty alphabet.
fn pick<R: Rng>(rng: &mut R, symbols: &[char]) -> char {
    symbols[rng.gen_range(0..symbols.len())]
}
