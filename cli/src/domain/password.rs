//! Admin password generation.
//!
//! Pure logic over an injected random source. Each character class is drawn
//! independently, the per-class runs are concatenated in a fixed order, and
//! the whole sequence is shuffled so class membership cannot be read from
//! position.

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};

use crate::domain::error::ProvisionError;

pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!#$%&*+-=?@^_";

/// Longest password a policy may ask for.
pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Exact number of characters drawn from each class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub lowercase: usize,
    pub uppercase: usize,
    pub digits: usize,
    pub symbols: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            lowercase: 10,
            uppercase: 10,
            digits: 10,
            symbols: 2,
        }
    }
}

impl PasswordPolicy {
    /// Total password length, or `None` if the class counts overflow.
    #[must_use]
    pub fn total_len(&self) -> Option<usize> {
        self.classes()
            .iter()
            .try_fold(0usize, |total, (_, count)| total.checked_add(*count))
    }

    /// Check that the policy yields a non-empty password of at most
    /// `MAX_PASSWORD_LENGTH` characters, and return its length.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPasswordPolicy` if every count is zero or the total is
    /// out of range.
    pub fn validate(&self) -> Result<usize> {
        match self.total_len() {
            Some(0) => Err(ProvisionError::InvalidPasswordPolicy(
                "at least one character class must have a non-zero count".to_string(),
            )
            .into()),
            Some(n) if n <= MAX_PASSWORD_LENGTH => Ok(n),
            _ => Err(ProvisionError::InvalidPasswordPolicy(format!(
                "total length must not exceed {MAX_PASSWORD_LENGTH} characters"
            ))
            .into()),
        }
    }

    fn classes(&self) -> [(&'static [u8], usize); 4] {
        [
            (LOWERCASE, self.lowercase),
            (UPPERCASE, self.uppercase),
            (DIGITS, self.digits),
            (SYMBOLS, self.symbols),
        ]
    }
}

/// Generate a password with the thread-local CSPRNG.
///
/// # Errors
///
/// Returns an error if the policy is empty or too long.
pub fn generate_password(policy: &PasswordPolicy) -> Result<String> {
    generate_password_with(policy, &mut rand::thread_rng())
}

/// Generate a password from the given random source.
///
/// # Errors
///
/// Returns an error if the policy is empty or too long.
pub fn generate_password_with<R: Rng + CryptoRng + ?Sized>(
    policy: &PasswordPolicy,
    rng: &mut R,
) -> Result<String> {
    let len = policy.validate()?;

    let mut chars: Vec<u8> = Vec::with_capacity(len);
    for (alphabet, count) in policy.classes() {
        for _ in 0..count {
            // alphabets are non-empty constants
            if let Some(c) = alphabet.choose(&mut *rng) {
                chars.push(*c);
            }
        }
    }
    chars.shuffle(rng);

    Ok(chars.into_iter().map(char::from).collect())
}

/// Count of characters per class in `password`, in policy order.
#[must_use]
pub fn class_counts(password: &str) -> PasswordPolicy {
    let mut counts = PasswordPolicy {
        lowercase: 0,
        uppercase: 0,
        digits: 0,
        symbols: 0,
    };
    for b in password.bytes() {
        if LOWERCASE.contains(&b) {
            counts.lowercase += 1;
        } else if UPPERCASE.contains(&b) {
            counts.uppercase += 1;
        } else if DIGITS.contains(&b) {
            counts.digits += 1;
        } else if SYMBOLS.contains(&b) {
            counts.symbols += 1;
        }
    }
    counts
}
