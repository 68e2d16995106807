//! Core types and data structures

use num_bigint::BigUint;
use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the generator `g` of a public key is chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GeneratorMode {
    /// `g = n + 1`, so that `mu = lambda^-1 mod n`
    #[default]
    Simplified,
    /// Random `g` in `Z*_{n^2}` with `mu = L(g^lambda mod n^2)^-1 mod n`
    General,
}

impl fmt::Display for GeneratorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorMode::Simplified => write!(f, "Simplified"),
            GeneratorMode::General => write!(f, "General"),
        }
    }
}

/// Paillier ciphertext, an integer in `[0, n^2)`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ciphertext(pub(crate) BigUint);

impl Ciphertext {
    /// Wrap a raw integer. Range checks happen when the ciphertext is used.
    pub fn new(value: BigUint) -> Self {
        Ciphertext(value)
    }

    /// Get the underlying integer
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.0.to_bytes_be().len()
    }
}

impl From<BigUint> for Ciphertext {
    fn from(value: BigUint) -> Self {
        Ciphertext(value)
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext({} bytes)", self.size_bytes())
    }
}

/// Security policy and retry bounds for key generation and encryption
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaillierConfig {
    /// Smallest accepted modulus size in bits
    pub min_key_bits: u64,
    /// Primality error bound is `2^-primality_confidence`
    pub primality_confidence: u32,
    /// Candidates drawn per prime before giving up
    pub max_prime_attempts: usize,
    /// Full restarts of key generation before giving up
    pub max_keygen_attempts: usize,
    /// Blinding factor and general generator draws before giving up.
    /// Generated public keys carry this bound into encryption.
    pub max_coprime_attempts: usize,
    pub generator: GeneratorMode,
    /// Wall-clock bound on key generation
    pub deadline: Option<Duration>,
}

impl PaillierConfig {
    pub const DEFAULT_MIN_KEY_BITS: u64 = 512;
    pub const DEFAULT_MAX_COPRIME_ATTEMPTS: usize = 128;
    /// Modulus size below which a warning is logged
    pub const RECOMMENDED_KEY_BITS: u64 = 2048;

    /// Lower the minimum key size. Keys below 512 bits are not secure.
    pub fn with_min_key_bits(mut self, bits: u64) -> Self {
        self.min_key_bits = bits;
        self
    }

    pub fn with_primality_confidence(mut self, confidence: u32) -> Self {
        self.primality_confidence = confidence;
        self
    }

    pub fn with_max_prime_attempts(mut self, attempts: usize) -> Self {
        self.max_prime_attempts = attempts;
        self
    }

    pub fn with_max_keygen_attempts(mut self, attempts: usize) -> Self {
        self.max_keygen_attempts = attempts;
        self
    }

    pub fn with_max_coprime_attempts(mut self, attempts: usize) -> Self {
        self.max_coprime_attempts = attempts;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorMode) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Number of Miller-Rabin rounds needed to reach the configured confidence
    pub fn miller_rabin_rounds(&self) -> usize {
        crate::primes::miller_rabin_rounds(self.primality_confidence)
    }
}

impl Default for PaillierConfig {
    fn default() -> Self {
        PaillierConfig {
            min_key_bits: Self::DEFAULT_MIN_KEY_BITS,
            primality_confidence: 128,
            max_prime_attempts: 100_000,
            max_keygen_attempts: 64,
            max_coprime_attempts: Self::DEFAULT_MAX_COPRIME_ATTEMPTS,
            generator: GeneratorMode::Simplified,
            deadline: None,
        }
    }
}
