//! Key generation and management

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{thread_rng, CryptoRng, RngCore};
use std::fmt;
use std::time::Instant;
use tracing::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PaillierError, Result};
use crate::primes::{generate_prime_until, is_probable_prime};
use crate::types::{GeneratorMode, PaillierConfig};
use crate::utils::{l_function, mod_exp, mod_inverse, random_coprime};

/// Paillier public key
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PublicKey {
    pub(crate) n: BigUint,         // Modulus p * q
    pub(crate) n_squared: BigUint, // n^2, ciphertext modulus
    pub(crate) g: BigUint,         // Generator
    /// Ceiling on blinding factor draws in encryption and re-randomization
    #[cfg_attr(feature = "serde", serde(default = "default_max_coprime_attempts"))]
    pub(crate) max_coprime_attempts: usize,
}

#[cfg(feature = "serde")]
fn default_max_coprime_attempts() -> usize {
    PaillierConfig::DEFAULT_MAX_COPRIME_ATTEMPTS
}

// The retry ceiling is a local policy, not part of the key material
impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.g == other.g
    }
}

impl Eq for PublicKey {}

impl PublicKey {
    /// Create a public key with the simplified generator `g = n + 1`
    pub fn new(n: BigUint) -> Result<Self> {
        let g = &n + BigUint::one();
        Self::with_generator(n, g)
    }

    /// Create a public key with an explicit generator
    pub fn with_generator(n: BigUint, g: BigUint) -> Result<Self> {
        let n_squared = &n * &n;
        let public_key = PublicKey {
            n,
            n_squared,
            g,
            max_coprime_attempts: PaillierConfig::DEFAULT_MAX_COPRIME_ATTEMPTS,
        };
        public_key.validate()?;
        Ok(public_key)
    }

    /// Replace the ceiling on blinding factor draws
    pub fn with_max_coprime_attempts(mut self, attempts: usize) -> Self {
        self.max_coprime_attempts = attempts;
        self
    }

    /// Blinding factor draws allowed before encryption gives up
    pub fn max_coprime_attempts(&self) -> usize {
        self.max_coprime_attempts
    }

    /// Get the modulus `n`
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Get the cached `n^2`
    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }

    /// Get the generator `g`
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Get the bit size of the modulus
    pub fn bit_size(&self) -> u64 {
        self.n.bits()
    }

    /// Whether this key uses `g = n + 1`
    pub fn has_simplified_generator(&self) -> bool {
        self.g == &self.n + 1u32
    }

    /// Validate the public key
    pub fn validate(&self) -> Result<()> {
        // n is a product of two odd primes
        if self.n <= BigUint::from(3u32) || self.n.is_even() {
            return Err(PaillierError::InvalidParameter(
                "Modulus n must be an odd composite".to_string(),
            ));
        }

        if self.n_squared != &self.n * &self.n {
            return Err(PaillierError::InvalidParameter(
                "Cached n^2 does not match n".to_string(),
            ));
        }

        if self.g <= BigUint::one() || self.g >= self.n_squared {
            return Err(PaillierError::InvalidParameter(
                "Generator g must be in range (1, n^2)".to_string(),
            ));
        }

        if !self.g.gcd(&self.n).is_one() {
            return Err(PaillierError::InvalidParameter(
                "Generator g must be coprime to n".to_string(),
            ));
        }

        Ok(())
    }

    pub(crate) fn check_plaintext(&self, plaintext: &BigUint) -> Result<()> {
        if plaintext >= &self.n {
            return Err(PaillierError::PlaintextOutOfRange);
        }
        Ok(())
    }

    pub(crate) fn check_ciphertext(&self, ciphertext: &BigUint) -> Result<()> {
        if ciphertext >= &self.n_squared {
            return Err(PaillierError::CiphertextOutOfRange);
        }
        Ok(())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({} bits)", self.bit_size())
    }
}

/// Paillier private key
///
/// Embeds the matching public key, whose `n` and `n^2` are needed to decrypt.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrivateKey {
    pub(crate) lambda: BigUint, // lcm(p - 1, q - 1)
    pub(crate) mu: BigUint,     // L(g^lambda mod n^2)^-1 mod n
    pub(crate) public_key: PublicKey,
}

impl PrivateKey {
    /// Get the secret exponent `lambda`
    pub fn lambda(&self) -> &BigUint {
        &self.lambda
    }

    /// Get the decryption constant `mu`
    pub fn mu(&self) -> &BigUint {
        &self.mu
    }

    /// Get the public key this private key decrypts for
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Check that `mu` inverts `L(g^lambda mod n^2)` modulo `n`
    pub fn validate(&self) -> Result<()> {
        let pk = &self.public_key;
        pk.validate()?;

        if self.lambda.is_zero() || self.mu.is_zero() || self.mu >= pk.n {
            return Err(PaillierError::InvalidParameter(
                "Private key parameters out of range".to_string(),
            ));
        }

        let u = mod_exp(&pk.g, &self.lambda, &pk.n_squared);
        let l = l_function(&u, &pk.n)
            .map_err(|_| PaillierError::InvalidParameter("g^lambda is not 1 mod n".to_string()))?;

        if !((l * &self.mu) % &pk.n).is_one() {
            return Err(PaillierError::InvalidParameter(
                "mu is not the inverse of L(g^lambda) mod n".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("lambda", &"***")
            .field("mu", &"***")
            .field("public_key", &self.public_key)
            .finish()
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(***)")
    }
}

/// Paillier key pair
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl KeyPair {
    /// Generate a new Paillier key pair with the given modulus size
    ///
    /// # Arguments
    ///
    /// * `bit_size` - The bit size of the modulus `n` (minimum 512, even)
    ///
    /// # Example
    ///
    /// ```rust
    /// use phe::KeyPair;
    ///
    /// let keypair = KeyPair::generate(1024).expect("Failed to generate keys");
    /// assert!(keypair.bit_size() >= 1023);
    /// ```
    pub fn generate(bit_size: u64) -> Result<Self> {
        Self::generate_with_config(bit_size, &PaillierConfig::default())
    }

    /// Generate a key pair under a custom policy using the thread-local CSPRNG
    pub fn generate_with_config(bit_size: u64, config: &PaillierConfig) -> Result<Self> {
        Self::generate_with_rng(bit_size, config, &mut thread_rng())
    }

    /// Generate a key pair drawing all randomness from `rng`.
    ///
    /// Either returns a complete key pair satisfying every invariant, or an
    /// error and no key material.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(
        bit_size: u64,
        config: &PaillierConfig,
        rng: &mut R,
    ) -> Result<Self> {
        if bit_size < config.min_key_bits {
            return Err(PaillierError::InvalidKeySize {
                bits: bit_size,
                min: config.min_key_bits,
            });
        }
        if bit_size < 8 || bit_size % 2 != 0 {
            return Err(PaillierError::InvalidParameter(format!(
                "Key size must be an even number of bits, at least 8 (got {})",
                bit_size
            )));
        }

        if config.min_key_bits < PaillierConfig::DEFAULT_MIN_KEY_BITS {
            warn!(
                min_key_bits = config.min_key_bits,
                "minimum key size lowered below {} bits",
                PaillierConfig::DEFAULT_MIN_KEY_BITS
            );
        }
        if bit_size < PaillierConfig::RECOMMENDED_KEY_BITS {
            warn!(
                bit_size,
                "key size below the recommended {} bits",
                PaillierConfig::RECOMMENDED_KEY_BITS
            );
        }

        let started = Instant::now();
        let deadline = config.deadline.map(|limit| started + limit);
        let prime_bits = bit_size / 2;

        debug!(bit_size, generator = %config.generator, "generating Paillier key pair");

        for attempt in 1..=config.max_keygen_attempts {
            let p = generate_prime_until(prime_bits, config, rng, deadline)?;
            let q = generate_prime_until(prime_bits, config, rng, deadline)?;

            if p == q {
                trace!(attempt, "p == q, regenerating");
                continue;
            }

            match Self::derive(&p, &q, config, rng, deadline)? {
                Some(keypair) => {
                    debug!(
                        bit_size = keypair.bit_size(),
                        attempts = attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "generated Paillier key pair"
                    );
                    return Ok(keypair);
                }
                None => trace!(attempt, "gcd(n, lambda) != 1, regenerating"),
            }
        }

        Err(PaillierError::GenerationExhausted {
            what: "key pair".to_string(),
            attempts: config.max_keygen_attempts,
        })
    }

    /// Build a key pair from two known primes with the simplified generator.
    ///
    /// No minimum size is enforced, which makes this the explicit route to
    /// toy keys for worked examples. Never use small primes in production.
    pub fn from_primes(p: &BigUint, q: &BigUint) -> Result<Self> {
        let config = PaillierConfig::default();
        let mut rng = thread_rng();

        for prime in [p, q] {
            if !is_probable_prime(prime, config.primality_confidence, &mut rng)? {
                return Err(PaillierError::InvalidParameter(format!(
                    "{} is not prime",
                    prime
                )));
            }
        }
        if p == q {
            return Err(PaillierError::InvalidParameter(
                "p and q must be distinct".to_string(),
            ));
        }
        if p == &BigUint::from(2u32) || q == &BigUint::from(2u32) {
            return Err(PaillierError::InvalidParameter(
                "p and q must be odd".to_string(),
            ));
        }

        Self::derive(p, q, &config, &mut rng, None)?.ok_or_else(|| {
            PaillierError::InvalidParameter("gcd(p * q, lambda) must be 1".to_string())
        })
    }

    /// Derive both keys from distinct primes. Returns `Ok(None)` when
    /// `gcd(n, lambda) != 1` so the caller can pick new primes.
    fn derive<R: RngCore + CryptoRng>(
        p: &BigUint,
        q: &BigUint,
        config: &PaillierConfig,
        rng: &mut R,
        deadline: Option<Instant>,
    ) -> Result<Option<Self>> {
        let n = p * q;
        let n_squared = &n * &n;
        let lambda = (p - 1u32).lcm(&(q - 1u32));

        if !n.gcd(&lambda).is_one() {
            return Ok(None);
        }

        let (g, mu) = match config.generator {
            GeneratorMode::Simplified => {
                // L((n + 1)^lambda mod n^2) = lambda mod n
                let mu = mod_inverse(&lambda, &n).ok_or_else(|| {
                    PaillierError::InternalInvariantViolation(
                        "lambda has no inverse modulo n".to_string(),
                    )
                })?;
                (&n + 1u32, mu)
            }
            GeneratorMode::General => choose_general_generator(
                &n,
                &n_squared,
                &lambda,
                config.max_coprime_attempts,
                rng,
                deadline,
            )?,
        };

        let public_key = PublicKey {
            n,
            n_squared,
            g,
            max_coprime_attempts: config.max_coprime_attempts,
        };
        let private_key = PrivateKey {
            lambda,
            mu,
            public_key: public_key.clone(),
        };

        public_key.validate()?;

        Ok(Some(KeyPair {
            public_key,
            private_key,
        }))
    }

    /// Get the bit size of the keys
    pub fn bit_size(&self) -> u64 {
        self.public_key.bit_size()
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({} bits)", self.bit_size())
    }
}

/// Pick a random `g` coprime to `n` for which `L(g^lambda mod n^2)` is
/// invertible modulo `n`, returning `(g, mu)`.
fn choose_general_generator<R: RngCore + CryptoRng>(
    n: &BigUint,
    n_squared: &BigUint,
    lambda: &BigUint,
    max_attempts: usize,
    rng: &mut R,
    deadline: Option<Instant>,
) -> Result<(BigUint, BigUint)> {
    for attempt in 0..max_attempts {
        if deadline.is_some_and(|limit| Instant::now() >= limit) {
            return Err(PaillierError::GenerationExhausted {
                what: "generator within deadline".to_string(),
                attempts: attempt,
            });
        }
        let g = random_coprime(rng, n_squared, max_attempts)?;
        if g.is_one() {
            continue;
        }

        // gcd(g, n) = 1 forces g^lambda = 1 (mod n)
        let u = mod_exp(&g, lambda, n_squared);
        let l = l_function(&u, n).map_err(|_| {
            PaillierError::InternalInvariantViolation("g^lambda is not 1 mod n".to_string())
        })?;

        if let Some(mu) = mod_inverse(&l, n) {
            return Ok((g, mu));
        }
    }

    Err(PaillierError::GenerationExhausted {
        what: "generator with invertible L(g^lambda)".to_string(),
        attempts: max_attempts,
    })
}
