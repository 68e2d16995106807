//! Probabilistic primality testing and random prime generation

use std::time::Instant;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::{CryptoRng, RngCore};
use tracing::trace;

use crate::error::{PaillierError, Result};
use crate::types::PaillierConfig;
use crate::utils::{mod_exp, random_bits, random_in_range};

/// Odd primes below 500, used to discard most candidates before Miller-Rabin
const SIEVE_PRIMES: &[u32] = &[
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421,
    431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499,
];

/// Miller-Rabin rounds giving an error probability of at most `2^-confidence`
pub fn miller_rabin_rounds(confidence: u32) -> usize {
    // A composite survives a single round with probability at most 1/4
    (confidence as usize).div_ceil(2).max(1)
}

/// Miller-Rabin primality test.
///
/// `Ok(false)` means `candidate` is certainly composite (or below 2).
/// `Ok(true)` means it is prime except with probability at most
/// `2^-confidence`. Witnesses are drawn from `rng`.
pub fn is_probable_prime<R: RngCore + CryptoRng>(
    candidate: &BigUint,
    confidence: u32,
    rng: &mut R,
) -> Result<bool> {
    let two = BigUint::from(2u32);

    if candidate < &two {
        return Ok(false);
    }
    if candidate == &two {
        return Ok(true);
    }
    if candidate.is_even() {
        return Ok(false);
    }

    if let Some(verdict) = sieve(candidate) {
        return Ok(verdict);
    }

    let n_minus_1 = candidate - BigUint::one();
    let (s, d) = factor_powers_of_two(&n_minus_1);

    'witness: for _ in 0..miller_rabin_rounds(confidence) {
        // Witness in [2, n - 2]
        let a = random_in_range(rng, &two, &n_minus_1)?;
        let mut x = mod_exp(&a, &d, candidate);

        if x.is_one() || x == n_minus_1 {
            continue;
        }

        for _ in 1..s {
            x = mod_exp(&x, &two, candidate);
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return Ok(false);
    }

    Ok(true)
}

/// Trial division by small primes. `None` means the sieve is inconclusive.
fn sieve(candidate: &BigUint) -> Option<bool> {
    let small = candidate.to_u32();
    for &prime in SIEVE_PRIMES {
        if small == Some(prime) {
            return Some(true);
        }
        if (candidate % prime).is_zero() {
            return Some(false);
        }
    }

    // Every composite below 500^2 has a factor in the table
    match small {
        Some(value) if value < 500 * 500 => Some(true),
        _ => None,
    }
}

/// Factor out powers of 2: returns (s, d) with n = 2^s * d and d odd
pub fn factor_powers_of_two(n: &BigUint) -> (u64, BigUint) {
    let s = n.trailing_zeros().unwrap_or(0);
    (s, n >> s)
}

/// Generate a random prime with exactly `bit_length` bits.
///
/// Candidates have their top bit set (fixing the length) and their bottom bit
/// set (forcing oddness). Gives up with
/// [`PaillierError::GenerationExhausted`] after `config.max_prime_attempts`
/// candidates or once `config.deadline` has passed.
pub fn generate_prime<R: RngCore + CryptoRng>(
    bit_length: u64,
    config: &PaillierConfig,
    rng: &mut R,
) -> Result<BigUint> {
    let deadline = config.deadline.map(|limit| Instant::now() + limit);
    generate_prime_until(bit_length, config, rng, deadline)
}

pub(crate) fn generate_prime_until<R: RngCore + CryptoRng>(
    bit_length: u64,
    config: &PaillierConfig,
    rng: &mut R,
    deadline: Option<Instant>,
) -> Result<BigUint> {
    if bit_length < 2 {
        return Err(PaillierError::InvalidParameter(format!(
            "Cannot generate a {}-bit prime",
            bit_length
        )));
    }

    let top_bit = BigUint::one() << (bit_length - 1);

    for attempt in 1..=config.max_prime_attempts {
        if deadline.is_some_and(|limit| Instant::now() >= limit) {
            return Err(PaillierError::GenerationExhausted {
                what: format!("{}-bit prime before deadline", bit_length),
                attempts: attempt - 1,
            });
        }

        let mut candidate = random_bits(rng, bit_length)?;
        candidate |= &top_bit;
        candidate |= BigUint::one();

        if is_probable_prime(&candidate, config.primality_confidence, rng)? {
            trace!(bit_length, attempts = attempt, "found prime");
            return Ok(candidate);
        }
    }

    Err(PaillierError::GenerationExhausted {
        what: format!("{}-bit prime", bit_length),
        attempts: config.max_prime_attempts,
    })
}
