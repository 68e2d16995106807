//! Modular arithmetic and sampling helpers

use crate::error::{PaillierError, Result};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::{CryptoRng, RngCore};

/// Draws allowed when rejection-sampling below a bound. Each draw succeeds
/// with probability above 1/2.
const MAX_SAMPLE_ATTEMPTS: usize = 256;

/// Modular exponentiation: base^exp mod modulus
pub fn mod_exp(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Compute modular inverse using the extended Euclidean algorithm
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let m_int = BigInt::from(m.clone());
    let (gcd, x) = extended_gcd(&BigInt::from(a % m), &m_int);

    if !gcd.is_one() {
        return None;
    }

    // Bring a possibly negative coefficient back into [0, m)
    let x = x.mod_floor(&m_int);
    debug_assert!(!x.is_negative());
    BigUint::try_from(x).ok()
}

/// Iterative extended Euclid: returns (gcd(a, b), x) with a*x = gcd (mod b)
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let (quotient, remainder) = old_r.div_rem(&r);
        old_r = std::mem::replace(&mut r, remainder);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    (old_r, old_s)
}

/// The Paillier `L` function: `L(x) = (x - 1) / n`, defined only when
/// `x = 1 (mod n)`. Any remainder is reported instead of being truncated.
pub fn l_function(x: &BigUint, n: &BigUint) -> Result<BigUint> {
    if n.is_zero() {
        return Err(PaillierError::InvalidParameter(
            "L function modulus must be non-zero".to_string(),
        ));
    }
    if x.is_zero() {
        return Err(PaillierError::InvalidCiphertext(
            "L function input is zero".to_string(),
        ));
    }

    let (quotient, remainder) = (x - BigUint::one()).div_rem(n);
    if !remainder.is_zero() {
        return Err(PaillierError::InvalidCiphertext(
            "L function input is not 1 mod n".to_string(),
        ));
    }

    Ok(quotient)
}

/// Uniform random integer in `[0, 2^bits)`.
///
/// Uses `try_fill_bytes` so a failing source surfaces as
/// [`PaillierError::RandomSourceUnavailable`].
pub fn random_bits<R: RngCore + CryptoRng>(rng: &mut R, bits: u64) -> Result<BigUint> {
    if bits == 0 {
        return Ok(BigUint::zero());
    }

    let byte_len = usize::try_from(bits.div_ceil(8)).map_err(|_| {
        PaillierError::InvalidParameter(format!("{} bits is too large to sample", bits))
    })?;
    let mut bytes = vec![0u8; byte_len];
    rng.try_fill_bytes(&mut bytes)?;

    // Clear the excess high bits of the most significant byte
    let excess = (byte_len as u64) * 8 - bits;
    if excess > 0 {
        bytes[byte_len - 1] &= 0xffu8 >> excess;
    }

    Ok(BigUint::from_bytes_le(&bytes))
}

/// Uniform random integer in `[0, upper)` by rejection sampling
pub fn random_below<R: RngCore + CryptoRng>(rng: &mut R, upper: &BigUint) -> Result<BigUint> {
    if upper.is_zero() {
        return Err(PaillierError::InvalidParameter(
            "Sampling bound must be positive".to_string(),
        ));
    }

    let bits = upper.bits();
    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let candidate = random_bits(rng, bits)?;
        if &candidate < upper {
            return Ok(candidate);
        }
    }

    Err(PaillierError::GenerationExhausted {
        what: "uniform sample".to_string(),
        attempts: MAX_SAMPLE_ATTEMPTS,
    })
}

/// Uniform random integer in `[low, high)`
pub fn random_in_range<R: RngCore + CryptoRng>(
    rng: &mut R,
    low: &BigUint,
    high: &BigUint,
) -> Result<BigUint> {
    if low >= high {
        return Err(PaillierError::InvalidParameter(format!(
            "Empty sampling range [{}, {})",
            low, high
        )));
    }
    Ok(low + random_below(rng, &(high - low))?)
}

/// Random `r` in `[1, n)` with `gcd(r, n) = 1`, redrawing on failure
pub fn random_coprime<R: RngCore + CryptoRng>(
    rng: &mut R,
    n: &BigUint,
    max_attempts: usize,
) -> Result<BigUint> {
    if n <= &BigUint::one() {
        return Err(PaillierError::InvalidParameter(
            "Modulus must be greater than 1".to_string(),
        ));
    }

    for _ in 0..max_attempts {
        let r = random_in_range(rng, &BigUint::one(), n)?;
        if r.gcd(n).is_one() {
            return Ok(r);
        }
    }

    Err(PaillierError::GenerationExhausted {
        what: "blinding factor coprime to n".to_string(),
        attempts: max_attempts,
    })
}
