//! Homomorphic operations on ciphertexts
//!
//! Everything here needs only the public key. Results are reduced modulo
//! `n`: sums past `n` wrap around, and callers needing overflow detection
//! must track bounds themselves.

use num_bigint::BigUint;
use rand::{thread_rng, CryptoRng, RngCore};

use crate::error::{PaillierError, Result};
use crate::keys::PublicKey;
use crate::types::Ciphertext;
use crate::utils::{mod_exp, mod_inverse};

/// Trait for homomorphic operations
pub trait HomomorphicOperations {
    /// Ciphertext addition: `Dec(add(c1, c2)) = (m1 + m2) mod n`
    fn add(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<Ciphertext>;

    /// Scalar multiplication by a known constant: `Dec(scalar_mul(c, k)) = (m * k) mod n`
    fn scalar_mul(&self, ct: &Ciphertext, k: &BigUint) -> Result<Ciphertext>;

    /// Fresh, unlinkable ciphertext of the same plaintext
    fn rerandomize(&self, ct: &Ciphertext) -> Result<Ciphertext>;

    /// Re-randomize drawing the blinding factor from `rng`
    fn rerandomize_with_rng<R: RngCore + CryptoRng>(
        &self,
        ct: &Ciphertext,
        rng: &mut R,
    ) -> Result<Ciphertext>;

    /// Add a known plaintext constant: `Dec(add_plaintext(c, k)) = (m + k) mod n`
    fn add_plaintext(&self, ct: &Ciphertext, k: &BigUint) -> Result<Ciphertext>;

    /// Homomorphic negation: `Dec(negate(c)) = (n - m) mod n`
    fn negate(&self, ct: &Ciphertext) -> Result<Ciphertext>;

    /// Homomorphic subtraction: `Dec(subtract(a, b)) = (m_a - m_b) mod n`
    fn subtract(&self, ct_a: &Ciphertext, ct_b: &Ciphertext) -> Result<Ciphertext>;

    /// Sum of a non-empty batch of ciphertexts
    fn sum(&self, ciphertexts: &[Ciphertext]) -> Result<Ciphertext>;

    /// Encrypted `sum(a_i * m_i) mod n`
    fn linear_combination(
        &self,
        ciphertexts: &[Ciphertext],
        coefficients: &[BigUint],
    ) -> Result<Ciphertext>;
}

impl HomomorphicOperations for PublicKey {
    fn add(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<Ciphertext> {
        self.check_ciphertext(ct1.value())?;
        self.check_ciphertext(ct2.value())?;

        let c = (ct1.value() * ct2.value()) % &self.n_squared;
        Ok(Ciphertext::new(c))
    }

    fn scalar_mul(&self, ct: &Ciphertext, k: &BigUint) -> Result<Ciphertext> {
        self.check_ciphertext(ct.value())?;

        let c = mod_exp(ct.value(), k, &self.n_squared);
        Ok(Ciphertext::new(c))
    }

    fn rerandomize(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.rerandomize_with_rng(ct, &mut thread_rng())
    }

    fn rerandomize_with_rng<R: RngCore + CryptoRng>(
        &self,
        ct: &Ciphertext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        self.check_ciphertext(ct.value())?;

        let r = self.random_blinding_factor(rng)?;
        let c = (ct.value() * self.blinding(&r)) % &self.n_squared;
        Ok(Ciphertext::new(c))
    }

    fn add_plaintext(&self, ct: &Ciphertext, k: &BigUint) -> Result<Ciphertext> {
        self.check_ciphertext(ct.value())?;
        self.check_plaintext(k)?;

        let c = (ct.value() * self.g_pow(k)) % &self.n_squared;
        Ok(Ciphertext::new(c))
    }

    fn negate(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.check_ciphertext(ct.value())?;

        let c = mod_inverse(ct.value(), &self.n_squared).ok_or_else(|| {
            PaillierError::InvalidCiphertext("ciphertext is not invertible mod n^2".to_string())
        })?;
        Ok(Ciphertext::new(c))
    }

    fn subtract(&self, ct_a: &Ciphertext, ct_b: &Ciphertext) -> Result<Ciphertext> {
        // a - b = a + (-b)
        let ct_b_neg = self.negate(ct_b)?;
        self.add(ct_a, &ct_b_neg)
    }

    fn sum(&self, ciphertexts: &[Ciphertext]) -> Result<Ciphertext> {
        let (first, rest) = ciphertexts.split_first().ok_or(PaillierError::EmptyBatch)?;
        self.check_ciphertext(first.value())?;

        rest.iter()
            .try_fold(first.clone(), |acc, ct| self.add(&acc, ct))
    }

    fn linear_combination(
        &self,
        ciphertexts: &[Ciphertext],
        coefficients: &[BigUint],
    ) -> Result<Ciphertext> {
        if ciphertexts.len() != coefficients.len() {
            return Err(PaillierError::LengthMismatch(format!(
                "ciphertexts: {}, coefficients: {}",
                ciphertexts.len(),
                coefficients.len()
            )));
        }

        let terms = ciphertexts
            .iter()
            .zip(coefficients)
            .map(|(ct, coeff)| self.scalar_mul(ct, coeff))
            .collect::<Result<Vec<_>>>()?;

        self.sum(&terms)
    }
}
