//! Core Paillier encryption and decryption operations

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::One;
use rand::{thread_rng, CryptoRng, RngCore};

use crate::error::{PaillierError, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::types::Ciphertext;
use crate::utils::{l_function, mod_exp, random_coprime};

impl PublicKey {
    /// Encrypt a plaintext in `[0, n)` with a fresh blinding factor
    ///
    /// # Example
    ///
    /// ```rust
    /// use phe::KeyPair;
    /// use num_bigint::BigUint;
    ///
    /// let keypair = KeyPair::generate(512).unwrap();
    /// let ct = keypair.public_key.encrypt(&BigUint::from(42u32)).unwrap();
    /// assert_eq!(keypair.private_key.decrypt(&ct).unwrap(), BigUint::from(42u32));
    /// ```
    pub fn encrypt(&self, plaintext: &BigUint) -> Result<Ciphertext> {
        self.encrypt_with_rng(plaintext, &mut thread_rng())
    }

    /// Encrypt drawing the blinding factor from `rng`
    pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
        &self,
        plaintext: &BigUint,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        self.check_plaintext(plaintext)?;
        let r = self.random_blinding_factor(rng)?;
        Ok(self.encrypt_raw(plaintext, &r))
    }

    /// Encrypt with a specific blinding factor (for test vectors).
    ///
    /// `r` must lie in `[1, n)` and be coprime to `n`. Reusing an `r` across
    /// two encryptions under the same key breaks semantic security.
    pub fn encrypt_with_randomness(&self, plaintext: &BigUint, r: &BigUint) -> Result<Ciphertext> {
        self.check_plaintext(plaintext)?;
        self.check_blinding_factor(r)?;
        Ok(self.encrypt_raw(plaintext, r))
    }

    /// Encrypt a signed integer, rejecting anything outside `[0, n)`.
    ///
    /// Negative values are not reduced modulo `n`; callers who want
    /// wraparound must reduce first.
    pub fn encrypt_signed(&self, plaintext: &BigInt) -> Result<Ciphertext> {
        let plaintext =
            BigUint::try_from(plaintext).map_err(|_| PaillierError::PlaintextOutOfRange)?;
        self.encrypt(&plaintext)
    }

    /// `g^m mod n^2`
    pub(crate) fn g_pow(&self, m: &BigUint) -> BigUint {
        if self.has_simplified_generator() {
            // (1 + n)^m = 1 + m*n (mod n^2)
            (BigUint::one() + m * &self.n) % &self.n_squared
        } else {
            mod_exp(&self.g, m, &self.n_squared)
        }
    }

    /// `r^n mod n^2`
    pub(crate) fn blinding(&self, r: &BigUint) -> BigUint {
        mod_exp(r, &self.n, &self.n_squared)
    }

    pub(crate) fn random_blinding_factor<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<BigUint> {
        random_coprime(rng, &self.n, self.max_coprime_attempts)
    }

    fn check_blinding_factor(&self, r: &BigUint) -> Result<()> {
        if r < &BigUint::one() || r >= &self.n {
            return Err(PaillierError::InvalidParameter(
                "Blinding factor must be in range [1, n)".to_string(),
            ));
        }
        if !r.gcd(&self.n).is_one() {
            return Err(PaillierError::InvalidParameter(
                "Blinding factor must be coprime to n".to_string(),
            ));
        }
        Ok(())
    }

    fn encrypt_raw(&self, plaintext: &BigUint, r: &BigUint) -> Ciphertext {
        let c = (self.g_pow(plaintext) * self.blinding(r)) % &self.n_squared;
        Ciphertext::new(c)
    }
}

impl PrivateKey {
    /// Decrypt a ciphertext in `[0, n^2)`.
    ///
    /// Fails with [`PaillierError::InvalidCiphertext`] if the ciphertext was
    /// not produced under the matching public key.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint> {
        let pk = &self.public_key;
        pk.check_ciphertext(ciphertext.value())?;

        let x = mod_exp(ciphertext.value(), &self.lambda, &pk.n_squared);
        let l = l_function(&x, &pk.n)?;

        Ok((l * &self.mu) % &pk.n)
    }
}
