//! # Paillier Homomorphic Encryption Library
//!
//! This library implements the Paillier probabilistic public-key
//! cryptosystem:
//! - Key generation from two random primes of equal bit length
//! - Probabilistic encryption of integers in `[0, n)`
//! - Exact decryption back to the plaintext
//! - Additive homomorphism on ciphertexts, using only the public key
//!
//! ## Features
//!
//! - **Injected randomness**: every random draw goes through a caller-supplied
//!   `RngCore + CryptoRng`, with `thread_rng` convenience wrappers
//! - **Bounded retries**: prime search, key generation and blinding factor
//!   draws fail with an error instead of looping forever
//! - **Re-randomization**: unlinkable copies of a ciphertext
//! - **Two generator modes**: `g = n + 1` or a random `g`
//!
//! ## Example
//!
//! ```rust
//! use phe::{HomomorphicOperations, KeyPair};
//! use num_bigint::BigUint;
//!
//! // Generate keys
//! let keypair = KeyPair::generate(512).unwrap();
//! let pk = &keypair.public_key;
//!
//! // Encrypt values
//! let ct1 = pk.encrypt(&BigUint::from(10u32)).unwrap();
//! let ct2 = pk.encrypt(&BigUint::from(20u32)).unwrap();
//!
//! // Perform homomorphic addition
//! let sum = pk.add(&ct1, &ct2).unwrap();
//!
//! // Decrypt result
//! let result = keypair.private_key.decrypt(&sum).unwrap();
//! assert_eq!(result, BigUint::from(30u32));
//! ```

pub mod encryption;
pub mod error;
pub mod homomorphic;
pub mod keys;
pub mod primes;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use error::{PaillierError, Result};
pub use homomorphic::HomomorphicOperations;
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use primes::{generate_prime, is_probable_prime};
pub use types::{Ciphertext, GeneratorMode, PaillierConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
