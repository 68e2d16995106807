//! Integration tests for the Paillier library

use std::collections::HashSet;
use std::thread;

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use phe::{
    Ciphertext, GeneratorMode, HomomorphicOperations, KeyPair, PaillierConfig, PaillierError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn keypair_with_seed(seed: u64) -> (KeyPair, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let keypair = KeyPair::generate_with_rng(512, &PaillierConfig::default(), &mut rng)
        .expect("Failed to generate keys");
    (keypair, rng)
}

fn toy_keypair() -> KeyPair {
    KeyPair::from_primes(&BigUint::from(13u32), &BigUint::from(17u32))
        .expect("Failed to build toy keys")
}

#[test]
fn test_round_trip_random_plaintexts() {
    let (keypair, mut rng) = keypair_with_seed(100);
    let pk = &keypair.public_key;

    for _ in 0..50 {
        let m = rng.gen_biguint_below(pk.n());
        for _ in 0..3 {
            let ct = pk.encrypt_with_rng(&m, &mut rng).unwrap();
            assert_eq!(keypair.private_key.decrypt(&ct).unwrap(), m);
        }
    }
}

#[test]
fn test_probabilistic_distinctness() {
    let (keypair, mut rng) = keypair_with_seed(101);
    let pk = &keypair.public_key;
    let m = BigUint::from(5u32);

    let mut seen = HashSet::new();
    for _ in 0..1000 {
        let ct = pk.encrypt_with_rng(&m, &mut rng).unwrap();
        assert!(seen.insert(ct), "ciphertext collision");
    }
}

#[test]
fn test_additive_homomorphism() {
    let (keypair, mut rng) = keypair_with_seed(102);
    let pk = &keypair.public_key;
    let n = pk.n();

    for _ in 0..20 {
        let a = rng.gen_biguint_below(n);
        let b = rng.gen_biguint_below(n);

        let ct_a = pk.encrypt_with_rng(&a, &mut rng).unwrap();
        let ct_b = pk.encrypt_with_rng(&b, &mut rng).unwrap();
        let ct_sum = pk.add(&ct_a, &ct_b).unwrap();

        assert_eq!(keypair.private_key.decrypt(&ct_sum).unwrap(), (a + b) % n);
    }
}

#[test]
fn test_scalar_homomorphism() {
    let (keypair, mut rng) = keypair_with_seed(103);
    let pk = &keypair.public_key;
    let n = pk.n();

    for _ in 0..20 {
        let a = rng.gen_biguint_below(n);
        let k = rng.gen_biguint_below(n);

        let ct = pk.encrypt_with_rng(&a, &mut rng).unwrap();
        let ct_scaled = pk.scalar_mul(&ct, &k).unwrap();

        assert_eq!(
            keypair.private_key.decrypt(&ct_scaled).unwrap(),
            (a * k) % n
        );
    }
}

#[test]
fn test_rerandomization_preserves_plaintext() {
    let (keypair, mut rng) = keypair_with_seed(104);
    let pk = &keypair.public_key;
    let plaintext = BigUint::from(999u32);

    let original = pk.encrypt_with_rng(&plaintext, &mut rng).unwrap();

    // Re-randomize multiple times
    let mut current = original.clone();
    for _ in 0..10 {
        let next = pk.rerandomize_with_rng(&current, &mut rng).unwrap();
        assert_ne!(next, current);
        assert_eq!(keypair.private_key.decrypt(&next).unwrap(), plaintext);
        current = next;
    }

    assert_ne!(original, current);
}

#[test]
fn test_key_validity_invariants() {
    for (seed, mode) in [(105, GeneratorMode::Simplified), (106, GeneratorMode::General)] {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = PaillierConfig::default().with_generator(mode);
        let keypair = KeyPair::generate_with_rng(512, &config, &mut rng).unwrap();
        let pk = &keypair.public_key;
        let sk = &keypair.private_key;

        assert!(pk.n().is_odd());
        assert!(pk.bit_size() == 511 || pk.bit_size() == 512);
        assert!(pk.n().gcd(sk.lambda()).is_one());
        assert_eq!(pk.n_squared(), &(pk.n() * pk.n()));
        sk.validate().unwrap();

        if mode == GeneratorMode::Simplified {
            assert!(((sk.mu() * sk.lambda()) % pk.n()).is_one());
        }
    }
}

#[test]
fn test_rejection_of_malformed_inputs() {
    let (keypair, _) = keypair_with_seed(107);
    let pk = &keypair.public_key;

    assert_eq!(
        pk.encrypt(pk.n()).unwrap_err(),
        PaillierError::PlaintextOutOfRange
    );
    assert_eq!(
        pk.encrypt_signed(&BigInt::from(-1)).unwrap_err(),
        PaillierError::PlaintextOutOfRange
    );
    assert_eq!(
        keypair
            .private_key
            .decrypt(&Ciphertext::new(pk.n_squared().clone()))
            .unwrap_err(),
        PaillierError::CiphertextOutOfRange
    );
}

#[test]
fn test_worked_example() {
    let keypair = toy_keypair();
    let pk = &keypair.public_key;
    let n = BigUint::from(221u32);

    assert_eq!(pk.n(), &n);
    assert_eq!(pk.g(), &BigUint::from(222u32));

    let m1 = BigUint::from(123u32);
    let m2 = BigUint::from(38u32);
    let r1 = BigUint::from(23u32);
    let r2 = BigUint::from(101u32);

    let ct1 = pk.encrypt_with_randomness(&m1, &r1).unwrap();
    let ct2 = pk.encrypt_with_randomness(&m2, &r2).unwrap();
    let combined = pk.add(&ct1, &ct2).unwrap();

    // Enc(m1) * Enc(m2) is Enc(m1 + m2) with blinding factor r1 * r2
    let r_product = (&r1 * &r2) % &n;
    let direct = pk.encrypt_with_randomness(&(&m1 + &m2), &r_product).unwrap();
    assert_eq!(combined, direct);

    assert_eq!(
        keypair.private_key.decrypt(&combined).unwrap(),
        BigUint::from(161u32)
    );
}

#[test]
fn test_worked_example_with_random_blinding() {
    let keypair = toy_keypair();
    let pk = &keypair.public_key;

    for _ in 0..25 {
        let ct1 = pk.encrypt(&BigUint::from(123u32)).unwrap();
        let ct2 = pk.encrypt(&BigUint::from(38u32)).unwrap();
        let combined = pk.add(&ct1, &ct2).unwrap();
        assert_eq!(
            keypair.private_key.decrypt(&combined).unwrap(),
            BigUint::from(161u32)
        );
    }
}

#[test]
fn test_private_sum_workflow() {
    let (keypair, mut rng) = keypair_with_seed(108);
    let pk = &keypair.public_key;

    // Each participant encrypts a value; an aggregator combines them blindly
    let salaries = [52_000u32, 61_500, 48_250, 75_000, 58_900];
    let ciphertexts: Vec<_> = salaries
        .iter()
        .map(|s| pk.encrypt_with_rng(&BigUint::from(*s), &mut rng).unwrap())
        .collect();

    let total = pk.sum(&ciphertexts).unwrap();
    let forwarded = pk.rerandomize_with_rng(&total, &mut rng).unwrap();

    let expected: u32 = salaries.iter().sum();
    assert_eq!(
        keypair.private_key.decrypt(&forwarded).unwrap(),
        BigUint::from(expected)
    );
}

#[test]
fn test_concurrent_use_of_shared_keys() {
    let keypair = KeyPair::generate(512).expect("Failed to generate keys");

    thread::scope(|scope| {
        for worker in 0u32..4 {
            let keypair = &keypair;
            scope.spawn(move || {
                for i in 0u32..10 {
                    let m = BigUint::from(worker * 100 + i);
                    let ct = keypair.public_key.encrypt(&m).unwrap();
                    let doubled = keypair.public_key.add(&ct, &ct).unwrap();
                    assert_eq!(keypair.private_key.decrypt(&doubled).unwrap(), &m * 2u32);
                }
            });
        }
    });
}

#[test]
fn test_deterministic_rng_reproduces_keys() {
    let (first, _) = keypair_with_seed(109);
    let (second, _) = keypair_with_seed(109);
    assert_eq!(first.public_key, second.public_key);
    assert_eq!(first.private_key, second.private_key);
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trip() {
    let keypair = toy_keypair();
    let ct = keypair.public_key.encrypt(&BigUint::from(7u32)).unwrap();

    let json = serde_json::to_string(&keypair).unwrap();
    let restored: KeyPair = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.public_key, keypair.public_key);

    let ct_json = serde_json::to_string(&ct).unwrap();
    let ct_restored: Ciphertext = serde_json::from_str(&ct_json).unwrap();
    assert_eq!(
        restored.private_key.decrypt(&ct_restored).unwrap(),
        BigUint::from(7u32)
    );
}
