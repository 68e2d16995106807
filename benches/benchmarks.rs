//! Performance benchmarks for Paillier operations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use num_bigint::BigUint;
use phe::{generate_prime, HomomorphicOperations, KeyPair, PaillierConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn benchmark_prime_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("prime_generation");
    group.sample_size(10);
    let config = PaillierConfig::default();

    for bits in [256u64, 512].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(bits), bits, |b, &bits| {
            let mut rng = StdRng::seed_from_u64(bits);
            b.iter(|| generate_prime(bits, &config, &mut rng).expect("Failed to generate prime"));
        });
    }

    group.finish();
}

fn benchmark_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_generation");
    group.sample_size(10);

    for bits in [512u64, 1024, 2048].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(bits), bits, |b, &bits| {
            b.iter(|| KeyPair::generate(bits).expect("Failed to generate keys"));
        });
    }

    group.finish();
}

fn benchmark_encryption(c: &mut Criterion) {
    let mut group = c.benchmark_group("encryption");

    for bits in [1024u64, 2048].iter() {
        let keypair = KeyPair::generate(*bits).expect("Failed to generate keys");
        let plaintext = BigUint::from(42u32);

        group.bench_with_input(BenchmarkId::from_parameter(bits), &keypair, |b, keypair| {
            b.iter(|| {
                keypair
                    .public_key
                    .encrypt(black_box(&plaintext))
                    .expect("Encryption failed")
            });
        });
    }

    group.finish();
}

fn benchmark_decryption(c: &mut Criterion) {
    let mut group = c.benchmark_group("decryption");

    for bits in [1024u64, 2048].iter() {
        let keypair = KeyPair::generate(*bits).expect("Failed to generate keys");
        let ciphertext = keypair
            .public_key
            .encrypt(&BigUint::from(42u32))
            .expect("Encryption failed");

        group.bench_with_input(BenchmarkId::from_parameter(bits), &keypair, |b, keypair| {
            b.iter(|| {
                keypair
                    .private_key
                    .decrypt(black_box(&ciphertext))
                    .expect("Decryption failed")
            });
        });
    }

    group.finish();
}

fn benchmark_homomorphic_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("homomorphic_operations");

    let keypair = KeyPair::generate(1024).expect("Failed to generate keys");
    let pk = &keypair.public_key;
    let ct1 = pk.encrypt(&BigUint::from(10u32)).expect("Encryption failed");
    let ct2 = pk.encrypt(&BigUint::from(20u32)).expect("Encryption failed");
    let scalar = BigUint::from(1_000_003u32);

    group.bench_function("add", |b| {
        b.iter(|| pk.add(black_box(&ct1), black_box(&ct2)).expect("Addition failed"));
    });

    group.bench_function("scalar_mul", |b| {
        b.iter(|| {
            pk.scalar_mul(black_box(&ct1), black_box(&scalar))
                .expect("Scalar multiplication failed")
        });
    });

    group.bench_function("rerandomize", |b| {
        b.iter(|| pk.rerandomize(black_box(&ct1)).expect("Rerandomization failed"));
    });

    group.finish();
}

fn benchmark_batch_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_operations");

    let keypair = KeyPair::generate(1024).expect("Failed to generate keys");
    let pk = &keypair.public_key;

    for size in [10usize, 100].iter() {
        let ciphertexts: Vec<_> = (0..*size)
            .map(|i| pk.encrypt(&BigUint::from(i)).expect("Encryption failed"))
            .collect();

        group.bench_with_input(BenchmarkId::new("sum", size), &ciphertexts, |b, cts| {
            b.iter(|| pk.sum(black_box(cts)).expect("Batch sum failed"));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_prime_generation,
    benchmark_key_generation,
    benchmark_encryption,
    benchmark_decryption,
    benchmark_homomorphic_operations,
    benchmark_batch_operations
);

criterion_main!(benches);
