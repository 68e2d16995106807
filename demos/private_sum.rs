//! Privacy-preserving tally using Paillier encryption
//!
//! Voters encrypt a one-hot ballot under the election key. The aggregator adds
//! ballots without ever seeing a vote and re-randomizes the totals before
//! handing them to the key holder, who decrypts only the final counts.

use num_bigint::BigUint;
use phe::{Ciphertext, HomomorphicOperations, KeyPair, PaillierError, PublicKey};
use std::collections::HashSet;

/// Aggregator holding only the public key
struct Tally {
    public_key: PublicKey,
    voters: HashSet<String>,
    totals: Vec<Ciphertext>,
}

impl Tally {
    fn new(public_key: PublicKey, candidates: usize) -> Result<Self, PaillierError> {
        let zero = BigUint::from(0u32);
        let totals = (0..candidates)
            .map(|_| public_key.encrypt(&zero))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Tally {
            public_key,
            voters: HashSet::new(),
            totals,
        })
    }

    /// Add an encrypted one-hot ballot to the running totals
    fn cast(&mut self, voter_id: &str, ballot: &[Ciphertext]) -> Result<(), String> {
        if ballot.len() != self.totals.len() {
            return Err("Ballot has the wrong number of entries".to_string());
        }
        if !self.voters.insert(voter_id.to_string()) {
            return Err(format!("{} has already voted", voter_id));
        }

        for (total, entry) in self.totals.iter_mut().zip(ballot) {
            *total = self
                .public_key
                .add(total, entry)
                .map_err(|e| format!("Tally failed: {}", e))?;
        }

        println!("✓ Ballot accepted from {}", voter_id);
        Ok(())
    }

    /// Unlinkable copies of the totals for the key holder
    fn publish(&self) -> Result<Vec<Ciphertext>, PaillierError> {
        self.totals
            .iter()
            .map(|total| self.public_key.rerandomize(total))
            .collect()
    }
}

fn encrypt_ballot(
    public_key: &PublicKey,
    choice: usize,
    candidates: usize,
) -> Result<Vec<Ciphertext>, PaillierError> {
    (0..candidates)
        .map(|i| public_key.encrypt(&BigUint::from(u32::from(i == choice))))
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Private Tally with Paillier Encryption ===\n");

    let candidates = ["Alice", "Bob", "Carol"];

    println!("Generating 1024-bit election key...");
    let keypair = KeyPair::generate(1024)?;
    println!("✓ {}", keypair);

    let mut tally = Tally::new(keypair.public_key.clone(), candidates.len())?;

    let votes = [
        ("voter-1", 0),
        ("voter-2", 1),
        ("voter-3", 0),
        ("voter-4", 2),
        ("voter-5", 0),
    ];

    for (voter, choice) in votes {
        let ballot = encrypt_ballot(&keypair.public_key, choice, candidates.len())?;
        tally.cast(voter, &ballot)?;
    }

    // A second ballot from the same voter is refused
    let repeat = encrypt_ballot(&keypair.public_key, 1, candidates.len())?;
    if let Err(e) = tally.cast("voter-2", &repeat) {
        println!("✗ {}", e);
    }

    println!("\n--- Results ---");
    for (name, total) in candidates.iter().zip(tally.publish()?) {
        let count = keypair.private_key.decrypt(&total)?;
        println!("{:>6}: {}", name, count);
    }

    Ok(())
}
