//! Randomized stress run for the sediment.
//!
//! Drives long random sequences of deposits and erosions across many chains,
//! mirroring them in plain vectors, and checks after every erosion that:
//! 1. Every live chain is a valid red-black tree
//! 2. Every chain iterates exactly its recorded history, newest first
//! 3. Point queries agree with a linear scan
//!
//! Usage: `cargo run --release --features bench --bin stress -- [seed] [rounds]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sediment::{Head, Sediment};

const CHAINS: usize = 64;

fn main() {
    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(0);
    let rounds: usize = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(1_000);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut sediment: Sediment<u64, u64> = Sediment::new();
    let mut heads: Vec<Option<Head>> = vec![None; CHAINS];
    let mut model: Vec<Vec<(u64, u64)>> = vec![Vec::new(); CHAINS];
    let mut clock = 0u64;
    let mut serial = 0u64;
    let mut eroded = 0usize;

    for round in 0..rounds {
        // A burst of deposits, then one erosion.
        for _ in 0..rng.gen_range(1..256) {
            clock += rng.gen_range(0..3);
            serial += 1;
            let chain = rng.gen_range(0..CHAINS);
            heads[chain] = Some(sediment.deposit(serial, clock, heads[chain]));
            model[chain].push((serial, clock));
        }

        let until = clock.saturating_sub(rng.gen_range(0..64));
        let rollbacks = sediment.erode(&until);
        eroded += rollbacks.len();
        for head in heads.iter_mut() {
            rollbacks.apply(head);
        }
        for history in model.iter_mut() {
            history.retain(|&(_, t)| t <= until);
        }
        clock = until;

        for chain in 0..CHAINS {
            let stratum = sediment.stratum(heads[chain]);
            if let Err(violation) = stratum.validate() {
                panic!("round {}: chain {} invalid: {}", round, chain, violation);
            }
            let actual: Vec<(u64, u64)> = stratum.iter().map(|(&v, &t)| (v, t)).collect();
            let expected: Vec<(u64, u64)> = model[chain].iter().rev().copied().collect();
            assert_eq!(actual, expected, "round {}: chain {} history mismatch", round, chain);

            let probe = rng.gen_range(0..=clock);
            let scanned = model[chain].iter().rev().find(|&&(_, t)| t <= probe).map(|&(v, _)| v);
            assert_eq!(stratum.value(&probe).copied(), scanned, "round {}: chain {} at {}", round, chain, probe);
        }
    }

    println!("seed {}: {} rounds ok", seed, rounds);
    println!("  beds live: {}", sediment.len());
    println!("  beds eroded: {}", eroded);
}
