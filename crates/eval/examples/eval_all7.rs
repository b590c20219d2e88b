// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
//
// Evaluates every 7 cards hand and checks the category counts.
//
// Run with:
//
// ```bash
// $ cargo r --release --example eval_all7
// ```
use std::time::Instant;

use sixmax_eval::*;

// Number of 7 cards hands for each category, from high card to straight flush.
const EXPECTED: [usize; 9] = [
    23_294_460, 58_627_800, 31_433_400, 6_461_620, 6_180_020, 4_047_644, 3_473_184, 224_848,
    41_584,
];

const CATEGORIES: [HandRank; 9] = [
    HandRank::HighCard,
    HandRank::OnePair,
    HandRank::TwoPair,
    HandRank::ThreeOfAKind,
    HandRank::Straight,
    HandRank::Flush,
    HandRank::FullHouse,
    HandRank::FourOfAKind,
    HandRank::StraightFlush,
];

fn main() {
    let now = Instant::now();
    let mut counts = [0usize; 9];

    Deck::default().for_each(7, |hand| {
        let rank = HandValue::eval(hand).rank();
        counts[rank as usize] += 1;
    });

    let elapsed = now.elapsed().as_secs_f64();
    let total = counts.iter().sum::<usize>();
    println!("Evaluated {total} hands in {elapsed:.3}s");
    println!("{:.0} hands/sec\n", total as f64 / elapsed);

    let mut mismatches = 0;
    for (rank, (&count, &expected)) in CATEGORIES.iter().zip(counts.iter().zip(&EXPECTED)) {
        let status = if count == expected { "ok" } else { "MISMATCH" };
        if count != expected {
            mismatches += 1;
        }

        println!("{:<16} {count:>10} {status}", rank.to_string());
    }

    if mismatches > 0 {
        eprintln!("\n{mismatches} categories don't match the expected counts");
        std::process::exit(1);
    }
}
