// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Sixmax Poker cards types.
//!
//! This crate defines types to create cards:
//!
//! ```
//! # use sixmax_cards::{Card, Rank, Suit};
//! let ah = Card::new(Rank::Ace, Suit::Hearts);
//! assert_eq!(ah.to_string(), "AH");
//! assert_eq!(ah.rank().value(), 14);
//! ```
//!
//! and a [Deck] type for shuffling and dealing the cards of a hand:
//!
//! ```
//! # use sixmax_cards::Deck;
//! let mut deck = Deck::new_and_shuffled(&mut rand::rng());
//! let (c1, c2) = (deck.deal(), deck.deal());
//! assert_ne!(c1, c2);
//! assert_eq!(deck.count(), Deck::SIZE - 2);
//! ```
//!
//! The deck can also iterate through all the k-cards combinations of its
//! cards:
//!
//! ```
//! # use sixmax_cards::Deck;
//! let mut counter = 0;
//! Deck::default().for_each(2, |hand| {
//!     assert_eq!(hand.len(), 2);
//!     counter += 1;
//! });
//! assert_eq!(counter, 1_326);
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
mod deck;
pub use deck::{Card, Deck, Rank, Suit, for_each_combination};
