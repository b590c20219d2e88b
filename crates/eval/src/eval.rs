// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker hand evaluator.
//!
//! A 5 cards hand is scored with a [HandRank] category and a tiebreak key:
//!
//! - for hands with paired ranks (one pair, two pair, three of a kind, full
//!   house, four of a kind) the key lists the distinct ranks ordered by count
//!   and then by rank, so a full house `KKK22` has key `[K, 2]`;
//! - for the other hands the key lists the five ranks in descending order.
//!
//! The ace-low straight `A2345` is keyed as `[5, 4, 3, 2, 1]` so that it ranks
//! below a six-high straight.
//!
//! [HandValue::eval] evaluates 5, 6, or 7 cards hands by scoring every 5-cards
//! subset (21 subsets for a 7 cards hand) and keeping the best one.
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

use sixmax_cards::{Card, Rank, for_each_combination};

/// The hand category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum HandRank {
    /// High card.
    HighCard = 0,
    /// One pair.
    OnePair,
    /// Two pair.
    TwoPair,
    /// Three of a kind.
    ThreeOfAKind,
    /// Straight.
    Straight,
    /// Flush.
    Flush,
    /// Full house.
    FullHouse,
    /// Four of a kind.
    FourOfAKind,
    /// Straight flush.
    StraightFlush,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandRank::HighCard => "High Card",
            HandRank::OnePair => "One Pair",
            HandRank::TwoPair => "Two Pair",
            HandRank::ThreeOfAKind => "Three of a Kind",
            HandRank::Straight => "Straight",
            HandRank::Flush => "Flush",
            HandRank::FullHouse => "Full House",
            HandRank::FourOfAKind => "Four of a Kind",
            HandRank::StraightFlush => "Straight Flush",
        };

        write!(f, "{name}")
    }
}

/// The value of a hand.
///
/// Values compare by rank and tiebreak key, two values with the same score
/// are equal even if made of different cards.
#[derive(Debug, Clone, Copy)]
pub struct HandValue {
    rank: HandRank,
    key: [u8; 5],
    hand: [Card; 5],
}

impl HandValue {
    /// Evaluates a 5, 6, or 7 cards hand and returns the value of the best
    /// 5 cards hand.
    ///
    /// Panics if the hand has fewer than 5 or more than 7 cards.
    pub fn eval(cards: &[Card]) -> Self {
        assert!(
            (5..=7).contains(&cards.len()),
            "Cannot evaluate a {} cards hand",
            cards.len()
        );

        let mut best: Option<HandValue> = None;
        for_each_combination(cards, 5, |hand| {
            let hv = Self::eval5([hand[0], hand[1], hand[2], hand[3], hand[4]]);
            if best.is_none_or(|b| hv > b) {
                best = Some(hv);
            }
        });

        // There is at least one 5 cards subset.
        best.expect("Hand should have 5 cards")
    }

    /// Evaluates a 5 cards hand.
    pub fn eval5(hand: [Card; 5]) -> Self {
        let mut ranks = hand.map(|c| c.rank().value());
        ranks.sort_unstable_by(|a, b| b.cmp(a));

        // Count ranks, ranks are sorted so equal ranks are adjacent.
        let mut groups: Vec<(u8, u8)> = Vec::with_capacity(5);
        for &r in &ranks {
            match groups.last_mut() {
                Some((rank, count)) if *rank == r => *count += 1,
                _ => groups.push((r, 1)),
            }
        }

        // Order by count then rank descending.
        groups.sort_unstable_by(|a, b| (b.1, b.0).cmp(&(a.1, a.0)));

        let is_flush = hand.iter().all(|c| c.suit() == hand[0].suit());
        let mut is_straight = groups.len() == 5 && ranks[0] - ranks[4] == 4;

        let wheel = [
            Rank::Ace.value(),
            Rank::Five.value(),
            Rank::Four.value(),
            Rank::Trey.value(),
            Rank::Deuce.value(),
        ];
        if !is_straight && ranks == wheel {
            is_straight = true;
            ranks = [5, 4, 3, 2, 1];
        }

        let counts = groups.iter().map(|g| g.1).collect::<Vec<_>>();
        let rank = match counts.as_slice() {
            _ if is_straight && is_flush => HandRank::StraightFlush,
            [4, 1] => HandRank::FourOfAKind,
            [3, 2] => HandRank::FullHouse,
            _ if is_flush => HandRank::Flush,
            _ if is_straight => HandRank::Straight,
            [3, 1, 1] => HandRank::ThreeOfAKind,
            [2, 2, 1] => HandRank::TwoPair,
            [2, 1, 1, 1] => HandRank::OnePair,
            _ => HandRank::HighCard,
        };

        let key = match rank {
            HandRank::StraightFlush | HandRank::Flush | HandRank::Straight | HandRank::HighCard => {
                ranks
            }
            _ => {
                let mut key = [0; 5];
                for (k, g) in key.iter_mut().zip(&groups) {
                    *k = g.0;
                }
                key
            }
        };

        Self { rank, key, hand }
    }

    /// The hand category.
    pub fn rank(&self) -> HandRank {
        self.rank
    }

    /// The tiebreak key used to compare hands with the same rank.
    pub fn key(&self) -> &[u8] {
        let len = self.key.iter().take_while(|&&k| k > 0).count();
        &self.key[..len]
    }

    /// The 5 cards that make this hand.
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    /// A label for this hand with the category and the top ranked card.
    pub fn label(&self) -> String {
        format!("{} ({})", self.rank, Rank::value_char(self.key[0]))
    }
}

impl PartialEq for HandValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HandValue {}

impl PartialOrd for HandValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandValue {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.rank, self.key).cmp(&(other.rank, other.key))
    }
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
