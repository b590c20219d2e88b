// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Side pots computation.
//!
//! Pots are derived from the players hand bets: the bets are sorted and each
//! distinct bet level makes a pot with the chips every player put in between
//! the previous level and this level. Players who folded add their chips to
//! the pots but cannot win them.
use ahash::AHashSet;

use sixmax_core::poker::{Chips, PlayerId};

/// A player hand bets.
#[derive(Debug, Clone, Copy)]
pub struct Stake {
    /// The player id.
    pub player_id: PlayerId,
    /// The chips the player bet in this hand.
    pub chips: Chips,
    /// The player folded.
    pub is_folded: bool,
}

/// A pot that contains players bets.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pot {
    /// The players who can win this pot.
    pub players: AHashSet<PlayerId>,
    /// The pot chips.
    pub chips: Chips,
}

/// Computes the pots for the given players bets, from the main pot to the last
/// side pot.
///
/// A bet level where all players folded is merged into the previous pot so
/// that its chips go to the players who are still in the hand.
pub fn side_pots<I>(stakes: I) -> Vec<Pot>
where
    I: IntoIterator<Item = Stake>,
{
    let mut stakes = stakes
        .into_iter()
        .filter(|s| s.chips > Chips::ZERO)
        .collect::<Vec<_>>();
    stakes.sort_by_key(|s| s.chips);

    let mut pots: Vec<Pot> = Vec::new();
    let mut last_level = Chips::ZERO;
    let mut uncontested = Chips::ZERO;

    for (idx, stake) in stakes.iter().enumerate() {
        if stake.chips <= last_level {
            continue;
        }

        let level = stake.chips;
        let chips = stakes
            .iter()
            .filter(|s| s.chips > last_level)
            .map(|s| s.chips.min(level) - last_level)
            .sum::<Chips>();

        let players = stakes[idx..]
            .iter()
            .filter(|s| !s.is_folded)
            .map(|s| s.player_id)
            .collect::<AHashSet<_>>();

        if players.is_empty() {
            match pots.last_mut() {
                Some(pot) => pot.chips += chips,
                None => uncontested += chips,
            }
        } else {
            pots.push(Pot {
                players,
                chips: chips + uncontested,
            });
            uncontested = Chips::ZERO;
        }

        last_level = level;
    }

    pots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stakes(bets: &[(u32, bool)]) -> Vec<Stake> {
        bets.iter()
            .enumerate()
            .map(|(idx, &(chips, is_folded))| Stake {
                player_id: PlayerId::from(idx as u64),
                chips: Chips::new(chips),
                is_folded,
            })
            .collect()
    }

    fn ids(ids: &[u64]) -> AHashSet<PlayerId> {
        ids.iter().map(|&id| PlayerId::from(id)).collect()
    }

    #[test]
    fn single_pot() {
        let pots = side_pots(stakes(&[(200, false), (200, false), (200, true)]));
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].chips, Chips::new(600));
        assert_eq!(pots[0].players, ids(&[0, 1]));
    }

    #[test]
    fn all_in_side_pots() {
        let pots = side_pots(stakes(&[
            (150, false),
            (25, false),
            (75, false),
            (150, false),
        ]));

        let chips = pots.iter().map(|p| p.chips.amount()).collect::<Vec<_>>();
        assert_eq!(chips, vec![100, 150, 150]);
        assert_eq!(pots[0].players, ids(&[0, 1, 2, 3]));
        assert_eq!(pots[1].players, ids(&[0, 2, 3]));
        assert_eq!(pots[2].players, ids(&[0, 3]));
    }

    #[test]
    fn folded_top_bettor() {
        let pots = side_pots(stakes(&[
            (100, false),
            (100, false),
            (300, false),
            (300, false),
            (500, true),
        ]));

        let total = pots.iter().map(|p| p.chips).sum::<Chips>();
        assert_eq!(total, Chips::new(1_300));

        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].chips, Chips::new(500));
        assert_eq!(pots[0].players, ids(&[0, 1, 2, 3]));

        // The folded player chips above 300 go to the last contested pot.
        let top = pots.last().unwrap();
        assert_eq!(top.chips, Chips::new(800));
        assert_eq!(top.players, ids(&[2, 3]));
        assert!(!top.players.contains(&PlayerId::from(4)));
    }

    #[test]
    fn folded_below_all_in() {
        // The folder chips count in the pots they reach.
        let pots = side_pots(stakes(&[(50, true), (100, false), (100, false)]));
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].chips, Chips::new(150));
        assert_eq!(pots[0].players, ids(&[1, 2]));
        assert_eq!(pots[1].chips, Chips::new(100));
        assert_eq!(pots[1].players, ids(&[1, 2]));
    }

    #[test]
    fn no_bets() {
        assert!(side_pots(stakes(&[(0, false), (0, true)])).is_empty());
    }
}
