// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Table player types.
use sixmax_core::{
    message::{PlayerAction, PlayerUpdate, Position},
    poker::{Chips, PlayerCards, PlayerId},
};

/// A table player state.
#[derive(Debug)]
pub struct Player {
    /// The player id.
    pub player_id: PlayerId,
    /// This player nickname.
    pub nickname: String,
    /// This player chips.
    pub chips: Chips,
    /// The player chips when the hand started.
    pub start_chips: Chips,
    /// The player bet in this street.
    pub bet: Chips,
    /// The player bets in this hand.
    pub total_bet: Chips,
    /// The last player action.
    pub action: PlayerAction,
    /// This player cards that are visible to all other players.
    pub public_cards: PlayerCards,
    /// This player private cards.
    pub hole_cards: PlayerCards,
    /// The player folded or is not playing this hand.
    pub is_folded: bool,
    /// The player has no chips left to bet in this hand.
    pub is_all_in: bool,
    /// The player acted since the last raise in this street.
    pub has_acted: bool,
    /// The player position in this hand.
    pub position: Position,
    /// The player hand name at showdown.
    pub hand_name: Option<String>,
}

impl Player {
    /// Creates a new player.
    pub fn new(player_id: PlayerId, nickname: String, chips: Chips) -> Self {
        Self {
            player_id,
            nickname,
            chips,
            start_chips: chips,
            bet: Chips::ZERO,
            total_bet: Chips::ZERO,
            action: PlayerAction::None,
            public_cards: PlayerCards::None,
            hole_cards: PlayerCards::None,
            is_folded: false,
            is_all_in: false,
            has_acted: false,
            position: Position::None,
            hand_name: None,
        }
    }

    /// Moves chips from this player stack to the bets and returns the chips
    /// actually bet.
    ///
    /// If the player doesn't have enough chips bets all the chips and goes
    /// all-in.
    pub fn bet(&mut self, chips: Chips) -> Chips {
        let chips = if chips >= self.chips {
            self.is_all_in = true;
            self.chips
        } else {
            chips
        };

        self.chips -= chips;
        self.bet += chips;
        self.total_bet += chips;
        chips
    }

    /// Sets this player in fold state.
    pub fn fold(&mut self) {
        self.is_folded = true;
        self.action = PlayerAction::Fold;
        self.public_cards = PlayerCards::None;
    }

    /// Checks if this player can still act in the hand.
    pub fn can_act(&self) -> bool {
        !self.is_folded && !self.is_all_in
    }

    /// Checks if this player is still in the hand.
    pub fn in_hand(&self) -> bool {
        !self.is_folded
    }

    /// Reset state for a new hand, players with no chips sit out.
    pub fn start_hand(&mut self) {
        self.start_chips = self.chips;
        self.bet = Chips::ZERO;
        self.total_bet = Chips::ZERO;
        self.action = PlayerAction::None;
        self.public_cards = PlayerCards::None;
        self.hole_cards = PlayerCards::None;
        self.is_folded = self.chips == Chips::ZERO;
        self.is_all_in = false;
        self.has_acted = false;
        self.position = Position::None;
        self.hand_name = None;
    }

    /// Reset state for a new street.
    pub fn start_round(&mut self) {
        self.bet = Chips::ZERO;
        self.has_acted = false;
        if !self.is_folded {
            self.action = PlayerAction::None;
        }
    }

    /// Restores the player chips and clears the hand.
    pub fn reset(&mut self, chips: Chips) {
        self.chips = chips;
        self.start_hand();
    }

    /// Projects this player as seen by the `viewer`.
    pub fn update(&self, viewer: Option<PlayerId>) -> PlayerUpdate {
        let cards = if viewer == Some(self.player_id) {
            self.hole_cards
        } else {
            self.public_cards
        };

        PlayerUpdate {
            player_id: self.player_id,
            nickname: self.nickname.clone(),
            chips: self.chips,
            profit: self.chips.delta(self.start_chips),
            bet: self.bet,
            cards,
            is_folded: self.is_folded,
            is_all_in: self.is_all_in,
            has_acted: self.has_acted,
            action: self.action,
            position: self.position,
            hand_name: self.hand_name.clone(),
        }
    }
}

/// The table players in seat order.
#[derive(Debug, Default)]
pub struct PlayersState {
    players: Vec<Player>,
}

impl PlayersState {
    /// Adds a player to the table and returns its seat.
    pub fn join(&mut self, player: Player) -> usize {
        self.players.push(player);
        self.players.len() - 1
    }

    /// Returns total number of players.
    pub fn count(&self) -> usize {
        self.players.len()
    }

    /// Returns the number of players still in the hand.
    pub fn count_in_hand(&self) -> usize {
        self.players.iter().filter(|p| p.in_hand()).count()
    }

    /// Returns the number of players in the hand who can still bet.
    pub fn count_can_act(&self) -> usize {
        self.players.iter().filter(|p| p.can_act()).count()
    }

    /// Returns the number of player who have chips.
    pub fn count_with_chips(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.chips > Chips::ZERO)
            .count()
    }

    /// Returns the seat of a player.
    pub fn seat(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.player_id == player_id)
    }

    /// Returns the first seat after `from` going around the table whose player
    /// matches the predicate, `from` itself is checked last.
    pub fn next_seat<P>(&self, from: usize, pred: P) -> Option<usize>
    where
        P: Fn(&Player) -> bool,
    {
        let n = self.players.len();
        (1..=n)
            .map(|offset| (from + offset) % n)
            .find(|&seat| pred(&self.players[seat]))
    }

    /// Returns an iterator to all players.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Returns a mutable iterator to all players.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }
}

impl std::ops::Index<usize> for PlayersState {
    type Output = Player;

    fn index(&self, seat: usize) -> &Self::Output {
        &self.players[seat]
    }
}

impl std::ops::IndexMut<usize> for PlayersState {
    fn index_mut(&mut self, seat: usize) -> &mut Self::Output {
        &mut self.players[seat]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sixmax_core::poker::{Card, Rank, Suit};

    fn new_player(chips: u32) -> Player {
        Player::new(PlayerId::new_id(), "Alice".to_string(), Chips::new(chips))
    }

    #[test]
    fn bet_moves_chips() {
        let mut p = new_player(1_000);
        assert_eq!(p.bet(Chips::new(300)), Chips::new(300));
        assert_eq!(p.bet(Chips::new(200)), Chips::new(200));
        assert_eq!(p.chips, Chips::new(500));
        assert_eq!(p.bet, Chips::new(500));
        assert_eq!(p.total_bet, Chips::new(500));
        assert!(!p.is_all_in);

        p.start_round();
        assert_eq!(p.bet, Chips::ZERO);
        assert_eq!(p.total_bet, Chips::new(500));
    }

    #[test]
    fn bet_clamps_to_stack() {
        let mut p = new_player(1_000);
        assert_eq!(p.bet(Chips::new(5_000)), Chips::new(1_000));
        assert_eq!(p.chips, Chips::ZERO);
        assert!(p.is_all_in);
        assert!(!p.can_act());

        // Betting exactly the stack is all-in too.
        let mut p = new_player(1_000);
        assert_eq!(p.bet(Chips::new(1_000)), Chips::new(1_000));
        assert!(p.is_all_in);
    }

    #[test]
    fn zero_stack_sits_out() {
        let mut p = new_player(0);
        p.start_hand();
        assert!(p.is_folded);

        p.reset(Chips::new(5_000));
        assert!(!p.is_folded);
        assert_eq!(p.start_chips, Chips::new(5_000));
    }

    #[test]
    fn update_hides_hole_cards() {
        let mut p = new_player(1_000);
        let cards = PlayerCards::Cards(
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::King, Suit::Spades),
        );
        p.hole_cards = cards;
        p.public_cards = PlayerCards::Covered;
        p.bet(Chips::new(400));

        let own = p.update(Some(p.player_id));
        assert_eq!(own.cards, cards);
        assert_eq!(own.profit, -400);

        assert_eq!(p.update(None).cards, PlayerCards::Covered);
        assert_eq!(
            p.update(Some(PlayerId::new_id())).cards,
            PlayerCards::Covered
        );

        p.fold();
        assert_eq!(p.update(None).cards, PlayerCards::None);
        assert_eq!(p.update(None).action, PlayerAction::Fold);
    }

    #[test]
    fn next_seat_skips_players() {
        let mut players = PlayersState::default();
        for chips in [1_000, 1_000, 1_000, 1_000] {
            players.join(new_player(chips));
        }

        players[1].fold();
        players[2].bet(Chips::new(1_000));

        assert_eq!(players.next_seat(0, Player::can_act), Some(3));
        assert_eq!(players.next_seat(3, Player::can_act), Some(0));
        assert_eq!(players.next_seat(0, Player::in_hand), Some(2));
        assert_eq!(players.count_can_act(), 2);
        assert_eq!(players.count_in_hand(), 3);

        players[3].fold();
        assert_eq!(players.next_seat(0, Player::can_act), Some(0));
    }
}
