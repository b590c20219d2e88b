// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Table state types.
use ahash::AHashMap;
use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use std::time::Instant;

use sixmax_core::{
    message::{HandPayoff, HandPhase, PlayerAction, Position, TableUpdate},
    poker::{Card, Chips, Deck, HandValue, PlayerCards, PlayerId},
};

use super::{
    TableConfig, TableError,
    player::{Player, PlayersState},
    pots::{self, Stake},
};

/// The hand state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandState {
    /// The table is waiting for players to start a hand.
    WaitForPlayers,
    /// Handle preflop betting.
    PreflopBetting,
    /// Handle flop betting.
    FlopBetting,
    /// Handle turn betting.
    TurnBetting,
    /// Handle river betting.
    RiverBetting,
    /// The hand has ended, results are shown until the next hand.
    EndHand,
}

impl HandState {
    fn in_progress(&self) -> bool {
        !matches!(self, HandState::WaitForPlayers | HandState::EndHand)
    }
}

/// The result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Joined {
    /// The player id.
    pub player_id: PlayerId,
    /// The player seat.
    pub seat: usize,
    /// The player chips.
    pub chips: Chips,
    /// The player was already at the table.
    pub rejoined: bool,
}

/// Internal table state.
#[derive(Debug)]
pub struct State {
    config: TableConfig,
    hand_state: HandState,
    players: PlayersState,
    deck: Deck,
    board: Vec<Card>,
    dealer: Option<usize>,
    turn: Option<usize>,
    turn_start: Option<Instant>,
    high_bet: Chips,
    pot: Chips,
    announcement: Option<String>,
    payoffs: Vec<HandPayoff>,
    rng: StdRng,
}

impl State {
    const NOT_ENOUGH_PLAYERS: &'static str = "Not enough players with chips, reset the table";
    const TABLE_RESET: &'static str = "Table reset";

    /// Create a new state.
    pub fn new(config: TableConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a new state with user initialized randomness.
    pub fn with_rng(config: TableConfig, mut rng: StdRng) -> Self {
        // There must be 2 to 6 seats.
        assert!((2..=6).contains(&config.seats));

        Self {
            config,
            hand_state: HandState::WaitForPlayers,
            players: PlayersState::default(),
            deck: Deck::new_and_shuffled(&mut rng),
            board: Vec::default(),
            dealer: None,
            turn: None,
            turn_start: None,
            high_bet: Chips::ZERO,
            pot: Chips::ZERO,
            announcement: None,
            payoffs: Vec::default(),
            rng,
        }
    }

    /// A player tries to join the table.
    ///
    /// A player that joins while a hand is in progress sits out until the
    /// next hand.
    pub fn join(
        &mut self,
        nickname: &str,
        player_id: Option<PlayerId>,
    ) -> Result<Joined, TableError> {
        // Rejoining is a no-op.
        if let Some(seat) = player_id.and_then(|id| self.players.seat(id)) {
            let player = &self.players[seat];
            return Ok(Joined {
                player_id: player.player_id,
                seat,
                chips: player.chips,
                rejoined: true,
            });
        }

        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(TableError::EmptyNickname);
        }

        if self.players.count() == self.config.seats {
            return Err(TableError::TableFull);
        }

        let player_id = PlayerId::new_id();
        let mut player = Player::new(player_id, nickname.to_string(), self.config.starting_chips);
        player.is_folded = self.hand_state.in_progress();

        let chips = player.chips;
        let seat = self.players.join(player);

        info!("Player {nickname} {player_id} joined seat {seat}");

        Ok(Joined {
            player_id,
            seat,
            chips,
            rejoined: false,
        })
    }

    /// Starts a new hand, rotates the button, pays the blinds and deals cards.
    ///
    /// If there are fewer than 2 players with chips the hand doesn't start and
    /// the players are told to reset the table.
    pub fn start_hand(&mut self) -> Result<(), TableError> {
        if self.hand_state.in_progress() {
            return Err(TableError::HandInProgress);
        }

        if self.players.count_with_chips() < 2 {
            info!("Cannot start hand with fewer than 2 players with chips");
            self.hand_state = HandState::WaitForPlayers;
            self.board.clear();
            self.payoffs.clear();
            self.pot = Chips::ZERO;
            self.high_bet = Chips::ZERO;
            self.set_turn(None);
            self.announcement = Some(Self::NOT_ENOUGH_PLAYERS.to_string());
            return Ok(());
        }

        self.announcement = None;
        self.payoffs.clear();
        self.board.clear();
        self.deck = Deck::new_and_shuffled(&mut self.rng);
        self.pot = Chips::ZERO;

        for player in self.players.iter_mut() {
            player.start_hand();
        }

        // Move the button to the next player with chips.
        let num_players = self.players.count();
        let from = self.dealer.unwrap_or(num_players - 1);
        let dealer = self
            .players
            .next_seat(from, Player::in_hand)
            .unwrap_or_default();

        let next_in_hand = |seat: usize| self.players.next_seat(seat, Player::in_hand);

        // Heads-up the dealer pays the small blind and acts first preflop.
        let heads_up = self.players.count_in_hand() == 2;
        let small_blind = if heads_up {
            dealer
        } else {
            next_in_hand(dealer).unwrap_or(dealer)
        };
        let big_blind = next_in_hand(small_blind).unwrap_or(small_blind);
        let first = if heads_up {
            small_blind
        } else {
            next_in_hand(big_blind).unwrap_or(big_blind)
        };

        self.dealer = Some(dealer);
        self.players[small_blind].position = Position::SmallBlind;
        self.players[big_blind].position = Position::BigBlind;
        self.players[dealer].position = Position::Dealer;

        // Deal the cards to each player in the hand.
        for player in self.players.iter_mut() {
            if player.in_hand() {
                let (c1, c2) = (self.deck.deal(), self.deck.deal());
                player.hole_cards = PlayerCards::Cards(c1, c2);
                player.public_cards = PlayerCards::Covered;
            }
        }

        // Pay small and big blind.
        let sb = &mut self.players[small_blind];
        self.pot += sb.bet(self.config.small_blind);
        sb.action = PlayerAction::SmallBlind;

        let bb = &mut self.players[big_blind];
        self.pot += bb.bet(self.config.big_blind);
        bb.action = PlayerAction::BigBlind;

        self.high_bet = self.config.big_blind;
        self.hand_state = HandState::PreflopBetting;

        info!(
            "Hand started dealer {dealer} small blind {small_blind} big blind {big_blind}"
        );

        // Start from the seat before the first player so that the turn moves to
        // the first player that can act.
        self.turn = Some((first + num_players - 1) % num_players);
        self.next_turn();

        Ok(())
    }

    /// Handles a player action.
    ///
    /// Actions from a player who is not on turn are rejected.
    pub fn action(
        &mut self,
        player_id: PlayerId,
        action: PlayerAction,
        amount: Option<Chips>,
    ) -> Result<(), TableError> {
        if !self.hand_state.in_progress() {
            return Err(TableError::NoHandInProgress);
        }

        let seat = self
            .turn
            .filter(|&seat| self.players[seat].player_id == player_id)
            .ok_or(TableError::NotYourTurn)?;

        let high_bet = self.high_bet;
        let player = &mut self.players[seat];

        match action {
            PlayerAction::Fold => {
                player.fold();
            }
            PlayerAction::Check | PlayerAction::Call => {
                let gap = high_bet - player.bet;
                self.pot += player.bet(gap);
                player.action = if gap == Chips::ZERO {
                    PlayerAction::Check
                } else {
                    PlayerAction::Call
                };
            }
            PlayerAction::Raise => {
                let target = amount.filter(|&a| a > high_bet).ok_or(TableError::InvalidRaise)?;
                self.pot += player.bet(target - player.bet);
                player.action = PlayerAction::Raise;
            }
            PlayerAction::AllIn => {
                self.pot += player.bet(player.chips);
                player.action = PlayerAction::AllIn;
            }
            action => return Err(TableError::InvalidAction(action)),
        }

        player.has_acted = true;
        debug!(
            "Player {} {} bet {} chips {}",
            player.nickname,
            player.action.label(),
            player.bet,
            player.chips
        );

        // A raise reopens the betting for all the other players.
        if player.bet > self.high_bet {
            self.high_bet = player.bet;
            for (idx, other) in self.players.iter_mut().enumerate() {
                if idx != seat && other.in_hand() {
                    other.has_acted = false;
                }
            }
        }

        if self.players.count_in_hand() == 1 {
            self.fold_win();
        } else {
            self.next_turn();
        }

        Ok(())
    }

    /// Restores every player chips and clears the table.
    pub fn reset(&mut self) {
        for player in self.players.iter_mut() {
            player.reset(self.config.starting_chips);
        }

        self.hand_state = HandState::WaitForPlayers;
        self.board.clear();
        self.pot = Chips::ZERO;
        self.high_bet = Chips::ZERO;
        self.payoffs.clear();
        self.set_turn(None);
        self.announcement = Some(Self::TABLE_RESET.to_string());

        info!("Table reset");
    }

    /// Folds the player on turn if the action timeout expired.
    ///
    /// Returns true if the player was folded.
    pub fn tick(&mut self) -> bool {
        let (Some(timeout), Some(start), Some(seat)) =
            (self.config.action_timeout, self.turn_start, self.turn)
        else {
            return false;
        };

        if !self.hand_state.in_progress() || start.elapsed() < timeout {
            return false;
        }

        let player_id = self.players[seat].player_id;
        info!("Player {player_id} action timeout");
        self.action(player_id, PlayerAction::Fold, None).is_ok()
    }

    /// Projects the table state as seen by the `viewer`, only the viewer hole
    /// cards are visible until showdown.
    pub fn update(&self, viewer: Option<PlayerId>) -> TableUpdate {
        let phase = match self.hand_state {
            HandState::WaitForPlayers => HandPhase::Waiting,
            HandState::PreflopBetting => HandPhase::Preflop,
            HandState::FlopBetting => HandPhase::Flop,
            HandState::TurnBetting => HandPhase::Turn,
            HandState::RiverBetting => HandPhase::River,
            HandState::EndHand => HandPhase::Ended,
        };

        TableUpdate {
            version: TableUpdate::VERSION,
            players: self.players.iter().map(|p| p.update(viewer)).collect(),
            board: self.board.clone(),
            pot: self.pot,
            high_bet: self.high_bet,
            dealer: self.dealer,
            turn: self.turn,
            phase,
            announcement: self.announcement.clone(),
            payoffs: self.payoffs.clone(),
        }
    }

    /// The ids of the players at the table in seat order.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.player_id)
    }

    /// The chips at the table, players chips plus the pot.
    pub fn total_chips(&self) -> Chips {
        self.players.iter().map(|p| p.chips).sum::<Chips>() + self.pot
    }

    /// Checks if all players in the hand are all-in or have acted and matched
    /// the high bet.
    fn is_round_complete(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.in_hand())
            .all(|p| p.is_all_in || (p.has_acted && p.bet == self.high_bet))
    }

    /// Moves the turn to the next player who can act or ends the round.
    fn next_turn(&mut self) {
        let num_players = self.players.count();
        let mut seat = self.turn.unwrap_or_default();

        for _ in 0..num_players {
            if self.is_round_complete() {
                break;
            }

            seat = (seat + 1) % num_players;
            if self.players[seat].can_act() {
                self.set_turn(Some(seat));
                return;
            }
        }

        self.end_round();
    }

    /// Ends a betting round and deals the next street or goes to showdown.
    fn end_round(&mut self) {
        // With at most one player who can bet there is no more betting, deal
        // the board and go to showdown.
        if self.players.count_can_act() <= 1 {
            while self.board.len() < 5 {
                self.board.push(self.deck.deal());
            }

            self.showdown();
            return;
        }

        for player in self.players.iter_mut() {
            player.start_round();
        }

        self.high_bet = Chips::ZERO;

        let dealer = self.dealer.unwrap_or_default();
        let first = self.players.next_seat(dealer, Player::can_act);
        self.set_turn(first);

        match self.board.len() {
            0 => {
                for _ in 1..=3 {
                    self.board.push(self.deck.deal());
                }
                self.hand_state = HandState::FlopBetting;
            }
            3 => {
                self.board.push(self.deck.deal());
                self.hand_state = HandState::TurnBetting;
            }
            4 => {
                self.board.push(self.deck.deal());
                self.hand_state = HandState::RiverBetting;
            }
            _ => {
                self.showdown();
                return;
            }
        }

        debug!("Dealt board {:?}", self.board);
    }

    /// The last player in the hand wins all the chips.
    fn fold_win(&mut self) {
        let pot = self.pot;
        if let Some(winner) = self.players.iter_mut().find(|p| p.in_hand()) {
            winner.chips += pot;

            self.payoffs = vec![HandPayoff {
                player_id: winner.player_id,
                chips: pot,
                cards: Vec::new(),
            }];

            let msg = format!("{} wins, everyone else folded", winner.nickname);
            info!("{msg} pot {pot}");
            self.announcement = Some(msg);
        }

        self.pot = Chips::ZERO;
        self.end_hand();
    }

    /// Compares the players hands and pays each pot to its winners.
    fn showdown(&mut self) {
        // Evaluate hands and show the cards of the players still in the hand.
        let mut values = vec![None; self.players.count()];
        for (seat, player) in self.players.iter_mut().enumerate() {
            if let (true, PlayerCards::Cards(c1, c2)) = (player.in_hand(), player.hole_cards) {
                let mut cards = vec![c1, c2];
                cards.extend_from_slice(&self.board);

                let hv = HandValue::eval(&cards);
                player.hand_name = Some(hv.label());
                player.public_cards = player.hole_cards;
                values[seat] = Some(hv);
            }
        }

        let stakes = self.players.iter().map(|p| Stake {
            player_id: p.player_id,
            chips: p.total_bet,
            is_folded: p.is_folded,
        });

        // Winners are sorted starting left of the button so that odd chips go
        // to the first players after the button.
        let num_players = self.players.count();
        let dealer = self.dealer.unwrap_or_default();
        let mut order = (1..=num_players)
            .map(|offset| (dealer + offset) % num_players)
            .collect::<Vec<_>>();
        order.retain(|&seat| values[seat].is_some());

        let mut winnings = AHashMap::<usize, Chips>::new();
        for pot in pots::side_pots(stakes) {
            let eligible = order
                .iter()
                .copied()
                .filter(|&seat| pot.players.contains(&self.players[seat].player_id))
                .collect::<Vec<_>>();

            let Some(best) = eligible.iter().filter_map(|&seat| values[seat]).max() else {
                continue;
            };

            let winners = eligible
                .into_iter()
                .filter(|&seat| values[seat] == Some(best))
                .collect::<Vec<_>>();

            let share = pot.chips / winners.len() as u32;
            let odd_chips = (pot.chips % winners.len() as u32).amount() as usize;
            for (idx, &seat) in winners.iter().enumerate() {
                let mut chips = share;
                if idx < odd_chips {
                    chips += Chips::new(1);
                }

                *winnings.entry(seat).or_default() += chips;
            }
        }

        self.payoffs.clear();
        for seat in 0..num_players {
            if let (Some(&chips), Some(hv)) = (winnings.get(&seat), values[seat]) {
                let player = &mut self.players[seat];
                player.chips += chips;

                // Sort by rank for the UI.
                let mut cards = hv.hand().to_vec();
                cards.sort_by_key(|c| c.rank());

                self.payoffs.push(HandPayoff {
                    player_id: player.player_id,
                    chips,
                    cards,
                });
            }
        }

        // The best hand amongst all players, side pots may go to other players.
        if let Some(best) = values.iter().flatten().max() {
            let names = self
                .players
                .iter()
                .zip(&values)
                .filter(|(_, hv)| hv.as_ref() == Some(best))
                .map(|(p, _)| p.nickname.as_str())
                .collect::<Vec<_>>();

            let verb = if names.len() == 1 { "wins" } else { "win" };
            let msg = format!("{} {verb} with {}", names.join(", "), best.label());
            info!("{msg} pot {}", self.pot);
            self.announcement = Some(msg);
        }

        self.pot = Chips::ZERO;
        self.end_hand();
    }

    fn end_hand(&mut self) {
        self.hand_state = HandState::EndHand;
        self.set_turn(None);
    }

    fn set_turn(&mut self, turn: Option<usize>) {
        self.turn = turn;
        self.turn_start = turn.map(|_| Instant::now());
    }
}
