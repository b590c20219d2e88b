// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Type definitions for messages between the clients and a table.
//!
//! Messages are encoded with [bincode], the [TableUpdate] snapshot carries a
//! version number so that clients can detect a snapshot layout change.
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::poker::{Card, Chips, PlayerCards, PlayerId};

/// Message exchanged by a client and a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Join a table with a nickname, a known player id rejoins the table.
    JoinTable {
        /// The player nickname.
        nickname: String,
        /// The identity from a previous join.
        player_id: Option<PlayerId>,
    },
    /// Table joined confirmation.
    TableJoined {
        /// The identity to use for rejoining the table.
        player_id: PlayerId,
        /// The player chips.
        chips: Chips,
        /// The player seat.
        seat: usize,
    },
    /// Start a new hand.
    StartHand,
    /// Restore all players chips and clear the table.
    ResetTable,
    /// A player action.
    Action {
        /// The action from the player.
        action: PlayerAction,
        /// The target street bet, only used for raise actions.
        amount: Option<Chips>,
    },
    /// A table state snapshot.
    TableUpdate(TableUpdate),
}

impl Message {
    /// Serializes this message.
    pub fn serialize(&self) -> Vec<u8> {
        bincode::serialize(self).expect("Should serialize message")
    }

    /// Deserializes a message.
    pub fn deserialize(buf: &[u8]) -> Result<Self> {
        let msg = bincode::deserialize::<Message>(buf)?;
        if let Message::TableUpdate(update) = &msg {
            if update.version != TableUpdate::VERSION {
                bail!("Unsupported table update version {}", update.version);
            }
        }

        Ok(msg)
    }
}

/// The phase of the hand at the table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandPhase {
    /// No hand in progress.
    #[default]
    Waiting,
    /// Preflop betting.
    Preflop,
    /// Flop betting.
    Flop,
    /// Turn betting.
    Turn,
    /// River betting.
    River,
    /// The hand ended, the results are shown until a new hand starts.
    Ended,
}

/// A full table snapshot as seen by one observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableUpdate {
    /// The snapshot layout version.
    pub version: u16,
    /// The players in seat order.
    pub players: Vec<PlayerUpdate>,
    /// The board cards.
    pub board: Vec<Card>,
    /// The chips in the pot.
    pub pot: Chips,
    /// The highest street bet.
    pub high_bet: Chips,
    /// The dealer seat.
    pub dealer: Option<usize>,
    /// The seat of the player who has to act.
    pub turn: Option<usize>,
    /// The hand phase.
    pub phase: HandPhase,
    /// The hand result or table announcement.
    pub announcement: Option<String>,
    /// The chips paid to the winners of the last hand.
    pub payoffs: Vec<HandPayoff>,
}

impl TableUpdate {
    /// The current snapshot layout version.
    pub const VERSION: u16 = 1;

    /// The board cards display tokens.
    pub fn board_tokens(&self) -> Vec<String> {
        self.board.iter().map(|c| c.to_string()).collect()
    }
}

/// A player update details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    /// The player id.
    pub player_id: PlayerId,
    /// The player nickname.
    pub nickname: String,
    /// The player chips.
    pub chips: Chips,
    /// The chips won or lost in this hand.
    pub profit: i64,
    /// The player current street bet.
    pub bet: Chips,
    /// The player cards.
    pub cards: PlayerCards,
    /// The player folded or is sitting out this hand.
    pub is_folded: bool,
    /// The player is all-in.
    pub is_all_in: bool,
    /// The player acted in this street.
    pub has_acted: bool,
    /// The last player action.
    pub action: PlayerAction,
    /// The player position in this hand.
    pub position: Position,
    /// The player hand at showdown.
    pub hand_name: Option<String>,
}

/// The chips won by a player at the end of a hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPayoff {
    /// The winner id.
    pub player_id: PlayerId,
    /// The chips won.
    pub chips: Chips,
    /// The winning hand cards, empty if the other players folded.
    pub cards: Vec<Card>,
}

/// A Player action.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// No action.
    #[default]
    None,
    /// Player pays small blind.
    SmallBlind,
    /// Player pays big blind.
    BigBlind,
    /// Player calls.
    Call,
    /// Player checks.
    Check,
    /// Player raises.
    Raise,
    /// Player bets all the chips.
    AllIn,
    /// Player folds.
    Fold,
}

impl PlayerAction {
    /// The action label.
    pub fn label(&self) -> &'static str {
        match self {
            PlayerAction::SmallBlind => "SB",
            PlayerAction::BigBlind => "BB",
            PlayerAction::Call => "CALL",
            PlayerAction::Check => "CHECK",
            PlayerAction::Raise => "RAISE",
            PlayerAction::AllIn => "ALL-IN",
            PlayerAction::Fold => "FOLD",
            PlayerAction::None => "",
        }
    }
}

/// A player position in the hand.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// No position.
    #[default]
    None,
    /// The dealer button, also small blind when heads-up.
    Dealer,
    /// The small blind.
    SmallBlind,
    /// The big blind.
    BigBlind,
}

impl Position {
    /// The position label.
    pub fn label(&self) -> &'static str {
        match self {
            Position::Dealer => "D",
            Position::SmallBlind => "SB",
            Position::BigBlind => "BB",
            Position::None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::{Rank, Suit};

    fn update(version: u16) -> TableUpdate {
        let ah = Card::new(Rank::Ace, Suit::Hearts);
        let kd = Card::new(Rank::King, Suit::Diamonds);

        TableUpdate {
            version,
            players: vec![PlayerUpdate {
                player_id: PlayerId::from(7),
                nickname: "Alice".to_string(),
                chips: Chips::new(4_800),
                profit: -200,
                bet: Chips::new(200),
                cards: PlayerCards::Cards(ah, kd),
                is_folded: false,
                is_all_in: false,
                has_acted: false,
                action: PlayerAction::BigBlind,
                position: Position::BigBlind,
                hand_name: None,
            }],
            board: vec![kd],
            pot: Chips::new(300),
            high_bet: Chips::new(200),
            dealer: Some(1),
            turn: Some(0),
            phase: HandPhase::Preflop,
            announcement: None,
            payoffs: Vec::new(),
        }
    }

    #[test]
    fn message_encoding() {
        let msg = Message::JoinTable {
            nickname: "Alice".to_string(),
            player_id: None,
        };
        let bytes = msg.serialize();
        assert_eq!(Message::deserialize(&bytes).unwrap(), msg);

        let msg = Message::TableUpdate(update(TableUpdate::VERSION));
        let bytes = msg.serialize();
        let Message::TableUpdate(update) = Message::deserialize(&bytes).unwrap() else {
            panic!("Expected table update");
        };
        assert_eq!(update.players[0].cards.tokens(), vec!["AH", "KD"]);
        assert_eq!(update.board_tokens(), vec!["KD"]);
    }

    #[test]
    fn reject_unknown_version() {
        let msg = Message::TableUpdate(update(TableUpdate::VERSION + 1));
        assert!(Message::deserialize(&msg.serialize()).is_err());
    }

    #[test]
    fn labels() {
        assert_eq!(PlayerAction::AllIn.label(), "ALL-IN");
        assert_eq!(Position::Dealer.label(), "D");
    }
}
