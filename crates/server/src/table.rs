// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker table actor.
//!
//! A [Table] is a handle to a task that owns the table state, the task applies
//! one command at a time and after each accepted command sends every player its
//! own view of the table.
use ahash::AHashMap;
use anyhow::Result;
use log::{debug, error, info};
use std::time::Duration;
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time,
};

use sixmax_core::{
    message::{Message, PlayerAction},
    poker::{Chips, PlayerId},
};

mod player;
mod pots;
mod state;

use state::State;

/// Table configuration.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Number of seats, from 2 to 6.
    pub seats: usize,
    /// Chips given to a player who joins and on reset.
    pub starting_chips: Chips,
    /// The small blind.
    pub small_blind: Chips,
    /// The big blind.
    pub big_blind: Chips,
    /// Fold the player on turn after this time, no timeout if `None`.
    pub action_timeout: Option<Duration>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            seats: 6,
            starting_chips: Chips::new(5_000),
            small_blind: Chips::new(100),
            big_blind: Chips::new(200),
            action_timeout: None,
        }
    }
}

/// Errors for rejected table commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The nickname is empty.
    #[error("nickname cannot be empty")]
    EmptyNickname,
    /// All seats are taken.
    #[error("table is full")]
    TableFull,
    /// The sender has not joined the table.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    /// A new hand was requested while a hand is being played.
    #[error("a hand is in progress")]
    HandInProgress,
    /// An action was sent with no hand in progress.
    #[error("no hand in progress")]
    NoHandInProgress,
    /// An action from a player who is not on turn.
    #[error("not your turn")]
    NotYourTurn,
    /// A raise with no amount or an amount not above the high bet.
    #[error("raise must be above the high bet")]
    InvalidRaise,
    /// An action a player cannot choose.
    #[error("invalid action {0:?}")]
    InvalidAction(PlayerAction),
    /// A message the table doesn't handle.
    #[error("unexpected message")]
    InvalidMessage,
    /// The table task has stopped.
    #[error("table closed")]
    TableClosed,
}

/// A message sent to player connections.
#[derive(Debug)]
pub enum TableMessage {
    /// Sends a message to a client.
    Send(Message),
    /// The table closed.
    Close,
}

/// Command for the table task.
#[derive(Debug)]
enum TableCommand {
    /// Join this table.
    Join {
        nickname: String,
        player_id: Option<PlayerId>,
        table_tx: mpsc::Sender<TableMessage>,
        resp_tx: oneshot::Sender<Result<PlayerId, TableError>>,
    },
    /// Receive table updates without a seat.
    Watch(mpsc::Sender<TableMessage>),
    /// Handle a player message.
    Message { player_id: PlayerId, msg: Message },
}

/// A handle to a table task.
#[derive(Debug, Clone)]
pub struct Table {
    /// Channel for sending commands.
    commands_tx: mpsc::Sender<TableCommand>,
}

impl Table {
    /// Creates a new table and spawns its task.
    pub fn new(
        config: TableConfig,
        shutdown_broadcast_rx: broadcast::Receiver<()>,
        shutdown_complete_tx: mpsc::Sender<()>,
    ) -> Self {
        Self::with_state(State::new(config), shutdown_broadcast_rx, shutdown_complete_tx)
    }

    fn with_state(
        state: State,
        shutdown_broadcast_rx: broadcast::Receiver<()>,
        shutdown_complete_tx: mpsc::Sender<()>,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(128);

        let mut task = TableTask {
            state,
            players: AHashMap::default(),
            watchers: Vec::new(),
            commands_rx,
            shutdown_broadcast_rx,
            _shutdown_complete_tx: shutdown_complete_tx,
        };

        tokio::spawn(async move {
            if let Err(err) = task.run().await {
                error!("Table error {err}");
            }

            task.close().await;
            info!("Table task stopped");
        });

        Self { commands_tx }
    }

    /// A player joins this table, a known `player_id` rejoins the same seat.
    ///
    /// The player receives a [Message::TableJoined] followed by table updates
    /// on the `table_tx` channel.
    pub async fn join(
        &self,
        nickname: &str,
        player_id: Option<PlayerId>,
        table_tx: mpsc::Sender<TableMessage>,
    ) -> Result<PlayerId, TableError> {
        let (resp_tx, resp_rx) = oneshot::channel();

        self.commands_tx
            .send(TableCommand::Join {
                nickname: nickname.to_string(),
                player_id,
                table_tx,
                resp_tx,
            })
            .await
            .map_err(|_| TableError::TableClosed)?;

        resp_rx.await.map_err(|_| TableError::TableClosed)?
    }

    /// Receives table updates without joining, hole cards are never visible.
    pub async fn watch(&self, table_tx: mpsc::Sender<TableMessage>) {
        let _ = self.commands_tx.send(TableCommand::Watch(table_tx)).await;
    }

    /// Starts a new hand.
    pub async fn start_hand(&self, player_id: PlayerId) {
        self.message(player_id, Message::StartHand).await;
    }

    /// Restores all players chips.
    pub async fn reset(&self, player_id: PlayerId) {
        self.message(player_id, Message::ResetTable).await;
    }

    /// Sends a player action.
    pub async fn action(&self, player_id: PlayerId, action: PlayerAction, amount: Option<Chips>) {
        self.message(player_id, Message::Action { action, amount })
            .await;
    }

    /// Handle a message from a player.
    pub async fn message(&self, player_id: PlayerId, msg: Message) {
        let _ = self
            .commands_tx
            .send(TableCommand::Message { player_id, msg })
            .await;
    }
}

struct TableTask {
    /// The table state.
    state: State,
    /// Channels to the seated players.
    players: AHashMap<PlayerId, mpsc::Sender<TableMessage>>,
    /// Channels to the table watchers.
    watchers: Vec<mpsc::Sender<TableMessage>>,
    /// Channel for receiving table commands.
    commands_rx: mpsc::Receiver<TableCommand>,
    /// Channel for listening shutdown notification.
    shutdown_broadcast_rx: broadcast::Receiver<()>,
    /// Sender that drops when this task is done.
    _shutdown_complete_tx: mpsc::Sender<()>,
}

impl TableTask {
    async fn run(&mut self) -> Result<()> {
        let mut ticks = time::interval(Duration::from_millis(500));

        loop {
            tokio::select! {
                // Server is shutting down exit this handler.
                _ = self.shutdown_broadcast_rx.recv() => break Ok(()),
                _ = ticks.tick() => {
                    if self.state.tick() {
                        self.send_updates().await;
                    }
                }
                res = self.commands_rx.recv() => match res {
                    Some(TableCommand::Join { nickname, player_id, table_tx, resp_tx }) => {
                        let res = self.join(&nickname, player_id, table_tx).await;
                        let _ = resp_tx.send(res);
                    }
                    Some(TableCommand::Watch(table_tx)) => {
                        let update = self.state.update(None);
                        let _ = table_tx
                            .send(TableMessage::Send(Message::TableUpdate(update)))
                            .await;
                        self.watchers.push(table_tx);
                    }
                    Some(TableCommand::Message { player_id, msg }) => {
                        match self.message(player_id, msg) {
                            Ok(()) => self.send_updates().await,
                            Err(err) => debug!("Player {player_id} command rejected: {err}"),
                        }
                    }
                    None => break Ok(()),
                },
            }
        }
    }

    async fn join(
        &mut self,
        nickname: &str,
        player_id: Option<PlayerId>,
        table_tx: mpsc::Sender<TableMessage>,
    ) -> Result<PlayerId, TableError> {
        let joined = self.state.join(nickname, player_id)?;

        let msg = Message::TableJoined {
            player_id: joined.player_id,
            chips: joined.chips,
            seat: joined.seat,
        };
        let _ = table_tx.send(TableMessage::Send(msg)).await;

        // Rejoin replaces the channel of the previous connection.
        self.players.insert(joined.player_id, table_tx);

        if joined.rejoined {
            self.send_update(joined.player_id).await;
        } else {
            self.send_updates().await;
        }

        Ok(joined.player_id)
    }

    fn message(&mut self, player_id: PlayerId, msg: Message) -> Result<(), TableError> {
        if !self.players.contains_key(&player_id) {
            return Err(TableError::UnknownPlayer(player_id));
        }

        match msg {
            Message::StartHand => self.state.start_hand(),
            Message::ResetTable => {
                self.state.reset();
                Ok(())
            }
            Message::Action { action, amount } => self.state.action(player_id, action, amount),
            _ => Err(TableError::InvalidMessage),
        }
    }

    /// Sends each player its own view of the table.
    async fn send_updates(&mut self) {
        let player_ids = self.state.player_ids().collect::<Vec<_>>();
        for player_id in player_ids {
            self.send_update(player_id).await;
        }

        let update = Message::TableUpdate(self.state.update(None));
        let mut watchers = Vec::with_capacity(self.watchers.len());
        for tx in self.watchers.drain(..) {
            if tx.send(TableMessage::Send(update.clone())).await.is_ok() {
                watchers.push(tx);
            }
        }

        self.watchers = watchers;
    }

    async fn send_update(&self, player_id: PlayerId) {
        if let Some(tx) = self.players.get(&player_id) {
            let update = self.state.update(Some(player_id));
            let _ = tx.send(TableMessage::Send(Message::TableUpdate(update))).await;
        }
    }

    async fn close(&self) {
        for tx in self.players.values().chain(self.watchers.iter()) {
            let _ = tx.send(TableMessage::Close).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use sixmax_core::{
        message::{HandPhase, TableUpdate},
        poker::PlayerCards,
    };

    struct TestTable {
        table: Table,
        shutdown_broadcast_tx: broadcast::Sender<()>,
        shutdown_complete_rx: mpsc::Receiver<()>,
    }

    impl TestTable {
        fn new() -> Self {
            let (shutdown_complete_tx, shutdown_complete_rx) = mpsc::channel(1);
            let (shutdown_broadcast_tx, shutdown_broadcast_rx) = broadcast::channel(1);
            let state = State::with_rng(TableConfig::default(), StdRng::seed_from_u64(7));
            let table = Table::with_state(state, shutdown_broadcast_rx, shutdown_complete_tx);

            Self {
                table,
                shutdown_broadcast_tx,
                shutdown_complete_rx,
            }
        }
    }

    struct TestPlayer {
        player_id: PlayerId,
        rx: mpsc::Receiver<TableMessage>,
    }

    impl TestPlayer {
        async fn join(table: &Table, nickname: &str) -> Self {
            let (tx, mut rx) = mpsc::channel(64);
            let player_id = table.join(nickname, None, tx).await.unwrap();

            let msg = rx.recv().await.unwrap();
            assert!(matches!(
                msg,
                TableMessage::Send(Message::TableJoined { player_id: id, .. }) if id == player_id
            ));

            Self { player_id, rx }
        }

        async fn update(&mut self) -> TableUpdate {
            match self.rx.recv().await {
                Some(TableMessage::Send(Message::TableUpdate(update))) => update,
                msg => panic!("Unexpected message {msg:?}"),
            }
        }

        // Skips updates until the table reaches the given phase.
        async fn wait_phase(&mut self, phase: HandPhase) -> TableUpdate {
            loop {
                let update = self.update().await;
                if update.phase == phase {
                    break update;
                }
            }
        }
    }

    #[tokio::test]
    async fn join_and_play() {
        let test = TestTable::new();
        let table = &test.table;

        let mut alice = TestPlayer::join(table, "Alice").await;
        assert_eq!(alice.update().await.players.len(), 1);

        let mut bob = TestPlayer::join(table, "Bob").await;
        assert_eq!(alice.update().await.players.len(), 2);
        assert_eq!(bob.update().await.players.len(), 2);

        table.start_hand(alice.player_id).await;
        let update = alice.update().await;
        assert_eq!(update.phase, HandPhase::Preflop);
        assert!(matches!(update.players[0].cards, PlayerCards::Cards(_, _)));
        assert_eq!(update.players[1].cards, PlayerCards::Covered);

        let update = bob.update().await;
        assert_eq!(update.players[0].cards, PlayerCards::Covered);
        assert!(matches!(update.players[1].cards, PlayerCards::Cards(_, _)));

        // Heads-up Alice is the dealer and acts first, Bob action is rejected
        // and no update is sent.
        assert_eq!(update.turn, Some(0));
        table.action(bob.player_id, PlayerAction::Fold, None).await;
        table.action(alice.player_id, PlayerAction::Fold, None).await;

        let update = bob.update().await;
        assert_eq!(update.phase, HandPhase::Ended);
        assert_eq!(
            update.announcement.as_deref(),
            Some("Bob wins, everyone else folded")
        );
        assert_eq!(update.players[1].chips, Chips::new(5_100));
        assert_eq!(alice.update().await.players[0].chips, Chips::new(4_900));
    }

    #[tokio::test]
    async fn join_errors() {
        let test = TestTable::new();
        let table = &test.table;

        let (tx, _rx) = mpsc::channel(64);
        assert_eq!(
            table.join(" ", None, tx).await,
            Err(TableError::EmptyNickname)
        );

        let mut players = Vec::new();
        for idx in 0..6 {
            players.push(TestPlayer::join(table, &format!("Player{idx}")).await);
        }

        let (tx, _rx) = mpsc::channel(64);
        assert_eq!(table.join("Zoe", None, tx).await, Err(TableError::TableFull));
    }

    #[tokio::test]
    async fn rejoin_gets_snapshot() {
        let test = TestTable::new();
        let table = &test.table;

        let alice = TestPlayer::join(table, "Alice").await;
        let _bob = TestPlayer::join(table, "Bob").await;
        table.start_hand(alice.player_id).await;

        // Alice reconnects with a new channel.
        let (tx, mut rx) = mpsc::channel(64);
        let player_id = table.join("Alice", Some(alice.player_id), tx).await.unwrap();
        assert_eq!(player_id, alice.player_id);

        assert!(matches!(
            rx.recv().await,
            Some(TableMessage::Send(Message::TableJoined { seat: 0, .. }))
        ));

        let mut alice = TestPlayer { player_id, rx };
        let update = alice.update().await;
        assert_eq!(update.players.len(), 2);
        assert_eq!(update.phase, HandPhase::Preflop);
        assert!(matches!(update.players[0].cards, PlayerCards::Cards(_, _)));
    }

    #[tokio::test]
    async fn watcher_sees_covered_cards() {
        let test = TestTable::new();
        let table = &test.table;

        let (tx, rx) = mpsc::channel(64);
        table.watch(tx).await;
        let mut watcher = TestPlayer {
            player_id: PlayerId::new_id(),
            rx,
        };
        assert!(watcher.update().await.players.is_empty());

        let alice = TestPlayer::join(table, "Alice").await;
        let _bob = TestPlayer::join(table, "Bob").await;

        // Watchers cannot start a hand.
        table.start_hand(watcher.player_id).await;
        table.start_hand(alice.player_id).await;

        let update = watcher.wait_phase(HandPhase::Preflop).await;
        assert_eq!(update.phase, HandPhase::Preflop);
        assert!(update.players.iter().all(|p| p.cards == PlayerCards::Covered));
    }

    #[tokio::test]
    async fn shutdown_closes_players() {
        let mut test = TestTable::new();
        let mut alice = TestPlayer::join(&test.table, "Alice").await;
        alice.update().await;

        test.shutdown_broadcast_tx.send(()).unwrap();
        assert!(matches!(alice.rx.recv().await, Some(TableMessage::Close)));

        // Wait for the table task to drop its completion sender.
        drop(test.table);
        assert!(test.shutdown_complete_rx.recv().await.is_none());
    }
}
