// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Plays hands at a table with random bots.
use anyhow::{Result, bail};
use clap::Parser;
use log::{error, info};
use rand::prelude::*;
use tokio::{
    sync::{broadcast, mpsc},
    time::Duration,
};

use sixmax_core::{
    message::{HandPhase, Message, PlayerAction, TableUpdate},
    poker::{Chips, PlayerId},
};
use sixmax_server::{Table, TableConfig, TableMessage};

#[derive(Debug, Parser)]
struct Cli {
    /// Number of bots at the table.
    #[clap(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(2..=6))]
    seats: u8,
    /// Number of hands to play.
    #[clap(long, default_value_t = 100)]
    hands: usize,
    /// The bots starting chips.
    #[clap(long, default_value_t = 5_000)]
    chips: u32,
    /// Fold a bot that doesn't act within this time.
    #[clap(long)]
    timeout_ms: Option<u64>,
    /// Seed for the bots decisions.
    #[clap(long)]
    seed: Option<u64>,
}

/// A bot strategy.
trait Strategy: Send + 'static {
    /// Picks an action for the player at `seat`, `None` doesn't act.
    fn decide(&mut self, update: &TableUpdate, seat: usize) -> Option<(PlayerAction, Option<Chips>)>;
}

/// Picks actions at random, mostly calls.
struct RandomStrategy {
    rng: StdRng,
    big_blind: Chips,
    /// Sometimes skip the action to trigger the table timeout.
    stall: bool,
}

impl Strategy for RandomStrategy {
    fn decide(&mut self, update: &TableUpdate, seat: usize) -> Option<(PlayerAction, Option<Chips>)> {
        if self.stall && self.rng.random_ratio(1, 20) {
            return None;
        }

        let player = &update.players[seat];
        let to_call = update.high_bet - player.bet;

        let action = match self.rng.random_range(0..100) {
            0..=9 if to_call > Chips::ZERO => (PlayerAction::Fold, None),
            10..=12 => (PlayerAction::AllIn, None),
            13..=29 => {
                let raise = update.high_bet + self.big_blind * self.rng.random_range(1..=4);
                (PlayerAction::Raise, Some(raise))
            }
            _ if to_call == Chips::ZERO => (PlayerAction::Check, None),
            _ => (PlayerAction::Call, None),
        };

        Some(action)
    }
}

static NICKNAMES: &[&str] = &["Alice", "Bob", "Carol", "Dave", "Frank", "Mike"];

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{e}");
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = TableConfig {
        seats: cli.seats as usize,
        starting_chips: Chips::new(cli.chips),
        action_timeout: cli.timeout_ms.map(Duration::from_millis),
        ..TableConfig::default()
    };

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!("Playing {} hands with seed {seed}", cli.hands);

    let (shutdown_broadcast_tx, _) = broadcast::channel(1);
    let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::channel(1);

    let table = Table::new(
        config.clone(),
        shutdown_broadcast_tx.subscribe(),
        shutdown_complete_tx.clone(),
    );

    let mut player_ids = Vec::with_capacity(config.seats);
    for (idx, nickname) in NICKNAMES.iter().take(config.seats).enumerate() {
        let strategy = RandomStrategy {
            rng: StdRng::seed_from_u64(seed.wrapping_add(idx as u64)),
            big_blind: config.big_blind,
            stall: config.action_timeout.is_some(),
        };

        let player_id = join_bot(&table, nickname, strategy).await?;
        player_ids.push(player_id);
    }

    let (watch_tx, mut watch_rx) = mpsc::channel(128);
    table.watch(watch_tx).await;
    next_update(&mut watch_rx).await?;

    let total = config.starting_chips * config.seats as u32;
    let mut last = None;

    for hand in 1..=cli.hands {
        table.start_hand(player_ids[0]).await;

        let update = loop {
            let update = next_update(&mut watch_rx).await?;
            if matches!(update.phase, HandPhase::Ended | HandPhase::Waiting) {
                break update;
            }
        };

        if let Some(msg) = &update.announcement {
            info!("Hand {hand}: {msg}");
        }

        let chips = update.players.iter().map(|p| p.chips).sum::<Chips>() + update.pot;
        if chips != total {
            bail!("Hand {hand} table has {chips} chips expected {total}");
        }

        let ended = update.phase == HandPhase::Waiting;
        last = Some(update);
        if ended {
            break;
        }
    }

    if let Some(update) = last {
        for player in &update.players {
            info!("{:<8} {:>7}", player.nickname, player.chips.to_string());
        }
    }

    // Signal the table and bots to shutdown and wait for tasks to complete.
    drop(shutdown_broadcast_tx);
    drop(shutdown_complete_tx);
    drop(table);
    let _ = shutdown_complete_rx.recv().await;

    Ok(())
}

/// Joins a bot to the table and spawns its task.
async fn join_bot<S: Strategy>(table: &Table, nickname: &str, mut strategy: S) -> Result<PlayerId> {
    let (tx, mut rx) = mpsc::channel(64);
    let player_id = table.join(nickname, None, tx).await?;

    let Some(TableMessage::Send(Message::TableJoined { seat, .. })) = rx.recv().await else {
        bail!("Bot {nickname} didn't receive a join confirmation");
    };

    let table = table.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                TableMessage::Send(Message::TableUpdate(update)) if update.turn == Some(seat) => {
                    if let Some((action, amount)) = strategy.decide(&update, seat) {
                        table.action(player_id, action, amount).await;
                    }
                }
                TableMessage::Close => break,
                _ => {}
            }
        }
    });

    Ok(player_id)
}

async fn next_update(rx: &mut mpsc::Receiver<TableMessage>) -> Result<TableUpdate> {
    loop {
        match rx.recv().await {
            Some(TableMessage::Send(Message::TableUpdate(update))) => return Ok(update),
            Some(TableMessage::Send(_)) => {}
            Some(TableMessage::Close) | None => bail!("Table closed"),
        }
    }
}
