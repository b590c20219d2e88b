// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Sixmax Poker core types shared by the table and its clients.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod message;
pub mod poker;
