// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Six seats Texas Hold'em table server.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod table;
pub use table::{Table, TableConfig, TableError, TableMessage};
