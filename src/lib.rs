// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! # PIX Ledger
//!
//! This library provides an in-memory account ledger: a fixed-capacity set
//! of accounts, each with a bounded transaction history, addressable by a
//! PIX key alias for transfers. Money is held as integer cents.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Deposits, withdrawals, PIX transfers, credit advances, and account maintenance
//! - [`AccountStore`]: Fixed-capacity account arena with registration and login
//! - [`AliasIndex`]: Open-addressing PIX key index with tombstone-free deletion
//! - [`TxLog`]: Ring-buffer transaction history
//! - [`money`]: Decimal text to cents codec
//! - [`LedgerError`]: Error types for rejected operations
//!
//! ## Example
//!
//! ```
//! use pix_ledger::{Ledger, TransferOutcome, money::parse_cents};
//!
//! let mut ledger = Ledger::default();
//! let alice = ledger.register("alice", "secret", "0001").unwrap();
//! let bob = ledger.register("bob", "hunter2", "0001").unwrap();
//! ledger.set_alias(alice, "alice@pix").unwrap();
//! ledger.set_alias(bob, "bob@pix").unwrap();
//!
//! ledger.deposit(alice, parse_cents("100.00").unwrap()).unwrap();
//! let outcome = ledger.transfer(alice, parse_cents("30").unwrap(), "bob@pix").unwrap();
//! assert_eq!(outcome, TransferOutcome::Sent { to: bob });
//!
//! assert_eq!(ledger.account(alice).unwrap().balance(), 7000);
//! assert_eq!(ledger.account(bob).unwrap().balance(), 3000);
//! ```
//!
//! ## Thread Safety
//!
//! [`Ledger`] is single-writer. [`SharedLedger`] wraps one in a mutex for
//! use from several threads.

pub mod account;
pub mod alias_index;
mod base;
pub mod config;
pub mod error;
mod ledger;
pub mod money;
mod shared;
mod store;
pub mod tx_log;

pub use account::{Account, AccountSummary};
pub use alias_index::{AliasIndex, AliasSource};
pub use base::{AccountHandle, Cents};
pub use config::LedgerConfig;
pub use error::{LedgerError, ParseMoneyError, Result};
pub use ledger::{Ledger, TransferOutcome};
pub use money::Money;
pub use shared::SharedLedger;
pub use store::AccountStore;
pub use tx_log::{TxEntry, TxKind, TxLog};
