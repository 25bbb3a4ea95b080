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

//! Account records.
//!
//! Accounts are created by [`AccountStore::register`](crate::AccountStore::register)
//! and mutated only through [`Ledger`](crate::Ledger) operations. Every
//! mutator checks its preconditions before touching a field, so a failed
//! call leaves the account unchanged.
//!
//! # Example
//!
//! ```
//! use pix_ledger::Ledger;
//!
//! let mut ledger = Ledger::default();
//! let handle = ledger.register("alice", "secret", "0001").unwrap();
//! let account = ledger.account(handle).unwrap();
//! assert_eq!(account.balance(), 0);
//! assert_eq!(account.credit_limit(), 10000);
//! ```

use crate::base::{AccountHandle, Cents};
use crate::error::{LedgerError, Result};
use crate::money::to_decimal;
use crate::tx_log::{TxKind, TxLog};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Account {
    handle: AccountHandle,
    username: String,
    password: String,
    agency: String,
    balance: Cents,
    credit_limit: Cents,
    credit_used: Cents,
    alias: Option<String>,
    history: TxLog,
}

impl Account {
    pub(crate) fn new(
        handle: AccountHandle,
        username: &str,
        password: &str,
        agency: &str,
        credit_limit: Cents,
        history: TxLog,
    ) -> Self {
        Self {
            handle,
            username: username.to_owned(),
            password: password.to_owned(),
            agency: agency.to_owned(),
            balance: 0,
            credit_limit,
            credit_used: 0,
            alias: None,
            history,
        }
    }

    pub fn handle(&self) -> AccountHandle {
        self.handle
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn agency(&self) -> &str {
        &self.agency
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    pub fn credit_limit(&self) -> Cents {
        self.credit_limit
    }

    pub fn credit_used(&self) -> Cents {
        self.credit_used
    }

    /// Credit still available for advances.
    pub fn credit_available(&self) -> Cents {
        self.credit_limit - self.credit_used
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn history(&self) -> &TxLog {
        &self.history
    }

    /// Exact comparison against the stored password.
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            username: self.username.clone(),
            agency: self.agency.clone(),
            balance: to_decimal(self.balance),
            credit_used: to_decimal(self.credit_used),
            credit_limit: to_decimal(self.credit_limit),
            alias: self.alias.clone().unwrap_or_default(),
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= 0,
            "Invariant violated: balance went negative: {}",
            self.balance
        );
        debug_assert!(
            0 <= self.credit_used && self.credit_used <= self.credit_limit,
            "Invariant violated: credit used {} outside limit {}",
            self.credit_used,
            self.credit_limit
        );
    }

    /// Increases the balance.
    pub(crate) fn deposit(&mut self, amount: Cents) -> Result<()> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        self.assert_invariants();
        Ok(())
    }

    /// Decreases the balance.
    pub(crate) fn withdraw(&mut self, amount: Cents) -> Result<()> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds);
        }
        self.balance -= amount;
        self.assert_invariants();
        Ok(())
    }

    /// Moves unused credit into the balance.
    pub(crate) fn advance_credit(&mut self, amount: Cents) -> Result<()> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > self.credit_available() {
            return Err(LedgerError::CreditExhausted);
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        self.balance = balance;
        self.credit_used += amount;
        self.assert_invariants();
        Ok(())
    }

    pub(crate) fn set_credit_limit(&mut self, limit: Cents) -> Result<()> {
        if limit < self.credit_used {
            return Err(LedgerError::InvalidCreditLimit);
        }
        self.credit_limit = limit;
        self.assert_invariants();
        Ok(())
    }

    pub(crate) fn set_password(&mut self, password: &str) {
        self.password = password.to_owned();
    }

    pub(crate) fn set_alias(&mut self, alias: Option<&str>) {
        self.alias = alias.map(str::to_owned);
    }

    pub(crate) fn log(&mut self, kind: TxKind, amount: Cents, note: &str) {
        self.history.push(kind, amount, note);
    }
}

/// Serializable account row. Money fields carry two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub username: String,
    pub agency: String,
    pub balance: Decimal,
    pub credit_used: Decimal,
    pub credit_limit: Decimal,
    /// Empty when the account has no PIX key.
    pub alias: String,
}
