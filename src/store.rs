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

//! Fixed-capacity account arena.
//!
//! Accounts live in a vector that never grows past `max_accounts`. A
//! handle is the account's position in that vector; since accounts are
//! never deleted, every handle the store hands out stays valid.

use crate::account::Account;
use crate::alias_index::AliasSource;
use crate::base::AccountHandle;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::tx_log::TxLog;
use log::debug;

#[derive(Debug, Clone)]
pub struct AccountStore {
    accounts: Vec<Account>,
    config: LedgerConfig,
}

impl AccountStore {
    /// Creates an empty store sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            accounts: Vec::with_capacity(config.max_accounts),
            config,
        })
    }

    /// Creates an account and returns its handle.
    ///
    /// The password may be empty; username and agency may not.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::EmptyField`] - username or agency is empty.
    /// - [`LedgerError::FieldTooLong`] - a field exceeds its configured length.
    /// - [`LedgerError::DuplicateUsername`] - the username is taken.
    /// - [`LedgerError::CapacityExceeded`] - the arena is full.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        agency: &str,
    ) -> Result<AccountHandle> {
        require("username", username, self.config.max_username_len)?;
        if self.find_by_username(username).is_some() {
            return Err(LedgerError::DuplicateUsername);
        }
        bounded("password", password, self.config.max_password_len)?;
        require("agency", agency, self.config.max_agency_len)?;
        if self.accounts.len() >= self.config.max_accounts {
            return Err(LedgerError::CapacityExceeded);
        }

        // Capacity is validated to fit in u32.
        let handle = AccountHandle(self.accounts.len() as u32);
        let history = TxLog::new(self.config.tx_log_capacity, self.config.tx_note_len);
        self.accounts.push(Account::new(
            handle,
            username,
            password,
            agency,
            self.config.default_credit_limit,
            history,
        ));
        debug!("Registered account {handle} for {username}");
        Ok(handle)
    }

    /// Resolves a username/password pair to a handle.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AccountHandle> {
        self.accounts
            .iter()
            .find(|account| account.username() == username)
            .filter(|account| account.password_matches(password))
            .map(Account::handle)
            .ok_or(LedgerError::InvalidCredentials)
    }

    pub fn find_by_username(&self, username: &str) -> Option<AccountHandle> {
        self.accounts
            .iter()
            .find(|account| account.username() == username)
            .map(Account::handle)
    }

    pub fn get(&self, handle: AccountHandle) -> Option<&Account> {
        self.accounts.get(handle.index())
    }

    pub(crate) fn get_mut(&mut self, handle: AccountHandle) -> Result<&mut Account> {
        self.accounts
            .get_mut(handle.index())
            .ok_or(LedgerError::AccountNotFound)
    }

    /// Borrows two distinct accounts mutably.
    pub(crate) fn pair_mut(
        &mut self,
        first: AccountHandle,
        second: AccountHandle,
    ) -> Result<(&mut Account, &mut Account)> {
        let (a, b) = (first.index(), second.index());
        if a == b || a >= self.accounts.len() || b >= self.accounts.len() {
            return Err(LedgerError::AccountNotFound);
        }
        if a < b {
            let (head, tail) = self.accounts.split_at_mut(b);
            Ok((&mut head[a], &mut tail[0]))
        } else {
            let (head, tail) = self.accounts.split_at_mut(a);
            Ok((&mut tail[0], &mut head[b]))
        }
    }

    /// Accounts in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.max_accounts
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

impl AliasSource for AccountStore {
    fn alias_of(&self, handle: AccountHandle) -> Option<&str> {
        self.get(handle).and_then(Account::alias)
    }
}

/// Non-empty and within `max` bytes.
pub(crate) fn require(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.is_empty() {
        return Err(LedgerError::EmptyField(field));
    }
    bounded(field, value, max)
}

pub(crate) fn bounded(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(LedgerError::FieldTooLong { field, max });
    }
    Ok(())
}
