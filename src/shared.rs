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

//! Thread-safe ledger handle.
//!
//! [`SharedLedger`] serializes every call behind one [`Mutex`]. A PIX key
//! removal rewrites a whole cluster of index slots and a transfer touches
//! two accounts; holding the single lock for the full call keeps both
//! atomic with respect to every other caller. There is only one lock, so
//! there is no lock ordering to get wrong.

use crate::base::{AccountHandle, Cents};
use crate::config::LedgerConfig;
use crate::error::Result;
use crate::ledger::{Ledger, TransferOutcome};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, lock-protected [`Ledger`].
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        Ok(Self::from(Ledger::new(config)?))
    }

    pub fn register(&self, username: &str, password: &str, agency: &str) -> Result<AccountHandle> {
        self.inner.lock().register(username, password, agency)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<AccountHandle> {
        self.inner.lock().authenticate(username, password)
    }

    pub fn deposit(&self, handle: AccountHandle, amount: Cents) -> Result<()> {
        self.inner.lock().deposit(handle, amount)
    }

    pub fn withdraw(&self, handle: AccountHandle, amount: Cents) -> Result<()> {
        self.inner.lock().withdraw(handle, amount)
    }

    pub fn transfer(
        &self,
        handle: AccountHandle,
        amount: Cents,
        target_alias: &str,
    ) -> Result<TransferOutcome> {
        self.inner.lock().transfer(handle, amount, target_alias)
    }

    pub fn set_alias(&self, handle: AccountHandle, alias: &str) -> Result<()> {
        self.inner.lock().set_alias(handle, alias)
    }

    pub fn clear_alias(&self, handle: AccountHandle) -> Result<()> {
        self.inner.lock().clear_alias(handle)
    }

    pub fn change_credit_limit(&self, handle: AccountHandle, new_limit: Cents) -> Result<()> {
        self.inner.lock().change_credit_limit(handle, new_limit)
    }

    pub fn change_password(&self, handle: AccountHandle, old: &str, new: &str) -> Result<()> {
        self.inner.lock().change_password(handle, old, new)
    }

    /// Runs `f` against the ledger while holding the lock.
    ///
    /// Keep `f` short; every other caller waits on it.
    pub fn with<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        let ledger = self.inner.lock();
        f(&*ledger)
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let shared = SharedLedger::new(LedgerConfig::default().with_max_accounts(4)).unwrap();
        let other = shared.clone();

        let handle = shared.register("alice", "pw", "01").unwrap();
        other.deposit(handle, 500).unwrap();

        let balance = shared.with(|ledger| ledger.account(handle).map(|a| a.balance()));
        assert_eq!(balance, Some(500));
    }

    #[test]
    fn errors_pass_through() {
        let shared = SharedLedger::default();
        let handle = shared.register("alice", "pw", "01").unwrap();
        assert_eq!(
            shared.withdraw(handle, 1),
            Err(crate::LedgerError::InsufficientFunds)
        );
    }
}
