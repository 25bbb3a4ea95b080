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

//! Funds movement and account maintenance.
//!
//! The [`Ledger`] owns the account store and the PIX key index and is the
//! only way to mutate an account once it exists.
//!
//! # Operations
//!
//! - **Deposit / withdraw**: move funds in or out of one account.
//! - **Transfer**: move funds to the account holding a PIX key. Sending to
//!   one's own key is a credit advance instead.
//! - **PIX key**: set, replace, or clear an account's alias.
//! - **Credit limit / password**: account maintenance.
//!
//! Every operation checks all of its preconditions before it mutates
//! anything and appends one entry to each affected account's history.
//!
//! # Concurrency
//!
//! A `Ledger` is single-writer: `&mut self` on every mutation. Share one
//! across threads through [`SharedLedger`](crate::SharedLedger).

use crate::account::{Account, AccountSummary};
use crate::alias_index::AliasIndex;
use crate::base::{AccountHandle, Cents};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::money::format_cents;
use crate::store::{AccountStore, require};
use crate::tx_log::TxKind;
use log::debug;

/// What a successful [`Ledger::transfer`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Target was the caller's own key; unused credit moved into the balance.
    CreditAdvance,
    /// Funds moved to another account.
    Sent { to: AccountHandle },
}

/// Account ledger with PIX key routing.
///
/// # Invariants
///
/// - `0 <= credit_used <= credit_limit` and `balance >= 0` for every account.
/// - A PIX key is held by at most one account.
/// - Every account holding a PIX key is reachable through the index.
#[derive(Debug, Clone)]
pub struct Ledger {
    store: AccountStore,
    aliases: AliasIndex,
}

impl Ledger {
    /// Creates an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        let aliases = AliasIndex::with_size(config.alias_table_size)?;
        let store = AccountStore::new(config)?;
        Ok(Self { store, aliases })
    }

    /// See [`AccountStore::register`].
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        agency: &str,
    ) -> Result<AccountHandle> {
        self.store.register(username, password, agency)
    }

    /// See [`AccountStore::authenticate`].
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AccountHandle> {
        self.store.authenticate(username, password)
    }

    /// Credits `amount` to the account.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] - unknown handle.
    /// - [`LedgerError::InvalidAmount`] - `amount <= 0`.
    /// - [`LedgerError::BalanceOverflow`] - balance would overflow.
    pub fn deposit(&mut self, handle: AccountHandle, amount: Cents) -> Result<()> {
        let account = self.store.get_mut(handle)?;
        account.deposit(amount)?;
        let note = format!("Deposited {}", format_cents(amount));
        account.log(TxKind::Deposit, amount, &note);
        debug!("Deposited {} to account {}", format_cents(amount), handle);
        Ok(())
    }

    /// Debits `amount` from the account.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] - unknown handle.
    /// - [`LedgerError::InvalidAmount`] - `amount <= 0`.
    /// - [`LedgerError::InsufficientFunds`] - `amount` exceeds the balance.
    pub fn withdraw(&mut self, handle: AccountHandle, amount: Cents) -> Result<()> {
        let account = self.store.get_mut(handle)?;
        account.withdraw(amount)?;
        let note = format!("Withdrew {}", format_cents(amount));
        account.log(TxKind::Withdraw, amount, &note);
        debug!("Withdrew {} from account {}", format_cents(amount), handle);
        Ok(())
    }

    /// Sends `amount` to the account holding `target_alias`.
    ///
    /// When `target_alias` is the caller's own PIX key this is a credit
    /// advance: `amount` is drawn from unused credit into the balance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] - unknown handle.
    /// - [`LedgerError::AliasNotSet`] - caller has no PIX key.
    /// - [`LedgerError::InvalidAmount`] - `amount <= 0`.
    /// - [`LedgerError::CreditExhausted`] - credit advance beyond unused credit.
    /// - [`LedgerError::TargetNotFound`] - no account holds `target_alias`.
    /// - [`LedgerError::InsufficientFunds`] - `amount` exceeds the balance.
    /// - [`LedgerError::BalanceOverflow`] - a balance would overflow.
    pub fn transfer(
        &mut self,
        handle: AccountHandle,
        amount: Cents,
        target_alias: &str,
    ) -> Result<TransferOutcome> {
        let account = self.store.get(handle).ok_or(LedgerError::AccountNotFound)?;
        let own_alias = account.alias().ok_or(LedgerError::AliasNotSet)?;
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }

        if target_alias == own_alias {
            let account = self.store.get_mut(handle)?;
            account.advance_credit(amount)?;
            let note = format!("Credit advance {}", format_cents(amount));
            account.log(TxKind::CreditAdvance, amount, &note);
            debug!("Credit advance of {} on account {}", format_cents(amount), handle);
            return Ok(TransferOutcome::CreditAdvance);
        }

        let target = self
            .aliases
            .find(target_alias, &self.store)
            .ok_or(LedgerError::TargetNotFound)?;
        let (source, dest) = self.store.pair_mut(handle, target)?;
        if amount > source.balance() {
            return Err(LedgerError::InsufficientFunds);
        }
        if dest.balance().checked_add(amount).is_none() {
            return Err(LedgerError::BalanceOverflow);
        }
        source.withdraw(amount)?;
        dest.deposit(amount)?;

        let shown = format_cents(amount);
        let note_out = format!("Transferred {shown} to {}", dest.username());
        let note_in = format!("Received {shown} from {}", source.username());
        source.log(TxKind::TransferOut, amount, &note_out);
        dest.log(TxKind::TransferIn, amount, &note_in);
        debug!("Transferred {shown} from account {handle} to account {target}");
        Ok(TransferOutcome::Sent { to: target })
    }

    /// Sets or replaces the account's PIX key.
    ///
    /// Setting the key the account already holds is allowed.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::EmptyField`] - `alias` is empty.
    /// - [`LedgerError::FieldTooLong`] - `alias` exceeds `max_alias_len`.
    /// - [`LedgerError::AccountNotFound`] - unknown handle.
    /// - [`LedgerError::DuplicateAlias`] - another account holds `alias`.
    pub fn set_alias(&mut self, handle: AccountHandle, alias: &str) -> Result<()> {
        self.bind_alias(handle, alias)?;
        self.store
            .get_mut(handle)?
            .log(TxKind::Misc, 0, "PIX key set/updated");
        debug!("Account {handle} set PIX key {alias}");
        Ok(())
    }

    /// Removes the account's PIX key.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] - unknown handle.
    /// - [`LedgerError::AliasNotSet`] - account has no PIX key.
    pub fn clear_alias(&mut self, handle: AccountHandle) -> Result<()> {
        let account = self.store.get(handle).ok_or(LedgerError::AccountNotFound)?;
        let alias = account.alias().ok_or(LedgerError::AliasNotSet)?.to_owned();

        // The index matches slots against live aliases, so unlink first.
        self.aliases.remove(&alias, &self.store);
        let account = self.store.get_mut(handle)?;
        account.set_alias(None);
        account.log(TxKind::Misc, 0, "PIX key removed");
        debug!("Account {handle} cleared PIX key {alias}");
        Ok(())
    }

    /// Changes the credit limit.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] - unknown handle.
    /// - [`LedgerError::InvalidCreditLimit`] - `new_limit` is below the credit used.
    pub fn change_credit_limit(&mut self, handle: AccountHandle, new_limit: Cents) -> Result<()> {
        let account = self.store.get_mut(handle)?;
        account.set_credit_limit(new_limit)?;
        let note = format!("Credit limit set to {}", format_cents(new_limit));
        account.log(TxKind::Misc, 0, &note);
        debug!("Account {handle} credit limit set to {}", format_cents(new_limit));
        Ok(())
    }

    /// Replaces the password after checking the current one.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] - unknown handle.
    /// - [`LedgerError::WrongPassword`] - `old` does not match.
    /// - [`LedgerError::EmptyField`] - `new` is empty.
    /// - [`LedgerError::FieldTooLong`] - `new` exceeds `max_password_len`.
    pub fn change_password(&mut self, handle: AccountHandle, old: &str, new: &str) -> Result<()> {
        let max = self.store.config().max_password_len;
        let account = self.store.get_mut(handle)?;
        if !account.password_matches(old) {
            return Err(LedgerError::WrongPassword);
        }
        require("password", new, max)?;
        account.set_password(new);
        account.log(TxKind::Misc, 0, "Password changed");
        debug!("Account {handle} changed password");
        Ok(())
    }

    /// Registers the two demo accounts `user1` and `user2` (password `pass`,
    /// agency `DF`) with PIX keys `user1pix` and `user2pix`.
    ///
    /// Seeding writes no history entries.
    pub fn seed_sample_accounts(&mut self) -> Result<Vec<AccountHandle>> {
        const SAMPLES: [(&str, &str); 2] = [("user1", "user1pix"), ("user2", "user2pix")];

        if self.store.len() + SAMPLES.len() > self.store.capacity() {
            return Err(LedgerError::CapacityExceeded);
        }
        for (username, alias) in SAMPLES {
            if self.store.find_by_username(username).is_some() {
                return Err(LedgerError::DuplicateUsername);
            }
            if self.resolve_alias(alias).is_some() {
                return Err(LedgerError::DuplicateAlias);
            }
        }

        let mut handles = Vec::with_capacity(SAMPLES.len());
        for (username, alias) in SAMPLES {
            let handle = self.store.register(username, "pass", "DF")?;
            self.bind_alias(handle, alias)?;
            handles.push(handle);
        }
        Ok(handles)
    }

    /// Looks up the account holding `alias`.
    pub fn resolve_alias(&self, alias: &str) -> Option<AccountHandle> {
        self.aliases.find(alias, &self.store)
    }

    pub fn account(&self, handle: AccountHandle) -> Option<&Account> {
        self.store.get(handle)
    }

    /// Accounts in handle order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.store.iter()
    }

    pub fn summaries(&self) -> Vec<AccountSummary> {
        self.store.iter().map(Account::summary).collect()
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    pub fn config(&self) -> &LedgerConfig {
        self.store.config()
    }

    fn bind_alias(&mut self, handle: AccountHandle, alias: &str) -> Result<()> {
        require("alias", alias, self.store.config().max_alias_len)?;
        let account = self.store.get(handle).ok_or(LedgerError::AccountNotFound)?;
        if let Some(holder) = self.aliases.find(alias, &self.store) {
            if holder != handle {
                return Err(LedgerError::DuplicateAlias);
            }
        }

        if let Some(previous) = account.alias().map(str::to_owned) {
            self.aliases.remove(&previous, &self.store);
        }
        self.store.get_mut(handle)?.set_alias(Some(alias));
        // The table has more slots than accounts, so a slot is always free.
        self.aliases.insert(alias, handle, &self.store)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default()).expect("default configuration is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias_index::AliasSource;

    fn ledger() -> Ledger {
        Ledger::new(LedgerConfig::default().with_max_accounts(8)).unwrap()
    }

    #[test]
    fn default_ledger_builds() {
        let ledger = Ledger::default();
        assert_eq!(ledger.aliases().capacity(), 2048);
        assert_eq!(ledger.store().capacity(), 1024);
    }

    #[test]
    fn replacing_alias_unlinks_previous() {
        let mut ledger = ledger();
        let handle = ledger.register("alice", "pw", "01").unwrap();
        ledger.set_alias(handle, "first").unwrap();
        ledger.set_alias(handle, "second").unwrap();

        assert_eq!(ledger.resolve_alias("first"), None);
        assert_eq!(ledger.resolve_alias("second"), Some(handle));
        assert_eq!(ledger.aliases().len(), 1);
    }

    #[test]
    fn resetting_same_alias_keeps_single_slot() {
        let mut ledger = ledger();
        let handle = ledger.register("alice", "pw", "01").unwrap();
        ledger.set_alias(handle, "same").unwrap();
        ledger.set_alias(handle, "same").unwrap();

        assert_eq!(ledger.resolve_alias("same"), Some(handle));
        assert_eq!(ledger.aliases().len(), 1);
        assert_eq!(ledger.store().alias_of(handle), Some("same"));
    }

    #[test]
    fn seeding_registers_demo_accounts_without_history() {
        let mut ledger = ledger();
        let handles = ledger.seed_sample_accounts().unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(ledger.authenticate("user1", "pass"), Ok(handles[0]));
        assert_eq!(ledger.resolve_alias("user2pix"), Some(handles[1]));
        assert!(ledger.account(handles[0]).unwrap().history().is_empty());
    }

    #[test]
    fn seeding_needs_room_for_both_accounts() {
        let mut ledger = Ledger::new(LedgerConfig::default().with_max_accounts(1)).unwrap();
        assert_eq!(
            ledger.seed_sample_accounts(),
            Err(LedgerError::CapacityExceeded)
        );
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn unknown_handle_is_reported() {
        let mut ledger = ledger();
        let ghost = AccountHandle(5);
        assert_eq!(ledger.deposit(ghost, 100), Err(LedgerError::AccountNotFound));
        assert_eq!(ledger.transfer(ghost, 100, "x"), Err(LedgerError::AccountNotFound));
        assert_eq!(ledger.set_alias(ghost, "x"), Err(LedgerError::AccountNotFound));
        assert_eq!(ledger.clear_alias(ghost), Err(LedgerError::AccountNotFound));
    }
}
