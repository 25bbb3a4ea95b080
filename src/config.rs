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

//! Ledger capacity and length limits.

use crate::base::Cents;
use crate::error::{LedgerError, Result};
use serde::Deserialize;

/// Tunable limits for a [`Ledger`](crate::Ledger).
///
/// String limits are maximum byte lengths, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub max_accounts: usize,
    pub max_username_len: usize,
    pub max_password_len: usize,
    pub max_agency_len: usize,
    pub max_alias_len: usize,
    pub tx_log_capacity: usize,
    pub tx_note_len: usize,
    /// Credit limit given to newly registered accounts.
    pub default_credit_limit: Cents,
    /// Alias slot count. Must be a power of two larger than `max_accounts`.
    pub alias_table_size: usize,
}

impl LedgerConfig {
    pub const DEFAULT_MAX_ACCOUNTS: usize = 1024;

    /// Sets `max_accounts` and resizes the alias table to match.
    pub fn with_max_accounts(mut self, max_accounts: usize) -> Self {
        self.max_accounts = max_accounts;
        self.alias_table_size = alias_table_size_for(max_accounts);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_accounts", self.max_accounts),
            ("max_username_len", self.max_username_len),
            ("max_password_len", self.max_password_len),
            ("max_agency_len", self.max_agency_len),
            ("max_alias_len", self.max_alias_len),
            ("tx_log_capacity", self.tx_log_capacity),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(LedgerError::InvalidConfig(format!("{name} must be positive")));
        }
        if self.max_accounts > u32::MAX as usize {
            return Err(LedgerError::InvalidConfig(
                "max_accounts must fit in a u32 handle".into(),
            ));
        }
        if self.default_credit_limit < 0 {
            return Err(LedgerError::InvalidConfig(
                "default_credit_limit cannot be negative".into(),
            ));
        }
        if !self.alias_table_size.is_power_of_two() || self.alias_table_size <= self.max_accounts {
            return Err(LedgerError::InvalidConfig(format!(
                "alias_table_size {} must be a power of two larger than max_accounts {}",
                self.alias_table_size, self.max_accounts
            )));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_accounts: Self::DEFAULT_MAX_ACCOUNTS,
            max_username_len: 32,
            max_password_len: 64,
            max_agency_len: 8,
            max_alias_len: 64,
            tx_log_capacity: 256,
            tx_note_len: 40,
            default_credit_limit: 100_00,
            alias_table_size: alias_table_size_for(Self::DEFAULT_MAX_ACCOUNTS),
        }
    }
}

/// Next power of two at or above twice the account capacity.
pub fn alias_table_size_for(max_accounts: usize) -> usize {
    max_accounts.saturating_mul(2).max(2).next_power_of_two()
}
