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

//! PIX key index.
//!
//! An open-addressing hash table with linear probing that maps an alias to
//! the handle of the account holding it. Slots store only handles; the key
//! of a slot is always read back from live account state through an
//! [`AliasSource`], so a slot whose account changed alias simply stops
//! matching.
//!
//! Deletion does not use tombstones. Removing a slot would cut the probe
//! path of any key that was placed past it, so [`AliasIndex::remove`]
//! re-inserts the whole run of occupied slots that follows the freed one.
//!
//! # Invariant
//!
//! For every live account with an alias, exactly one slot on the alias's
//! probe sequence holds the account's handle, and no slot before it on that
//! sequence is empty.

use crate::base::AccountHandle;
use crate::error::{LedgerError, Result};

/// Read access to the current alias of live accounts.
pub trait AliasSource {
    /// Returns the alias of the account behind `handle`, or `None` when the
    /// handle is not live or the account has no alias.
    fn alias_of(&self, handle: AccountHandle) -> Option<&str>;
}

/// 64-bit FNV-1a.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET_BASIS, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

#[derive(Debug, Clone)]
pub struct AliasIndex {
    slots: Vec<Option<AccountHandle>>,
    mask: usize,
}

impl AliasIndex {
    /// Creates an empty table with `size` slots.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfig`] unless `size` is a power of two.
    pub fn with_size(size: usize) -> Result<Self> {
        if !size.is_power_of_two() {
            return Err(LedgerError::InvalidConfig(format!(
                "alias table size {size} is not a power of two"
            )));
        }
        Ok(Self {
            slots: vec![None; size],
            mask: size - 1,
        })
    }

    /// Looks up the live account holding `alias`.
    pub fn find<S>(&self, alias: &str, source: &S) -> Option<AccountHandle>
    where
        S: AliasSource + ?Sized,
    {
        self.locate(alias, source).and_then(|slot| self.slots[slot])
    }

    /// Maps `alias` to `handle`.
    ///
    /// If a slot on the probe path already resolves to `alias`, its handle is
    /// replaced; otherwise the first empty slot is claimed.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::EmptyField`] - `alias` is empty.
    /// - [`LedgerError::CapacityExceeded`] - the probe wrapped around a full table.
    pub fn insert<S>(&mut self, alias: &str, handle: AccountHandle, source: &S) -> Result<()>
    where
        S: AliasSource + ?Sized,
    {
        if alias.is_empty() {
            return Err(LedgerError::EmptyField("alias"));
        }
        if self.place(alias, handle, source) {
            Ok(())
        } else {
            Err(LedgerError::CapacityExceeded)
        }
    }

    /// Removes the mapping for `alias` and repairs the cluster behind it.
    ///
    /// Must be called while the owning account still reports `alias` as its
    /// current alias. Returns `false` when no live account resolves to it.
    pub fn remove<S>(&mut self, alias: &str, source: &S) -> bool
    where
        S: AliasSource + ?Sized,
    {
        let Some(slot) = self.locate(alias, source) else {
            return false;
        };
        let removed = self.slots[slot].take();

        // The freed slot guarantees the walk ends and every re-insert finds room.
        let mut next = (slot + 1) & self.mask;
        while let Some(handle) = self.slots[next].take() {
            if Some(handle) != removed {
                if let Some(current) = source.alias_of(handle) {
                    let placed = self.place(current, handle, source);
                    debug_assert!(placed, "cluster repair ran out of slots");
                }
            }
            next = (next + 1) & self.mask;
        }
        true
    }

    /// Number of slots in the table.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    fn home(&self, alias: &str) -> usize {
        (fnv1a(alias.as_bytes()) as usize) & self.mask
    }

    fn locate<S>(&self, alias: &str, source: &S) -> Option<usize>
    where
        S: AliasSource + ?Sized,
    {
        if alias.is_empty() {
            return None;
        }
        let mut slot = self.home(alias);
        for _ in 0..self.slots.len() {
            let handle = self.slots[slot]?;
            if source.alias_of(handle) == Some(alias) {
                return Some(slot);
            }
            slot = (slot + 1) & self.mask;
        }
        None
    }

    fn place<S>(&mut self, alias: &str, handle: AccountHandle, source: &S) -> bool
    where
        S: AliasSource + ?Sized,
    {
        let mut slot = self.home(alias);
        for _ in 0..self.slots.len() {
            match self.slots[slot] {
                Some(existing) if source.alias_of(existing) != Some(alias) => {
                    slot = (slot + 1) & self.mask;
                }
                _ => {
                    self.slots[slot] = Some(handle);
                    return true;
                }
            }
        }
        false
    }
}
