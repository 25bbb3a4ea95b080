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

//! Per-account transaction history.
//!
//! A [`TxLog`] is a fixed-capacity ring buffer. Once full, every push
//! overwrites the oldest entry, so the log always holds the most recent
//! `capacity` records in chronological order.

use crate::base::Cents;
use crate::money::format_cents;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Deposit,
    Withdraw,
    TransferOut,
    TransferIn,
    CreditAdvance,
    Misc,
}

impl TxKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
            Self::TransferOut => "XFER_OUT",
            Self::TransferIn => "XFER_IN",
            Self::CreditAdvance => "CREDIT",
            Self::Misc => "MISC",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single log record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TxEntry {
    kind: TxKind,
    amount: Cents,
    note: String,
}

impl TxEntry {
    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn amount(&self) -> Cents {
        self.amount
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

impl fmt::Display for TxEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}  {}", self.kind, format_cents(self.amount), self.note)
    }
}

/// Fixed-capacity ring buffer of [`TxEntry`] records.
#[derive(Debug, Clone)]
pub struct TxLog {
    entries: Vec<TxEntry>,
    /// Slot of the oldest entry once the buffer has wrapped.
    head: usize,
    capacity: usize,
    note_len: usize,
}

impl TxLog {
    /// Creates an empty log holding at most `capacity` entries, with notes
    /// truncated to `note_len` bytes.
    pub fn new(capacity: usize, note_len: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            head: 0,
            capacity,
            note_len,
        }
    }

    /// Appends an entry, evicting the oldest one when full.
    pub fn push(&mut self, kind: TxKind, amount: Cents, note: &str) {
        if self.capacity == 0 {
            return;
        }
        let entry = TxEntry {
            kind,
            amount,
            note: truncate(note, self.note_len).to_owned(),
        };
        if self.entries.len() < self.capacity {
            self.entries.push(entry);
        } else {
            self.entries[self.head] = entry;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            log: self,
            offset: 0,
        }
    }

    /// Returns the most recent entry.
    pub fn latest(&self) -> Option<&TxEntry> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        self.entries.get((self.head + len - 1) % len)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<'a> IntoIterator for &'a TxLog {
    type Item = &'a TxEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Chronological iterator over a [`TxLog`]. Cloning forks the cursor;
/// [`TxLog::iter`] starts a fresh pass.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    log: &'a TxLog,
    offset: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TxEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.log.entries.len();
        if self.offset >= len {
            return None;
        }
        let entry = &self.log.entries[(self.log.head + self.offset) % len];
        self.offset += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.log.entries.len() - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Cuts `text` to at most `max` bytes on a char boundary.
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
