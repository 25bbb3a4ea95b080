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

//! Error types for ledger operations and money parsing.

use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failures of [`parse_cents`](crate::money::parse_cents).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMoneyError {
    /// Input was empty
    #[error("empty amount")]
    Empty,

    /// Input had a sign or point but no digits
    #[error("amount has no digits")]
    MissingDigits,

    /// Input had a character that is not part of a decimal amount
    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedCharacter { found: char, position: usize },

    /// Amount does not fit in 64-bit cents
    #[error("amount is too large")]
    Overflow,
}

/// Ledger operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Debit would exceed the balance
    #[error("insufficient funds")]
    InsufficientFunds,

    /// New credit limit is below the credit already used
    #[error("credit limit cannot be lower than credit used")]
    InvalidCreditLimit,

    /// Credit advance would exceed the remaining credit
    #[error("not enough credit available")]
    CreditExhausted,

    /// Another account already holds the alias
    #[error("PIX key is already registered")]
    DuplicateAlias,

    /// Account has no alias
    #[error("PIX key not set")]
    AliasNotSet,

    /// No live account holds the target alias
    #[error("target PIX key not found")]
    TargetNotFound,

    /// Account arena or alias table is full
    #[error("capacity exceeded")]
    CapacityExceeded,

    /// Username is taken
    #[error("username already taken")]
    DuplicateUsername,

    /// Unknown username or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Current password does not match
    #[error("incorrect current password")]
    WrongPassword,

    /// A required field was empty
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A field exceeded its configured length
    #[error("{field} exceeds {max} bytes")]
    FieldTooLong { field: &'static str, max: usize },

    /// Handle does not point at a live account
    #[error("account not found")]
    AccountNotFound,

    /// Balance would overflow 64-bit cents
    #[error("balance overflow")]
    BalanceOverflow,

    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Money text could not be parsed
    #[error("invalid amount: {0}")]
    Parse(#[from] ParseMoneyError),
}
