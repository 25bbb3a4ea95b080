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

//! Decimal money codec.
//!
//! Amounts are held as integer cents. Parsing keeps the first two fractional
//! digits and truncates the rest, so `parse_cents(&format_cents(x)) == x`
//! for every `x`, but formatting a parsed value does not reproduce input that
//! had more than two fractional digits.
//!
//! # Example
//!
//! ```
//! use pix_ledger::money::{format_cents, parse_cents};
//!
//! assert_eq!(parse_cents("12.345").unwrap(), 1234);
//! assert_eq!(format_cents(-1205), "-12.05");
//! ```

use crate::base::Cents;
use crate::error::ParseMoneyError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest accepted whole part.
const WHOLE_LIMIT: i64 = 1 << 60;

/// Parses `[+-]digits[.digits]` followed by optional whitespace into cents.
///
/// A single fractional digit is read as tenths. A trailing point (`"12."`)
/// and a missing whole part (`".5"`) are both accepted, but at least one
/// digit must appear somewhere.
pub fn parse_cents(text: &str) -> Result<Cents, ParseMoneyError> {
    if text.is_empty() {
        return Err(ParseMoneyError::Empty);
    }

    let bytes = text.as_bytes();
    let mut pos = 0;
    let negative = match bytes[0] {
        b'+' => {
            pos += 1;
            false
        }
        b'-' => {
            pos += 1;
            true
        }
        _ => false,
    };

    let mut whole: i64 = 0;
    let mut digits = 0usize;
    while let Some(d) = digit_at(bytes, pos) {
        whole = whole
            .checked_mul(10)
            .and_then(|w| w.checked_add(d))
            .filter(|w| *w <= WHOLE_LIMIT)
            .ok_or(ParseMoneyError::Overflow)?;
        pos += 1;
        digits += 1;
    }

    let mut frac: i64 = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let mut significant = 0;
        while let Some(d) = digit_at(bytes, pos) {
            if significant < 2 {
                frac = frac * 10 + d;
                significant += 1;
            }
            pos += 1;
            digits += 1;
        }
        if significant == 1 {
            frac *= 10;
        }
    }

    let rest = &text[pos..];
    if let Some((offset, found)) = rest.char_indices().find(|(_, c)| !c.is_whitespace()) {
        return Err(ParseMoneyError::UnexpectedCharacter {
            found,
            position: pos + offset,
        });
    }
    if digits == 0 {
        return Err(ParseMoneyError::MissingDigits);
    }

    // Widen so the magnitude of `i64::MIN` fits before the sign is applied.
    let magnitude = i128::from(whole) * 100 + i128::from(frac);
    let cents = if negative { -magnitude } else { magnitude };
    Cents::try_from(cents).map_err(|_| ParseMoneyError::Overflow)
}

fn digit_at(bytes: &[u8], pos: usize) -> Option<i64> {
    match bytes.get(pos) {
        Some(b) if b.is_ascii_digit() => Some(i64::from(b - b'0')),
        _ => None,
    }
}

/// Renders cents as `[-]W.FF`. Total over every `i64`.
pub fn format_cents(cents: Cents) -> String {
    let abs = cents.unsigned_abs();
    let sign = if cents < 0 { "-" } else { "" };
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Converts cents to a two-decimal-place [`Decimal`].
pub fn to_decimal(cents: Cents) -> Decimal {
    Decimal::new(cents, 2)
}

/// Cents with text conversions through the codec.
///
/// Serializes as the formatted string so reports never carry floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(pub Cents);

impl Money {
    pub const ZERO: Self = Money(0);

    pub fn cents(self) -> Cents {
        self.0
    }
}

impl From<Cents> for Money {
    fn from(cents: Cents) -> Self {
        Money(cents)
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cents(s).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cents(self.0))
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_cents(self.0))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}
