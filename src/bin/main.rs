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

use clap::Parser;
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use log::{debug, warn};
use pix_ledger::money::parse_cents;
use pix_ledger::{Cents, Ledger, LedgerConfig, LedgerError};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;

/// PIX Ledger - Replay a CSV script of account commands
///
/// Reads commands from a CSV file, applies them to an in-memory ledger, and
/// writes the resulting account summaries to stdout.
#[derive(Parser, Debug)]
#[command(name = "pix-ledger")]
#[command(about = "Replays ledger command CSVs and prints account summaries", long_about = None)]
struct Args {
    /// Path to CSV file with commands
    ///
    /// Expected format: command,username,password,amount,text
    /// Example: cargo run -- commands.csv > accounts.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Register the demo accounts user1 and user2 before replaying
    #[arg(long)]
    seed_sample: bool,

    /// Print every account's transaction log to stderr after the summaries
    #[arg(long)]
    history: bool,

    #[arg(long, default_value_t = LedgerConfig::DEFAULT_MAX_ACCOUNTS)]
    max_accounts: usize,

    #[arg(long, default_value_t = LedgerConfig::default().max_username_len)]
    max_username_len: usize,

    #[arg(long, default_value_t = LedgerConfig::default().max_password_len)]
    max_password_len: usize,

    #[arg(long, default_value_t = LedgerConfig::default().max_agency_len)]
    max_agency_len: usize,

    #[arg(long, default_value_t = LedgerConfig::default().max_alias_len)]
    max_alias_len: usize,

    #[arg(long, default_value_t = LedgerConfig::default().tx_log_capacity)]
    tx_log_capacity: usize,

    #[arg(long, default_value_t = LedgerConfig::default().tx_note_len)]
    tx_note_len: usize,

    /// Credit limit for new accounts, in cents
    #[arg(long, default_value_t = LedgerConfig::default().default_credit_limit)]
    default_credit_limit: Cents,

    /// PIX key table slots (power of two); derived from --max-accounts if unset
    #[arg(long)]
    alias_table_size: Option<usize>,
}

impl Args {
    fn config(&self) -> LedgerConfig {
        let mut config = LedgerConfig {
            max_username_len: self.max_username_len,
            max_password_len: self.max_password_len,
            max_agency_len: self.max_agency_len,
            max_alias_len: self.max_alias_len,
            tx_log_capacity: self.tx_log_capacity,
            tx_note_len: self.tx_note_len,
            default_credit_limit: self.default_credit_limit,
            ..LedgerConfig::default()
        }
        .with_max_accounts(self.max_accounts);
        if let Some(size) = self.alias_table_size {
            config.alias_table_size = size;
        }
        config
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let mut ledger = match Ledger::new(args.config()) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if args.seed_sample {
        if let Err(e) = ledger.seed_sample_accounts() {
            eprintln!("Error seeding sample accounts: {}", e);
            process::exit(1);
        }
    }

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = process_commands(&mut ledger, BufReader::new(file)) {
        eprintln!("Error processing commands: {}", e);
        process::exit(1);
    }

    if let Err(e) = write_accounts(&ledger, io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }

    if args.history {
        if let Err(e) = write_history(&ledger, io::stderr().lock()) {
            eprintln!("Error writing history: {}", e);
            process::exit(1);
        }
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `command, username, password, amount, text`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    command: String,
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    text: String,
}

/// Why a single row was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
enum RowError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl CsvRecord {
    fn amount(&self) -> Result<Cents, LedgerError> {
        Ok(parse_cents(&self.amount)?)
    }

    /// Applies the row to `ledger`. Every command except `register` logs in
    /// with the row's username and password first.
    fn apply(&self, ledger: &mut Ledger) -> Result<(), RowError> {
        let command = self.command.to_lowercase();
        if command == "register" {
            ledger.register(&self.username, &self.password, &self.text)?;
            return Ok(());
        }

        let handle = ledger.authenticate(&self.username, &self.password)?;
        match command.as_str() {
            "deposit" => ledger.deposit(handle, self.amount()?)?,
            "withdraw" => ledger.withdraw(handle, self.amount()?)?,
            "transfer" => {
                ledger.transfer(handle, self.amount()?, &self.text)?;
            }
            "set_alias" => ledger.set_alias(handle, &self.text)?,
            "clear_alias" => ledger.clear_alias(handle)?,
            "credit_limit" => ledger.change_credit_limit(handle, self.amount()?)?,
            "change_password" => ledger.change_password(handle, &self.password, &self.text)?,
            _ => return Err(RowError::UnknownCommand(self.command.clone())),
        }
        Ok(())
    }
}

/// Apply commands from a CSV reader to `ledger`.
///
/// Rows are streamed. Malformed rows and rejected commands are logged and
/// skipped; they never stop processing.
///
/// # CSV Format
///
/// Expected columns: `command, username, password, amount, text`
/// - `command`: register, deposit, withdraw, transfer, set_alias,
///   clear_alias, credit_limit, change_password
/// - `username`, `password`: credentials (for `change_password`, the current password)
/// - `amount`: decimal amount for money commands
/// - `text`: agency, target PIX key, new PIX key, or new password
///
/// # Example
///
/// ```csv
/// command,username,password,amount,text
/// register,alice,pw,,0001
/// deposit,alice,pw,100.00,
/// set_alias,alice,pw,,alice@pix
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails. Returns the number of rows applied.
pub fn process_commands<R: Read>(ledger: &mut Ledger, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut applied = 0;
    for (index, result) in rdr.records().enumerate() {
        // Header is line 1.
        let row = index + 2;
        let parsed = result.and_then(|record| {
            pad_to(record, headers.len()).deserialize::<CsvRecord>(Some(&headers))
        });
        match parsed {
            Ok(record) => match record.apply(ledger) {
                Ok(()) => {
                    applied += 1;
                    debug!("Row {}: {} applied", row, record.command);
                }
                Err(e) => warn!("Row {}: {} rejected: {}", row, record.command, e),
            },
            Err(e) => {
                if e.is_io_error() {
                    return Err(e);
                }
                warn!("Row {}: skipping malformed row: {}", row, e);
            }
        }
    }

    Ok(applied)
}

/// Fills trailing columns a short row left out with empty fields.
fn pad_to(mut record: StringRecord, width: usize) -> StringRecord {
    while record.len() < width {
        record.push_field("");
    }
    record
}

/// Write account summaries to a CSV writer, in registration order.
///
/// # CSV Format
///
/// Columns: `username, agency, balance, credit_used, credit_limit, alias`
///
/// ```csv
/// username,agency,balance,credit_used,credit_limit,alias
/// alice,0001,70.00,0.00,100.00,alice@pix
/// ```
pub fn write_accounts<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for summary in ledger.summaries() {
        wtr.serialize(&summary)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write every account's transaction log, oldest entry first.
pub fn write_history<W: Write>(ledger: &Ledger, mut writer: W) -> io::Result<()> {
    for account in ledger.accounts() {
        writeln!(writer, "--- {} ---", account.username())?;
        if account.history().is_empty() {
            writeln!(writer, "<no transactions>")?;
        }
        for entry in account.history() {
            writeln!(writer, "{}", entry)?;
        }
    }
    writer.flush()
}
