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

//! Benchmarks for the ledger.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Money parsing
//! - Deposit throughput with a saturated transaction log
//! - PIX key lookup and transfer
//! - Key removal with cluster repair
//! - Contention on the shared ledger

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pix_ledger::money::parse_cents;
use pix_ledger::{AccountHandle, Ledger, LedgerConfig, SharedLedger};
use rayon::prelude::*;

// =============================================================================
// Helper Functions
// =============================================================================

fn ledger_with_accounts(count: usize) -> (Ledger, Vec<AccountHandle>) {
    let mut ledger = Ledger::new(LedgerConfig::default().with_max_accounts(count)).unwrap();
    let handles = (0..count)
        .map(|i| {
            let handle = ledger.register(&format!("user{i}"), "pw", "0001").unwrap();
            ledger.set_alias(handle, &format!("pix-{i}")).unwrap();
            handle
        })
        .collect();
    (ledger, handles)
}

// =============================================================================
// Money Codec Benchmarks
// =============================================================================

fn bench_parse_cents(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_cents");
    for input in ["5", "1234.56", "-99999999.999", "12.5   "] {
        group.bench_with_input(BenchmarkId::from_parameter(input), input, |b, input| {
            b.iter(|| parse_cents(black_box(input)))
        });
    }
    group.finish();
}

// =============================================================================
// Account Operation Benchmarks
// =============================================================================

fn bench_deposit_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("deposit_throughput");

    // Past 256 deposits every push overwrites the oldest log entry.
    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let (mut ledger, handles) = ledger_with_accounts(1);
                for _ in 0..count {
                    ledger.deposit(handles[0], 10_000).unwrap();
                }
                black_box(&ledger);
            })
        });
    }
    group.finish();
}

fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer");

    for accounts in [16, 256, 1_024].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(accounts),
            accounts,
            |b, &accounts| {
                let (mut ledger, handles) = ledger_with_accounts(accounts);
                for handle in &handles {
                    ledger.deposit(*handle, 1_000_000_000).unwrap();
                }
                let mut i = 0usize;
                b.iter(|| {
                    let from = handles[i % accounts];
                    let to = format!("pix-{}", (i + 1) % accounts);
                    i += 1;
                    ledger.transfer(from, 1, black_box(&to)).unwrap();
                })
            },
        );
    }
    group.finish();
}

// =============================================================================
// Alias Index Benchmarks
// =============================================================================

fn bench_alias_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("alias_lookup");

    for accounts in [16, 256, 1_024].iter() {
        let (ledger, _) = ledger_with_accounts(*accounts);
        let aliases: Vec<String> = (0..*accounts).map(|i| format!("pix-{i}")).collect();

        group.throughput(Throughput::Elements(*accounts as u64));
        group.bench_with_input(BenchmarkId::new("hit", accounts), &aliases, |b, aliases| {
            b.iter(|| {
                for alias in aliases {
                    black_box(ledger.resolve_alias(alias));
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("miss", accounts), accounts, |b, &accounts| {
            let missing: Vec<String> = (0..accounts).map(|i| format!("absent-{i}")).collect();
            b.iter(|| {
                for alias in &missing {
                    black_box(ledger.resolve_alias(alias));
                }
            })
        });
    }
    group.finish();
}

fn bench_alias_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("alias_churn");

    // Every account holds a key, so each removal repairs a populated cluster.
    for accounts in [16, 256, 1_024].iter() {
        group.throughput(Throughput::Elements(*accounts as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(accounts),
            accounts,
            |b, &accounts| {
                b.iter_batched(
                    || ledger_with_accounts(accounts),
                    |(mut ledger, handles)| {
                        for (i, handle) in handles.iter().enumerate() {
                            ledger.clear_alias(*handle).unwrap();
                            ledger.set_alias(*handle, &format!("moved-{i}")).unwrap();
                        }
                        black_box(&ledger);
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_shared_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_contention");
    let total_ops = 10_000u32;

    for accounts in [1, 16, 256].iter() {
        group.throughput(Throughput::Elements(total_ops as u64));
        group.bench_with_input(
            BenchmarkId::new("accounts", accounts),
            accounts,
            |b, &accounts| {
                b.iter(|| {
                    let (ledger, handles) = ledger_with_accounts(accounts);
                    let shared = SharedLedger::from(ledger);

                    (0..total_ops).into_par_iter().for_each(|i| {
                        let handle = handles[i as usize % accounts];
                        shared.deposit(handle, 100).unwrap();
                    });

                    black_box(&shared);
                })
            },
        );
    }
    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(codec, bench_parse_cents);

criterion_group!(operations, bench_deposit_throughput, bench_transfer);

criterion_group!(aliases, bench_alias_lookup, bench_alias_churn);

criterion_group!(multi_threaded, bench_shared_contention);

criterion_main!(codec, operations, aliases, multi_threaded);
