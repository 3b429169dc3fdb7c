//! Core business logic - framework-agnostic ledger operations.
//!
//! `processor` is the only module allowed to mutate wallet balances and
//! installment status; `store`, `query`, and `report` are read-side,
//! `schedule` holds the amortization rules the processor applies.

/// Money-moving operations: deposit, withdrawal, donation, payments
pub mod processor;
/// Read-only transaction history and pending installment queries
pub mod query;
/// Wallet report generation and display formatting
pub mod report;
/// Amortization schedule rules: build, payoff, overdue, counter recompute
pub mod schedule;
/// Ledger store: aggregate lookups, seeding, reset, export
pub mod store;
