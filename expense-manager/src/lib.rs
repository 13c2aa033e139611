//! Expense manager: per-user categories, expenses and monthly budget status.
//!
//! - `database`: SQLite pool, migrations, queries and row models
//! - `domain`: account store, ledgers and the budget aggregator
//! - `backend`: axum HTTP surface and session gate

pub mod backend;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod telemetry;

pub use error::{LedgerError, LedgerResult};
