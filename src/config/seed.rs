//! Seed dataset loading from seed.toml
//!
//! This module parses the TOML fixture describing the initial marketplace
//! dataset: farmers with their loan terms and donors with their balances.
//! The fixture is the known-good state that `reset` restores and that a
//! fresh database is seeded from on first run. Only the loan *terms* are
//! stored here; the installment schedule and the wallet debt counters are
//! derived from them at seed time, never hand-written into the fixture.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// The entire seed.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    /// Farmers to seed, each with a wallet and loan terms
    pub farmers: Vec<FarmerSeed>,
    /// Donors to seed
    pub donors: Vec<DonorSeed>,
}

/// One farmer in the fixture
#[derive(Debug, Clone, Deserialize)]
pub struct FarmerSeed {
    pub id: String,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    pub location: String,
    /// Starting free balance
    pub balance: f64,
    pub project_description: String,
    pub project_area: String,
    pub requested_amount: f64,
    /// Terms the installment schedule is generated from
    pub loan: LoanSeed,
}

/// Loan terms for one farmer
#[derive(Debug, Clone, Deserialize)]
pub struct LoanSeed {
    /// Principal borrowed
    pub original_amount: f64,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    /// Number of monthly installments
    pub months: u32,
    /// Due date of installment #1, `YYYY-MM-DD`
    pub first_due_date: String,
    /// How many leading installments are already paid at seed time
    #[serde(default)]
    pub paid_installments: u32,
}

/// One donor in the fixture
#[derive(Debug, Clone, Deserialize)]
pub struct DonorSeed {
    pub id: String,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    pub balance: f64,
}

impl LoanSeed {
    /// Parses the fixture's first due date.
    pub fn first_due(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.first_due_date, "%Y-%m-%d").map_err(|e| Error::Config {
            message: format!("Invalid first_due_date '{}': {e}", self.first_due_date),
        })
    }
}

/// Loads the seed dataset from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedData> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Loads the seed dataset from the default location (./seed.toml)
pub fn load_default_seed() -> Result<SeedData> {
    load_seed("seed.toml")
}
