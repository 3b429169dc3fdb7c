//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{
    config::seed::{DonorSeed, FarmerSeed, LoanSeed, SeedData},
    core::schedule::{self, LoanTerms},
    entities::{InstallmentStatus, donor, farmer, installment},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test farmer with the given balance and no installment
/// schedule. Debt fields start at zero.
pub async fn create_test_farmer(
    db: &DatabaseConnection,
    id: &str,
    balance: f64,
) -> Result<farmer::Model> {
    farmer::ActiveModel {
        id: Set(id.to_string()),
        name: Set("Joao da Silva".to_string()),
        email: Set("joao@fazendaverde.com.br".to_string()),
        cpf: Set("123.456.789-00".to_string()),
        phone: Set("(11) 98765-4321".to_string()),
        location: Set("Sao Paulo".to_string()),
        balance: Set(balance),
        total_debt: Set(0.0),
        original_amount: Set(0.0),
        interest_rate: Set(0.0),
        monthly_payment: Set(0.0),
        paid_amount: Set(0.0),
        remaining_amount: Set(0.0),
        next_payment_date: Set(None),
        remaining_months: Set(0),
        project_description: Set("Organic vegetable expansion".to_string()),
        project_area: Set("12 hectares".to_string()),
        requested_amount: Set(50000.0),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test farmer with a generated 50 000 @ 4% schedule.
///
/// # Arguments
/// * `months` - Schedule length
/// * `paid` - How many leading installments start out paid
///
/// Counters are recomputed from the schedule before returning, so the
/// returned model reflects the seeded state.
pub async fn create_test_farmer_with_loan(
    db: &DatabaseConnection,
    id: &str,
    balance: f64,
    months: u32,
    paid: u32,
) -> Result<farmer::Model> {
    let farmer = create_test_farmer(db, id, balance).await?;

    let terms = LoanTerms {
        original_amount: 50000.0,
        interest_rate: 4.0,
        months,
    };
    let first_due = NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");

    let mut active: farmer::ActiveModel = farmer.into();
    active.total_debt = Set(terms.total_debt());
    active.original_amount = Set(terms.original_amount);
    active.interest_rate = Set(terms.interest_rate);
    active.monthly_payment = Set(terms.monthly_payment());
    active.update(db).await?;

    for row in schedule::build_schedule(&terms, first_due) {
        let already_paid = row.number <= i64::from(paid);
        installment::ActiveModel {
            farmer_id: Set(id.to_string()),
            number: Set(row.number),
            due_date: Set(row.due_date),
            amount: Set(row.amount),
            principal: Set(row.principal),
            interest: Set(row.interest),
            status: Set(if already_paid {
                InstallmentStatus::Paid
            } else {
                InstallmentStatus::Pending
            }),
            paid_date: Set(already_paid.then_some(row.due_date)),
        }
        .insert(db)
        .await?;
    }

    schedule::recompute_debt_counters(db, id).await
}

/// Creates a test donor with the given balance.
pub async fn create_test_donor(
    db: &DatabaseConnection,
    id: &str,
    balance: f64,
) -> Result<donor::Model> {
    donor::ActiveModel {
        id: Set(id.to_string()),
        name: Set("Maria Santos".to_string()),
        email: Set("maria.santos@email.com.br".to_string()),
        cpf: Set("987.654.321-00".to_string()),
        phone: Set("(21) 91234-5678".to_string()),
        balance: Set(balance),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Builds an installment model in memory, without inserting it.
#[must_use]
pub fn test_installment(
    farmer_id: &str,
    number: i64,
    due_date: NaiveDate,
    amount: f64,
    principal: f64,
    interest: f64,
    paid: bool,
) -> installment::Model {
    installment::Model {
        farmer_id: farmer_id.to_string(),
        number,
        due_date,
        amount,
        principal,
        interest,
        status: if paid {
            InstallmentStatus::Paid
        } else {
            InstallmentStatus::Pending
        },
        paid_date: paid.then_some(due_date),
    }
}

/// Inserts a single hand-built installment row.
pub async fn insert_test_installment(
    db: &DatabaseConnection,
    farmer_id: &str,
    number: i64,
    due_date: &str,
    amount: f64,
    principal: f64,
    interest: f64,
    paid: bool,
) -> Result<installment::Model> {
    let due = NaiveDate::parse_from_str(due_date, "%Y-%m-%d").expect("valid test date");
    let model = test_installment(farmer_id, number, due, amount, principal, interest, paid);

    installment::ActiveModel {
        farmer_id: Set(model.farmer_id.clone()),
        number: Set(model.number),
        due_date: Set(model.due_date),
        amount: Set(model.amount),
        principal: Set(model.principal),
        interest: Set(model.interest),
        status: Set(model.status),
        paid_date: Set(model.paid_date),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// The standard fixture used by store tests: one farmer
/// (50 000 @ 4% / 24 months, 4 paid, balance 45 000) and one donor
/// (balance 25 000).
#[must_use]
pub fn test_seed_data() -> SeedData {
    SeedData {
        farmers: vec![FarmerSeed {
            id: "farmer-001".to_string(),
            name: "Joao da Silva".to_string(),
            email: "joao@fazendaverde.com.br".to_string(),
            cpf: "123.456.789-00".to_string(),
            phone: "(11) 98765-4321".to_string(),
            location: "Sao Paulo".to_string(),
            balance: 45000.0,
            project_description: "Organic vegetable expansion".to_string(),
            project_area: "12 hectares".to_string(),
            requested_amount: 50000.0,
            loan: LoanSeed {
                original_amount: 50000.0,
                interest_rate: 4.0,
                months: 24,
                first_due_date: "2024-01-15".to_string(),
                paid_installments: 4,
            },
        }],
        donors: vec![DonorSeed {
            id: "donor-001".to_string(),
            name: "Maria Santos".to_string(),
            email: "maria.santos@email.com.br".to_string(),
            cpf: "987.654.321-00".to_string(),
            phone: "(21) 91234-5678".to_string(),
            balance: 25000.0,
        }],
    }
}
