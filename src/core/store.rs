//! Ledger store - aggregate lookups, seeding, reset, and export.
//!
//! The store is the read-side source of truth for whole Farmer and Donor
//! aggregates. It never mutates balances or installment status itself;
//! all of that goes through [`crate::core::processor`]. Seeding derives the
//! installment schedule and the wallet debt counters from the fixture's
//! loan terms instead of trusting hand-written counter values.

use crate::{
    config::seed::{FarmerSeed, SeedData},
    core::schedule::{self, LoanTerms},
    entities::{
        Donation, Donor, Farmer, Installment, InstallmentStatus, Transaction, donation, donor,
        farmer, installment, transaction,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, PaginatorTrait, QueryOrder, Set, TransactionTrait,
    prelude::*,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// One farmer with everything they own.
#[derive(Debug, Clone, Serialize)]
pub struct FarmerAggregate {
    /// Profile and wallet fields
    #[serde(flatten)]
    pub farmer: farmer::Model,
    /// Amortization schedule, by installment number
    pub installments: Vec<installment::Model>,
    /// Audit trail, most recent first
    pub transactions: Vec<transaction::Model>,
}

/// One donor with their giving history.
#[derive(Debug, Clone, Serialize)]
pub struct DonorAggregate {
    /// Profile and wallet fields
    #[serde(flatten)]
    pub donor: donor::Model,
    /// Outgoing donations, most recent first
    pub donations: Vec<donation::Model>,
}

/// Full-dataset export document: the whole ledger as one serializable
/// value, `farmers` and `donors` maps keyed by id. Debugging/inspection
/// surface, not the persistence format.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerExport {
    pub farmers: BTreeMap<String, FarmerAggregate>,
    pub donors: BTreeMap<String, DonorAggregate>,
}

/// Loads a farmer aggregate by id.
pub async fn get_farmer(db: &DatabaseConnection, farmer_id: &str) -> Result<FarmerAggregate> {
    let farmer = Farmer::find_by_id(farmer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::FarmerNotFound {
            id: farmer_id.to_string(),
        })?;

    load_farmer_aggregate(db, farmer).await
}

/// Loads a donor aggregate by id.
pub async fn get_donor(db: &DatabaseConnection, donor_id: &str) -> Result<DonorAggregate> {
    let donor = Donor::find_by_id(donor_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::DonorNotFound {
            id: donor_id.to_string(),
        })?;

    load_donor_aggregate(db, donor).await
}

/// Lists all farmer rows (without their aggregates).
pub async fn list_farmers(db: &DatabaseConnection) -> Result<Vec<farmer::Model>> {
    Farmer::find()
        .order_by_asc(farmer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists all donor rows.
pub async fn list_donors(db: &DatabaseConnection) -> Result<Vec<donor::Model>> {
    Donor::find()
        .order_by_asc(donor::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Seeds the fixture dataset if the store is empty.
///
/// A store that already has farmers is left untouched, so this is safe to
/// run on every startup.
pub async fn seed_initial_data(db: &DatabaseConnection, seed: &SeedData) -> Result<()> {
    if Farmer::find().count(db).await? > 0 {
        info!("ledger already seeded, skipping");
        return Ok(());
    }

    let txn = db.begin().await?;
    insert_dataset(&txn, seed).await?;
    txn.commit().await?;

    info!(
        farmers = seed.farmers.len(),
        donors = seed.donors.len(),
        "ledger seeded"
    );
    Ok(())
}

/// Replaces the entire dataset with a fresh copy of the fixture.
///
/// Used for demo and test repeatability; everything the ledger holds is
/// deleted and re-derived from the seed inside one transaction.
pub async fn reset(db: &DatabaseConnection, seed: &SeedData) -> Result<()> {
    let txn = db.begin().await?;

    Transaction::delete_many().exec(&txn).await?;
    Donation::delete_many().exec(&txn).await?;
    Installment::delete_many().exec(&txn).await?;
    Farmer::delete_many().exec(&txn).await?;
    Donor::delete_many().exec(&txn).await?;

    insert_dataset(&txn, seed).await?;
    txn.commit().await?;

    info!("ledger reset to seed fixture");
    Ok(())
}

/// Exports the whole dataset as one document.
pub async fn export(db: &DatabaseConnection) -> Result<LedgerExport> {
    let mut farmers = BTreeMap::new();
    for farmer in list_farmers(db).await? {
        let aggregate = load_farmer_aggregate(db, farmer).await?;
        farmers.insert(aggregate.farmer.id.clone(), aggregate);
    }

    let mut donors = BTreeMap::new();
    for donor in list_donors(db).await? {
        let aggregate = load_donor_aggregate(db, donor).await?;
        donors.insert(aggregate.donor.id.clone(), aggregate);
    }

    Ok(LedgerExport { farmers, donors })
}

/// Serializes the full-dataset export to pretty-printed JSON.
pub async fn export_json(db: &DatabaseConnection) -> Result<String> {
    let document = export(db).await?;
    serde_json::to_string_pretty(&document).map_err(|e| Error::Database {
        message: format!("Failed to serialize ledger export: {e}"),
    })
}

async fn load_farmer_aggregate(
    db: &DatabaseConnection,
    farmer: farmer::Model,
) -> Result<FarmerAggregate> {
    let installments = Installment::find()
        .filter(installment::Column::FarmerId.eq(farmer.id.clone()))
        .order_by_asc(installment::Column::Number)
        .all(db)
        .await?;

    let transactions = Transaction::find()
        .filter(transaction::Column::FarmerId.eq(farmer.id.clone()))
        .order_by_desc(transaction::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(FarmerAggregate {
        farmer,
        installments,
        transactions,
    })
}

async fn load_donor_aggregate(
    db: &DatabaseConnection,
    donor: donor::Model,
) -> Result<DonorAggregate> {
    let donations = Donation::find()
        .filter(donation::Column::DonorId.eq(donor.id.clone()))
        .order_by_desc(donation::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(DonorAggregate { donor, donations })
}

/// Inserts every fixture record, deriving schedules and counters.
async fn insert_dataset<C>(db: &C, seed: &SeedData) -> Result<()>
where
    C: ConnectionTrait,
{
    for farmer_seed in &seed.farmers {
        insert_farmer(db, farmer_seed).await?;
    }

    for donor_seed in &seed.donors {
        donor::ActiveModel {
            id: Set(donor_seed.id.clone()),
            name: Set(donor_seed.name.clone()),
            email: Set(donor_seed.email.clone()),
            cpf: Set(donor_seed.cpf.clone()),
            phone: Set(donor_seed.phone.clone()),
            balance: Set(donor_seed.balance),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

async fn insert_farmer<C>(db: &C, seed: &FarmerSeed) -> Result<()>
where
    C: ConnectionTrait,
{
    let terms = LoanTerms {
        original_amount: seed.loan.original_amount,
        interest_rate: seed.loan.interest_rate,
        months: seed.loan.months,
    };
    let rows = schedule::build_schedule(&terms, seed.loan.first_due()?);

    farmer::ActiveModel {
        id: Set(seed.id.clone()),
        name: Set(seed.name.clone()),
        email: Set(seed.email.clone()),
        cpf: Set(seed.cpf.clone()),
        phone: Set(seed.phone.clone()),
        location: Set(seed.location.clone()),
        balance: Set(seed.balance),
        total_debt: Set(terms.total_debt()),
        original_amount: Set(terms.original_amount),
        interest_rate: Set(terms.interest_rate),
        monthly_payment: Set(terms.monthly_payment()),
        // Counters are recomputed from the schedule below
        paid_amount: Set(0.0),
        remaining_amount: Set(0.0),
        next_payment_date: Set(None),
        remaining_months: Set(0),
        project_description: Set(seed.project_description.clone()),
        project_area: Set(seed.project_area.clone()),
        requested_amount: Set(seed.requested_amount),
    }
    .insert(db)
    .await?;

    for row in rows {
        let already_paid = row.number <= i64::from(seed.loan.paid_installments);
        installment::ActiveModel {
            farmer_id: Set(seed.id.clone()),
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

    schedule::recompute_debt_counters(db, &seed.id).await?;
    Ok(())
}
