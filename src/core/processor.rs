//! Transaction processor - the only writer of wallet and installment state.
//!
//! Every public operation here is one atomic database transaction: it
//! validates, mutates balances/installments, appends its audit record(s),
//! and commits. A validation failure or a failed write aborts the
//! transaction, leaving the ledger exactly as it was; no audit record is
//! ever written for a failed attempt. Balance changes go through atomic
//! `balance = balance + δ` updates so concurrent operations cannot lose
//! each other's writes.
//!
//! Deposit, funding, withdrawal, and donation accept an optional
//! caller-supplied idempotency key: a retried request with a key that was
//! already applied returns the original transaction without moving money
//! again.

use crate::{
    core::schedule,
    entities::{
        Donor, Farmer, Installment, InstallmentStatus, Transaction, TransactionKind,
        TransactionStatus, donation, donor, farmer, installment, transaction,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::info;
use uuid::Uuid;

/// Result of a completed deposit.
#[derive(Debug, Clone)]
pub struct DepositOutcome {
    /// Farmer balance after the deposit
    pub balance: f64,
    /// The appended `funding` audit record
    pub transaction: transaction::Model,
}

/// Result of a completed withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawalOutcome {
    /// Farmer balance after the withdrawal
    pub balance: f64,
    /// The appended `withdrawal` audit record
    pub transaction: transaction::Model,
}

/// Result of a completed donation transfer.
#[derive(Debug, Clone)]
pub struct DonationOutcome {
    /// Donor balance after the transfer
    pub donor_balance: f64,
    /// Farmer balance after the transfer
    pub farmer_balance: f64,
    /// The donor-side mirror record
    pub donation: donation::Model,
    /// The farmer-side `donation` audit record
    pub transaction: transaction::Model,
}

/// Result of a single installment payment.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The installment after its pending → paid transition
    pub installment: installment::Model,
    /// The appended `payment` audit record
    pub transaction: transaction::Model,
    /// The farmer row with freshly recomputed debt counters
    pub wallet: farmer::Model,
}

/// Result of a bulk early payoff.
#[derive(Debug, Clone)]
pub struct PayoffOutcome {
    /// Face value of the installments paid off
    pub total_amount: f64,
    /// Forgiven interest
    pub discount: f64,
    /// Amount actually charged
    pub final_amount: f64,
    /// How many installments were settled
    pub installments_paid: usize,
    /// The appended `payment` audit record
    pub transaction: transaction::Model,
    /// The farmer row with freshly recomputed debt counters
    pub wallet: farmer::Model,
}

/// Credits a farmer's balance with an external deposit.
///
/// Appends one `funding` transaction. Fails with `InvalidAmount` for
/// non-positive or non-finite amounts and `FarmerNotFound` for unknown ids.
pub async fn deposit(
    db: &DatabaseConnection,
    farmer_id: &str,
    amount: f64,
    source: &str,
    idempotency_key: Option<&str>,
) -> Result<DepositOutcome> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    if let Some(prior) = find_by_idempotency_key(&txn, idempotency_key).await? {
        let balance = require_farmer(&txn, farmer_id).await?.balance;
        return Ok(DepositOutcome {
            balance,
            transaction: prior,
        });
    }

    require_farmer(&txn, farmer_id).await?;

    let mut record = new_transaction(farmer_id, TransactionKind::Funding, amount, idempotency_key);
    record.description = format!("Deposit received - {source}");
    record.reference = reference_code("DEP", &record.id);
    record.investor_name = Some(source.to_string());
    let record = insert_transaction(&txn, record).await?;

    let wallet = add_to_farmer_balance(&txn, farmer_id, amount).await?;

    txn.commit().await?;
    info!(farmer_id, amount, "deposit completed");

    Ok(DepositOutcome {
        balance: wallet.balance,
        transaction: record,
    })
}

/// Credits a farmer's balance with marketplace investment funding.
///
/// Same contract as [`deposit`] but records the investor's name and a
/// funding reference code, so statements distinguish bank deposits from
/// investment rounds.
pub async fn fund(
    db: &DatabaseConnection,
    farmer_id: &str,
    amount: f64,
    investor_name: &str,
    idempotency_key: Option<&str>,
) -> Result<DepositOutcome> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    if let Some(prior) = find_by_idempotency_key(&txn, idempotency_key).await? {
        let balance = require_farmer(&txn, farmer_id).await?.balance;
        return Ok(DepositOutcome {
            balance,
            transaction: prior,
        });
    }

    require_farmer(&txn, farmer_id).await?;

    let mut record = new_transaction(farmer_id, TransactionKind::Funding, amount, idempotency_key);
    record.description = format!("Funding received - {investor_name}");
    record.reference = reference_code("FIN", &record.id);
    record.investor_name = Some(investor_name.to_string());
    let record = insert_transaction(&txn, record).await?;

    let wallet = add_to_farmer_balance(&txn, farmer_id, amount).await?;

    txn.commit().await?;
    info!(farmer_id, amount, investor_name, "funding credited");

    Ok(DepositOutcome {
        balance: wallet.balance,
        transaction: record,
    })
}

/// Debits a farmer's balance for a withdrawal to a bank account.
///
/// Appends one `withdrawal` transaction. Fails with `InvalidAmount` or
/// `InsufficientBalance`; a rejected withdrawal leaves the balance
/// untouched.
pub async fn withdraw(
    db: &DatabaseConnection,
    farmer_id: &str,
    amount: f64,
    bank_account: &str,
    idempotency_key: Option<&str>,
) -> Result<WithdrawalOutcome> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    if let Some(prior) = find_by_idempotency_key(&txn, idempotency_key).await? {
        let balance = require_farmer(&txn, farmer_id).await?.balance;
        return Ok(WithdrawalOutcome {
            balance,
            transaction: prior,
        });
    }

    let current = require_farmer(&txn, farmer_id).await?;
    if current.balance < amount {
        return Err(Error::InsufficientBalance {
            current: current.balance,
            requested: amount,
        });
    }

    let mut record =
        new_transaction(farmer_id, TransactionKind::Withdrawal, amount, idempotency_key);
    record.description = "Withdrawal to bank account".to_string();
    record.reference = reference_code("SAQ", &record.id);
    record.bank_account = Some(bank_account.to_string());
    let record = insert_transaction(&txn, record).await?;

    let wallet = add_to_farmer_balance(&txn, farmer_id, -amount).await?;

    txn.commit().await?;
    info!(farmer_id, amount, "withdrawal completed");

    Ok(WithdrawalOutcome {
        balance: wallet.balance,
        transaction: record,
    })
}

/// Transfers a donation from a donor's wallet to a farmer's wallet.
///
/// Debits the donor, credits the farmer, and appends one record on each
/// side carrying the same amount, all inside a single database transaction:
/// money is conserved or nothing happens at all.
pub async fn donate(
    db: &DatabaseConnection,
    donor_id: &str,
    farmer_id: &str,
    amount: f64,
    message: &str,
    idempotency_key: Option<&str>,
) -> Result<DonationOutcome> {
    validate_amount(amount)?;

    let txn = db.begin().await?;

    if let Some(prior) = find_by_idempotency_key(&txn, idempotency_key).await? {
        let donor_balance = require_donor(&txn, donor_id).await?.balance;
        let farmer_balance = require_farmer(&txn, farmer_id).await?.balance;
        let mirror = donation_for_transaction(&txn, donor_id, &prior).await?;
        return Ok(DonationOutcome {
            donor_balance,
            farmer_balance,
            donation: mirror,
            transaction: prior,
        });
    }

    let donor = require_donor(&txn, donor_id).await?;
    require_farmer(&txn, farmer_id).await?;

    if donor.balance < amount {
        return Err(Error::InsufficientBalance {
            current: donor.balance,
            requested: amount,
        });
    }

    let now = Utc::now();
    let mirror = donation::ActiveModel {
        id: Set(format!("don_{}", Uuid::new_v4().simple())),
        donor_id: Set(donor_id.to_string()),
        farmer_id: Set(farmer_id.to_string()),
        amount: Set(amount),
        date: Set(now.date_naive()),
        created_at: Set(now),
        status: Set(TransactionStatus::Completed),
        message: Set(message.to_string()),
    }
    .insert(&txn)
    .await?;

    let mut record = new_transaction(farmer_id, TransactionKind::Donation, amount, idempotency_key);
    record.description = format!("Donation received - {}", donor.name);
    record.reference = reference_code("DOA", &record.id);
    record.donor_name = Some(donor.name.clone());
    let record = insert_transaction(&txn, record).await?;

    let donor_wallet = add_to_donor_balance(&txn, donor_id, -amount).await?;
    let farmer_wallet = add_to_farmer_balance(&txn, farmer_id, amount).await?;

    txn.commit().await?;
    info!(donor_id, farmer_id, amount, "donation completed");

    Ok(DonationOutcome {
        donor_balance: donor_wallet.balance,
        farmer_balance: farmer_wallet.balance,
        donation: mirror,
        transaction: record,
    })
}

/// Pays one installment of a farmer's schedule.
///
/// Marks it paid, recomputes the wallet's debt counters from the schedule,
/// and appends one `payment` transaction for the installment's amount.
/// Fails with `AlreadyPaid` on a double payment; the second attempt appends
/// nothing.
pub async fn pay_installment(
    db: &DatabaseConnection,
    farmer_id: &str,
    number: i64,
) -> Result<PaymentOutcome> {
    let txn = db.begin().await?;

    require_farmer(&txn, farmer_id).await?;

    let today = Utc::now().date_naive();
    let paid = schedule::mark_paid(&txn, farmer_id, number, today).await?;
    let wallet = schedule::recompute_debt_counters(&txn, farmer_id).await?;

    let mut record = new_transaction(farmer_id, TransactionKind::Payment, paid.amount, None);
    record.description = format!("Installment #{number} payment");
    record.reference = reference_code("PAG", &record.id);
    record.installment_number = Some(number);
    let record = insert_transaction(&txn, record).await?;

    txn.commit().await?;
    info!(farmer_id, number, amount = paid.amount, "installment paid");

    Ok(PaymentOutcome {
        installment: paid,
        transaction: record,
        wallet,
    })
}

/// Pays off every pending installment at once, with the early-payoff
/// discount applied.
///
/// Marks all pending installments paid today, recomputes the counters
/// (remaining amount and months drop to zero, next payment date clears),
/// and appends one `payment` transaction for the discounted final amount.
/// Fails with `NoPendingInstallments` when the schedule is already settled.
pub async fn pay_all_pending(db: &DatabaseConnection, farmer_id: &str) -> Result<PayoffOutcome> {
    let txn = db.begin().await?;

    require_farmer(&txn, farmer_id).await?;

    let pending = Installment::find()
        .filter(installment::Column::FarmerId.eq(farmer_id))
        .filter(installment::Column::Status.eq(InstallmentStatus::Pending))
        .order_by_asc(installment::Column::Number)
        .all(&txn)
        .await?;

    if pending.is_empty() {
        return Err(Error::NoPendingInstallments);
    }

    let payoff = schedule::compute_early_payoff(&pending);
    let today = Utc::now().date_naive();
    let count = pending.len();

    for row in pending {
        let mut active: installment::ActiveModel = row.into();
        active.status = Set(InstallmentStatus::Paid);
        active.paid_date = Set(Some(today));
        active.update(&txn).await?;
    }

    let wallet = schedule::recompute_debt_counters(&txn, farmer_id).await?;

    let mut record =
        new_transaction(farmer_id, TransactionKind::Payment, payoff.final_amount, None);
    record.description = format!("Early payoff of {count} installments");
    record.reference = reference_code("PAG", &record.id);
    let record = insert_transaction(&txn, record).await?;

    txn.commit().await?;
    info!(
        farmer_id,
        count,
        final_amount = payoff.final_amount,
        discount = payoff.discount,
        "early payoff completed"
    );

    Ok(PayoffOutcome {
        total_amount: payoff.total_amount,
        discount: payoff.discount,
        final_amount: payoff.final_amount,
        installments_paid: count,
        transaction: record,
        wallet,
    })
}

/// Rejects non-positive and non-finite amounts before any state is touched.
fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// A fresh audit record with the shared fields filled in. Callers set the
/// kind-specific description, reference, and linkage fields before insert.
fn new_transaction(
    farmer_id: &str,
    kind: TransactionKind,
    amount: f64,
    idempotency_key: Option<&str>,
) -> transaction::Model {
    let now = Utc::now();
    transaction::Model {
        id: format!("txn_{}", Uuid::new_v4().simple()),
        farmer_id: farmer_id.to_string(),
        kind,
        amount,
        date: now.date_naive(),
        created_at: now,
        status: TransactionStatus::Completed,
        description: String::new(),
        reference: String::new(),
        donor_name: None,
        bank_account: None,
        installment_number: None,
        investor_name: None,
        idempotency_key: idempotency_key.map(ToString::to_string),
    }
}

/// Inserts a fully built audit record.
async fn insert_transaction<C>(db: &C, t: transaction::Model) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    transaction::ActiveModel {
        id: Set(t.id),
        farmer_id: Set(t.farmer_id),
        kind: Set(t.kind),
        amount: Set(t.amount),
        date: Set(t.date),
        created_at: Set(t.created_at),
        status: Set(t.status),
        description: Set(t.description),
        reference: Set(t.reference),
        donor_name: Set(t.donor_name),
        bank_account: Set(t.bank_account),
        installment_number: Set(t.installment_number),
        investor_name: Set(t.investor_name),
        idempotency_key: Set(t.idempotency_key),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Display code: prefix plus a short fragment of the transaction id.
fn reference_code(prefix: &str, transaction_id: &str) -> String {
    let fragment: String = transaction_id
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{prefix}{}", fragment.to_uppercase())
}

async fn require_farmer<C>(db: &C, farmer_id: &str) -> Result<farmer::Model>
where
    C: ConnectionTrait,
{
    Farmer::find_by_id(farmer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::FarmerNotFound {
            id: farmer_id.to_string(),
        })
}

async fn require_donor<C>(db: &C, donor_id: &str) -> Result<donor::Model>
where
    C: ConnectionTrait,
{
    Donor::find_by_id(donor_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::DonorNotFound {
            id: donor_id.to_string(),
        })
}

/// Looks up a previously applied transaction by idempotency key.
async fn find_by_idempotency_key<C>(
    db: &C,
    key: Option<&str>,
) -> Result<Option<transaction::Model>>
where
    C: ConnectionTrait,
{
    let Some(key) = key else {
        return Ok(None);
    };
    Transaction::find()
        .filter(transaction::Column::IdempotencyKey.eq(key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the donor-side mirror matching a replayed donation transaction.
async fn donation_for_transaction<C>(
    db: &C,
    donor_id: &str,
    record: &transaction::Model,
) -> Result<donation::Model>
where
    C: ConnectionTrait,
{
    crate::entities::Donation::find()
        .filter(donation::Column::DonorId.eq(donor_id))
        .filter(donation::Column::FarmerId.eq(record.farmer_id.clone()))
        .filter(donation::Column::Amount.eq(record.amount))
        .order_by_desc(donation::Column::CreatedAt)
        .one(db)
        .await?
        .ok_or_else(|| Error::Database {
            message: format!(
                "Donation mirror missing for replayed transaction {}",
                record.id
            ),
        })
}

/// Updates a farmer balance by atomically adding a delta.
///
/// A single `UPDATE farmers SET balance = balance + δ` statement rather
/// than read-modify-write, so a concurrent operation cannot lose the
/// update.
async fn add_to_farmer_balance<C>(db: &C, farmer_id: &str, delta: f64) -> Result<farmer::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    Farmer::update_many()
        .col_expr(
            farmer::Column::Balance,
            Expr::col(farmer::Column::Balance).add(delta),
        )
        .filter(farmer::Column::Id.eq(farmer_id))
        .exec(db)
        .await?;

    require_farmer(db, farmer_id).await
}

/// Updates a donor balance by atomically adding a delta.
async fn add_to_donor_balance<C>(db: &C, donor_id: &str, delta: f64) -> Result<donor::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    Donor::update_many()
        .col_expr(
            donor::Column::Balance,
            Expr::col(donor::Column::Balance).add(delta),
        )
        .filter(donor::Column::Id.eq(donor_id))
        .exec(db)
        .await?;

    require_donor(db, donor_id).await
}
