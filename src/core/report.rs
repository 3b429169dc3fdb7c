//! Wallet report generation.
//!
//! Builds the structured summary the wallet dashboard renders: balance,
//! debt progress, upcoming payment, and recent activity. All functions are
//! read-only and framework-agnostic; formatting helpers return plain
//! strings for whatever surface displays them.

use crate::{
    core::{query, schedule, store},
    entities::{farmer, transaction},
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;

/// Snapshot of one farmer's wallet for display.
#[derive(Debug, Clone)]
pub struct WalletReport {
    /// Free balance
    pub balance: f64,
    /// Share of the debt already paid, 0 to 100
    pub debt_progress_percent: f64,
    /// Pending installments already past their due date
    pub overdue_count: usize,
    /// Recent transactions, most recent first
    pub recent_transactions: Vec<transaction::Model>,
    /// The farmer row the report was built from
    pub farmer: farmer::Model,
}

/// Builds a wallet report for one farmer.
///
/// `transaction_limit` caps the recent-activity list (default 10).
pub async fn generate_wallet_report(
    db: &DatabaseConnection,
    farmer_id: &str,
    transaction_limit: Option<u64>,
) -> Result<WalletReport> {
    let aggregate = store::get_farmer(db, farmer_id).await?;

    let limit = transaction_limit.unwrap_or(10);
    let recent_transactions =
        query::get_farmer_transactions(db, farmer_id, Some(limit)).await?;

    let today = Utc::now().date_naive();
    let overdue_count = count_overdue(&aggregate.installments, today);

    let farmer = aggregate.farmer;
    Ok(WalletReport {
        balance: farmer.balance,
        debt_progress_percent: calculate_debt_progress(farmer.paid_amount, farmer.total_debt),
        overdue_count,
        recent_transactions,
        farmer,
    })
}

/// Share of the total debt already paid, as a percentage.
#[must_use]
pub fn calculate_debt_progress(paid_amount: f64, total_debt: f64) -> f64 {
    if total_debt == 0.0 {
        return 0.0;
    }

    (paid_amount / total_debt) * 100.0
}

/// Counts pending installments past their due date as of `today`.
#[must_use]
pub fn count_overdue(installments: &[crate::entities::installment::Model], today: NaiveDate) -> usize {
    installments
        .iter()
        .filter(|i| schedule::is_overdue(i, today))
        .count()
}

/// Formats a monetary amount for display, e.g. `"R$ 45000.00"`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("R$ {amount:.2}")
}

/// Generates a one-line summary for a transaction.
#[must_use]
pub fn format_transaction_summary(transaction: &transaction::Model) -> String {
    format!(
        "{} | {} | {}",
        format_amount(transaction.amount),
        transaction.reference,
        transaction.description
    )
}
