//! Read-only query layer used by presentation surfaces.
//!
//! Queries never mutate the ledger and can run concurrently with each
//! other; they only ever observe committed state.

use crate::{
    entities::{Installment, InstallmentStatus, Transaction, installment, transaction},
    errors::Result,
};
use sea_orm::{DatabaseConnection, QueryOrder, QuerySelect, prelude::*};

/// Transaction history for a farmer, most recent first.
///
/// `limit` caps the result when given. An unknown farmer yields an empty
/// history rather than an error, mirroring how callers render an empty
/// statement.
pub async fn get_farmer_transactions(
    db: &DatabaseConnection,
    farmer_id: &str,
    limit: Option<u64>,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::FarmerId.eq(farmer_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Pending installments for a farmer, ordered by due date ascending.
pub async fn get_pending_installments(
    db: &DatabaseConnection,
    farmer_id: &str,
) -> Result<Vec<installment::Model>> {
    Installment::find()
        .filter(installment::Column::FarmerId.eq(farmer_id))
        .filter(installment::Column::Status.eq(InstallmentStatus::Pending))
        .order_by_asc(installment::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}
