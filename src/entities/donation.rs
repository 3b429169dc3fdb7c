//! Donation entity - The donor-side mirror of an outgoing donation.
//!
//! A completed donation writes one row here for the donor and one `donation`
//! transaction on the farmer side, both for the same amount. Keeping the
//! mirror separate lets a donor's giving history be listed without scanning
//! every farmer's transaction log.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionStatus;

/// Donation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    /// Collision-free identifier (`don_` + UUID)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Donor the money left
    pub donor_id: String,
    /// Farmer the money went to
    pub farmer_id: String,
    /// Amount donated, always positive
    pub amount: f64,
    /// Business date of the donation
    pub date: Date,
    /// Creation instant, used for most-recent-first ordering
    pub created_at: DateTimeUtc,
    /// Settlement status
    pub status: TransactionStatus,
    /// Optional message from the donor to the farmer
    pub message: String,
}

/// Defines relationships between Donation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each donation belongs to one donor
    #[sea_orm(
        belongs_to = "super::donor::Entity",
        from = "Column::DonorId",
        to = "super::donor::Column::Id"
    )]
    Donor,
}

impl Related<super::donor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
