//! Transaction entity - The immutable audit trail of balance changes.
//!
//! Every successful processor operation appends exactly one row here (the
//! donor side of a donation is mirrored separately in `donations`). Rows are
//! append-only and never updated; the balance history of a wallet can be
//! reconstructed from them. Ids are random UUIDs so rapid concurrent calls
//! cannot collide, and `reference` is a short human-readable display code.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of balance change a transaction records
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Incoming donation from a donor
    #[sea_orm(string_value = "donation")]
    Donation,
    /// Withdrawal to the farmer's bank account
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// Installment payment (single or bulk early payoff)
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Deposit or investor funding credited to the balance
    #[sea_orm(string_value = "funding")]
    Funding,
}

/// Settlement status of a transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Applied to balances
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Accepted but not yet applied
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Rejected by the settlement side
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Collision-free identifier (`txn_` + UUID)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Farmer whose wallet this transaction touched
    pub farmer_id: String,
    /// Kind of balance change
    pub kind: TransactionKind,
    /// Amount moved, always positive
    pub amount: f64,
    /// Business date of the transaction
    pub date: Date,
    /// Creation instant, used for most-recent-first ordering
    pub created_at: DateTimeUtc,
    /// Settlement status
    pub status: TransactionStatus,
    /// Human-readable description
    pub description: String,
    /// Short display code (e.g., `"SAQ1A2B3C"`); not guaranteed unique
    pub reference: String,
    /// Donor display name, set on donation transactions
    pub donor_name: Option<String>,
    /// Destination account reference, set on withdrawals
    pub bank_account: Option<String>,
    /// Installment number, set on single installment payments
    pub installment_number: Option<i64>,
    /// Funding source display name, set on deposits/funding
    pub investor_name: Option<String>,
    /// Caller-supplied deduplication key; replays return the original row
    #[sea_orm(unique)]
    pub idempotency_key: Option<String>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one farmer
    #[sea_orm(
        belongs_to = "super::farmer::Entity",
        from = "Column::FarmerId",
        to = "super::farmer::Column::Id"
    )]
    Farmer,
}

impl Related<super::farmer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farmer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
