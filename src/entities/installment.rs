//! Installment entity - One scheduled debt payment.
//!
//! Installments are keyed by (`farmer_id`, `number`) where `number` is stable
//! and sequential within a farmer. Each row carries the principal/interest
//! split (`amount == principal + interest`). The lifecycle is pending → paid,
//! never reversed. "Overdue" is deliberately not a column: it is derived at
//! read time from `due_date` so it can never drift from the clock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an installment
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    /// Not yet paid
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Paid via the transaction processor; terminal
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// Installment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    /// Farmer this installment belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub farmer_id: String,
    /// Sequential position within the farmer's schedule, starting at 1
    #[sea_orm(primary_key, auto_increment = false)]
    pub number: i64,
    /// Date the installment falls due
    pub due_date: Date,
    /// Total amount due: `principal + interest`
    pub amount: f64,
    /// Principal portion of the amount
    pub principal: f64,
    /// Interest portion of the amount
    pub interest: f64,
    /// Current lifecycle status
    pub status: InstallmentStatus,
    /// Date the installment was paid, None while pending
    pub paid_date: Option<Date>,
}

/// Defines relationships between Installment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each installment belongs to one farmer
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
