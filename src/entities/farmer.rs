//! Farmer entity - A borrower and the wallet that tracks their debt.
//!
//! The wallet is flattened into the farmer row: the free balance plus the
//! aggregate debt counters (`total_debt`, `paid_amount`, `remaining_amount`,
//! `next_payment_date`, `remaining_months`). The counters are derived from
//! the installment schedule and must only be written by the recompute path,
//! never patched ad hoc.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Farmer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "farmers")]
pub struct Model {
    /// Stable external identifier (e.g., `"farmer-001"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Full name of the farmer
    pub name: String,
    /// Contact email
    pub email: String,
    /// Brazilian taxpayer registry number
    pub cpf: String,
    /// Contact phone number
    pub phone: String,
    /// Farm location (state or region)
    pub location: String,
    /// Freely withdrawable balance in reais
    pub balance: f64,
    /// Total debt: sum of all installment amounts
    pub total_debt: f64,
    /// Principal originally borrowed
    pub original_amount: f64,
    /// Annual interest rate in percent (e.g., 4.0)
    pub interest_rate: f64,
    /// Flat monthly payment the schedule was built around
    pub monthly_payment: f64,
    /// Sum of amounts of installments already paid
    pub paid_amount: f64,
    /// Sum of amounts of installments still pending
    pub remaining_amount: f64,
    /// Due date of the next pending installment, None once fully paid
    pub next_payment_date: Option<Date>,
    /// Count of pending installments
    pub remaining_months: i32,
    /// What the loan funds
    pub project_description: String,
    /// Cultivated area of the funded project
    pub project_area: String,
    /// Amount the farmer asked the marketplace for
    pub requested_amount: f64,
}

/// Defines relationships between Farmer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One farmer has many audit transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One farmer has many scheduled installments
    #[sea_orm(has_many = "super::installment::Entity")]
    Installments,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::installment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
