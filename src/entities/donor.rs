//! Donor entity - A lender with a simple balance wallet.
//!
//! Donors carry no debt fields; their wallet is just the balance they can
//! donate from. Outgoing donations are mirrored in the `donations` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Donor database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donors")]
pub struct Model {
    /// Stable external identifier (e.g., `"donor-001"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Full name of the donor
    pub name: String,
    /// Contact email
    pub email: String,
    /// Brazilian taxpayer registry number
    pub cpf: String,
    /// Contact phone number
    pub phone: String,
    /// Donatable balance in reais
    pub balance: f64,
}

/// Defines relationships between Donor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One donor has many outgoing donation records
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
