//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod donation;
pub mod donor;
pub mod farmer;
pub mod installment;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use donation::{Column as DonationColumn, Entity as Donation, Model as DonationModel};
pub use donor::{Column as DonorColumn, Entity as Donor, Model as DonorModel};
pub use farmer::{Column as FarmerColumn, Entity as Farmer, Model as FarmerModel};
pub use installment::{
    Column as InstallmentColumn, Entity as Installment, InstallmentStatus,
    Model as InstallmentModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionKind, TransactionStatus,
};
