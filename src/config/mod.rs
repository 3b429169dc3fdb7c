/// Database configuration and connection management
pub mod database;

/// Seed dataset loading from seed.toml
pub mod seed;
