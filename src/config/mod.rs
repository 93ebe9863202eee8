/// Database configuration and connection management
pub mod database;

/// Seed fixture loading from seed.toml
pub mod seed;
