/// Database configuration and connection management
pub mod database;

/// Seed data loading from the seed TOML file
pub mod seed;

/// Listener settings from environment variables
pub mod server;
