//! Database seeding functionality
//!
//! Bootstrap data that has to exist before the first request: currently only
//! the platform super admin.

pub mod super_admin;

pub use super_admin::{SeedOutcome, seed_super_admin};
