//! # Services
//!
//! Transport-agnostic operations. They return [`ServiceError`](crate::error::ServiceError)
//! outcomes that handlers translate into HTTP responses.

pub mod accounts;
pub mod inventory;
pub mod validation;

pub use accounts::{AccountService, LoginOutcome, SignupOutcome, SignupRequest, TenantRef};
pub use inventory::{InventoryService, ItemInput, PageRequest};
