//! # Data Models
//!
//! SeaORM entities for the Inventory API plus small shared response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod category;
pub mod item;
pub mod tenant;
pub mod user;

pub use category::Entity as Category;
pub use item::Entity as Item;
pub use tenant::Entity as Tenant;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "inventory-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
