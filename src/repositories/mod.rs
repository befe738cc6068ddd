//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations. Queries
//! reachable by callers take an authorization [`Scope`](crate::auth::Scope)
//! so tenant isolation lives in the SQL.

pub mod category;
pub mod item;
pub mod tenant;
pub mod user;

pub use category::{CategoryRepository, NewCategory};
pub use item::{ItemChanges, ItemPage, ItemRepository, NewItem};
pub use tenant::TenantRepository;
pub use user::{IdentityRepository, NewIdentity};

#[cfg(test)]
pub(crate) mod test_support {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};

    /// In-memory SQLite database with every migration applied.
    pub async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to apply migrations");
        db
    }
}
