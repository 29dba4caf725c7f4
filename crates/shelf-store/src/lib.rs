//! # shelf-store
//!
//! SQLite persistence for Shelf, built on `sqlx`.
//!
//! All queries hang off [`Database`]:
//! - products: insert, update, delete, lookups by id and by owner
//! - users: registration with Argon2 hashes, credential checks
//! - sessions: server-side login sessions keyed by an opaque token
//!
//! Migrations are embedded and applied with [`Database::migrate`].
//!
//! ```rust,no_run
//! use shelf_store::Database;
//! use shelf_core::config::DatabaseConfig;
//!
//! # async fn example() -> Result<(), shelf_store::StoreError> {
//! let db = Database::connect(&DatabaseConfig::default()).await?;
//! db.migrate().await?;
//! let products = db.all_products().await?;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod error;
pub mod products;
pub mod sessions;
pub mod users;

pub use db::Database;
pub use error::StoreError;
pub use sessions::Session;
