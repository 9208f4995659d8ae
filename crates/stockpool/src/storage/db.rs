//! Database connection and initialization.

pub use stockpool_core::db::DatabaseError;

stockpool_core::define_database!(Database, "Database migrations complete");
