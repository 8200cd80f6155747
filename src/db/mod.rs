//! Database module: models, schema and the serialized storage actor.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows, plus item query types
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: queries, seeding and mutations over one pooled connection
//! - `actor.rs`: ractor actor that serializes every storage call

pub mod actor;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use actor::{DbActorHandle, spawn};
pub use models::{Feed, Folder, Item, ItemQuery, ItemRef, ItemSelector};
pub use schema::SQLITE_INIT;
pub use sqlite::{FeedStorage, SeedSummary, SqlitePool, connect};
