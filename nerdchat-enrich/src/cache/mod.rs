//! Artist document cache
//!
//! - `store`: the get/set/exists abstraction plus file and memory backends
//! - `sqlite`: embedded SQLite backend
//! - `freshness`: time-stamped entries with staleness checked on read

pub mod freshness;
pub mod sqlite;
pub mod store;

pub use freshness::FreshnessCache;
pub use sqlite::SqliteStore;
pub use store::{FileStore, KeyValueStore, MemoryStore};
