//! Persistence adapters: libsql repository and JSON seed loader.

pub mod seed_json;
pub mod sqlite_repo;

pub use seed_json::{SeedFile, SeedStats, apply_seed, load_seed};
pub use sqlite_repo::SqliteRepo;
