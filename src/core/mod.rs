mod config;
pub mod db;
pub mod kv;
pub mod telemetry;

pub use config::AppConfig;
pub use kv::{KeyValueStore, MemoryKv, SharedKv, SqliteKv};
