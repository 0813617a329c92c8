pub mod admin;
pub mod backend;
pub mod config;
pub mod error;
pub mod retry;
pub mod schema;
pub mod store;


pub use admin::Provisioner;
pub use backend::{CellValue, MemoryTable, PersistenceBackend, SqliteTable};
pub use config::{FileConfig, StoreConfig};
pub use error::{BackendError, ConfigError, StoreError};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use store::PlayerRecordStore;
pub use roster_types::{Color, PlayerRecord, PlayerUpdate};
