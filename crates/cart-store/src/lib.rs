pub mod activity_log;
pub mod config;
pub mod error;
pub mod memory_source;
pub mod scan;

pub use activity_log::ActivityLog;
pub use config::{CONFIG_FILE, CartConfig, ResolvedPaths, resolve_root};
pub use error::{Result, StoreError};
pub use memory_source::MemorySource;
pub use scan::{FullSearch, LedgerScan, TokenScan, full_search, read_ledger_index, scan_tokens};
