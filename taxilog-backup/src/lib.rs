//! Taxilog Backup Core
//!
//! Builds versioned snapshots of a taxi driver's day book, serializes them as
//! a JSON document or a multi-tab spreadsheet workbook, and restores either
//! form back into the store with progress reporting.

pub mod backup;
pub mod coerce;
pub mod error;
pub mod model;
pub mod normalize;
pub mod payload;
pub mod progress;
pub mod restore;
pub mod sheet;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use backup::{
    backup_to_blob, export_to_sheets, peek_meta, restore_from_json, restore_from_sheets,
};
pub use error::BackupError;
pub use payload::{build_backup_payload, BackupPayload, BACKUP_APP_MARKER};
pub use restore::{restore_payload, RestoreSummary};
pub use store::{StoreError, TaxiStore};

pub type Result<T> = std::result::Result<T, BackupError>;
