//! Domain layer: issue records, the Markdown codec, ports and errors.
//!
//! Nothing in here performs I/O; adapters live in `infrastructure`.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{StoreError, SyncError, SyncResult};
