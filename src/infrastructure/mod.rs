//! Infrastructure layer: adapters for the domain ports plus configuration
//! and logging.

pub mod config;
pub mod github;
pub mod logging;
pub mod store;
