//! Sync services: the two synchronizers, conflict handling and the
//! orchestrator that runs them.

pub mod conflict_resolver;
pub mod pull_sync;
pub mod push_sync;
pub mod sync_orchestrator;

pub use conflict_resolver::{
    is_conflict, resolution_guide, Conflict, ConflictArtifacts, ConflictResolver, Resolution,
};
pub use pull_sync::PullSynchronizer;
pub use push_sync::{MilestoneResolver, PushSynchronizer};
pub use sync_orchestrator::{SyncOrchestrator, SyncReport};
