mod orchestrator;
mod packer;
mod progress;

pub use orchestrator::{BuilderError, BulkSwapOrchestrator, BulkSwapOrchestratorBuilder, JobError};
pub use packer::{pack, Packing};
pub use progress::{Progress, ProgressTracker};
