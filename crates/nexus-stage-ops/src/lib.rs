//! Build-level operations wiring the extension, the staging client and the
//! host task graph together.

pub mod ops_apply;
pub mod ops_initialize;
pub mod session;

pub use ops_apply::NexusPublishPlugin;
pub use ops_initialize::{InitializeStagingRepository, TaskOutcome};
pub use session::{BuildGuard, BuildSession};
