//! Boundary between nexus-stage and the host build system.
//!
//! The host owns the task graph, plugin lifecycle and the publishing
//! repositories; nexus-stage only reads configuration through [`BuildUnit`]
//! and asks it to record task dependencies. The host in turn drives the
//! initialization step and reads its outcome.

use std::sync::Arc;

/// A named upload destination registered with the host's publishing
/// mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishingRepository {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// One build unit (root project or subproject) as seen by the plugin.
pub trait BuildUnit: Send + Sync {
    /// Host-specific path of this unit, e.g. `:core`.
    fn path(&self) -> &str;

    /// Version string of the unit (`1.0.0`, `1.1.0-SNAPSHOT`, ...).
    fn version(&self) -> String;

    /// Group identifier of the unit, e.g. `org.example`.
    fn group(&self) -> String;

    /// Ambient build property lookup.
    fn find_property(&self, key: &str) -> Option<String>;

    /// Apply another plugin to this unit by id.
    fn apply_plugin(&self, plugin_id: &str);

    fn add_publishing_repository(&self, repository: PublishingRepository);

    fn publishing_repository_url(&self, name: &str) -> Option<String>;

    /// Overwrite the URL of an existing publishing repository.
    ///
    /// Fails with `RepositoryNotFound` when no repository has this name.
    fn set_publishing_repository_url(&self, name: &str, url: &str) -> miette::Result<()>;

    /// Register a task on this unit. Re-registering a name is a no-op.
    fn register_task(&self, name: &str, description: &str);

    /// Names of the upload tasks whose target is the named repository.
    fn upload_tasks_targeting(&self, repository: &str) -> Vec<String>;

    /// Record that `task` must run after `depends_on`.
    fn add_task_dependency(&self, task: &str, depends_on: &str);

    /// Extension of a companion plugin applied to the root unit, if any.
    fn companion_extension(&self, plugin_id: &str) -> Option<Arc<dyn CompanionExtension>>;
}

/// Extension object of a separately installed staging-lifecycle plugin.
pub trait CompanionExtension: Send + Sync {
    /// The settable staging repository id, or `None` when this version of
    /// the companion does not expose it.
    fn staging_repository_id(&self) -> Option<&dyn StagingRepositoryIdProperty>;
}

pub trait StagingRepositoryIdProperty: Send + Sync {
    fn set(&self, staging_repository_id: &str) -> miette::Result<()>;
}
