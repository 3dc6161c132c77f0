//! Operation: apply the plugin to a build unit.
//!
//! Wiring happens in two phases, mirroring the host's lifecycle:
//!
//! 1. [`NexusPublishPlugin::apply`] at plugin application: applies the
//!    publishing plugin and registers the tasks. The extension can be edited
//!    afterwards.
//! 2. [`NexusPublishPlugin::after_evaluate`] once the unit's configuration is
//!    final: registers the publishing repository and makes every upload task
//!    targeting it depend on the initialization step.

use std::sync::Arc;

use nexus_stage_core::extension::NexusPublishExtension;
use nexus_stage_core::host::BuildUnit;

use crate::ops_initialize::{self, InitializeStagingRepository};
use crate::session::BuildSession;

/// Lifecycle task publishing everything to the staging service.
pub const PUBLISH_TO_NEXUS_TASK: &str = "publishToNexus";

/// Prerequisite plugin providing publications and upload tasks.
pub const MAVEN_PUBLISH_PLUGIN_ID: &str = "maven-publish";

pub struct NexusPublishPlugin {
    unit: Arc<dyn BuildUnit>,
    session: Arc<BuildSession>,
    extension: NexusPublishExtension,
}

impl NexusPublishPlugin {
    pub fn apply(unit: Arc<dyn BuildUnit>, session: Arc<BuildSession>) -> Self {
        Self::apply_with(unit, session, NexusPublishExtension::default())
    }

    /// Apply with a pre-populated extension, e.g. one read from a settings file.
    pub fn apply_with(
        unit: Arc<dyn BuildUnit>,
        session: Arc<BuildSession>,
        extension: NexusPublishExtension,
    ) -> Self {
        unit.apply_plugin(MAVEN_PUBLISH_PLUGIN_ID);
        unit.register_task(
            PUBLISH_TO_NEXUS_TASK,
            "Publishes all Maven publications produced by this project to Nexus.",
        );
        unit.register_task(
            ops_initialize::TASK_NAME,
            "Creates a Nexus staging repository and points the publishing repository at it.",
        );
        Self {
            unit,
            session,
            extension,
        }
    }

    pub fn extension(&self) -> &NexusPublishExtension {
        &self.extension
    }

    pub fn extension_mut(&mut self) -> &mut NexusPublishExtension {
        &mut self.extension
    }

    /// Finalize configuration and wire task dependencies.
    ///
    /// Returns the initialization step for the host to schedule.
    pub fn after_evaluate(self) -> miette::Result<InitializeStagingRepository> {
        let config = self.extension.resolve(self.unit.as_ref())?;
        let repository = config.publishing_repository();
        tracing::debug!(
            "Registering publishing repository '{}' at {} for '{}'",
            repository.name,
            repository.url,
            self.unit.path()
        );
        self.unit.add_publishing_repository(repository);

        for task in self.unit.upload_tasks_targeting(&config.repository_name) {
            self.unit.add_task_dependency(&task, ops_initialize::TASK_NAME);
            self.unit.add_task_dependency(PUBLISH_TO_NEXUS_TASK, &task);
        }

        Ok(InitializeStagingRepository::new(
            self.unit,
            self.session,
            config,
        ))
    }
}
