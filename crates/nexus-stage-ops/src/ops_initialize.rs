//! Operation: open (or reuse) a staging repository and point the publishing
//! repository at it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nexus_stage_client::auth::Credentials;
use nexus_stage_client::{NexusClient, StagingRepositoryHandle};
use nexus_stage_core::config::ServerConfig;
use nexus_stage_core::host::BuildUnit;
use nexus_stage_util::errors::StagingError;

use crate::session::BuildSession;

/// Task name registered on every build unit.
pub const TASK_NAME: &str = "initializeNexusStagingRepository";

/// Plugin id of the companion staging-lifecycle plugin.
pub const COMPANION_PLUGIN_ID: &str = "io.codearte.nexus-staging";

/// Result of running the initialization step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Staging is off for this unit; nothing was done.
    Skipped,
    /// The publishing repository now points at `deployment_url`.
    Executed { deployment_url: String },
}

/// The initialization step of one publish target.
pub struct InitializeStagingRepository {
    unit: Arc<dyn BuildUnit>,
    session: Arc<BuildSession>,
    config: ServerConfig,
}

impl InitializeStagingRepository {
    pub fn new(unit: Arc<dyn BuildUnit>, session: Arc<BuildSession>, config: ServerConfig) -> Self {
        Self {
            unit,
            session,
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Whether the host should run this step at all.
    pub fn should_run(&self) -> bool {
        self.config.use_staging
    }

    /// Run the step. Skipped when staging is off.
    pub async fn execute(&self) -> miette::Result<TaskOutcome> {
        if !self.should_run() {
            tracing::info!(
                "Skipping {TASK_NAME} for '{}': staging is disabled",
                self.unit.path()
            );
            return Ok(TaskOutcome::Skipped);
        }

        let created = AtomicBool::new(false);
        let handle = self
            .session
            .get_or_create(&self.config.server_url, || async {
                let result = self.create_staging_repository().await;
                created.store(result.is_ok(), Ordering::Release);
                result
            })
            .await?;

        // Only the step that created the repository hands it to the companion.
        // A failure here fails the step but keeps the cached repository.
        if created.load(Ordering::Acquire) {
            self.publish_to_companion(&handle)?;
        }

        tracing::info!(
            "Updating URL of publishing repository '{}' to '{}'",
            self.config.repository_name,
            handle.deployment_url
        );
        self.unit
            .set_publishing_repository_url(&self.config.repository_name, &handle.deployment_url)?;

        Ok(TaskOutcome::Executed {
            deployment_url: handle.deployment_url,
        })
    }

    async fn create_staging_repository(&self) -> miette::Result<StagingRepositoryHandle> {
        let client = NexusClient::new(
            &self.config.server_url,
            Credentials::new(self.config.username.clone(), self.config.password.clone()),
            self.config.client_timeout,
            self.config.connect_timeout,
        )?;
        let staging_profile_id = determine_staging_profile_id(&client, &self.config).await?;

        tracing::info!("Creating staging repository for stagingProfileId '{staging_profile_id}'");
        client.create_staging_repository(&staging_profile_id).await
    }

    /// Hand the new repository id to the companion plugin, if installed.
    fn publish_to_companion(&self, handle: &StagingRepositoryHandle) -> miette::Result<()> {
        let Some(extension) = self.unit.companion_extension(COMPANION_PLUGIN_ID) else {
            return Ok(());
        };
        match extension.staging_repository_id() {
            Some(property) => property.set(&handle.staged_repository_id),
            None => {
                tracing::warn!(
                    "For increased publishing reliability please update the {COMPANION_PLUGIN_ID} plugin to at least version 0.20.0.\n\
                     If your version is at least 0.20.0, try to update this plugin to its latest version.\n\
                     If this also does not make this warning go away, please report an issue."
                );
                tracing::debug!("stagingRepositoryId property not found on the {COMPANION_PLUGIN_ID} extension");
                Ok(())
            }
        }
    }
}

/// Use the configured staging profile id, or look one up by package group.
pub async fn determine_staging_profile_id(
    client: &NexusClient,
    config: &ServerConfig,
) -> miette::Result<String> {
    if let Some(id) = &config.staging_profile_id {
        return Ok(id.clone());
    }
    tracing::debug!(
        "No stagingProfileId set, querying for packageGroup '{}'",
        config.package_group
    );
    let id = client
        .find_staging_profile_id(&config.package_group)
        .await?
        .ok_or_else(|| StagingError::ProfileNotFound {
            package_group: config.package_group.clone(),
        })?;
    Ok(id)
}
