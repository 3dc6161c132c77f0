use std::time::Duration;

use crate::host::PublishingRepository;

/// Release staging endpoint of the public Sonatype OSSRH service.
pub const DEFAULT_SERVER_URL: &str = "https://oss.sonatype.org/service/local/";

/// Snapshot repository of the public Sonatype OSSRH service.
pub const DEFAULT_SNAPSHOT_REPOSITORY_URL: &str =
    "https://oss.sonatype.org/content/repositories/snapshots/";

/// Name of the publishing repository registered by the plugin.
pub const DEFAULT_REPOSITORY_NAME: &str = "nexus";

/// Build properties consulted for default credentials.
pub const USERNAME_PROPERTY: &str = "nexusUsername";
pub const PASSWORD_PROPERTY: &str = "nexusPassword";

/// Versions ending with this marker publish to the snapshot repository.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Effective settings of one publish target, with every default applied.
///
/// Produced by [`crate::extension::NexusPublishExtension::resolve`] and not
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub use_staging: bool,
    pub server_url: String,
    pub snapshot_repository_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub repository_name: String,
    pub package_group: String,
    pub staging_profile_id: Option<String>,
    pub client_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ServerConfig {
    /// The URL the publishing repository points at before initialization:
    /// the staging server when staging is on, the snapshot repository otherwise.
    pub fn initial_repository_url(&self) -> &str {
        if self.use_staging {
            &self.server_url
        } else {
            &self.snapshot_repository_url
        }
    }

    /// Publishing repository entry to register with the host.
    pub fn publishing_repository(&self) -> PublishingRepository {
        PublishingRepository {
            name: self.repository_name.clone(),
            url: self.initial_repository_url().to_string(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
