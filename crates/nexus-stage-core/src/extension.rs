//! User-facing publishing settings for one build unit.
//!
//! Settings can be assigned programmatically or read from a TOML table:
//!
//! ```toml
//! [nexus-publishing]
//! server-url = "https://s01.oss.sonatype.org/service/local/"
//! username = "${env:OSSRH_USERNAME}"
//! password = "${env:OSSRH_PASSWORD}"
//! staging-profile-id = "12ab34cd"
//! client-timeout = 300
//! ```
//!
//! Every field is optional. [`NexusPublishExtension::resolve`] fills the gaps
//! with defaults computed from the build unit.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use nexus_stage_util::errors::StagingError;

use crate::config::{self, ServerConfig};
use crate::host::BuildUnit;
use crate::properties::BuildProperties;

/// Name under which the extension is registered and read from TOML.
pub const EXTENSION_NAME: &str = "nexus-publishing";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NexusPublishExtension {
    #[serde(default)]
    pub use_staging: Option<bool>,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub snapshot_repository_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub repository_name: Option<String>,
    #[serde(default)]
    pub package_group: Option<String>,
    #[serde(default)]
    pub staging_profile_id: Option<String>,
    /// Per-read timeout in seconds.
    #[serde(default)]
    pub client_timeout: Option<u64>,
    /// Connect timeout in seconds.
    #[serde(default)]
    pub connect_timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default, rename = "nexus-publishing")]
    nexus_publishing: NexusPublishExtension,
}

impl NexusPublishExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `[nexus-publishing]` table of a TOML document, expanding
    /// `${env:VAR}` references in string values.
    ///
    /// A document without the table yields an empty extension.
    pub fn from_toml_str(content: &str, properties: &BuildProperties) -> miette::Result<Self> {
        let file: SettingsFile = toml::from_str(content).map_err(|e| StagingError::Config {
            message: format!("Failed to parse [{EXTENSION_NAME}] settings: {e}"),
        })?;
        Ok(file.nexus_publishing.interpolated(properties))
    }

    fn interpolated(self, properties: &BuildProperties) -> Self {
        let expand = |value: Option<String>| value.map(|v| properties.interpolate(&v));
        Self {
            server_url: expand(self.server_url),
            snapshot_repository_url: expand(self.snapshot_repository_url),
            username: expand(self.username),
            password: expand(self.password),
            repository_name: expand(self.repository_name),
            package_group: expand(self.package_group),
            staging_profile_id: expand(self.staging_profile_id),
            ..self
        }
    }

    /// Compute the effective configuration for `unit`.
    pub fn resolve(&self, unit: &dyn BuildUnit) -> miette::Result<ServerConfig> {
        let use_staging = self
            .use_staging
            .unwrap_or_else(|| !unit.version().ends_with(config::SNAPSHOT_SUFFIX));
        let server_url = validate_url(
            "server-url",
            self.server_url.as_deref().unwrap_or(config::DEFAULT_SERVER_URL),
        )?;
        let snapshot_repository_url = validate_url(
            "snapshot-repository-url",
            self.snapshot_repository_url
                .as_deref()
                .unwrap_or(config::DEFAULT_SNAPSHOT_REPOSITORY_URL),
        )?;
        if !use_staging {
            tracing::debug!(
                "Staging disabled for '{}' (version {}), publishing to {snapshot_repository_url}",
                unit.path(),
                unit.version()
            );
        }

        Ok(ServerConfig {
            use_staging,
            server_url,
            snapshot_repository_url,
            username: self
                .username
                .clone()
                .or_else(|| unit.find_property(config::USERNAME_PROPERTY)),
            password: self
                .password
                .clone()
                .or_else(|| unit.find_property(config::PASSWORD_PROPERTY)),
            repository_name: self
                .repository_name
                .clone()
                .unwrap_or_else(|| config::DEFAULT_REPOSITORY_NAME.to_string()),
            package_group: self.package_group.clone().unwrap_or_else(|| unit.group()),
            staging_profile_id: self.staging_profile_id.clone(),
            client_timeout: self
                .client_timeout
                .map(Duration::from_secs)
                .unwrap_or(config::DEFAULT_CLIENT_TIMEOUT),
            connect_timeout: self
                .connect_timeout
                .map(Duration::from_secs)
                .unwrap_or(config::DEFAULT_CONNECT_TIMEOUT),
        })
    }
}

fn validate_url(key: &str, value: &str) -> miette::Result<String> {
    match reqwest::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(value.to_string()),
        Ok(url) => Err(StagingError::Config {
            message: format!("{key} must be an http(s) URL, got scheme '{}'", url.scheme()),
        }
        .into()),
        Err(e) => Err(StagingError::Config {
            message: format!("{key} '{value}' is not a valid URL: {e}"),
        }
        .into()),
    }
}
