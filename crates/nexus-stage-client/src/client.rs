//! Staging REST calls against a Nexus server.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use nexus_stage_util::errors::StagingError;

use crate::auth::{self, Credentials};
use crate::envelope::{self, Envelope};

const USER_AGENT: &str = concat!("nexus-stage/", env!("CARGO_PKG_VERSION"));
const REPOSITORY_DESCRIPTION: &str = "publishing";
const DEPLOY_BY_REPOSITORY_ID_PATH: &str = "staging/deployByRepositoryId/";

/// A server-side grouping under which staging repositories are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingProfile {
    pub id: String,
    pub name: String,
}

/// A staging repository created on the server for this build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingRepositoryHandle {
    pub staging_profile_id: String,
    pub staged_repository_id: String,
    pub deployment_url: String,
}

#[derive(Debug, Serialize)]
struct Description<'a> {
    description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedStagingRepository {
    staged_repository_id: Option<String>,
}

/// Client bound to one staging server and one set of credentials.
#[derive(Debug, Clone)]
pub struct NexusClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl NexusClient {
    /// Build a client for `base_url`.
    ///
    /// `read_timeout` bounds each read from the connection, so a large but
    /// steadily arriving response is never cut off. `connect_timeout` bounds
    /// the TCP/TLS handshake.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        read_timeout: Duration,
        connect_timeout: Duration,
    ) -> miette::Result<Self> {
        let http = Client::builder()
            .read_timeout(read_timeout)
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StagingError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
            credentials,
        })
    }

    /// Base URL with a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Id of the first staging profile whose name equals `package_group`.
    pub async fn find_staging_profile_id(
        &self,
        package_group: &str,
    ) -> miette::Result<Option<String>> {
        let profiles = self.staging_profiles().await?;
        Ok(profiles
            .into_iter()
            .find(|profile| profile.name == package_group)
            .map(|profile| profile.id))
    }

    /// All staging profiles visible to the configured user.
    pub async fn staging_profiles(&self) -> miette::Result<Vec<StagingProfile>> {
        const ACTION: &str = "load staging profiles";
        let url = format!("{}staging/profiles", self.base_url);
        tracing::debug!("Loading staging profiles from {url}");
        let request = self.http.get(&url).header(ACCEPT, "application/json");
        let response = auth::apply_auth(request, &self.credentials)
            .send()
            .await
            .map_err(|e| transport_failure(ACTION, &url, e))?;
        decode(ACTION, response).await
    }

    /// Start a new staging repository under `staging_profile_id`.
    pub async fn create_staging_repository(
        &self,
        staging_profile_id: &str,
    ) -> miette::Result<StagingRepositoryHandle> {
        const ACTION: &str = "create staging repository";
        let url = format!(
            "{}staging/profiles/{staging_profile_id}/start",
            self.base_url
        );
        tracing::debug!("Starting staging repository at {url}");
        let body = Envelope::new(Description {
            description: REPOSITORY_DESCRIPTION,
        });
        let request = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&body);
        let response = auth::apply_auth(request, &self.credentials)
            .send()
            .await
            .map_err(|e| transport_failure(ACTION, &url, e))?;

        let created: CreatedStagingRepository = decode(ACTION, response).await?;
        let staged_repository_id =
            created
                .staged_repository_id
                .ok_or_else(|| StagingError::InvalidResponse {
                    message: format!("No stagedRepositoryId in response from {url}"),
                })?;

        Ok(StagingRepositoryHandle {
            staging_profile_id: staging_profile_id.to_string(),
            deployment_url: self.deployment_url(&staged_repository_id),
            staged_repository_id,
        })
    }

    /// Upload endpoint of a staged repository.
    ///
    /// `https://host/service/local/` + `orgexample-42` becomes
    /// `https://host/service/local/staging/deployByRepositoryId/orgexample-42`.
    pub fn deployment_url(&self, staged_repository_id: &str) -> String {
        format!(
            "{}{DEPLOY_BY_REPOSITORY_ID_PATH}{staged_repository_id}",
            self.base_url
        )
    }
}

pub(crate) fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn transport_failure(action: &str, url: &str, e: reqwest::Error) -> StagingError {
    StagingError::Network {
        message: format!("Failed to {action} ({url}): {e}"),
    }
}

async fn decode<T: DeserializeOwned>(action: &str, response: Response) -> miette::Result<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(|e| StagingError::Network {
        message: format!("Failed to read response body while trying to {action}: {e}"),
    })?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body).trim().to_string();
        return Err(StagingError::Request {
            action: action.to_string(),
            status: status.as_u16(),
            body: (!text.is_empty()).then_some(text),
        }
        .into());
    }

    let payload = envelope::unwrap_json(&body).map_err(|e| StagingError::InvalidResponse {
        message: format!("Failed to decode response while trying to {action}: {e}"),
    })?;
    Ok(payload)
}
