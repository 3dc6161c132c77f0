#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nexus_stage_core::host::{
    BuildUnit, CompanionExtension, PublishingRepository, StagingRepositoryIdProperty,
};
use nexus_stage_util::errors::StagingError;
use tiny_http::{Header, Response, Server, StatusCode};

// ---------------------------------------------------------------------------
// In-memory build unit
// ---------------------------------------------------------------------------

pub struct FakeUnit {
    path: String,
    version: String,
    group: String,
    properties: BTreeMap<String, String>,
    upload_tasks: Vec<(String, String)>,
    companion: Option<Arc<dyn CompanionExtension>>,
    pub plugins: Mutex<Vec<String>>,
    pub repositories: Mutex<BTreeMap<String, PublishingRepository>>,
    pub tasks: Mutex<BTreeMap<String, String>>,
    pub dependencies: Mutex<Vec<(String, String)>>,
}

impl FakeUnit {
    pub fn new(path: &str, version: &str) -> Self {
        Self {
            path: path.to_string(),
            version: version.to_string(),
            group: "org.example".to_string(),
            properties: BTreeMap::new(),
            upload_tasks: vec![(
                "publishMavenJavaPublicationToNexusRepository".to_string(),
                "nexus".to_string(),
            )],
            companion: None,
            plugins: Mutex::new(Vec::new()),
            repositories: Mutex::new(BTreeMap::new()),
            tasks: Mutex::new(BTreeMap::new()),
            dependencies: Mutex::new(Vec::new()),
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_upload_task(mut self, task: &str, repository: &str) -> Self {
        self.upload_tasks
            .push((task.to_string(), repository.to_string()));
        self
    }

    pub fn with_companion(mut self, companion: Arc<dyn CompanionExtension>) -> Self {
        self.companion = Some(companion);
        self
    }

    pub fn repository_url(&self, name: &str) -> Option<String> {
        self.publishing_repository_url(name)
    }

    pub fn depends_on(&self, task: &str, dependency: &str) -> bool {
        self.dependencies
            .lock()
            .unwrap()
            .iter()
            .any(|(t, d)| t == task && d == dependency)
    }
}

impl BuildUnit for FakeUnit {
    fn path(&self) -> &str {
        &self.path
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn group(&self) -> String {
        self.group.clone()
    }

    fn find_property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn apply_plugin(&self, plugin_id: &str) {
        self.plugins.lock().unwrap().push(plugin_id.to_string());
    }

    fn add_publishing_repository(&self, repository: PublishingRepository) {
        self.repositories
            .lock()
            .unwrap()
            .insert(repository.name.clone(), repository);
    }

    fn publishing_repository_url(&self, name: &str) -> Option<String> {
        self.repositories
            .lock()
            .unwrap()
            .get(name)
            .map(|r| r.url.clone())
    }

    fn set_publishing_repository_url(&self, name: &str, url: &str) -> miette::Result<()> {
        let mut repositories = self.repositories.lock().unwrap();
        let repository = repositories
            .get_mut(name)
            .ok_or_else(|| StagingError::RepositoryNotFound {
                name: name.to_string(),
            })?;
        repository.url = url.to_string();
        Ok(())
    }

    fn register_task(&self, name: &str, description: &str) {
        self.tasks
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert_with(|| description.to_string());
    }

    fn upload_tasks_targeting(&self, repository: &str) -> Vec<String> {
        self.upload_tasks
            .iter()
            .filter(|(_, repo)| repo == repository)
            .map(|(task, _)| task.clone())
            .collect()
    }

    fn add_task_dependency(&self, task: &str, depends_on: &str) {
        self.dependencies
            .lock()
            .unwrap()
            .push((task.to_string(), depends_on.to_string()));
    }

    fn companion_extension(&self, _plugin_id: &str) -> Option<Arc<dyn CompanionExtension>> {
        self.companion.clone()
    }
}

// ---------------------------------------------------------------------------
// Companion extensions
// ---------------------------------------------------------------------------

/// A companion exposing the staging repository id property.
#[derive(Default)]
pub struct RecordingCompanion {
    pub staging_repository_id: Mutex<Option<String>>,
}

impl CompanionExtension for RecordingCompanion {
    fn staging_repository_id(&self) -> Option<&dyn StagingRepositoryIdProperty> {
        Some(self)
    }
}

impl StagingRepositoryIdProperty for RecordingCompanion {
    fn set(&self, staging_repository_id: &str) -> miette::Result<()> {
        *self.staging_repository_id.lock().unwrap() = Some(staging_repository_id.to_string());
        Ok(())
    }
}

/// A companion whose property rejects every value.
#[derive(Default)]
pub struct FailingCompanion {
    pub set_calls: AtomicUsize,
}

impl CompanionExtension for FailingCompanion {
    fn staging_repository_id(&self) -> Option<&dyn StagingRepositoryIdProperty> {
        Some(self)
    }
}

impl StagingRepositoryIdProperty for FailingCompanion {
    fn set(&self, _staging_repository_id: &str) -> miette::Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        Err(miette::miette!("property is read-only"))
    }
}

/// An old companion version without the property.
pub struct LegacyCompanion;

impl CompanionExtension for LegacyCompanion {
    fn staging_repository_id(&self) -> Option<&dyn StagingRepositoryIdProperty> {
        None
    }
}

// ---------------------------------------------------------------------------
// Mock staging server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
}

pub struct MockNexusConfig {
    pub profiles_body: String,
    /// Number of create calls answered with HTTP 500 before succeeding.
    pub failing_creates: usize,
    /// Delay before answering a create call.
    pub create_delay: Duration,
    /// Created ids are `orgexample-<first_id>`, `orgexample-<first_id + 1>`, ...
    pub first_id: usize,
}

impl Default for MockNexusConfig {
    fn default() -> Self {
        Self {
            profiles_body: r#"{"data":[{"id":"p1","name":"org.example"}]}"#.to_string(),
            failing_creates: 0,
            create_delay: Duration::ZERO,
            first_id: 42,
        }
    }
}

pub struct MockNexus {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    server: Arc<Server>,
}

impl MockNexus {
    pub fn start() -> Self {
        Self::start_with(MockNexusConfig::default())
    }

    pub fn start_with(config: MockNexusConfig) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("server"));
        let base_url = format!("http://{}/", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));

        {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            let creates = AtomicUsize::new(0);
            std::thread::spawn(move || {
                for req in server.incoming_requests() {
                    let method = req.method().to_string();
                    let url = req.url().to_string();
                    let authorization = req
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string());
                    requests.lock().unwrap().push(Recorded {
                        method: method.clone(),
                        url: url.clone(),
                        authorization,
                    });

                    let (status, body) = if method == "GET" && url == "/staging/profiles" {
                        (200, config.profiles_body.clone())
                    } else if method == "POST"
                        && url.starts_with("/staging/profiles/")
                        && url.ends_with("/start")
                    {
                        std::thread::sleep(config.create_delay);
                        let n = creates.fetch_add(1, Ordering::SeqCst);
                        if n < config.failing_creates {
                            (500, "staging is temporarily unavailable".to_string())
                        } else {
                            let id = config.first_id + n - config.failing_creates;
                            (
                                201,
                                format!(r#"{{"data":{{"stagedRepositoryId":"orgexample-{id}"}}}}"#),
                            )
                        }
                    } else {
                        (404, "{}".to_string())
                    };

                    let resp = Response::from_string(body)
                        .with_status_code(StatusCode(status))
                        .with_header(
                            Header::from_bytes("Content-Type", "application/json")
                                .expect("header"),
                        );
                    let _ = req.respond(resp);
                }
            });
        }

        Self {
            base_url,
            requests,
            server,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn profile_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == "GET" && r.url == "/staging/profiles")
            .count()
    }

    pub fn create_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == "POST" && r.url.ends_with("/start"))
            .count()
    }

    pub fn deployment_url(&self, staged_repository_id: &str) -> String {
        format!(
            "{}staging/deployByRepositoryId/{staged_repository_id}",
            self.base_url
        )
    }
}

impl Drop for MockNexus {
    fn drop(&mut self) {
        self.server.unblock();
    }
}
