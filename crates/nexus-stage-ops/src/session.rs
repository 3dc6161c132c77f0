//! Build-session cache of staging repositories, keyed by server URL.
//!
//! One [`BuildSession`] is shared by every initialization step of a build.
//! The first step to ask for a server URL creates the staging repository;
//! concurrent steps for the same URL wait for that creation and reuse its
//! result. A failed creation is not remembered, so a later step retries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

use nexus_stage_client::StagingRepositoryHandle;

type Slot = Arc<OnceCell<StagingRepositoryHandle>>;

#[derive(Debug, Default)]
pub struct BuildSession {
    repositories: Mutex<HashMap<String, Slot>>,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the staging repository for `server_url`, running `create` if
    /// none exists yet in this build.
    ///
    /// At most one `create` runs per key at a time; callers arriving while it
    /// is in flight wait for it. If it fails the slot stays empty.
    pub async fn get_or_create<F, Fut>(
        &self,
        server_url: &str,
        create: F,
    ) -> miette::Result<StagingRepositoryHandle>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = miette::Result<StagingRepositoryHandle>>,
    {
        let key = cache_key(server_url);
        let slot = self.lock().entry(key.clone()).or_default().clone();
        if let Some(handle) = slot.get() {
            tracing::debug!(
                "Reusing staging repository {} for {key}",
                handle.staged_repository_id
            );
            return Ok(handle.clone());
        }
        slot.get_or_try_init(create).await.cloned()
    }

    /// Already-created staging repository for `server_url`, if any.
    pub fn get(&self, server_url: &str) -> Option<StagingRepositoryHandle> {
        self.lock()
            .get(&cache_key(server_url))
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of server URLs with a created staging repository.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every staging repository; the next build starts fresh.
    pub fn build_finished(&self) {
        let mut repositories = self.lock();
        tracing::debug!(
            "Build finished, dropping {} cached staging repositories",
            repositories.len()
        );
        repositories.clear();
    }

    /// Begin a build. The returned guard clears the session when dropped, so
    /// both successful and failed builds leave it empty.
    pub fn start_build(self: &Arc<Self>) -> BuildGuard {
        BuildGuard {
            session: Arc::clone(self),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scope of one build invocation; see [`BuildSession::start_build`].
#[must_use = "the session is cleared as soon as the guard is dropped"]
pub struct BuildGuard {
    session: Arc<BuildSession>,
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        self.session.build_finished();
    }
}

/// `http://host` and `http://host/` name the same server.
fn cache_key(server_url: &str) -> String {
    if server_url.ends_with('/') {
        server_url.to_string()
    } else {
        format!("{server_url}/")
    }
}
