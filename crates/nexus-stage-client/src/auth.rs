//! HTTP Basic authentication for staging requests.

use reqwest::RequestBuilder;

/// Username/password pair for the staging server. Either half may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

// Keep passwords out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Apply Basic auth to a request. A missing half is sent as an empty string.
///
/// With no credentials at all the request goes out without an
/// `Authorization` header rather than with empty Basic credentials.
pub fn apply_auth(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    if credentials.is_empty() {
        return request;
    }
    request.basic_auth(
        credentials.username.as_deref().unwrap_or(""),
        Some(credentials.password.as_deref().unwrap_or("")),
    )
}
