use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all staging operations.
#[derive(Debug, Error, Diagnostic)]
pub enum StagingError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid publishing configuration (bad URL, malformed settings table).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check the nexus-publishing settings of this build unit"))]
    Config { message: String },

    /// No staging profile on the server matches the package group.
    #[error("Failed to find staging profile for package group: {package_group}")]
    #[diagnostic(help(
        "Set `staging-profile-id` explicitly, or make `package-group` match a staging profile name on the server"
    ))]
    ProfileNotFound { package_group: String },

    /// The HTTP call itself failed (connect, timeout, I/O).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The server answered with a non-2xx status.
    #[error(
        "Failed to {action}, server responded with status code {status}{}",
        format_body(.body)
    )]
    Request {
        action: String,
        status: u16,
        body: Option<String>,
    },

    /// The server answered 2xx but the body was missing or malformed.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// The build unit has no publishing repository with this name.
    #[error("Publishing repository '{name}' not found")]
    RepositoryNotFound { name: String },
}

fn format_body(body: &Option<String>) -> String {
    match body {
        Some(text) if !text.is_empty() => format!(", body: {text}"),
        _ => String::new(),
    }
}
