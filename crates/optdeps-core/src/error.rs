use std::path::PathBuf;

/// Errors that can occur while selecting and installing optional packages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A declaration failed validation.
    ///
    /// The engine recovers from this by excluding the declaration.
    #[error("invalid optional package declaration '{name}': {reason}")]
    InvalidSpec { name: String, reason: String },

    /// A version constraint could not be parsed.
    #[error("invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    /// A scripted prompt source ran out of answers.
    #[error("no more answers available for prompt: {prompt}")]
    ExhaustedInput { prompt: String },

    /// The interactive front-end failed to read an answer.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// The installer returned a non-zero status.
    #[error("installation of {} failed with status {status}; the manifest was not modified", packages.join(", "))]
    Install { status: i32, packages: Vec<String> },

    /// The installer exited successfully but left selected packages missing.
    #[error("installer finished but {} not found under {}; the manifest was not modified", packages.join(", "), vendor_dir.display())]
    InstallIncomplete {
        packages: Vec<String>,
        vendor_dir: PathBuf,
    },

    /// The installer command could not be started.
    #[error("failed to run installer command '{command}': {source}")]
    InstallerSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest file not found at the expected path.
    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Failed to parse or render manifest JSON.
    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// The manifest parsed but does not have the expected structure.
    #[error("unexpected manifest structure: {reason}")]
    ManifestShape { reason: String },

    /// Failed to parse the settings file.
    #[error("failed to parse settings: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_spec(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
