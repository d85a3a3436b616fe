//! # Error Types
//!
//! All library errors derive `thiserror`. The taxonomy follows the deploy
//! pipeline's failure policy:
//!
//! - Object-store failures carry the key (or prefix) being touched.
//! - A manifest that exists but does not parse is fatal and reported
//!   separately from store failures, since it needs an operator to fix it.
//! - A manifest that does not exist is never an error; see
//!   [`ManifestState::Absent`](crate::manifest::ManifestState::Absent).

use thiserror::Error;

/// Failure reported by an [`ObjectStore`](crate::store::ObjectStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound {
        /// Bucket that was queried.
        bucket: String,
        /// Key that was requested.
        key: String,
    },

    /// Listing objects under a prefix failed.
    #[error("failed to list {bucket}/{prefix}*: {message}")]
    List {
        bucket: String,
        prefix: String,
        message: String,
    },

    /// Reading an object failed for a reason other than absence.
    #[error("failed to read {bucket}/{key}: {message}")]
    Get {
        bucket: String,
        key: String,
        message: String,
    },

    /// Writing an object failed.
    #[error("failed to write {bucket}/{key}: {message}")]
    Put {
        bucket: String,
        key: String,
        message: String,
    },

    /// The store client could not be constructed.
    #[error("object store client error: {0}")]
    Client(String),
}

impl StoreError {
    /// Whether this error means the object simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Configuration loading or validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration field is missing or empty.
    #[error("missing required config: {0}")]
    MissingField(&'static str),

    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The config file could not be parsed.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Top-level error for deploy hooks.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Object-store operation failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration is incomplete or unreadable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The manifest object exists but is not a valid manifest document.
    #[error("malformed manifest at {key}: {source}")]
    MalformedManifest {
        key: String,
        source: serde_json::Error,
    },

    /// The manifest formatter could not produce a body.
    #[error("manifest formatting failed: {0}")]
    ManifestFormat(String),

    /// Activation was requested without any revision to activate.
    #[error("no revision to activate: pass a revision or record one in the deploy context")]
    MissingRevision,

    /// Neither the config nor the deploy context names an archive prefix.
    #[error("no archive prefix configured")]
    MissingArchivePrefix,

    /// Upload was requested without an archive in the deploy context.
    #[error("no archive to upload: {0}")]
    MissingArchive(&'static str),

    /// A revision identifier failed validation.
    #[error("invalid revision {0:?}")]
    InvalidRevision(String),

    /// Local filesystem failure (reading the archive).
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Convenience alias for deploy results.
pub type Result<T, E = DeployError> = std::result::Result<T, E>;
