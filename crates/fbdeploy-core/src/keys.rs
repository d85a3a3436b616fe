//! # Storage Key Layout
//!
//! Every key the deploy hooks touch is derived here, so that listing,
//! correlation, and activation agree on one layout:
//!
//! ```text
//! [<pathPrefix>/]<archivePrefix><revision>.zip     archive
//! [<pathPrefix>/]<manifestKey>                     pointer manifest
//! [<pathPrefix>/]<archiveName>                     uploaded archive
//! ```
//!
//! Parsing an archive key is the exact inverse of building one: a key is a
//! build archive iff it starts with the listing prefix and ends with `.zip`.
//! Whatever sits in between is the revision, even when it is empty.

use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// Manifest object name used when none is configured.
pub const DEFAULT_MANIFEST_KEY: &str = "fastboot-deploy-info.json";

/// Suffix shared by all build archives.
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Revision identifier embedded in an archive key, commonly a VCS short hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    /// Validate and wrap a revision identifier.
    ///
    /// Rejects empty or whitespace-only identifiers.
    pub fn new(revision: impl Into<String>) -> Result<Self, DeployError> {
        let revision = revision.into();
        if revision.trim().is_empty() {
            return Err(DeployError::InvalidRevision(revision));
        }
        Ok(Self(revision))
    }

    /// Wrap a revision captured from a stored archive key, as-is.
    pub(crate) fn from_archive_key(revision: &str) -> Self {
        Self(revision.to_string())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved key layout for one bucket namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    path_prefix: Option<String>,
    archive_prefix: String,
    manifest_key: String,
}

impl KeyLayout {
    /// Build a layout. An empty `path_prefix` means "bucket root"; trailing
    /// slashes on it are dropped so keys never contain `//`.
    pub fn new(
        archive_prefix: impl Into<String>,
        manifest_key: impl Into<String>,
        path_prefix: Option<&str>,
    ) -> Self {
        let path_prefix = path_prefix
            .map(|p| p.trim_end_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self {
            path_prefix,
            archive_prefix: archive_prefix.into(),
            manifest_key: manifest_key.into(),
        }
    }

    /// Configured path prefix, without the trailing delimiter.
    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    /// Configured archive prefix, without any path prefix.
    pub fn archive_prefix(&self) -> &str {
        &self.archive_prefix
    }

    fn prefixed(&self, key: &str) -> String {
        match &self.path_prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }

    /// Prefix passed to the object listing: `[<pathPrefix>/]<archivePrefix>`.
    pub fn listing_prefix(&self) -> String {
        self.prefixed(&self.archive_prefix)
    }

    /// Full key of a revision's archive.
    pub fn archive_key(&self, revision: &RevisionId) -> String {
        self.prefixed(&format!(
            "{}{}{ARCHIVE_SUFFIX}",
            self.archive_prefix,
            revision.as_str()
        ))
    }

    /// Full key of the pointer manifest.
    pub fn manifest_key(&self) -> String {
        self.prefixed(&self.manifest_key)
    }

    /// Full key an uploaded archive named `archive_name` is stored under.
    pub fn upload_key(&self, archive_name: &str) -> String {
        self.prefixed(archive_name)
    }

    /// Extract the revision from a full archive key.
    ///
    /// Returns `None` for anything that is not a build archive under this
    /// layout; callers treat that as "skip", never as a failure.
    pub fn parse_archive_key(&self, key: &str) -> Option<RevisionId> {
        let prefix = self.listing_prefix();
        let revision = key.strip_prefix(&prefix)?.strip_suffix(ARCHIVE_SUFFIX)?;
        Some(RevisionId::from_archive_key(revision))
    }
}
