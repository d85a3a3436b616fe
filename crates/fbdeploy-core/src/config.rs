//! # Deploy Configuration
//!
//! Loaded from a YAML file with camelCase keys, then overlaid with
//! environment variables and finally with command-line flags:
//!
//! ```yaml
//! bucket: my-deploys
//! region: eu-west-1
//! archivePrefix: dist-
//! manifestKey: fastboot-deploy-info.json
//! pathPrefix: blog
//! ```
//!
//! `bucket` and `region` are required. Credentials are optional; without
//! them the S3 client falls back to the default AWS provider chain.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::keys::DEFAULT_MANIFEST_KEY;

/// Settings for one deploy target.
///
/// Custom `Debug` implementation redacts the secret access key.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    /// Prefix distinguishing build archives from other bucket contents.
    /// Falls back to the archive prefix recorded in the deploy context.
    #[serde(default)]
    pub archive_prefix: Option<String>,
    #[serde(default = "default_manifest_key")]
    pub manifest_key: String,
    /// Namespace for archive and manifest keys.
    #[serde(default, alias = "awsPrefix")]
    pub path_prefix: Option<String>,
    /// Revision to activate, overriding anything in the deploy context.
    #[serde(default)]
    pub revision_key: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Named profile from the shared AWS config files.
    #[serde(default)]
    pub profile: Option<String>,
    /// Custom S3-compatible endpoint (MinIO, LocalStack).
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_manifest_key() -> String {
    DEFAULT_MANIFEST_KEY.to_string()
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: String::new(),
            archive_prefix: None,
            manifest_key: default_manifest_key(),
            path_prefix: None,
            revision_key: None,
            access_key_id: None,
            secret_access_key: None,
            profile: None,
            endpoint: None,
        }
    }
}

impl std::fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("archive_prefix", &self.archive_prefix)
            .field("manifest_key", &self.manifest_key)
            .field("path_prefix", &self.path_prefix)
            .field("revision_key", &self.revision_key)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("profile", &self.profile)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl DeployConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Load a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml_str(&yaml, &display)
    }

    /// Overlay values from the process environment.
    ///
    /// Variables:
    /// - `FBDEPLOY_BUCKET`, `FBDEPLOY_REGION` (falls back to `AWS_REGION`)
    /// - `FBDEPLOY_ARCHIVE_PREFIX`, `FBDEPLOY_MANIFEST_KEY`, `FBDEPLOY_PATH_PREFIX`
    /// - `FBDEPLOY_ENDPOINT`
    /// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_PROFILE`
    pub fn apply_env(&mut self) {
        self.apply_env_from(|var| std::env::var(var).ok());
    }

    /// Overlay values from an arbitrary variable lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

        if let Some(v) = get("FBDEPLOY_BUCKET") {
            self.bucket = v;
        }
        if let Some(v) = get("FBDEPLOY_REGION") {
            self.region = v;
        } else if self.region.is_empty() {
            if let Some(v) = get("AWS_REGION") {
                self.region = v;
            }
        }
        if let Some(v) = get("FBDEPLOY_ARCHIVE_PREFIX") {
            self.archive_prefix = Some(v);
        }
        if let Some(v) = get("FBDEPLOY_MANIFEST_KEY") {
            self.manifest_key = v;
        }
        if let Some(v) = get("FBDEPLOY_PATH_PREFIX") {
            self.path_prefix = Some(v);
        }
        if let Some(v) = get("FBDEPLOY_ENDPOINT") {
            self.endpoint = Some(v);
        }
        if let Some(v) = get("AWS_ACCESS_KEY_ID") {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = get("AWS_SECRET_ACCESS_KEY") {
            self.secret_access_key.get_or_insert(v);
        }
        if let Some(v) = get("AWS_PROFILE") {
            self.profile.get_or_insert(v);
        }
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::MissingField("bucket"));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::MissingField("region"));
        }
        if self.manifest_key.trim().is_empty() {
            return Err(ConfigError::MissingField("manifestKey"));
        }
        Ok(())
    }
}
