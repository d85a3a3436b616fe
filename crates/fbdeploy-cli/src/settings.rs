//! # Global Settings
//!
//! Flags shared by every subcommand, and their merge into a
//! [`DeployConfig`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use fbdeploy_core::{DeployConfig, DeployContext};

use crate::{DEFAULT_ARCHIVE_PREFIX, DEFAULT_CONFIG_FILE};

/// Deploy target overrides accepted by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Path to a YAML config file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bucket holding archives and the manifest.
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// Bucket region.
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Prefix of build archive keys (default: `dist-`).
    #[arg(long, global = true)]
    pub archive_prefix: Option<String>,

    /// Namespace for archive and manifest keys.
    #[arg(long, global = true)]
    pub path_prefix: Option<String>,

    /// Manifest object name.
    #[arg(long, global = true)]
    pub manifest_key: Option<String>,

    /// Custom S3-compatible endpoint.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Named AWS profile.
    #[arg(long, global = true)]
    pub profile: Option<String>,
}

impl TargetArgs {
    /// Resolve the effective config: file, then environment, then flags.
    pub fn load_config(&self, cwd: &Path) -> Result<DeployConfig> {
        let mut cfg = self.load_file(cwd)?;
        cfg.apply_env();
        self.apply_flags(&mut cfg);
        cfg.validate().context("incomplete deploy configuration")?;
        tracing::debug!(?cfg, "resolved deploy configuration");
        Ok(cfg)
    }

    fn load_file(&self, cwd: &Path) -> Result<DeployConfig> {
        if let Some(path) = &self.config {
            return DeployConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()));
        }
        let implicit = cwd.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            tracing::debug!(path = %implicit.display(), "using config from working directory");
            return DeployConfig::from_file(&implicit)
                .with_context(|| format!("failed to load config {}", implicit.display()));
        }
        Ok(DeployConfig::default())
    }

    /// Apply command-line overrides on top of `cfg`.
    pub fn apply_flags(&self, cfg: &mut DeployConfig) {
        if let Some(v) = &self.bucket {
            cfg.bucket = v.clone();
        }
        if let Some(v) = &self.region {
            cfg.region = v.clone();
        }
        if let Some(v) = &self.archive_prefix {
            cfg.archive_prefix = Some(v.clone());
        }
        if let Some(v) = &self.path_prefix {
            cfg.path_prefix = Some(v.clone());
        }
        if let Some(v) = &self.manifest_key {
            cfg.manifest_key = v.clone();
        }
        if let Some(v) = &self.endpoint {
            cfg.endpoint = Some(v.clone());
        }
        if let Some(v) = &self.profile {
            cfg.profile = Some(v.clone());
        }
    }
}

/// Deploy context for a CLI run: the archive prefix the build step uses.
pub fn base_context() -> DeployContext {
    DeployContext {
        archive_prefix: Some(DEFAULT_ARCHIVE_PREFIX.to_string()),
        ..DeployContext::default()
    }
}
