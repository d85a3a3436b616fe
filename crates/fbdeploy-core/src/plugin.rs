//! # Deploy Plugin
//!
//! Pipeline-facing facade over the listing, activation, and upload
//! operations. A release pipeline drives it through four hooks:
//!
//! | Hook | Effect |
//! |------|--------|
//! | `upload` | store the built archive |
//! | `activate` | repoint the manifest |
//! | `fetch_revisions` | list revisions, flag the active one |
//! | `fetch_initial_revisions` | same listing, captured before a deploy |
//!
//! Values that earlier pipeline stages produce (archive prefix and path,
//! recorded revision, command-line revision) arrive in a [`DeployContext`];
//! static settings come from [`DeployConfig`].

use std::path::PathBuf;

use crate::activate::{activate_revision, resolve_revision};
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::keys::KeyLayout;
use crate::manifest::{JsonManifestFormatter, ManifestFormatter};
use crate::revisions::{list_revisions, InitialRevisionList, RevisionList};
use crate::store::ObjectStore;
use crate::upload::upload_archive;

/// Revision recorded by an earlier pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionData {
    pub revision_key: Option<String>,
}

/// Values produced by the surrounding pipeline.
#[derive(Debug, Clone, Default)]
pub struct DeployContext {
    /// Archive prefix chosen by the build stage (e.g. `dist-`).
    pub archive_prefix: Option<String>,
    /// Local path of the built archive.
    pub archive_path: Option<PathBuf>,
    /// File name the archive is stored under.
    pub archive_name: Option<String>,
    pub revision_data: Option<RevisionData>,
    /// Revision passed on the command line.
    pub command_revision: Option<String>,
}

/// Deploy hooks bound to one store and configuration.
pub struct DeployPlugin<S> {
    store: S,
    config: DeployConfig,
    formatter: Box<dyn ManifestFormatter>,
}

impl<S: ObjectStore> DeployPlugin<S> {
    /// Create a plugin writing JSON manifests.
    pub fn new(store: S, config: DeployConfig) -> Self {
        Self::with_formatter(store, config, JsonManifestFormatter)
    }

    /// Create a plugin with a custom manifest formatter.
    pub fn with_formatter(
        store: S,
        config: DeployConfig,
        formatter: impl ManifestFormatter + 'static,
    ) -> Self {
        Self {
            store,
            config,
            formatter: Box::new(formatter),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Key layout for this config, taking the archive prefix from the
    /// context when the config does not set one.
    pub fn layout(&self, ctx: &DeployContext) -> Result<KeyLayout> {
        let archive_prefix = self
            .config
            .archive_prefix
            .as_deref()
            .or(ctx.archive_prefix.as_deref())
            .ok_or(DeployError::MissingArchivePrefix)?;
        Ok(KeyLayout::new(
            archive_prefix,
            self.config.manifest_key.as_str(),
            self.config.path_prefix.as_deref(),
        ))
    }

    /// Upload the archive named in the context. Returns the key written.
    pub async fn upload(&self, ctx: &DeployContext) -> Result<String> {
        self.config.validate()?;
        let path = ctx
            .archive_path
            .as_deref()
            .ok_or(DeployError::MissingArchive("archive path"))?;
        let name = match ctx.archive_name.as_deref() {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or(DeployError::MissingArchive("archive name"))?,
        };
        // The upload key only depends on the path prefix.
        let layout = KeyLayout::new(
            String::new(),
            self.config.manifest_key.as_str(),
            self.config.path_prefix.as_deref(),
        );
        upload_archive(&self.store, &layout, path, &name).await
    }

    /// Point the manifest at the configured or recorded revision.
    pub async fn activate(&self, ctx: &DeployContext) -> Result<()> {
        self.config.validate()?;
        let explicit = self
            .config
            .revision_key
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .or(ctx.command_revision.as_deref());
        let recorded = ctx
            .revision_data
            .as_ref()
            .and_then(|d| d.revision_key.as_deref());
        let revision = resolve_revision(explicit, recorded)?;
        let layout = self.layout(ctx)?;
        activate_revision(&self.store, &layout, &revision, self.formatter.as_ref()).await
    }

    /// List revisions and flag the active one.
    pub async fn fetch_revisions(&self, ctx: &DeployContext) -> Result<RevisionList> {
        self.config.validate()?;
        let layout = self.layout(ctx)?;
        let list = list_revisions(&self.store, &layout).await?;
        for r in &list.revisions {
            tracing::info!("{} | {} | active: {}", r.revision, r.timestamp, r.active);
        }
        Ok(list)
    }

    /// Same listing as [`fetch_revisions`](Self::fetch_revisions), reported
    /// as the pre-deploy snapshot.
    pub async fn fetch_initial_revisions(&self, ctx: &DeployContext) -> Result<InitialRevisionList> {
        self.fetch_revisions(ctx).await.map(InitialRevisionList::from)
    }
}
