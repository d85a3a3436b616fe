//! # fbdeploy-core — FastBoot Deploy Revisions
//!
//! Manages build archives of a FastBoot app server in an object-storage
//! bucket. A deploy pipeline uploads archives, lists the revision history,
//! and activates a revision by rewriting a small pointer manifest that app
//! servers poll.
//!
//! ## Layout in the bucket
//!
//! ```text
//! [<pathPrefix>/]<archivePrefix><revision>.zip    one per build
//! [<pathPrefix>/]fastboot-deploy-info.json        {"bucket": …, "key": …}
//! ```
//!
//! ## Failure policy
//!
//! - A missing or unreadable manifest means "nothing active", never an error.
//! - A manifest that exists but does not parse is fatal.
//! - Keys that are not build archives are skipped during listing.
//! - Activation is a blind overwrite; concurrent activations are
//!   last-writer-wins and the target archive is not checked for existence.
//!
//! ## Crate Policy
//!
//! - No process-wide client state: stores are constructed from explicit
//!   configuration.
//! - No `.unwrap()` outside tests.

pub mod activate;
pub mod config;
pub mod error;
pub mod keys;
pub mod manifest;
pub mod plugin;
pub mod revisions;
pub mod store;
pub mod upload;

// ─── Re-exports ─────────────────────────────────────────────────────

pub use activate::{activate_revision, resolve_revision};
pub use config::DeployConfig;
pub use error::{ConfigError, DeployError, Result, StoreError};
pub use keys::{KeyLayout, RevisionId, ARCHIVE_SUFFIX, DEFAULT_MANIFEST_KEY};
pub use manifest::{resolve_manifest, JsonManifestFormatter, Manifest, ManifestFormatter, ManifestState};
pub use plugin::{DeployContext, DeployPlugin, RevisionData};
pub use revisions::{
    correlate, extract_revisions, list_revisions, InitialRevisionList, RevisionCandidate,
    RevisionEntry, RevisionList,
};
pub use store::{MemoryStore, ObjectAcl, ObjectStore, ObjectSummary, StoreOp};
pub use upload::upload_archive;
