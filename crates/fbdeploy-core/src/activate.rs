//! # Activation
//!
//! Activating a revision rewrites the pointer manifest so that it names the
//! revision's archive. The write is a single blind overwrite with a
//! public-read ACL: there is no read-modify-write and no version check, so
//! concurrent activations resolve as last-writer-wins.
//!
//! The archive itself is not checked for existence. Pointing the manifest
//! at a missing archive is a caller error that surfaces when app servers
//! try to download it.

use bytes::Bytes;

use crate::error::{DeployError, Result};
use crate::keys::{KeyLayout, RevisionId};
use crate::manifest::ManifestFormatter;
use crate::store::{ObjectAcl, ObjectStore};

/// Pick the revision to activate: an explicit request wins over the
/// revision recorded earlier in the pipeline. A blank explicit request
/// counts as absent.
pub fn resolve_revision(explicit: Option<&str>, recorded: Option<&str>) -> Result<RevisionId> {
    let explicit = explicit.filter(|r| !r.trim().is_empty());
    match explicit.or(recorded) {
        Some(revision) => RevisionId::new(revision),
        None => Err(DeployError::MissingRevision),
    }
}

/// Point the manifest at `revision`'s archive.
pub async fn activate_revision<S: ObjectStore + ?Sized>(
    store: &S,
    layout: &KeyLayout,
    revision: &RevisionId,
    formatter: &dyn ManifestFormatter,
) -> Result<()> {
    let bucket = store.bucket();
    let build_key = layout.archive_key(revision);
    tracing::debug!(bucket, %build_key, "creating manifest");
    let body = formatter.format(bucket, &build_key)?;

    let manifest_key = layout.manifest_key();
    tracing::info!(bucket, %manifest_key, %revision, "updating manifest");
    store
        .put_object(&manifest_key, Bytes::from(body), ObjectAcl::PublicRead)
        .await?;
    Ok(())
}
