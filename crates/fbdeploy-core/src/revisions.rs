//! # Revision Listing
//!
//! Turns a raw bucket listing into the revision history a deploy pipeline
//! shows to an operator:
//!
//! 1. **Extract** — sort objects by last-modified (newest first), then keep
//!    only keys matching `[<pathPrefix>/]<archivePrefix><revision>.zip`.
//! 2. **Resolve** — read the pointer manifest (absence is not an error).
//! 3. **Correlate** — flag the entry whose archive key equals the manifest key.
//!
//! An empty listing short-circuits before the manifest is read, so a broken
//! or missing manifest can never fail a listing of an empty bucket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keys::{KeyLayout, RevisionId};
use crate::manifest::{resolve_manifest, ManifestState};
use crate::store::{ObjectStore, ObjectSummary};

/// A build archive found in the bucket, before correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionCandidate {
    pub revision: RevisionId,
    pub timestamp: DateTime<Utc>,
}

/// One row of the revision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionEntry {
    pub revision: RevisionId,
    pub timestamp: DateTime<Utc>,
    pub active: bool,
}

/// Result of the `fetchRevisions` hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionList {
    pub revisions: Vec<RevisionEntry>,
}

/// Result of the `fetchInitialRevisions` hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialRevisionList {
    pub initial_revisions: Vec<RevisionEntry>,
}

impl From<RevisionList> for InitialRevisionList {
    fn from(list: RevisionList) -> Self {
        Self {
            initial_revisions: list.revisions,
        }
    }
}

/// Extract build archives from a listing, newest first.
///
/// Sorting happens before filtering and is stable, so objects with equal
/// timestamps keep their listing order.
pub fn extract_revisions(
    mut objects: Vec<ObjectSummary>,
    layout: &KeyLayout,
) -> Vec<RevisionCandidate> {
    objects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    objects
        .into_iter()
        .filter_map(|obj| {
            let revision = layout.parse_archive_key(&obj.key)?;
            Some(RevisionCandidate {
                revision,
                timestamp: obj.last_modified,
            })
        })
        .collect()
}

/// Flag the candidate the manifest points at. Order is preserved.
pub fn correlate(
    candidates: Vec<RevisionCandidate>,
    manifest: &ManifestState,
    layout: &KeyLayout,
) -> Vec<RevisionEntry> {
    let active_key = manifest.active_key();
    candidates
        .into_iter()
        .map(|c| {
            let active = active_key == Some(layout.archive_key(&c.revision).as_str());
            RevisionEntry {
                revision: c.revision,
                timestamp: c.timestamp,
                active,
            }
        })
        .collect()
}

/// List the revision history of `store` under `layout`.
///
/// Listing failures propagate; manifest read failures degrade to "nothing
/// active"; a manifest that exists but does not parse is fatal.
pub async fn list_revisions<S: ObjectStore + ?Sized>(
    store: &S,
    layout: &KeyLayout,
) -> Result<RevisionList> {
    let prefix = layout.listing_prefix();
    let objects = store.list_objects(&prefix).await?;
    tracing::debug!(bucket = store.bucket(), %prefix, count = objects.len(), "listed objects");

    if objects.is_empty() {
        return Ok(RevisionList::default());
    }

    let manifest = resolve_manifest(store, &layout.manifest_key()).await?;
    let candidates = extract_revisions(objects, layout);
    Ok(RevisionList {
        revisions: correlate(candidates, &manifest, layout),
    })
}
