//! # Pointer Manifest
//!
//! The manifest is a small JSON document naming the archive an app server
//! should download:
//!
//! ```json
//! { "bucket": "my-deploys", "key": "blog/dist-56.zip" }
//! ```
//!
//! It is the only durable deploy state. Reading it is tolerant: a manifest
//! that cannot be fetched is [`ManifestState::Absent`], so first deployments
//! work before anything was activated. A manifest that *can* be fetched but
//! does not parse is an error.
//!
//! Writing goes through a [`ManifestFormatter`], which lets the surrounding
//! pipeline own the manifest schema.

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};
use crate::store::ObjectStore;

/// Pointer to the active archive.
///
/// Both fields default to empty so that `{}` parses as "points nowhere".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub key: String,
}

impl Manifest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Outcome of reading the manifest object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestState {
    /// The manifest exists and parsed.
    Found(Manifest),
    /// No manifest could be read; nothing is active.
    Absent,
}

impl ManifestState {
    /// Key of the active archive, if any.
    pub fn active_key(&self) -> Option<&str> {
        match self {
            ManifestState::Found(m) if !m.key.is_empty() => Some(&m.key),
            _ => None,
        }
    }
}

/// Fetch and parse the manifest stored at `key`.
pub async fn resolve_manifest<S: ObjectStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<ManifestState> {
    let body = match store.get_object(key).await {
        Ok(body) => body,
        Err(e) if e.is_not_found() => {
            tracing::debug!(bucket = store.bucket(), key, "no manifest present");
            return Ok(ManifestState::Absent);
        }
        Err(e) => {
            tracing::warn!(bucket = store.bucket(), key, "manifest unreadable, treating as absent: {e}");
            return Ok(ManifestState::Absent);
        }
    };

    let manifest = serde_json::from_slice(&body).map_err(|source| DeployError::MalformedManifest {
        key: key.to_string(),
        source,
    })?;
    Ok(ManifestState::Found(manifest))
}

/// Produces the manifest body written on activation.
///
/// Any `Fn(&str, &str) -> String` closure taking `(bucket, key)` is a
/// formatter.
pub trait ManifestFormatter: Send + Sync {
    fn format(&self, bucket: &str, key: &str) -> Result<String>;
}

impl<F> ManifestFormatter for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn format(&self, bucket: &str, key: &str) -> Result<String> {
        Ok(self(bucket, key))
    }
}

/// Default formatter: `{"bucket": …, "key": …}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestFormatter;

impl ManifestFormatter for JsonManifestFormatter {
    fn format(&self, bucket: &str, key: &str) -> Result<String> {
        serde_json::to_string_pretty(&Manifest::new(bucket, key))
            .map_err(|e| DeployError::ManifestFormat(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreOp};
    use chrono::Utc;

    #[tokio::test]
    async fn missing_manifest_is_absent() {
        let store = MemoryStore::new("deploys");
        let state = resolve_manifest(&store, "fastboot-deploy-info.json").await.unwrap();
        assert_eq!(state, ManifestState::Absent);
        assert_eq!(state.active_key(), None);
    }

    #[tokio::test]
    async fn read_failure_is_absent() {
        let store = MemoryStore::new("deploys");
        store.insert_at("m.json", r#"{"bucket":"deploys","key":"dist-1.zip"}"#, Utc::now());
        store.fail(StoreOp::Get);
        let state = resolve_manifest(&store, "m.json").await.unwrap();
        assert_eq!(state, ManifestState::Absent);
    }

    #[tokio::test]
    async fn present_manifest_is_parsed() {
        let store = MemoryStore::new("deploys");
        store.insert_at(
            "m.json",
            r#"{ "bucket": "deploys", "key": "dist-34.zip", "version": 2 }"#,
            Utc::now(),
        );
        let state = resolve_manifest(&store, "m.json").await.unwrap();
        assert_eq!(state, ManifestState::Found(Manifest::new("deploys", "dist-34.zip")));
        assert_eq!(state.active_key(), Some("dist-34.zip"));
    }

    #[tokio::test]
    async fn empty_object_points_nowhere() {
        let store = MemoryStore::new("deploys");
        store.insert_at("m.json", "{}", Utc::now());
        let state = resolve_manifest(&store, "m.json").await.unwrap();
        assert!(matches!(state, ManifestState::Found(_)));
        assert_eq!(state.active_key(), None);
    }

    #[tokio::test]
    async fn malformed_manifest_is_fatal() {
        let store = MemoryStore::new("deploys");
        store.insert_at("m.json", "<html>", Utc::now());
        let err = resolve_manifest(&store, "m.json").await.unwrap_err();
        match err {
            DeployError::MalformedManifest { key, .. } => assert_eq!(key, "m.json"),
            other => panic!("expected MalformedManifest, got: {other:?}"),
        }
    }

    #[test]
    fn json_formatter_emits_bucket_and_key() {
        let body = JsonManifestFormatter.format("deploys", "blog/dist-56.zip").unwrap();
        let parsed: Manifest = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, Manifest::new("deploys", "blog/dist-56.zip"));
    }

    #[test]
    fn closures_are_formatters() {
        let formatter = |bucket: &str, key: &str| format!("{bucket}:{key}");
        assert_eq!(formatter.format("b", "k").unwrap(), "b:k");
    }
}
