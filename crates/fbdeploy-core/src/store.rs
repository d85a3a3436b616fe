//! # Object Store Abstraction
//!
//! The deploy hooks only need three capabilities from a bucket: list keys
//! under a prefix, read an object, and overwrite an object. Each store
//! instance is bound to a single bucket.
//!
//! [`MemoryStore`] is the in-process implementation used by tests and dry
//! runs; the S3 implementation lives in the `fbdeploy-s3` crate.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// One entry of an object listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key.
    pub key: String,
    /// Last modification time reported by the store.
    pub last_modified: DateTime<Utc>,
}

/// Canned access control applied on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectAcl {
    /// Bucket default (private).
    #[default]
    Private,
    /// Readable by anyone; required for the manifest so app servers can
    /// poll it without credentials.
    PublicRead,
}

/// Minimal bucket-scoped object store.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Name of the bucket this store is bound to.
    fn bucket(&self) -> &str;

    /// Lists every object whose key starts with `prefix`.
    ///
    /// Ordering is unspecified; callers sort.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError>;

    /// Reads an entire object.
    ///
    /// Returns `StoreError::NotFound` if the key does not exist.
    async fn get_object(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Writes an object unconditionally (last writer wins).
    async fn put_object(&self, key: &str, body: Bytes, acl: ObjectAcl) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    fn bucket(&self) -> &str {
        (**self).bucket()
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        (**self).list_objects(prefix).await
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, StoreError> {
        (**self).get_object(key).await
    }

    async fn put_object(&self, key: &str, body: Bytes, acl: ObjectAcl) -> Result<(), StoreError> {
        (**self).put_object(key, body, acl).await
    }
}

/// Operation a [`MemoryStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Get,
    Put,
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    acl: ObjectAcl,
    last_modified: DateTime<Utc>,
}

/// In-memory, bucket-scoped store.
///
/// Thread-safe via `RwLock`. Not suitable for production.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bucket: String,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    failures: Arc<RwLock<HashSet<StoreOp>>>,
}

impl MemoryStore {
    /// Create an empty store for `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::default(),
            failures: Arc::default(),
        }
    }

    /// Insert an object with an explicit modification time.
    pub fn insert_at(&self, key: &str, body: impl Into<Bytes>, last_modified: DateTime<Utc>) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert(
                key.to_string(),
                StoredObject {
                    body: body.into(),
                    acl: ObjectAcl::Private,
                    last_modified,
                },
            );
        }
    }

    /// ACL recorded for `key`, if the object exists.
    pub fn acl(&self, key: &str) -> Option<ObjectAcl> {
        self.objects.read().ok()?.get(key).map(|o| o.acl)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent `op` fail with a transport-style error.
    pub fn fail(&self, op: StoreOp) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(op);
        }
    }

    fn should_fail(&self, op: StoreOp) -> bool {
        self.failures.read().map(|f| f.contains(&op)).unwrap_or(false)
    }

    fn poisoned(&self) -> StoreError {
        StoreError::Client(format!("memory store for {} is poisoned", self.bucket))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        if self.should_fail(StoreOp::List) {
            return Err(StoreError::List {
                bucket: self.bucket.clone(),
                prefix: prefix.to_string(),
                message: "injected failure".into(),
            });
        }
        let objects = self.objects.read().map_err(|_| self.poisoned())?;
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, obj)| ObjectSummary {
                key: key.clone(),
                last_modified: obj.last_modified,
            })
            .collect())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, StoreError> {
        if self.should_fail(StoreOp::Get) {
            return Err(StoreError::Get {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message: "injected failure".into(),
            });
        }
        let objects = self.objects.read().map_err(|_| self.poisoned())?;
        objects
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StoreError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            })
    }

    async fn put_object(&self, key: &str, body: Bytes, acl: ObjectAcl) -> Result<(), StoreError> {
        if self.should_fail(StoreOp::Put) {
            return Err(StoreError::Put {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message: "injected failure".into(),
            });
        }
        let mut objects = self.objects.write().map_err(|_| self.poisoned())?;
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                acl,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }
}
