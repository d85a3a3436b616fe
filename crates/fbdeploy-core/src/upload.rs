//! Uploads a prebuilt archive to `[<pathPrefix>/]<archiveName>`.

use std::path::Path;

use bytes::Bytes;

use crate::error::{DeployError, Result};
use crate::keys::KeyLayout;
use crate::store::{ObjectAcl, ObjectStore};

/// Read `archive_path` and store it under `archive_name`. Returns the key
/// written.
pub async fn upload_archive<S: ObjectStore + ?Sized>(
    store: &S,
    layout: &KeyLayout,
    archive_path: &Path,
    archive_name: &str,
) -> Result<String> {
    let data = tokio::fs::read(archive_path)
        .await
        .map_err(|source| DeployError::Io {
            path: archive_path.display().to_string(),
            source,
        })?;

    let key = layout.upload_key(archive_name);
    tracing::info!(bucket = store.bucket(), %key, bytes = data.len(), "uploading fastboot archive");
    store
        .put_object(&key, Bytes::from(data), ObjectAcl::Private)
        .await?;
    Ok(key)
}
