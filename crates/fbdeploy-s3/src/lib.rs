//! # fbdeploy-s3 — S3 Object Store Backend
//!
//! Implements [`fbdeploy_core::ObjectStore`] on top of `aws-sdk-s3`.
//!
//! Every [`S3Store`] is built from its own [`S3Config`]. Static credentials,
//! a named profile, and a custom endpoint are all applied to that one client;
//! nothing is written to process-wide SDK state, so two stores with different
//! credentials can coexist.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region, SharedCredentialsProvider};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use fbdeploy_core::{DeployConfig, ObjectAcl, ObjectStore, ObjectSummary, StoreError};

/// Connection settings for one bucket.
///
/// Custom `Debug` implementation redacts the secret access key.
#[derive(Clone, Default)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Named profile from the shared AWS config files.
    pub profile: Option<String>,
    /// Custom endpoint; enables path-style addressing.
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
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

impl From<&DeployConfig> for S3Config {
    fn from(cfg: &DeployConfig) -> Self {
        Self {
            bucket: cfg.bucket.clone(),
            region: cfg.region.clone(),
            access_key_id: cfg.access_key_id.clone(),
            secret_access_key: cfg.secret_access_key.clone(),
            profile: cfg.profile.clone(),
            endpoint: cfg.endpoint.clone(),
        }
    }
}

impl S3Config {
    fn static_credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(ak), Some(sk)) => Some(Credentials::new(ak, sk, None, None, "fbdeploy")),
            _ => None,
        }
    }
}

/// S3 bucket accessed through `aws-sdk-s3`.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from `cfg`.
    ///
    /// With static credentials the client is configured directly; otherwise
    /// the default provider chain is loaded (honoring `cfg.profile`).
    pub async fn connect(cfg: S3Config) -> Result<Self, StoreError> {
        if cfg.bucket.is_empty() {
            return Err(StoreError::Client("bucket is required".into()));
        }
        if cfg.region.is_empty() {
            return Err(StoreError::Client("region is required".into()));
        }

        let region = Region::new(cfg.region.clone());
        let mut builder = match cfg.static_credentials() {
            Some(creds) => aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(SharedCredentialsProvider::new(creds)),
            None => {
                let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
                if let Some(profile) = &cfg.profile {
                    loader = loader.profile_name(profile);
                }
                let shared = loader.load().await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
        };

        if let Some(endpoint) = &cfg.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::debug!(bucket = %cfg.bucket, region = %cfg.region, endpoint = ?cfg.endpoint, "S3 client configured");
        Ok(Self::from_client(Client::from_conf(builder.build()), cfg.bucket))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

fn to_chrono(ts: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StoreError::List {
                    bucket: self.bucket.clone(),
                    prefix: prefix.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            for obj in resp.contents() {
                let Some(key) = obj.key() else { continue };
                // Objects without a timestamp sort as oldest.
                let last_modified = obj
                    .last_modified()
                    .and_then(to_chrono)
                    .unwrap_or_default();
                objects.push(ObjectSummary {
                    key: key.to_string(),
                    last_modified,
                });
            }

            match resp.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(objects)
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, StoreError> {
        let out = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(out) => out,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false)
                    || err
                        .raw_response()
                        .map(|r| r.status().as_u16() == 404)
                        .unwrap_or(false);
                if missing {
                    return Err(StoreError::NotFound {
                        bucket: self.bucket.clone(),
                        key: key.to_string(),
                    });
                }
                return Err(StoreError::Get {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    message: DisplayErrorContext(&err).to_string(),
                });
            }
        };

        let data = out.body.collect().await.map_err(|e| StoreError::Get {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(data.into_bytes())
    }

    async fn put_object(&self, key: &str, body: Bytes, acl: ObjectAcl) -> Result<(), StoreError> {
        let canned = match acl {
            ObjectAcl::Private => None,
            ObjectAcl::PublicRead => Some(ObjectCannedAcl::PublicRead),
        };
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_acl(canned)
            .send()
            .await
            .map_err(|e| StoreError::Put {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}
