//! Contract tests for `S3Store` against a mock S3 endpoint.
//!
//! The client runs with static credentials and path-style addressing, so
//! every request lands on `/{bucket}` or `/{bucket}/{key}`.

use bytes::Bytes;
use fbdeploy_core::{ObjectAcl, ObjectStore, StoreError};
use fbdeploy_s3::{S3Config, S3Store};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUCKET: &str = "fastboot-test";

async fn test_store(mock_server: &MockServer) -> S3Store {
    S3Store::connect(S3Config {
        bucket: BUCKET.into(),
        region: "us-east-1".into(),
        access_key_id: Some("AKIDEXAMPLE".into()),
        secret_access_key: Some("secret".into()),
        profile: None,
        endpoint: Some(mock_server.uri()),
    })
    .await
    .unwrap()
}

fn list_body(keys: &[(&str, &str)], next_token: Option<&str>) -> String {
    let contents: String = keys
        .iter()
        .map(|(key, modified)| {
            format!(
                "<Contents><Key>{key}</Key><LastModified>{modified}</LastModified>\
                 <ETag>&quot;abc&quot;</ETag><Size>4</Size><StorageClass>STANDARD</StorageClass></Contents>"
            )
        })
        .collect();
    let (truncated, token) = match next_token {
        Some(t) => ("true", format!("<NextContinuationToken>{t}</NextContinuationToken>")),
        None => ("false", String::new()),
    };
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <Name>{BUCKET}</Name><Prefix>dist-</Prefix><KeyCount>{}</KeyCount><MaxKeys>1000</MaxKeys>\
         <IsTruncated>{truncated}</IsTruncated>{token}{contents}</ListBucketResult>",
        keys.len()
    )
}

// ── ListObjectsV2 ────────────────────────────────────────────────────

#[tokio::test]
async fn list_objects_parses_keys_and_timestamps() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(format!("^/{BUCKET}/?$")))
        .and(query_param("list-type", "2"))
        .and(query_param("prefix", "dist-"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/xml")
                .set_body_string(list_body(
                    &[
                        ("dist-12.zip", "2024-05-01T09:00:00.000Z"),
                        ("dist-34.zip", "2024-05-01T09:01:00.000Z"),
                    ],
                    None,
                )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server).await;
    let objects = store.list_objects("dist-").await.unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].key, "dist-12.zip");
    assert_eq!(objects[1].key, "dist-34.zip");
    assert!(objects[1].last_modified > objects[0].last_modified);
}

#[tokio::test]
async fn list_objects_follows_continuation_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(format!("^/{BUCKET}/?$")))
        .and(query_param("list-type", "2"))
        .and(query_param("continuation-token", "page-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/xml")
                .set_body_string(list_body(&[("dist-56.zip", "2024-05-01T09:02:00.000Z")], None)),
        )
        .expect(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(format!("^/{BUCKET}/?$")))
        .and(query_param("list-type", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/xml")
                .set_body_string(list_body(
                    &[("dist-12.zip", "2024-05-01T09:00:00.000Z")],
                    Some("page-2"),
                )),
        )
        .expect(1)
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server).await;
    let keys: Vec<String> = store
        .list_objects("dist-")
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.key)
        .collect();
    assert_eq!(keys, ["dist-12.zip", "dist-56.zip"]);
}

#[tokio::test]
async fn list_objects_surfaces_access_denied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(format!("^/{BUCKET}/?$")))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("content-type", "application/xml")
                .set_body_string(
                    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                     <Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
                ),
        )
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server).await;
    let err = store.list_objects("dist-").await.unwrap_err();
    assert!(matches!(err, StoreError::List { .. }), "got: {err:?}");
}

// ── GetObject ────────────────────────────────────────────────────────

#[tokio::test]
async fn get_object_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{BUCKET}/fastboot-deploy-info.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bucket": BUCKET,
            "key": "dist-34.zip"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server).await;
    let body = store.get_object("fastboot-deploy-info.json").await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["key"], "dist-34.zip");
}

#[tokio::test]
async fn get_object_maps_missing_key_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{BUCKET}/fastboot-deploy-info.json")))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("content-type", "application/xml")
                .set_body_string(
                    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                     <Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message>\
                     <Key>fastboot-deploy-info.json</Key></Error>",
                ),
        )
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server).await;
    let err = store.get_object("fastboot-deploy-info.json").await.unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
}

// ── PutObject ────────────────────────────────────────────────────────

#[tokio::test]
async fn put_object_sends_public_read_acl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/{BUCKET}/fastboot-deploy-info.json")))
        .and(header("x-amz-acl", "public-read"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server).await;
    store
        .put_object(
            "fastboot-deploy-info.json",
            Bytes::from_static(br#"{"bucket":"fastboot-test","key":"dist-56.zip"}"#),
            ObjectAcl::PublicRead,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn put_object_failure_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("content-type", "application/xml")
                .set_body_string(
                    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                     <Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
                ),
        )
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server).await;
    let err = store
        .put_object("dist-78.zip", Bytes::from_static(b"zip"), ObjectAcl::Private)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Put { .. }), "got: {err:?}");
}
