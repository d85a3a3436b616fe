//! End-to-end run of the deploy hooks over an in-memory bucket:
//! upload → list → activate → list again → roll back.

use chrono::{Duration, TimeZone, Utc};

use fbdeploy_core::{
    DeployConfig, DeployContext, DeployPlugin, Manifest, MemoryStore, ObjectAcl, ObjectStore,
    RevisionData,
};

const BUCKET: &str = "fastboot-test";

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new(BUCKET);
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    for (i, name) in ["dist-12.zip", "dist-34.zip", "dist-56.zip"].iter().enumerate() {
        store.insert_at(name, format!("Body: {name}"), base + Duration::minutes(i as i64));
    }
    store.insert_at(
        "fastboot-deploy-info.json",
        format!(r#"{{"bucket":"{BUCKET}","key":"dist-34.zip"}}"#),
        base,
    );
    store
}

fn config() -> DeployConfig {
    DeployConfig {
        bucket: BUCKET.into(),
        region: "us-east-1".into(),
        ..DeployConfig::default()
    }
}

fn context() -> DeployContext {
    DeployContext {
        archive_prefix: Some("dist-".into()),
        ..DeployContext::default()
    }
}

async fn manifest(store: &MemoryStore, key: &str) -> Manifest {
    let body = store.get_object(key).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ── fetchRevisions / fetchInitialRevisions ───────────────────────────

#[tokio::test]
async fn fetch_revisions_lists_newest_first_with_active_flag() {
    let plugin = DeployPlugin::new(seeded_store(), config());
    let data = plugin.fetch_revisions(&context()).await.unwrap();

    let revisions: Vec<&str> = data.revisions.iter().map(|r| r.revision.as_str()).collect();
    assert_eq!(revisions, ["56", "34", "12"]);
    assert!(data.revisions[1].active, "revision 34 marked current");
    assert!(!data.revisions[0].active);
    assert!(!data.revisions[2].active);
}

#[tokio::test]
async fn fetch_initial_revisions_matches_fetch_revisions() {
    let plugin = DeployPlugin::new(seeded_store(), config());
    let initial = plugin.fetch_initial_revisions(&context()).await.unwrap();
    let current = plugin.fetch_revisions(&context()).await.unwrap();
    assert_eq!(initial.initial_revisions, current.revisions);
}

#[tokio::test]
async fn fetch_revisions_on_empty_bucket_is_empty() {
    let plugin = DeployPlugin::new(MemoryStore::new(BUCKET), config());
    let data = plugin.fetch_revisions(&context()).await.unwrap();
    assert!(data.revisions.is_empty());
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json, serde_json::json!({ "revisions": [] }));
}

// ── activate ─────────────────────────────────────────────────────────

#[tokio::test]
async fn activate_rewrites_manifest_and_listing_follows() {
    let store = seeded_store();
    let plugin = DeployPlugin::new(store.clone(), config());
    let ctx = DeployContext {
        command_revision: Some("56".into()),
        ..context()
    };

    plugin.activate(&ctx).await.unwrap();

    assert_eq!(
        manifest(&store, "fastboot-deploy-info.json").await,
        Manifest::new(BUCKET, "dist-56.zip")
    );
    assert_eq!(store.acl("fastboot-deploy-info.json"), Some(ObjectAcl::PublicRead));

    let data = plugin.fetch_revisions(&ctx).await.unwrap();
    let active: Vec<&str> = data
        .revisions
        .iter()
        .filter(|r| r.active)
        .map(|r| r.revision.as_str())
        .collect();
    assert_eq!(active, ["56"]);
}

#[tokio::test]
async fn rollback_to_recorded_revision() {
    let store = seeded_store();
    let plugin = DeployPlugin::new(store.clone(), config());
    let ctx = DeployContext {
        revision_data: Some(RevisionData {
            revision_key: Some("12".into()),
        }),
        ..context()
    };

    plugin.activate(&ctx).await.unwrap();
    let data = plugin.fetch_revisions(&ctx).await.unwrap();
    assert!(data.revisions[2].active);
    assert_eq!(data.revisions[2].revision.as_str(), "12");
}

#[tokio::test]
async fn path_prefix_namespaces_everything() {
    let store = MemoryStore::new(BUCKET);
    let mut cfg = config();
    cfg.path_prefix = Some("blog".into());
    let plugin = DeployPlugin::new(store.clone(), cfg);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dist-56.zip");
    std::fs::write(&path, "zip").unwrap();
    let ctx = DeployContext {
        archive_path: Some(path),
        archive_name: Some("dist-56.zip".into()),
        command_revision: Some("56".into()),
        ..context()
    };

    assert_eq!(plugin.upload(&ctx).await.unwrap(), "blog/dist-56.zip");
    plugin.activate(&ctx).await.unwrap();

    assert_eq!(
        manifest(&store, "blog/fastboot-deploy-info.json").await,
        Manifest::new(BUCKET, "blog/dist-56.zip")
    );

    let data = plugin.fetch_revisions(&ctx).await.unwrap();
    assert_eq!(data.revisions.len(), 1);
    assert_eq!(data.revisions[0].revision.as_str(), "56");
    assert!(data.revisions[0].active);
}

// ── upload ───────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_stores_archive_contents() {
    let store = seeded_store();
    let plugin = DeployPlugin::new(store.clone(), config());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dist-78.zip");
    std::fs::write(&path, "testtest").unwrap();
    let ctx = DeployContext {
        archive_path: Some(path),
        archive_name: Some("dist-78.zip".into()),
        ..context()
    };

    let key = plugin.upload(&ctx).await.unwrap();
    assert_eq!(&store.get_object(&key).await.unwrap()[..], b"testtest");

    // Freshly uploaded archive is the newest revision, but not active.
    let data = plugin.fetch_revisions(&ctx).await.unwrap();
    assert_eq!(data.revisions[0].revision.as_str(), "78");
    assert!(!data.revisions[0].active);
}
