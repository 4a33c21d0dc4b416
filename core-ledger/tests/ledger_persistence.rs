//! Ledger file round-trips and legacy compatibility

use core_ledger::{
    compute_key, prune, Ledger, LedgerEntry, LedgerStore, ListingKey, NormalizedListing,
};
use std::path::PathBuf;
use std::time::Duration;

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("jobsync-ledger-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn listing(title: &str, organization: &str, external_id: Option<&str>) -> NormalizedListing {
    NormalizedListing {
        title: title.to_string(),
        organization: organization.to_string(),
        locale: "Remote".to_string(),
        description: "Build pipelines".to_string(),
        apply_url: format!("https://jobs.example.com/{}", title.to_lowercase().replace(' ', "-")),
        external_id: external_id.map(str::to_string),
        logo_url: None,
    }
}

#[tokio::test]
async fn test_save_then_load_round_trips_structured_entries() {
    let dir = temp_dir();
    let store = LedgerStore::new(dir.join("posted_jobs.json"));

    let mut ledger = Ledger::new();
    for (l, post) in [
        (listing("Data Engineer", "Acme", None), Some("101")),
        (listing("Backend Engineer", "Globex", Some("remotive:55")), Some("102")),
        (listing("QA Lead", "Initech", None), None),
    ] {
        let key = compute_key(&l);
        ledger.append(LedgerEntry::for_listing(
            &l,
            key,
            1_700_000_000,
            post.map(str::to_string),
        ));
    }

    store.save(&ledger).await.unwrap();
    let loaded = store.load().await;

    assert_eq!(loaded, ledger);
    assert!(!dir.join("posted_jobs.json.tmp").exists());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_legacy_string_list_upgrades() {
    let dir = temp_dir();
    let path = dir.join("posted_jobs.json");
    std::fs::write(
        &path,
        r#"["3f786850e387550fdab836ed7e6dc881de23001b", "89e6c98d92887913cadf06b2adb97f26cde4849b"]"#,
    )
    .unwrap();

    let loaded = LedgerStore::new(&path).load().await;

    assert_eq!(loaded.len(), 2);
    for (entry, token) in loaded.iter().zip([
        "3f786850e387550fdab836ed7e6dc881de23001b",
        "89e6c98d92887913cadf06b2adb97f26cde4849b",
    ]) {
        assert_eq!(entry.first_seen, 0);
        assert_eq!(entry.key.to_string(), token);
    }

    // Unknown age entries disappear once retention is active.
    assert!(prune(&loaded, Duration::from_secs(86_400), 1_700_000_000).is_empty());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_missing_file_is_empty_ledger() {
    let dir = temp_dir();
    let loaded = LedgerStore::new(dir.join("absent.json")).load().await;
    assert!(loaded.is_empty());
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_corrupt_file_is_empty_ledger() {
    let dir = temp_dir();
    let path = dir.join("posted_jobs.json");
    std::fs::write(&path, "[{\"key\": \"id:1\",").unwrap();

    assert!(LedgerStore::new(&path).load().await.is_empty());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_save_creates_parent_directories_and_overwrites() {
    let dir = temp_dir();
    let store = LedgerStore::new(dir.join("state").join("ledger.json"));

    let mut ledger = Ledger::new();
    ledger.append(LedgerEntry::legacy(ListingKey::Opaque("first".to_string())));
    store.save(&ledger).await.unwrap();

    let mut replacement = Ledger::new();
    replacement.append(LedgerEntry::legacy(ListingKey::Opaque("second".to_string())));
    store.save(&replacement).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.entries()[0].key.to_string(), "second");

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_save_fails_when_target_is_a_directory() {
    let dir = temp_dir();
    let target = dir.join("occupied");
    std::fs::create_dir_all(&target).unwrap();

    let result = LedgerStore::new(&target).save(&Ledger::new()).await;
    assert!(result.is_err());
    assert!(target.is_dir());
    assert!(!dir.join("occupied.tmp").exists());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_padded_legacy_key_is_stable_across_save() {
    let dir = temp_dir();
    let path = dir.join("posted_jobs.json");
    std::fs::write(&path, r#"["  abc  ", "id:remotive:7 "]"#).unwrap();
    let store = LedgerStore::new(&path);

    let first = store.load().await;
    store.save(&first).await.unwrap();
    let second = store.load().await;

    let keys = |ledger: &Ledger| ledger.iter().map(|e| e.key.clone()).collect::<Vec<_>>();
    assert_eq!(
        keys(&first),
        vec![
            ListingKey::Opaque("abc".to_string()),
            ListingKey::ById("remotive:7".to_string()),
        ]
    );
    assert_eq!(keys(&first), keys(&second));

    std::fs::remove_dir_all(dir).ok();
}
