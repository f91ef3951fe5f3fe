use ngle_analyzer::credentials::{
    CredentialError, CredentialSource, CredentialStore, EnvironmentCredentials, FileKeyValueStore, KeyValueStore,
    STORAGE_KEY,
};

fn store_at(path: &std::path::Path, env: &[(&str, &str)], fallback: Option<&str>) -> CredentialStore {
    CredentialStore::initialize(
        Box::new(FileKeyValueStore::new(path)),
        EnvironmentCredentials::from_pairs(env.iter().copied()),
        fallback.map(str::to_string),
    )
}

#[test]
fn environment_beats_persisted_beats_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    FileKeyValueStore::new(&path).set(STORAGE_KEY, "persisted-key").unwrap();

    let store = store_at(&path, &[("GEMINI_API_KEY", "env-key")], Some("fallback-key"));
    assert_eq!(store.resolve_active().map(|c| c.expose()), Some("env-key"));
    assert_eq!(store.active_source(), Some(&CredentialSource::Environment("GEMINI_API_KEY".to_string())));

    let store = store_at(&path, &[], Some("fallback-key"));
    assert_eq!(store.resolve_active().map(|c| c.expose()), Some("persisted-key"));
    assert_eq!(store.active_source(), Some(&CredentialSource::Persisted));

    let empty = dir.path().join("other.json");
    let store = store_at(&empty, &[], Some("fallback-key"));
    assert_eq!(store.resolve_active().map(|c| c.expose()), Some("fallback-key"));

    let store = store_at(&empty, &[], None);
    assert!(!store.is_configured());
}

#[test]
fn configured_key_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let mut store = store_at(&path, &[], Some("fallback-key"));
    store.configure("  user-key  ").unwrap();
    assert_eq!(store.resolve_active().map(|c| c.expose()), Some("user-key"));
    assert_eq!(store.active_source(), Some(&CredentialSource::Configured));

    let restarted = store_at(&path, &[], Some("fallback-key"));
    assert_eq!(restarted.resolve_active().map(|c| c.expose()), Some("user-key"));
}

#[test]
fn rejected_key_keeps_the_previous_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let mut store = store_at(&path, &[("API_KEY", "env-key")], None);

    assert!(matches!(store.configure("   "), Err(CredentialError::EmptyCredential)));
    assert_eq!(store.resolve_active().map(|c| c.expose()), Some("env-key"));
    assert_eq!(store.storage().get(STORAGE_KEY).unwrap(), None);
}

#[test]
fn clear_falls_back_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let mut store = store_at(&path, &[], Some("fallback-key"));
    store.configure("user-key").unwrap();

    store.clear().unwrap();
    assert_eq!(store.resolve_active().map(|c| c.expose()), Some("fallback-key"));
    assert_eq!(store.storage().get(STORAGE_KEY).unwrap(), None);

    store.clear().unwrap();
    assert_eq!(store.resolve_active().map(|c| c.expose()), Some("fallback-key"));
    assert_eq!(store.active_source(), Some(&CredentialSource::Fallback));
}

#[test]
fn clear_prefers_environment_over_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let mut store = store_at(&path, &[("GEMINI_API_KEY", "env-key")], Some("fallback-key"));
    store.configure("user-key").unwrap();

    store.clear().unwrap();
    assert_eq!(store.resolve_active().map(|c| c.expose()), Some("env-key"));
}
