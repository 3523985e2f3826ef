use super::*;
use rstest::rstest;

#[test]
fn test_load_from_environment() {
    temp_env::with_vars(
        [
            ("CLUBHOUSE__DATABASE__URL", Some("postgres://localhost/clubhouse")),
            ("CLUBHOUSE__SERVER__PORT", Some("9090")),
            ("CLUBHOUSE__STORAGE__BACKEND", Some("remote")),
            ("CLUBHOUSE__STORAGE__UPLOAD_ROOT", Some("/var/lib/clubhouse")),
        ],
        || {
            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.database.url, "postgres://localhost/clubhouse");
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.storage.backend, StorageBackendKind::Remote);
            assert_eq!(config.storage.upload_root, "/var/lib/clubhouse");
        },
    );
}

#[test]
fn test_defaults_apply_when_sections_missing() {
    temp_env::with_vars(
        [("CLUBHOUSE__DATABASE__URL", Some("postgres://localhost/clubhouse"))],
        || {
            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.storage.backend, StorageBackendKind::Local);
            assert_eq!(config.storage.max_file_size, 10 * 1024 * 1024);
            assert!(config.storage.remote.access_key_id.is_none());
            assert_eq!(config.storage.remote.timeout_secs, 30);
            assert_eq!(config.llm.model, "sonar-pro");
            assert_eq!(config.llm.timeout_secs, 25);
            assert!(config.llm.api_key.is_none());
            assert_eq!(config.realtime.queue_capacity, 64);
        },
    );
}

#[test]
fn test_missing_database_url_is_an_error() {
    temp_env::with_vars_unset(["CLUBHOUSE__DATABASE__URL"], || {
        assert!(AppConfig::load().is_err());
    });
}

#[rstest]
#[case(StorageBackendKind::Local, "local")]
#[case(StorageBackendKind::Remote, "remote")]
fn test_backend_kind_roundtrip(#[case] kind: StorageBackendKind, #[case] s: &str) {
    assert_eq!(kind.as_str(), s);
    assert_eq!(StorageBackendKind::parse(s), Some(kind));
}

#[test]
fn test_backend_kind_unknown() {
    assert_eq!(StorageBackendKind::parse("google_drive"), None);
}
