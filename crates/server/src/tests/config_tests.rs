use super::{normalize_database_url, prepare_database_url, validated_public_url};

use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn keeps_memory_url_untouched() {
    assert_eq!(
        normalize_database_url("sqlite::memory:"),
        "sqlite::memory:"
    );
}

#[test]
fn empty_database_url_falls_back_to_default() {
    assert_eq!(normalize_database_url("  "), "sqlite://./data/frames.db");
}

#[test]
fn normalizes_single_colon_sqlite_prefix() {
    assert_eq!(
        normalize_database_url("sqlite:./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn creates_parent_dir_for_sqlite_url() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();

    let temp_root = env::temp_dir().join(format!("frame_server_config_test_{suffix}"));
    let db_path = temp_root.join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(temp_root.join("data").exists());

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn invalid_public_url_is_dropped() {
    assert_eq!(validated_public_url(Some("not a url".to_string())), None);
    assert_eq!(
        validated_public_url(Some("https://maze.example".to_string())),
        Some("https://maze.example".to_string())
    );
    assert_eq!(validated_public_url(None), None);
}
