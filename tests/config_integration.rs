//! Integration tests for configuration parsing and handling.
//!
//! These tests verify that `fieldset.toml` is loaded, validated and turned
//! into parse options and request settings.

use std::io::Write;

use fieldset::selection::{BracePolicy, DEFAULT_MAX_DEPTH, FieldsetConfig, Selection, SelectionError};

/// Test that an empty file yields the defaults
#[test]
fn test_config_empty() {
    let config = FieldsetConfig::from_str("").expect("Failed to parse config");

    assert_eq!(config, FieldsetConfig::default());
    assert_eq!(config.selection.param, "fields");
    assert_eq!(config.selection.policy, BracePolicy::Lenient);
    assert_eq!(config.selection.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.pagination.limit_param, "limit");
    assert_eq!(config.pagination.offset_param, "offset");
}

/// Test full configuration with all options
#[test]
fn test_config_full() {
    let config_str = r#"
        [selection]
        param = "only"
        policy = "strict"
        max_depth = 4

        [pagination]
        limit_param = "page_size"
        offset_param = "start"
    "#;

    let config = FieldsetConfig::from_str(config_str).expect("Failed to parse config");

    assert_eq!(config.selection.param, "only");
    assert_eq!(config.selection.policy, BracePolicy::Strict);
    assert_eq!(config.selection.max_depth, 4);
    assert_eq!(config.pagination.limit_param, "page_size");
    assert_eq!(config.pagination.offset_param, "start");
}

/// Test that parse options follow the config
#[test]
fn test_config_parse_options() {
    let config = FieldsetConfig::from_str(
        r#"
        [selection]
        policy = "strict"
        max_depth = 1
    "#,
    )
    .expect("Failed to parse config");

    let options = config.parse_options();
    assert!(matches!(
        Selection::parse_with("a{b{c}}", &options),
        Err(SelectionError::TooDeep { limit: 1, .. })
    ));
    assert!(Selection::parse_with("a{b}", &options).is_ok());
}

/// Test that unknown keys are rejected
#[test]
fn test_config_unknown_key() {
    let result = FieldsetConfig::from_str(
        r#"
        [selection]
        parm = "fields"
    "#,
    );
    assert!(matches!(result, Err(SelectionError::TomlError { .. })));

    let result = FieldsetConfig::from_str("[caching]\nenabled = true\n");
    assert!(matches!(result, Err(SelectionError::TomlError { .. })));
}

/// Test values serde accepts but validation rejects
#[test]
fn test_config_validation() {
    let result = FieldsetConfig::from_str("[selection]\nparam = \"  \"\n");
    assert!(matches!(result, Err(SelectionError::ConfigError { .. })));

    let result = FieldsetConfig::from_str("[selection]\nmax_depth = 0\n");
    assert!(matches!(result, Err(SelectionError::ConfigError { .. })));
}

/// Test an unknown policy name
#[test]
fn test_config_bad_policy() {
    let result = FieldsetConfig::from_str("[selection]\npolicy = \"forgiving\"\n");
    assert!(result.is_err());
}

/// Test loading from a file
#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "[selection]\nparam = \"select\"").expect("Failed to write config");

    let config = FieldsetConfig::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.selection.param, "select");
}

/// Test loading a missing file
#[test]
fn test_config_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result = FieldsetConfig::from_file(dir.path().join("fieldset.toml"));

    match result {
        Err(SelectionError::IoError { path, .. }) => assert!(path.ends_with("fieldset.toml")),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

/// Test that the axum layer picks up the config
#[cfg(feature = "axum")]
#[test]
fn test_config_axum_layer() {
    use fieldset::axum::SelectionLayer;

    let config = FieldsetConfig::from_str(
        r#"
        [selection]
        param = "only"
        policy = "strict"

        [pagination]
        limit_param = "n"
    "#,
    )
    .expect("Failed to parse config");

    let layer = SelectionLayer::from_config(&config);
    let settings = layer.settings();
    assert_eq!(settings.param, "only");
    assert_eq!(settings.limit_param, "n");
    assert_eq!(settings.offset_param, "offset");
    assert_eq!(settings.options, config.parse_options());
}
