use std::io::Write;
use tablegrid::utils::config::{AssemblyConfig, LeftFillStrategy};
use tablegrid::ConfigError;
use tempfile::NamedTempFile;

#[test]
fn test_parse_partial_config_from_json() {
    let json = r#"{
        "nms_overlap_threshold": 0.2,
        "enable_multi_header": true,
        "left_fill": "deep"
    }"#;

    let config: AssemblyConfig = serde_json::from_str(json).unwrap();

    assert!((config.nms_overlap_threshold - 0.2).abs() < 1e-6);
    assert!(config.enable_multi_header);
    assert_eq!(config.left_fill, LeftFillStrategy::Deep);
    assert_eq!(config.large_table_maximum_rows, 1000);
    assert!(config.remove_null_rows);
}

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let json = r#"{
        "total_overlap_reject_threshold": 0.8,
        "confidence_thresholds": { "row": 0.6 },
        "force_large_table_assumption": true
    }"#;
    temp_file.write_all(json.as_bytes()).unwrap();

    let config = AssemblyConfig::from_file(temp_file.path()).unwrap();

    assert!((config.total_overlap_reject_threshold - 0.8).abs() < 1e-6);
    assert!((config.confidence_thresholds.row - 0.6).abs() < 1e-6);
    assert!((config.confidence_thresholds.column - 0.3).abs() < 1e-6);
    assert_eq!(config.force_large_table_assumption, Some(true));
}

#[test]
fn test_default_config() {
    let config = AssemblyConfig::default();

    assert!((config.nms_overlap_threshold - 0.1).abs() < 1e-6);
    assert!((config.header_ioa_threshold - 0.7).abs() < 1e-6);
    assert!((config.total_overlap_reject_threshold - 0.9).abs() < 1e-6);
    assert_eq!(config.nms_warn_threshold, 5);
    assert_eq!(config.force_large_table_assumption, None);
    assert!(!config.semantic_spanning_cells);
    assert_eq!(config.left_fill, LeftFillStrategy::Algorithm);
    assert!(config.validate().is_ok());
}

#[test]
fn test_serialize_config() {
    let config = AssemblyConfig {
        leave_gap: 0.2,
        enable_multi_header: true,
        ..AssemblyConfig::default()
    };

    let serialized = serde_json::to_string(&config).unwrap();
    let parsed: AssemblyConfig = serde_json::from_str(&serialized).unwrap();

    assert_eq!(config, parsed);
}

#[test]
fn test_invalid_value_is_rejected() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(br#"{ "header_ioa_threshold": 1.5 }"#)
        .unwrap();

    let result = AssemblyConfig::from_file(temp_file.path());

    match result {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "header_ioa_threshold"),
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_inverted_iob_thresholds_are_rejected() {
    let config = AssemblyConfig {
        iob_reject_threshold: 0.6,
        iob_warn_threshold: 0.5,
        ..AssemblyConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field: "iob_reject_threshold", .. })
    ));
}

#[test]
fn test_missing_file() {
    let result = AssemblyConfig::from_file("/nonexistent/tablegrid/config.json");
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_malformed_json() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"{ not json").unwrap();

    let result = AssemblyConfig::from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}
