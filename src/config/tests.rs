//! Tests for typed configuration

use super::*;

// ---------------------------------------------------------------------------
// MaxDepth serialization
// ---------------------------------------------------------------------------

#[test]
fn test_max_depth_bounded_from_yaml() {
    let depth: MaxDepth = serde_yaml::from_str("12").expect("YAML parse should succeed");
    assert_eq!(depth, MaxDepth::Bounded(12));
}

#[test]
fn test_max_depth_unbounded_from_yaml() {
    let depth: MaxDepth = serde_yaml::from_str("unbounded").expect("YAML parse should succeed");
    assert_eq!(depth, MaxDepth::Unbounded);
}

#[test]
fn test_max_depth_rejects_unknown_keyword() {
    assert!(serde_yaml::from_str::<MaxDepth>("bottomless").is_err());
}

#[test]
fn test_max_depth_roundtrip() {
    for depth in [MaxDepth::Bounded(3), MaxDepth::Unbounded] {
        let json = serde_json::to_string(&depth).expect("JSON serialization should succeed");
        let back: MaxDepth = serde_json::from_str(&json).expect("JSON parse should succeed");
        assert_eq!(back, depth);
    }
}

#[test]
fn test_max_depth_display() {
    assert_eq!(MaxDepth::Bounded(8).to_string(), "8");
    assert_eq!(MaxDepth::Unbounded.to_string(), "unbounded");
}

// ---------------------------------------------------------------------------
// ForecasterParams
// ---------------------------------------------------------------------------

#[test]
fn test_params_defaults_are_valid() {
    let params = ForecasterParams::default();
    assert_eq!(params.n_estimators, 100);
    assert_eq!(params.max_depth, MaxDepth::Unbounded);
    assert_eq!(params.min_samples_split, 2);
    assert_eq!(params.random_state, 42);
    params.validate().expect("defaults must validate");
}

#[test]
fn test_params_from_partial_yaml_uses_defaults() {
    let params: ForecasterParams =
        serde_yaml::from_str("n_estimators: 50").expect("YAML parse should succeed");
    assert_eq!(params.n_estimators, 50);
    assert_eq!(params.min_samples_split, 2);
}

#[test]
fn test_params_zero_estimators_rejected() {
    let params = ForecasterParams { n_estimators: 0, ..Default::default() };
    assert!(matches!(params.validate().unwrap_err(), ConfigError::InvalidNEstimators(0)));
}

#[test]
fn test_params_zero_depth_rejected() {
    let params = ForecasterParams { max_depth: MaxDepth::Bounded(0), ..Default::default() };
    assert!(matches!(params.validate().unwrap_err(), ConfigError::InvalidMaxDepth(0)));
}

#[test]
fn test_params_min_samples_split_below_two_rejected() {
    let params = ForecasterParams { min_samples_split: 1, ..Default::default() };
    assert!(matches!(params.validate().unwrap_err(), ConfigError::InvalidMinSamplesSplit(1)));
}

#[test]
fn test_params_unknown_field_rejected() {
    let err = serde_yaml::from_str::<ForecasterParams>("n_estimators: 10\nlearning_rate: 0.1");
    assert!(err.is_err());
}

// ---------------------------------------------------------------------------
// PromotionThresholds
// ---------------------------------------------------------------------------

#[test]
fn test_thresholds_default_is_strict() {
    let thresholds = PromotionThresholds::default();
    assert_eq!(thresholds.regression_tolerance, 0.0);
    thresholds.validate().expect("default must validate");
}

#[test]
fn test_thresholds_negative_tolerance_rejected() {
    let thresholds = PromotionThresholds { regression_tolerance: -0.1 };
    assert!(matches!(
        thresholds.validate().unwrap_err(),
        ConfigError::InvalidRegressionTolerance(_)
    ));
}

#[test]
fn test_thresholds_nan_tolerance_rejected() {
    let thresholds = PromotionThresholds { regression_tolerance: f64::NAN };
    assert!(thresholds.validate().is_err());
}

// ---------------------------------------------------------------------------
// LifecycleConfig and file loading
// ---------------------------------------------------------------------------

#[test]
fn test_lifecycle_config_defaults() {
    let config = LifecycleConfig::default();
    assert_eq!(config.registry_dir, PathBuf::from("registry"));
    assert!(config.audit_log.is_none());
    assert_eq!(config.lock_wait(), Duration::from_secs(5));
}

#[test]
fn test_load_params_from_file() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("params.yaml");
    std::fs::write(&path, "n_estimators: 300\nmax_depth: 10\nrandom_state: 1\n")
        .expect("write should succeed");

    let params = load_params(&path).expect("load should succeed");
    assert_eq!(params.n_estimators, 300);
    assert_eq!(params.max_depth, MaxDepth::Bounded(10));
}

#[test]
fn test_load_params_fails_fast_on_invalid_values() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("params.yaml");
    std::fs::write(&path, "n_estimators: 0\n").expect("write should succeed");

    assert!(matches!(load_params(&path).unwrap_err(), ConfigError::InvalidNEstimators(0)));
}

#[test]
fn test_load_lifecycle_config_from_file() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("promover.yaml");
    std::fs::write(
        &path,
        "registry_dir: /var/lib/promover\naudit_log: audit.jsonl\nthresholds:\n  regression_tolerance: 0.05\nlock_wait_ms: 250\n",
    )
    .expect("write should succeed");

    let config = load_lifecycle_config(&path).expect("load should succeed");
    assert_eq!(config.registry_dir, PathBuf::from("/var/lib/promover"));
    assert_eq!(config.audit_log, Some(PathBuf::from("audit.jsonl")));
    assert_eq!(config.thresholds.regression_tolerance, 0.05);
    assert_eq!(config.lock_wait(), Duration::from_millis(250));
}

#[test]
fn test_load_lifecycle_config_missing_file() {
    assert!(matches!(
        load_lifecycle_config("/nonexistent/promover.yaml").unwrap_err(),
        ConfigError::Io(_)
    ));
}
