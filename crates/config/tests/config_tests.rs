// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use pulsebench_config::{ConfigError, HarnessConfig};

#[test]
fn test_empty_document_yields_defaults() {
    let config: HarnessConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.timing.clock_period_ns, 100);
    assert_eq!(config.timing.sclk_half_period_ns, 5_000);
    assert_eq!(config.timing.post_frame_idle_ticks, 600);
    assert_eq!(config.timing.liveness_timeout_ns, 1_000_000);
    assert_eq!(config.timing.steady_window_ns, 10_000);
    assert_eq!(config.tolerance.frequency_min_hz, 2_970.0);
    assert_eq!(config.tolerance.frequency_max_hz, 3_030.0);
    assert_eq!(config.tolerance.duty_target_percent, 50.0);
    config.validate().unwrap();
}

#[test]
fn test_partial_override_keeps_other_defaults() {
    let yaml = r#"
timing:
  clock_period_ns: 50
tolerance:
  frequency_min_hz: 5900.0
  frequency_max_hz: 6100.0
"#;
    let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.timing.clock_period_ns, 50);
    assert_eq!(config.timing.sclk_half_period_ns, 5_000);
    assert_eq!(config.tolerance.frequency_min_hz, 5_900.0);
    assert_eq!(config.tolerance.duty_target_percent, 50.0);
}

#[test]
fn test_zero_clock_period_rejected() {
    let yaml = r#"
timing:
  clock_period_ns: 0
"#;
    let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::ZeroPeriod {
            field: "timing.clock_period_ns"
        })
    );
}

#[test]
fn test_inverted_band_rejected() {
    let yaml = r#"
tolerance:
  frequency_min_hz: 4000.0
  frequency_max_hz: 3000.0
"#;
    let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvertedBand { .. })
    ));
}

#[test]
fn test_duty_target_out_of_range_rejected() {
    let yaml = r#"
tolerance:
  duty_target_percent: 120.0
"#;
    let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.validate(), Err(ConfigError::DutyOutOfRange(120.0)));
}

#[test]
fn test_from_file_roundtrip() {
    let dir = std::env::temp_dir().join("pulsebench-config-test");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("harness.yaml");
    std::fs::write(&path, "timing:\n  reset_assert_ticks: 8\n").unwrap();

    let config = HarnessConfig::from_file(&path).unwrap();
    assert_eq!(config.timing.reset_assert_ticks, 8);

    assert!(HarnessConfig::from_file(dir.join("missing.yaml")).is_err());
}
