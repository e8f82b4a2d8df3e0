// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_clock_period_ns() -> u64 {
    100 // 10 MHz tick
}

fn default_sclk_half_period_ns() -> u64 {
    5_000
}

fn default_reset_assert_ticks() -> u64 {
    5
}

fn default_reset_settle_ticks() -> u64 {
    5
}

fn default_post_frame_idle_ticks() -> u64 {
    600
}

fn default_liveness_timeout_ns() -> u64 {
    1_000_000
}

fn default_steady_window_ns() -> u64 {
    10_000
}

fn default_frequency_min_hz() -> f64 {
    2_970.0
}

fn default_frequency_max_hz() -> f64 {
    3_030.0
}

fn default_duty_target_percent() -> f64 {
    50.0
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroPeriod { field: &'static str },
    #[error("frequency band is inverted: min {min_hz} Hz > max {max_hz} Hz")]
    InvertedBand { min_hz: f64, max_hz: f64 },
    #[error("duty target {0}% is outside 0-100%")]
    DutyOutOfRange(f64),
}

/// Clocking, protocol, and wait-budget parameters of the harness, all
/// in simulated time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Duration of one tick of the driving clock, in nanoseconds.
    #[serde(default = "default_clock_period_ns")]
    pub clock_period_ns: u64,
    /// Minimum hold time for each serial-clock phase.
    #[serde(default = "default_sclk_half_period_ns")]
    pub sclk_half_period_ns: u64,
    #[serde(default = "default_reset_assert_ticks")]
    pub reset_assert_ticks: u64,
    #[serde(default = "default_reset_settle_ticks")]
    pub reset_settle_ticks: u64,
    /// Bus idle time after each frame before control returns.
    #[serde(default = "default_post_frame_idle_ticks")]
    pub post_frame_idle_ticks: u64,
    /// Budget for the analyzer's liveness search.
    #[serde(default = "default_liveness_timeout_ns")]
    pub liveness_timeout_ns: u64,
    /// Window for the 0%/100% duty boundary checks. Much shorter than
    /// the liveness budget on purpose.
    #[serde(default = "default_steady_window_ns")]
    pub steady_window_ns: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            clock_period_ns: default_clock_period_ns(),
            sclk_half_period_ns: default_sclk_half_period_ns(),
            reset_assert_ticks: default_reset_assert_ticks(),
            reset_settle_ticks: default_reset_settle_ticks(),
            post_frame_idle_ticks: default_post_frame_idle_ticks(),
            liveness_timeout_ns: default_liveness_timeout_ns(),
            steady_window_ns: default_steady_window_ns(),
        }
    }
}

/// Accepted bands for the waveform measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceConfig {
    #[serde(default = "default_frequency_min_hz")]
    pub frequency_min_hz: f64,
    #[serde(default = "default_frequency_max_hz")]
    pub frequency_max_hz: f64,
    /// Duty at setting 0x80 must match this exactly.
    #[serde(default = "default_duty_target_percent")]
    pub duty_target_percent: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            frequency_min_hz: default_frequency_min_hz(),
            frequency_max_hz: default_frequency_max_hz(),
            duty_target_percent: default_duty_target_percent(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
}

impl HarnessConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read harness config from {:?}", path))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse harness config from {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid harness config in {:?}", path))?;
        tracing::debug!(?path, "harness config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.timing.clock_period_ns == 0 {
            return Err(ConfigError::ZeroPeriod {
                field: "timing.clock_period_ns",
            });
        }
        if self.timing.sclk_half_period_ns == 0 {
            return Err(ConfigError::ZeroPeriod {
                field: "timing.sclk_half_period_ns",
            });
        }
        if self.timing.liveness_timeout_ns == 0 {
            return Err(ConfigError::ZeroPeriod {
                field: "timing.liveness_timeout_ns",
            });
        }
        if self.tolerance.frequency_min_hz > self.tolerance.frequency_max_hz {
            return Err(ConfigError::InvertedBand {
                min_hz: self.tolerance.frequency_min_hz,
                max_hz: self.tolerance.frequency_max_hz,
            });
        }
        if !(0.0..=100.0).contains(&self.tolerance.duty_target_percent) {
            return Err(ConfigError::DutyOutOfRange(
                self.tolerance.duty_target_percent,
            ));
        }
        Ok(())
    }
}
