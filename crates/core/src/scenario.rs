// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::analyzer::{AnalyzerError, EdgeAnalyzer};
use crate::device::{
    DeviceModel, REG_EN_OUT_HI, REG_EN_OUT_LO, REG_EN_PWM_LO, REG_PWM_DUTY,
};
use crate::encoder::SpiEncoder;
use crate::frame::{FrameError, Transaction};
use crate::signals::{DigitalLevel, InputPins, OutputLine};
use crate::testbench::Testbench;
use pulsebench_config::HarnessConfig;

/// Addresses outside the implemented register map, used by the
/// negative-path scenario.
const UNMAPPED_ADDR: u16 = 0x30;
const UNMAPPED_ADDR_2: u16 = 0x41;

/// The PWM output observed by the waveform scenarios.
const PWM_LINE: OutputLine = OutputLine::PortA(0);

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error("{port} reads {actual:#04x}, expected {expected:#04x}")]
    PortMismatch {
        port: &'static str,
        actual: u8,
        expected: u8,
    },
    #[error("frequency {measured_hz:.1} Hz outside [{min_hz:.1}, {max_hz:.1}] Hz")]
    FrequencyOutOfBand {
        measured_hz: f64,
        min_hz: f64,
        max_hz: f64,
    },
    #[error("duty cycle {measured_percent}% != expected {expected_percent}%")]
    DutyMismatch {
        measured_percent: f64,
        expected_percent: f64,
    },
}

/// The scenarios the harness knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    RegisterFile,
    Addressing,
    PwmFrequency,
    PwmDuty,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::RegisterFile,
        ScenarioKind::Addressing,
        ScenarioKind::PwmFrequency,
        ScenarioKind::PwmDuty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScenarioKind::RegisterFile => "register_file",
            ScenarioKind::Addressing => "addressing",
            ScenarioKind::PwmFrequency => "pwm_frequency",
            ScenarioKind::PwmDuty => "pwm_duty",
        }
    }
}

/// Outcome of one named scenario, as surfaced to reporting.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Sequences encoder calls and analyzer measurements into end-to-end
/// scenarios against one testbench.
pub struct ScenarioDriver<'a, D: DeviceModel> {
    tb: &'a mut Testbench<D>,
    encoder: SpiEncoder,
    analyzer: EdgeAnalyzer,
    frequency_min_hz: f64,
    frequency_max_hz: f64,
    duty_target_percent: f64,
    reset_assert_ticks: u64,
    reset_settle_ticks: u64,
}

impl<'a, D: DeviceModel> ScenarioDriver<'a, D> {
    pub fn from_config(tb: &'a mut Testbench<D>, config: &HarnessConfig) -> Self {
        Self {
            tb,
            encoder: SpiEncoder::new(
                config.timing.sclk_half_period_ns,
                config.timing.post_frame_idle_ticks,
            ),
            analyzer: EdgeAnalyzer::new(
                config.timing.liveness_timeout_ns,
                config.timing.steady_window_ns,
            ),
            frequency_min_hz: config.tolerance.frequency_min_hz,
            frequency_max_hz: config.tolerance.frequency_max_hz,
            duty_target_percent: config.tolerance.duty_target_percent,
            reset_assert_ticks: config.timing.reset_assert_ticks,
            reset_settle_ticks: config.timing.reset_settle_ticks,
        }
    }

    /// Pulse the active-low reset line, then let the device settle.
    pub fn reset(&mut self) {
        tracing::info!("resetting device");
        self.tb.set_pins(InputPins::idle());
        self.tb.set_pin(InputPins::RST_N, DigitalLevel::Low);
        self.tb.advance(self.reset_assert_ticks);
        self.tb.set_pin(InputPins::RST_N, DigitalLevel::High);
        self.tb.advance(self.reset_settle_ticks);
    }

    pub fn write(&mut self, address: u16, data: u16) -> Result<(), ScenarioError> {
        let txn = Transaction::write(address, data)?;
        self.encoder.send(self.tb, &txn);
        Ok(())
    }

    pub fn read(&mut self, address: u16, data: u16) -> Result<(), ScenarioError> {
        let txn = Transaction::read(address, data)?;
        self.encoder.send(self.tb, &txn);
        Ok(())
    }

    /// Run one scenario and fold its outcome into a report.
    pub fn run(&mut self, kind: ScenarioKind) -> ScenarioReport {
        tracing::info!(scenario = kind.name(), "running scenario");
        let result = match kind {
            ScenarioKind::RegisterFile => self.register_file(),
            ScenarioKind::Addressing => self.addressing(),
            ScenarioKind::PwmFrequency => self.pwm_frequency(),
            ScenarioKind::PwmDuty => self.pwm_duty(),
        };
        match result {
            Ok(()) => {
                tracing::info!(scenario = kind.name(), "PASS");
                ScenarioReport {
                    name: kind.name().to_string(),
                    passed: true,
                    detail: None,
                }
            }
            Err(e) => {
                tracing::error!(scenario = kind.name(), error = %e, "FAIL");
                ScenarioReport {
                    name: kind.name().to_string(),
                    passed: false,
                    detail: Some(e.to_string()),
                }
            }
        }
    }

    pub fn run_all(&mut self, kinds: &[ScenarioKind]) -> Vec<ScenarioReport> {
        kinds.iter().map(|kind| self.run(*kind)).collect()
    }

    /// Every value written to an output-enable register must be
    /// observable unchanged on the matching port.
    fn register_file(&mut self) -> Result<(), ScenarioError> {
        self.reset();
        for data in [0x00, 0xF0, 0xCC, 0xFF] {
            self.write(REG_EN_OUT_LO, data)?;
            self.expect_port_a(data as u8)?;
        }
        self.write(REG_EN_OUT_HI, 0xCC)?;
        self.expect_port_b(0xCC)?;
        Ok(())
    }

    /// Writes to unmapped addresses and read-direction transactions
    /// must leave device-visible state untouched.
    fn addressing(&mut self) -> Result<(), ScenarioError> {
        self.reset();
        self.write(REG_EN_OUT_LO, 0xF0)?;
        self.expect_port_a(0xF0)?;

        self.write(UNMAPPED_ADDR, 0xAA)?;
        self.expect_port_a(0xF0)?;
        self.expect_port_b(0x00)?;

        self.read(REG_EN_OUT_LO, 0xBE)?;
        self.expect_port_a(0xF0)?;
        self.read(UNMAPPED_ADDR_2, 0xEF)?;
        self.expect_port_a(0xF0)?;
        Ok(())
    }

    /// With the generator at 50% duty, the output frequency must land
    /// inside the configured tolerance band.
    fn pwm_frequency(&mut self) -> Result<(), ScenarioError> {
        self.reset();
        self.enable_pwm(0x80)?;
        let m = self.analyzer.measure_frequency(self.tb, PWM_LINE)?;
        tracing::info!(frequency_hz = m.frequency_hz, "measured PWM frequency");
        if m.frequency_hz < self.frequency_min_hz || m.frequency_hz > self.frequency_max_hz {
            return Err(ScenarioError::FrequencyOutOfBand {
                measured_hz: m.frequency_hz,
                min_hz: self.frequency_min_hz,
                max_hz: self.frequency_max_hz,
            });
        }
        Ok(())
    }

    /// Duty must match the target exactly at setting 0x80, and the
    /// boundary settings must produce edge-free windows.
    fn pwm_duty(&mut self) -> Result<(), ScenarioError> {
        self.reset();
        self.enable_pwm(0x80)?;
        let d = self.analyzer.measure_duty(self.tb, PWM_LINE)?;
        tracing::info!(duty_percent = d.duty_percent, "measured PWM duty cycle");
        if d.duty_percent != self.duty_target_percent {
            return Err(ScenarioError::DutyMismatch {
                measured_percent: d.duty_percent,
                expected_percent: self.duty_target_percent,
            });
        }

        self.write(REG_PWM_DUTY, 0x00)?;
        self.analyzer
            .expect_steady(self.tb, PWM_LINE, DigitalLevel::Low)?;

        self.write(REG_PWM_DUTY, 0xFF)?;
        self.analyzer
            .expect_steady(self.tb, PWM_LINE, DigitalLevel::High)?;
        Ok(())
    }

    fn enable_pwm(&mut self, duty: u16) -> Result<(), ScenarioError> {
        self.write(REG_EN_OUT_LO, 0x01)?;
        self.write(REG_EN_PWM_LO, 0x01)?;
        self.write(REG_PWM_DUTY, duty)?;
        self.tb.advance(5);
        Ok(())
    }

    fn expect_port_a(&self, expected: u8) -> Result<(), ScenarioError> {
        let actual = self.tb.port_a();
        if actual != expected {
            return Err(ScenarioError::PortMismatch {
                port: "port A",
                actual,
                expected,
            });
        }
        Ok(())
    }

    fn expect_port_b(&self, expected: u8) -> Result<(), ScenarioError> {
        let actual = self.tb.port_b();
        if actual != expected {
            return Err(ScenarioError::PortMismatch {
                port: "port B",
                actual,
                expected,
            });
        }
        Ok(())
    }
}
