// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod analyzer;
pub mod device;
pub mod encoder;
pub mod frame;
pub mod scenario;
pub mod signals;
pub mod testbench;

pub use analyzer::{DutyMeasurement, EdgeAnalyzer, Measurement};
pub use device::{DeviceModel, SpiPwmDevice};
pub use encoder::SpiEncoder;
pub use frame::{Direction, Frame, Transaction};
pub use scenario::{ScenarioDriver, ScenarioKind, ScenarioReport};
pub use signals::{DigitalLevel, InputPins, OutputLine};
pub use testbench::Testbench;
