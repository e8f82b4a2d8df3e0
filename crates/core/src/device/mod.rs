// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

mod spi_pwm;

pub use spi_pwm::{
    SpiPwmDevice, REG_EN_OUT_HI, REG_EN_OUT_LO, REG_EN_PWM_HI, REG_EN_PWM_LO, REG_PWM_DUTY,
};

use crate::signals::InputPins;

/// A tick-evaluated model of the peripheral under test.
///
/// The harness never reaches into a model directly; it drives the input
/// pins through the testbench and observes the two 8-bit output ports.
pub trait DeviceModel: std::fmt::Debug + Send {
    /// Evaluate one clock tick with the given input pin levels.
    fn tick(&mut self, pins: InputPins);

    fn port_a(&self) -> u8;

    fn port_b(&self) -> u8;

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}
