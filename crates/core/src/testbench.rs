// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::device::DeviceModel;
use crate::signals::{DigitalLevel, InputPins, OutputLine};

/// Clocked execution environment for one device under test.
///
/// Owns the device model and the input pin record. All waiting in the
/// harness is expressed as tick advancement through this type; one tick
/// equals `tick_period_ns` of simulated time. Access is serialized by
/// the single-threaded cooperative model, so no locking exists here; a
/// parallel reimplementation would need a guard around the pin record.
pub struct Testbench<D: DeviceModel> {
    device: D,
    pins: InputPins,
    ticks: u64,
    tick_period_ns: u64,
}

impl<D: DeviceModel> Testbench<D> {
    pub fn new(device: D, tick_period_ns: u64) -> Self {
        Self {
            device,
            pins: InputPins::idle(),
            ticks: 0,
            tick_period_ns,
        }
    }

    /// Advance simulated time by `n` ticks, evaluating the device once
    /// per tick with the current pin levels.
    pub fn advance(&mut self, n: u64) {
        for _ in 0..n {
            self.device.tick(self.pins);
            self.ticks += 1;
        }
    }

    /// Simulated time in nanoseconds. Used for timeout accounting and
    /// diagnostics only.
    pub fn now_ns(&self) -> u64 {
        self.ticks * self.tick_period_ns
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick_period_ns(&self) -> u64 {
        self.tick_period_ns
    }

    pub fn pins(&self) -> InputPins {
        self.pins
    }

    /// Replace the whole pin record. Takes effect at the next tick.
    pub fn set_pins(&mut self, pins: InputPins) {
        self.pins = pins;
    }

    pub fn set_pin(&mut self, pin: InputPins, level: DigitalLevel) {
        self.pins.set(pin, level.into());
    }

    /// Sample one observation line at the current tick.
    pub fn sample(&self, line: OutputLine) -> DigitalLevel {
        let (port, bit) = match line {
            OutputLine::PortA(bit) => (self.device.port_a(), bit),
            OutputLine::PortB(bit) => (self.device.port_b(), bit),
        };
        ((port >> bit) & 1 == 1).into()
    }

    pub fn port_a(&self) -> u8 {
        self.device.port_a()
    }

    pub fn port_b(&self) -> u8 {
        self.device.port_b()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_snapshot(&self) -> serde_json::Value {
        self.device.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Device that mirrors COPI onto port A bit 0, one tick delayed.
    #[derive(Debug, Default)]
    struct Loopback {
        out: u8,
    }

    impl DeviceModel for Loopback {
        fn tick(&mut self, pins: InputPins) {
            self.out = pins.contains(InputPins::COPI) as u8;
        }

        fn port_a(&self) -> u8 {
            self.out
        }

        fn port_b(&self) -> u8 {
            0
        }
    }

    #[test]
    fn test_time_advances_in_ticks() {
        let mut tb = Testbench::new(Loopback::default(), 100);
        assert_eq!(tb.now_ns(), 0);
        tb.advance(5);
        assert_eq!(tb.ticks(), 5);
        assert_eq!(tb.now_ns(), 500);
    }

    #[test]
    fn test_pins_take_effect_on_next_tick() {
        let mut tb = Testbench::new(Loopback::default(), 100);
        tb.set_pin(InputPins::COPI, DigitalLevel::High);
        assert_eq!(tb.sample(OutputLine::PortA(0)), DigitalLevel::Low);
        tb.advance(1);
        assert_eq!(tb.sample(OutputLine::PortA(0)), DigitalLevel::High);
    }
}
