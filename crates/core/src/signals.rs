// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// Represents a digital signal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum DigitalLevel {
    #[default]
    Low,
    High,
}

impl From<bool> for DigitalLevel {
    fn from(b: bool) -> Self {
        if b {
            DigitalLevel::High
        } else {
            DigitalLevel::Low
        }
    }
}

impl From<DigitalLevel> for bool {
    fn from(level: DigitalLevel) -> Self {
        match level {
            DigitalLevel::High => true,
            DigitalLevel::Low => false,
        }
    }
}

bitflags::bitflags! {
    /// Input pins of the device under test, one bit per line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InputPins: u8 {
        /// Serial clock.
        const SCLK = 1 << 0;
        /// Serial data, controller out.
        const COPI = 1 << 1;
        /// Chip select, active low.
        const NCS = 1 << 2;
        /// Reset, active low.
        const RST_N = 1 << 3;
    }
}

impl InputPins {
    /// Bus idle: chip deselected, reset released, clock and data low.
    pub fn idle() -> Self {
        Self::NCS | Self::RST_N
    }

    pub fn with_level(mut self, pin: InputPins, level: DigitalLevel) -> Self {
        self.set(pin, level.into());
        self
    }
}

impl Default for InputPins {
    fn default() -> Self {
        Self::idle()
    }
}

/// Addresses one bit of the device's observable output ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLine {
    PortA(u8),
    PortB(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bool_roundtrip() {
        assert_eq!(DigitalLevel::from(true), DigitalLevel::High);
        assert_eq!(DigitalLevel::from(false), DigitalLevel::Low);
        let b: bool = DigitalLevel::High.into();
        assert!(b);
    }

    #[test]
    fn test_idle_pins() {
        let pins = InputPins::idle();
        assert!(pins.contains(InputPins::NCS));
        assert!(pins.contains(InputPins::RST_N));
        assert!(!pins.contains(InputPins::SCLK));
        assert!(!pins.contains(InputPins::COPI));
    }

    #[test]
    fn test_with_level() {
        let pins = InputPins::idle()
            .with_level(InputPins::NCS, DigitalLevel::Low)
            .with_level(InputPins::COPI, DigitalLevel::High);
        assert!(!pins.contains(InputPins::NCS));
        assert!(pins.contains(InputPins::COPI));
    }
}
