// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::device::DeviceModel;
use crate::frame::{Frame, Transaction};
use crate::signals::{DigitalLevel, InputPins};
use crate::testbench::Testbench;

/// Serializes transactions onto the bus pins, one bit per serial-clock
/// period.
///
/// Each bit is placed on COPI while SCLK is low and held unchanged
/// across the rising edge; the device samples it on that edge. The
/// half-clock hold is polled once per tick against simulated time
/// because the driving clock only advances in discrete steps.
#[derive(Debug, Clone)]
pub struct SpiEncoder {
    sclk_half_period_ns: u64,
    post_frame_idle_ticks: u64,
}

impl SpiEncoder {
    pub fn new(sclk_half_period_ns: u64, post_frame_idle_ticks: u64) -> Self {
        Self {
            sclk_half_period_ns,
            post_frame_idle_ticks,
        }
    }

    /// Transmit one full 16-bit frame, then return the bus to idle and
    /// wait out the configured idle ticks.
    pub fn send<D: DeviceModel>(&self, tb: &mut Testbench<D>, txn: &Transaction) {
        let frame = Frame::from(*txn);
        tracing::debug!(frame = format_args!("{:#06x}", frame.raw()), "frame start");

        // Select the device with clock and data low.
        let pins = tb
            .pins()
            .with_level(InputPins::NCS, DigitalLevel::Low)
            .with_level(InputPins::SCLK, DigitalLevel::Low)
            .with_level(InputPins::COPI, DigitalLevel::Low);
        tb.set_pins(pins);
        tb.advance(1);

        for bit in frame.bits() {
            // Low clock phase: place the bit.
            tb.set_pin(InputPins::SCLK, DigitalLevel::Low);
            tb.set_pin(InputPins::COPI, bit);
            self.hold_half_period(tb);
            // High clock phase: COPI unchanged, the device samples here.
            tb.set_pin(InputPins::SCLK, DigitalLevel::High);
            self.hold_half_period(tb);
        }

        // Deselect and idle the bus.
        tb.set_pin(InputPins::SCLK, DigitalLevel::Low);
        tb.set_pin(InputPins::COPI, DigitalLevel::Low);
        tb.set_pin(InputPins::NCS, DigitalLevel::High);
        tb.advance(self.post_frame_idle_ticks);

        tracing::debug!(at_ns = tb.now_ns(), "frame end");
    }

    fn hold_half_period<D: DeviceModel>(&self, tb: &mut Testbench<D>) {
        let start = tb.now_ns();
        loop {
            tb.advance(1);
            if tb.now_ns() - start >= self.sclk_half_period_ns {
                break;
            }
        }
    }
}
