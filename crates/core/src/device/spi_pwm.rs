// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::device::DeviceModel;
use crate::frame::{Direction, Frame};
use crate::signals::InputPins;

/// Output enable for port A pins.
pub const REG_EN_OUT_LO: u16 = 0x00;
/// Output enable for port B pins.
pub const REG_EN_OUT_HI: u16 = 0x01;
/// PWM routing for port A pins.
pub const REG_EN_PWM_LO: u16 = 0x02;
/// PWM routing for port B pins.
pub const REG_EN_PWM_HI: u16 = 0x03;
/// PWM duty setting: 0x00 = 0%, 0x80 = 50%, 0xFF = 100%.
pub const REG_PWM_DUTY: u16 = 0x04;

/// PWM time base divider. At a 10 MHz tick the 8-bit counter wraps
/// every 13 * 256 = 3328 ticks, giving 3004.8 Hz.
const PWM_PRESCALER: u32 = 13;

/// Reference model of the SPI-controlled PWM peripheral.
///
/// SPI mode 0 slave: COPI is sampled on SCLK rising edges while nCS is
/// low; a frame is 16 bits and write frames commit on the final bit.
/// Read-direction frames and unmapped addresses are ignored without
/// touching any register. RST_N low clears the whole device.
#[derive(Debug, Default, serde::Serialize)]
pub struct SpiPwmDevice {
    en_out_lo: u8,
    en_out_hi: u8,
    en_pwm_lo: u8,
    en_pwm_hi: u8,
    duty: u8,
    pwm_counter: u8,

    #[serde(skip)]
    pwm_prescaler_cnt: u32,
    #[serde(skip)]
    shift: u16,
    #[serde(skip)]
    bit_count: u8,
    #[serde(skip)]
    prev_sclk: bool,
    #[serde(skip)]
    prev_ncs: bool,
}

impl SpiPwmDevice {
    pub fn new() -> Self {
        Self {
            prev_ncs: true,
            ..Default::default()
        }
    }

    fn commit(&mut self, frame: Frame) {
        let txn = frame.decode();
        if txn.direction() != Direction::Write {
            return;
        }
        match txn.address() as u16 {
            REG_EN_OUT_LO => self.en_out_lo = txn.data(),
            REG_EN_OUT_HI => self.en_out_hi = txn.data(),
            REG_EN_PWM_LO => self.en_pwm_lo = txn.data(),
            REG_EN_PWM_HI => self.en_pwm_hi = txn.data(),
            REG_PWM_DUTY => self.duty = txn.data(),
            // Unmapped addresses are silently ignored.
            _ => {}
        }
    }

    fn pwm_level(&self) -> bool {
        // 0xFF is forced full-on so the register covers 0..=100%.
        self.duty == 0xFF || self.pwm_counter < self.duty
    }

    fn port_bits(&self, en_out: u8, en_pwm: u8) -> u8 {
        let pwm = if self.pwm_level() { 0xFF } else { 0x00 };
        // A pin routed to PWM follows the generator; otherwise it
        // mirrors its output-enable bit.
        en_out & (!en_pwm | pwm)
    }
}

impl DeviceModel for SpiPwmDevice {
    fn tick(&mut self, pins: InputPins) {
        if !pins.contains(InputPins::RST_N) {
            *self = Self::new();
            return;
        }

        let ncs = pins.contains(InputPins::NCS);
        let sclk = pins.contains(InputPins::SCLK);

        // Deselect resynchronizes the bit counter.
        if ncs && !self.prev_ncs {
            self.shift = 0;
            self.bit_count = 0;
        }

        if !ncs && sclk && !self.prev_sclk {
            let bit = pins.contains(InputPins::COPI) as u16;
            self.shift = (self.shift << 1) | bit;
            self.bit_count += 1;
            if self.bit_count == 16 {
                self.commit(Frame::from_raw(self.shift));
                self.shift = 0;
                self.bit_count = 0;
            }
        }

        self.prev_sclk = sclk;
        self.prev_ncs = ncs;

        // Free-running PWM time base.
        self.pwm_prescaler_cnt += 1;
        if self.pwm_prescaler_cnt == PWM_PRESCALER {
            self.pwm_prescaler_cnt = 0;
            self.pwm_counter = self.pwm_counter.wrapping_add(1);
        }
    }

    fn port_a(&self) -> u8 {
        self.port_bits(self.en_out_lo, self.en_pwm_lo)
    }

    fn port_b(&self) -> u8 {
        self.port_bits(self.en_out_hi, self.en_pwm_hi)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
