// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::signals::DigitalLevel;

/// Transfer direction of a transaction. Encoded in bit 15 of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("address {0:#x} does not fit 7 bits (0-127)")]
    AddressOutOfRange(u16),
    #[error("data {0:#x} does not fit 8 bits (0-255)")]
    DataOutOfRange(u16),
}

/// A validated (direction, address, data) triple.
///
/// Construction is the only place range checks happen: a `Transaction`
/// that exists always fits the wire format, so nothing downstream can
/// emit a partial or malformed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    direction: Direction,
    address: u8,
    data: u8,
}

impl Transaction {
    pub fn new(direction: Direction, address: u16, data: u16) -> Result<Self, FrameError> {
        if address > 0x7F {
            return Err(FrameError::AddressOutOfRange(address));
        }
        if data > 0xFF {
            return Err(FrameError::DataOutOfRange(data));
        }
        Ok(Self {
            direction,
            address: address as u8,
            data: data as u8,
        })
    }

    pub fn write(address: u16, data: u16) -> Result<Self, FrameError> {
        Self::new(Direction::Write, address, data)
    }

    pub fn read(address: u16, data: u16) -> Result<Self, FrameError> {
        Self::new(Direction::Read, address, data)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn data(&self) -> u8 {
        self.data
    }
}

/// The 16-bit wire form of one transaction: bit 15 direction (1 =
/// write), bits 14-8 address, bits 7-0 data. Transmitted most
/// significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame(u16);

impl Frame {
    pub fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    /// Recover the transaction this frame encodes.
    pub fn decode(self) -> Transaction {
        let direction = if self.0 & 0x8000 != 0 {
            Direction::Write
        } else {
            Direction::Read
        };
        Transaction {
            direction,
            address: ((self.0 >> 8) & 0x7F) as u8,
            data: (self.0 & 0xFF) as u8,
        }
    }

    /// Bit levels in transmission order, most significant bit first.
    pub fn bits(self) -> impl Iterator<Item = DigitalLevel> {
        (0..16).rev().map(move |i| ((self.0 >> i) & 1 == 1).into())
    }
}

impl From<Transaction> for Frame {
    fn from(txn: Transaction) -> Self {
        let dir = matches!(txn.direction, Direction::Write) as u16;
        Frame((dir << 15) | ((txn.address as u16) << 8) | txn.data as u16)
    }
}
