// Licensed under the Apache-2.0 license

//! Interrupt event bitset.
//!
//! The low half mirrors the controller's first status register and the high half the
//! second one (role flags), which is how the hardware reports "last event" in one read.

use core::ops::{BitAnd, BitOr, BitOrAssign};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Event(u32);

impl Event {
    pub const START_SENT: Self = Self(0x0001);
    pub const ADDRESS_MATCHED: Self = Self(0x0002);
    pub const BYTE_TRANSFER_FINISHED: Self = Self(0x0004);
    pub const STOP_DETECTED: Self = Self(0x0010);
    pub const RX_NOT_EMPTY: Self = Self(0x0040);
    pub const TX_EMPTY: Self = Self(0x0080);
    pub const BUS_ERROR: Self = Self(0x0100);
    pub const ARBITRATION_LOST: Self = Self(0x0200);
    pub const ACK_FAILURE: Self = Self(0x0400);
    pub const OVERRUN: Self = Self(0x0800);
    pub const PEC_ERROR: Self = Self(0x1000);
    pub const TIMEOUT: Self = Self(0x4000);
    pub const SMBUS_ALERT: Self = Self(0x8000);

    pub const MASTER: Self = Self(0x0001 << 16);
    pub const BUSY: Self = Self(0x0002 << 16);
    pub const TRANSMITTER: Self = Self(0x0004 << 16);
    pub const GENERAL_CALL: Self = Self(0x0010 << 16);
    pub const DUAL_ADDRESS: Self = Self(0x0080 << 16);

    /// Flags that make the master transmitter load the next byte.
    pub const MASTER_TX_READY: Self =
        Self(Self::ADDRESS_MATCHED.0 | Self::BYTE_TRANSFER_FINISHED.0 | Self::TX_EMPTY.0);
    /// Flags that make the slave transmitter load the next byte.
    pub const SLAVE_TX_READY: Self = Self(Self::BYTE_TRANSFER_FINISHED.0 | Self::TX_EMPTY.0);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All flags of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one flag of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for Event {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Event {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Event {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
