// Licensed under the Apache-2.0 license

use crate::i2c::common::BUFFER_LENGTH;
use crate::i2c::error::I2cError;

/// Fixed-capacity byte buffer with a cursor.
///
/// `cursor <= len <= BUFFER_LENGTH` holds after every method.
#[derive(Debug)]
pub struct TransactionBuffer {
    data: [u8; BUFFER_LENGTH],
    cursor: usize,
    len: usize,
}

impl Default for TransactionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: [0; BUFFER_LENGTH],
            cursor: 0,
            len: 0,
        }
    }

    /// Copy `bytes` in as the sequence to transmit.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), I2cError> {
        let slot = self
            .data
            .get_mut(..bytes.len())
            .ok_or(I2cError::OutOfCapacity)?;
        slot.copy_from_slice(bytes);
        self.cursor = 0;
        self.len = bytes.len();
        Ok(())
    }

    /// Prepare to receive up to `len` bytes (clamped to capacity).
    pub fn arm(&mut self, len: usize) {
        self.cursor = 0;
        self.len = len.min(BUFFER_LENGTH);
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.len = 0;
    }

    /// Next byte to transmit, advancing the cursor.
    pub fn next_byte(&mut self) -> Option<u8> {
        if self.cursor >= self.len {
            return None;
        }
        let byte = self.data.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(byte)
    }

    /// Store a received byte. Returns false when the armed length is exhausted.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.cursor >= self.len {
            return false;
        }
        match self.data.get_mut(self.cursor) {
            Some(slot) => {
                *slot = byte;
                self.cursor += 1;
                true
            }
            None => false,
        }
    }

    /// Bytes already transmitted or received.
    #[must_use]
    pub fn filled(&self) -> &[u8] {
        self.data.get(..self.cursor).unwrap_or_default()
    }

    /// Whole backing store, handed to the slave transmit callback.
    pub fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.len.saturating_sub(self.cursor)
    }
}
