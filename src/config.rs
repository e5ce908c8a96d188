//! Konfigurasi geometry ring buffer

use crate::core::{required_size, Cursors};
use crate::error::{RingError, RingResult};

/// Geometry ring: jumlah element dan ukuran tiap element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Jumlah element yang bisa disimpan (tanpa sentinel slot)
    pub capacity: usize,
    /// Stride tiap element dalam bytes
    pub element_size: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: 2,
            element_size: std::mem::size_of::<u32>(),
        }
    }
}

impl RingConfig {
    pub const fn new(capacity: usize, element_size: usize) -> Self {
        Self {
            capacity,
            element_size,
        }
    }

    /// Geometry untuk element bertipe `T`
    pub const fn for_type<T>(capacity: usize) -> Self {
        Self::new(capacity, std::mem::size_of::<T>())
    }

    pub fn validate(&self) -> RingResult<()> {
        self.required_size().map(|_| ())
    }

    /// Bytes region yang dibutuhkan `RawRing` dengan geometry ini
    pub fn required_size(&self) -> RingResult<usize> {
        required_size(self.capacity, self.element_size)
    }

    /// Total backing slot (capacity + 1)
    pub fn slots(&self) -> RingResult<usize> {
        if self.element_size == 0 {
            return Err(RingError::ZeroElementSize);
        }
        Cursors::new(self.capacity).map(|c| c.slots())
    }
}
