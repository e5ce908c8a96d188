//! Layout region untuk `RawRing`
//!
//! Layout:
//! ┌─────────────────────────────────────────────────────┐
//! │ RingHeader (40 bytes, fixed, little-endian u64)     │
//! ├─────────────────────────────────────────────────────┤
//! │ Slots: (capacity + 1) * element_size bytes          │
//! └─────────────────────────────────────────────────────┘
//!
//! Header ditulis field per field sebagai bytes, jadi region tidak perlu
//! aligned dan bisa di-copy verbatim ke address mana pun.

use crate::core::Cursors;
use crate::error::{Corruption, RingError, RingResult};

pub const MAGIC: u64 = 0x52454C52494E4731; // "RELRING1" in hex
pub const HEADER_SIZE: usize = 5 * WORD;

const WORD: usize = std::mem::size_of::<u64>();
const MAGIC_OFFSET: usize = 0;
const SLOTS_OFFSET: usize = WORD;
const ELEMENT_SIZE_OFFSET: usize = 2 * WORD;
const HEAD_OFFSET: usize = 3 * WORD;
const TAIL_OFFSET: usize = 4 * WORD;

/// Total bytes yang dibutuhkan: header + (capacity + 1) slot.
pub fn required_size(capacity: usize, element_size: usize) -> RingResult<usize> {
    if capacity == 0 {
        return Err(RingError::ZeroCapacity);
    }
    if element_size == 0 {
        return Err(RingError::ZeroElementSize);
    }

    capacity
        .checked_add(1)
        .and_then(|slots| slots.checked_mul(element_size))
        .and_then(|bytes| bytes.checked_add(HEADER_SIZE))
        .ok_or(RingError::SizeOverflow)
}

/// Metadata di awal region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingHeader {
    pub cursors: Cursors,
    pub element_size: usize,
}

impl RingHeader {
    /// Bytes yang dipakai header + slot (tanpa trailing bytes region)
    #[inline(always)]
    pub fn used_size(&self) -> usize {
        HEADER_SIZE + self.cursors.slots() * self.element_size
    }

    /// Tulis seluruh header ke awal region.
    ///
    /// Caller harus memastikan `region.len() >= HEADER_SIZE`.
    pub fn write_to(&self, region: &mut [u8]) {
        put_word(region, MAGIC_OFFSET, MAGIC);
        put_word(region, SLOTS_OFFSET, self.cursors.slots() as u64);
        put_word(region, ELEMENT_SIZE_OFFSET, self.element_size as u64);
        self.write_cursors(region);
    }

    /// Hanya update head/tail (hot path push/pop)
    #[inline(always)]
    pub fn write_cursors(&self, region: &mut [u8]) {
        put_word(region, HEAD_OFFSET, self.cursors.head() as u64);
        put_word(region, TAIL_OFFSET, self.cursors.tail() as u64);
    }

    /// Baca dan validasi header dari region.
    ///
    /// Cek magic, geometry terhadap panjang region, dan range cursor.
    pub fn read_from(region: &[u8]) -> RingResult<Self> {
        if region.len() < HEADER_SIZE {
            return Err(RingError::RegionTooSmall {
                required: HEADER_SIZE,
                actual: region.len(),
            });
        }

        let magic = get_word(region, MAGIC_OFFSET);
        if magic != MAGIC {
            return Err(Corruption::Magic { found: magic }.into());
        }

        let slots = word_to_usize(get_word(region, SLOTS_OFFSET));
        let element_size = word_to_usize(get_word(region, ELEMENT_SIZE_OFFSET));
        let head = word_to_usize(get_word(region, HEAD_OFFSET));
        let tail = word_to_usize(get_word(region, TAIL_OFFSET));

        let geometry = Corruption::Geometry {
            slots,
            element_size,
        };
        if slots < 2 || element_size == 0 {
            return Err(geometry.into());
        }
        let required = required_size(slots - 1, element_size).map_err(|_| geometry)?;
        if region.len() < required {
            return Err(RingError::RegionTooSmall {
                required,
                actual: region.len(),
            });
        }

        let cursors = Cursors::from_raw(head, tail, slots);
        cursors.validate()?;

        Ok(Self {
            cursors,
            element_size,
        })
    }
}

#[inline(always)]
fn put_word(region: &mut [u8], offset: usize, value: u64) {
    region[offset..offset + WORD].copy_from_slice(&value.to_le_bytes());
}

#[inline(always)]
fn get_word(region: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; WORD];
    bytes.copy_from_slice(&region[offset..offset + WORD]);
    u64::from_le_bytes(bytes)
}

// Nilai di luar usize dipetakan ke usize::MAX supaya gagal di validasi
#[inline(always)]
fn word_to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_size() {
        assert_eq!(HEADER_SIZE, 40);
        assert_eq!(required_size(2, 4).unwrap(), 40 + 3 * 4);
        assert_eq!(required_size(1, 1).unwrap(), 42);
        assert_eq!(required_size(0, 4), Err(RingError::ZeroCapacity));
        assert_eq!(required_size(4, 0), Err(RingError::ZeroElementSize));
        assert_eq!(required_size(usize::MAX, 1), Err(RingError::SizeOverflow));
        assert_eq!(
            required_size(usize::MAX / 2, 4),
            Err(RingError::SizeOverflow)
        );
    }

    #[test]
    fn test_header_write_read() {
        let header = RingHeader {
            cursors: Cursors::from_raw(2, 0, 3),
            element_size: 4,
        };
        let mut region = vec![0u8; header.used_size()];
        header.write_to(&mut region);

        assert_eq!(&region[..8], &MAGIC.to_le_bytes());
        assert_eq!(RingHeader::read_from(&region).unwrap(), header);
    }

    #[test]
    fn test_read_rejects_bad_magic() {
        let region = vec![0u8; 64];
        assert_eq!(
            RingHeader::read_from(&region),
            Err(RingError::Corrupt(Corruption::Magic { found: 0 }))
        );
    }

    #[test]
    fn test_read_rejects_short_region() {
        let header = RingHeader {
            cursors: Cursors::new(4).unwrap(),
            element_size: 8,
        };
        let mut region = vec![0u8; header.used_size()];
        header.write_to(&mut region);

        assert_eq!(
            RingHeader::read_from(&region[..header.used_size() - 1]),
            Err(RingError::RegionTooSmall {
                required: header.used_size(),
                actual: header.used_size() - 1,
            })
        );
        assert!(matches!(
            RingHeader::read_from(&region[..10]),
            Err(RingError::RegionTooSmall { required: 40, .. })
        ));
    }

    #[test]
    fn test_read_rejects_bad_cursor() {
        let header = RingHeader {
            cursors: Cursors::new(2).unwrap(),
            element_size: 4,
        };
        let mut region = vec![0u8; header.used_size()];
        header.write_to(&mut region);
        put_word(&mut region, TAIL_OFFSET, 3);

        assert!(matches!(
            RingHeader::read_from(&region),
            Err(RingError::Corrupt(Corruption::Cursor { position: 3, .. }))
        ));
    }

    #[test]
    fn test_read_rejects_bad_geometry() {
        let header = RingHeader {
            cursors: Cursors::new(2).unwrap(),
            element_size: 4,
        };
        let mut region = vec![0u8; header.used_size()];
        header.write_to(&mut region);
        put_word(&mut region, ELEMENT_SIZE_OFFSET, 0);

        assert!(matches!(
            RingHeader::read_from(&region),
            Err(RingError::Corrupt(Corruption::Geometry { .. }))
        ));

        put_word(&mut region, ELEMENT_SIZE_OFFSET, u64::MAX);
        assert!(RingHeader::read_from(&region).is_err());
    }
}
