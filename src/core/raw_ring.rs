//! Byte-stride ring buffer di dalam memory milik caller
//!
//! Header dan slot hidup di satu region `&mut [u8]`. Ring tidak pernah
//! alokasi sendiri; caller menyiapkan region sebesar `required_size()`
//! (heap `Vec<u8>`, `MmapRegion`, stack array, dll).
//!
//! Karena cursor di header adalah index relatif terhadap slot base,
//! region bisa di-copy verbatim ke address lain lalu di-`attach` ulang.

use tracing::{debug, warn};

use crate::core::layout::{required_size, RingHeader, HEADER_SIZE};
use crate::core::Cursors;
use crate::error::{Corruption, CursorKind, RingError, RingResult};

/// Ring buffer dengan element berukuran tetap `element_size` bytes
pub struct RawRing<'a> {
    region: &'a mut [u8],
    header: RingHeader,
}

impl<'a> RawRing<'a> {
    /// Layout ring baru di `region` dengan `capacity` slot yang bisa dipakai.
    ///
    /// Region boleh lebih besar dari `required_size()`; sisa bytes diabaikan.
    pub fn new(region: &'a mut [u8], capacity: usize, element_size: usize) -> RingResult<Self> {
        let required = required_size(capacity, element_size)?;
        if region.len() < required {
            return Err(RingError::RegionTooSmall {
                required,
                actual: region.len(),
            });
        }

        let header = RingHeader {
            cursors: Cursors::new(capacity)?,
            element_size,
        };
        header.write_to(region);

        debug!(
            capacity,
            element_size,
            region_len = region.len(),
            "ring initialized"
        );

        Ok(Self { region, header })
    }

    /// Buka kembali region yang sudah di-layout oleh `new()`.
    pub fn attach(region: &'a mut [u8]) -> RingResult<Self> {
        let header = RingHeader::read_from(region).map_err(|e| {
            warn!(error = %e, region_len = region.len(), "attach rejected region");
            e
        })?;

        debug!(
            head = header.cursors.head(),
            tail = header.cursors.tail(),
            slots = header.cursors.slots(),
            "ring attached"
        );

        Ok(Self { region, header })
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.header.cursors.capacity()
    }

    #[inline(always)]
    pub fn element_size(&self) -> usize {
        self.header.element_size
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.header.cursors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.header.cursors.is_empty()
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.header.cursors.is_full()
    }

    /// Bytes region yang dipakai header + slot
    #[inline(always)]
    pub fn used_size(&self) -> usize {
        self.header.used_size()
    }

    #[inline(always)]
    pub fn cursors(&self) -> Cursors {
        self.header.cursors
    }

    /// Base address slot saat ini (untuk diagnostik relokasi)
    #[inline(always)]
    pub fn slot_base(&self) -> *const u8 {
        self.region[HEADER_SIZE..].as_ptr()
    }

    /// Copy `element` ke slot di tail.
    ///
    /// Gagal dengan `Full` tanpa overwrite jika tidak ada slot kosong.
    #[inline(always)]
    pub fn push(&mut self, element: &[u8]) -> RingResult<()> {
        self.check_element(element.len())?;
        if self.header.cursors.is_full() {
            return Err(RingError::Full);
        }

        let slot = self.header.cursors.advance_tail();
        let range = self.slot_range(slot);
        self.region[range].copy_from_slice(element);
        self.header.write_cursors(self.region);

        Ok(())
    }

    /// Copy element terdepan ke `out`, lalu majukan head.
    #[inline(always)]
    pub fn pop(&mut self, out: &mut [u8]) -> RingResult<()> {
        self.check_element(out.len())?;
        if self.header.cursors.is_empty() {
            return Err(RingError::Empty);
        }

        let slot = self.header.cursors.advance_head();
        out.copy_from_slice(&self.region[self.slot_range(slot)]);
        self.header.write_cursors(self.region);

        Ok(())
    }

    /// Lihat element terdepan tanpa pop
    #[inline(always)]
    pub fn peek(&self) -> Option<&[u8]> {
        self.header
            .cursors
            .front()
            .map(|slot| &self.region[self.slot_range(slot)])
    }

    /// Kosongkan ring. Isi slot tidak di-zero.
    pub fn clear(&mut self) {
        self.header.cursors.reset();
        self.header.write_cursors(self.region);
    }

    /// Cek cursor terhadap base saat ini dan header di region.
    pub fn validate(&self) -> RingResult<()> {
        let result = self.check_consistency();
        if let Err(ref e) = result {
            warn!(
                error = %e,
                head = self.header.cursors.head(),
                tail = self.header.cursors.tail(),
                "ring validation failed"
            );
        }
        result
    }

    /// Copy ring ke `dest` (relokasi non-destruktif).
    ///
    /// Header + slot di-copy byte per byte. Cursor di-rebase sebagai
    /// offset dari slot base lama yang diterapkan ke slot base baru.
    pub fn relocate<'b>(&self, dest: &'b mut [u8]) -> RingResult<RawRing<'b>> {
        let used = self.used_size();
        if dest.len() < used {
            return Err(RingError::RegionTooSmall {
                required: used,
                actual: dest.len(),
            });
        }

        dest[..used].copy_from_slice(&self.region[..used]);

        let mut moved = RawRing {
            region: dest,
            header: RingHeader {
                cursors: self.header.cursors,
                element_size: self.header.element_size,
            },
        };
        moved.header.write_to(moved.region);
        moved.validate()?;

        debug!(
            from = ?self.slot_base(),
            to = ?moved.slot_base(),
            len = moved.len(),
            "ring relocated"
        );

        Ok(moved)
    }

    /// Pindahkan ring ke `dest`; ring sumber di-reset ke kosong.
    ///
    /// Jika gagal, sumber tidak berubah.
    pub fn relocate_move<'b>(&mut self, dest: &'b mut [u8]) -> RingResult<RawRing<'b>> {
        let moved = self.relocate(dest)?;
        self.clear();
        Ok(moved)
    }

    fn check_consistency(&self) -> RingResult<()> {
        self.header.cursors.validate()?;

        let stored = RingHeader::read_from(self.region)?;
        let ours = self.header.cursors;
        let theirs = stored.cursors;
        if theirs.slots() != ours.slots() || stored.element_size != self.header.element_size {
            return Err(Corruption::Geometry {
                slots: theirs.slots(),
                element_size: stored.element_size,
            }
            .into());
        }

        let (cursor, position) = if theirs.head() != ours.head() {
            (CursorKind::Head, theirs.head())
        } else if theirs.tail() != ours.tail() {
            (CursorKind::Tail, theirs.tail())
        } else {
            return Ok(());
        };
        Err(Corruption::Cursor {
            cursor,
            position,
            slots: theirs.slots(),
        }
        .into())
    }

    #[inline(always)]
    fn check_element(&self, len: usize) -> RingResult<()> {
        if len != self.header.element_size {
            return Err(RingError::ElementSize {
                expected: self.header.element_size,
                actual: len,
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn slot_range(&self, slot: usize) -> std::ops::Range<usize> {
        let start = HEADER_SIZE + slot * self.header.element_size;
        start..start + self.header.element_size
    }
}

impl std::fmt::Debug for RawRing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawRing")
            .field("head", &self.header.cursors.head())
            .field("tail", &self.header.cursors.tail())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("element_size", &self.header.element_size)
            .field("slot_base", &self.slot_base())
            .finish()
    }
}
