//! Cursor arithmetic untuk circular queue dengan satu sentinel slot
//!
//! `slots = capacity + 1`. Satu slot selalu kosong supaya kondisi
//! full (`tail == head`) dan empty (`inc(head) == tail`) bisa dibedakan
//! tanpa counter terpisah.
//!
//! Cursor disimpan sebagai index relatif terhadap base storage, bukan
//! sebagai address. Address absolut hanya dihitung saat slot diakses.
//! Rebase ke storage lain (`dest.base + (src.head - src.base)`) karena itu
//! sama dengan index itu sendiri, jadi relokasi cukup menyalin `Cursors`.

use crate::error::{Corruption, CursorKind, RingError, RingResult};

/// Posisi head/tail dalam `slots` backing slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursors {
    // Slot sebelum element berikutnya yang akan di-pop
    head: usize,
    // Slot berikutnya yang akan ditulis oleh push
    tail: usize,
    slots: usize,
}

impl Cursors {
    /// Cursor untuk buffer kosong dengan `capacity` slot yang bisa dipakai.
    pub fn new(capacity: usize) -> RingResult<Self> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }
        let slots = capacity.checked_add(1).ok_or(RingError::SizeOverflow)?;

        Ok(Self {
            head: 0,
            tail: 1,
            slots,
        })
    }

    /// Rekonstruksi cursor dari nilai mentah, misalnya dari header region.
    ///
    /// Tidak ada validasi di sini; panggil `validate()` sebelum dipakai.
    #[inline(always)]
    pub const fn from_raw(head: usize, tail: usize, slots: usize) -> Self {
        Self { head, tail, slots }
    }

    #[inline(always)]
    pub const fn head(&self) -> usize {
        self.head
    }

    #[inline(always)]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    /// Total backing slot (capacity + 1)
    #[inline(always)]
    pub const fn slots(&self) -> usize {
        self.slots
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.slots - 1
    }

    /// Slot berikutnya, wrap dari `slots - 1` kembali ke 0
    #[inline(always)]
    pub const fn increment(&self, position: usize) -> usize {
        if position + 1 >= self.slots {
            0
        } else {
            position + 1
        }
    }

    #[inline(always)]
    pub const fn is_full(&self) -> bool {
        self.tail == self.head
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.increment(self.head) == self.tail
    }

    /// Jumlah element hidup
    #[inline(always)]
    pub const fn len(&self) -> usize {
        (self.tail + self.slots - self.head - 1) % self.slots
    }

    /// Slot tempat push berikutnya menulis, lalu majukan tail.
    ///
    /// Caller harus sudah memastikan buffer tidak penuh.
    #[inline(always)]
    pub fn advance_tail(&mut self) -> usize {
        debug_assert!(!self.is_full());
        let slot = self.tail;
        self.tail = self.increment(self.tail);
        slot
    }

    /// Slot tempat pop berikutnya membaca, lalu majukan head.
    ///
    /// Caller harus sudah memastikan buffer tidak kosong.
    #[inline(always)]
    pub fn advance_head(&mut self) -> usize {
        debug_assert!(!self.is_empty());
        self.head = self.increment(self.head);
        self.head
    }

    /// Slot element terdepan tanpa memajukan cursor
    #[inline(always)]
    pub const fn front(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.increment(self.head))
        }
    }

    /// Kembali ke state kosong: head = 0, tail = 1
    #[inline(always)]
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 1;
    }

    /// Pastikan head dan tail berada dalam `[0, slots)`.
    pub fn validate(&self) -> RingResult<()> {
        if self.slots < 2 {
            return Err(Corruption::Geometry {
                slots: self.slots,
                element_size: 0,
            }
            .into());
        }
        if self.head >= self.slots {
            return Err(Corruption::Cursor {
                cursor: CursorKind::Head,
                position: self.head,
                slots: self.slots,
            }
            .into());
        }
        if self.tail >= self.slots {
            return Err(Corruption::Cursor {
                cursor: CursorKind::Tail,
                position: self.tail,
                slots: self.slots,
            }
            .into());
        }
        Ok(())
    }
}
