//! Typed Fixed-Capacity Ring Buffer
//!
//! `capacity + 1` slot `MaybeUninit<T>` di-alokasi sekali di heap.
//! Tidak ada alokasi lagi setelah inisialisasi, kecuali relokasi yang
//! memang diminta caller.
//!
//! Cursor berupa index relatif terhadap base storage, jadi memindahkan
//! `RingBuffer` sebagai value (Rust move) tidak pernah membuat cursor basi.
//! Relokasi ke storage lain dilakukan eksplisit lewat `relocate*` /
//! `transfer*`.

use std::mem::{self, MaybeUninit};
use std::ptr;

use tracing::{debug, warn};

use crate::core::Cursors;
use crate::error::{Corruption, PushError, RingError, RingResult};

/// Backing storage: `slots` slot yang mungkin belum terinisialisasi
pub type Slots<T> = Box<[MaybeUninit<T>]>;

/// Alokasi storage kosong dengan `slots` slot.
///
/// Gagal dengan `SizeOverflow` jika `slots * size_of::<T>()` melewati
/// `isize::MAX` atau alokasi ditolak allocator.
pub fn alloc_slots<T>(slots: usize) -> RingResult<Slots<T>> {
    slots
        .checked_mul(mem::size_of::<T>())
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(RingError::SizeOverflow)?;

    // Alokasi buffer di heap untuk menghindari stack overflow
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(slots)
        .map_err(|_| RingError::SizeOverflow)?;
    buffer.resize_with(slots, MaybeUninit::uninit);
    Ok(buffer.into_boxed_slice())
}

/// Single-owner FIFO ring buffer
pub struct RingBuffer<T> {
    cursors: Cursors,
    buffer: Slots<T>,
}

impl<T> RingBuffer<T> {
    /// Membuat ring buffer dengan `capacity` slot yang bisa dipakai.
    ///
    /// Backing storage berisi `capacity + 1` slot (satu sentinel).
    pub fn new(capacity: usize) -> RingResult<Self> {
        let cursors = Cursors::new(capacity)?;
        let buffer = alloc_slots(cursors.slots())?;

        Ok(Self { cursors, buffer })
    }

    /// Membuat ring buffer di atas storage milik caller.
    ///
    /// `storage.len()` menentukan jumlah slot; capacity = `len - 1`.
    pub fn with_storage(storage: Slots<T>) -> RingResult<Self> {
        if storage.len() < 2 {
            return Err(RingError::ZeroCapacity);
        }
        let cursors = Cursors::new(storage.len() - 1)?;

        Ok(Self {
            cursors,
            buffer: storage,
        })
    }

    /// Push `value` ke tail.
    ///
    /// Jika penuh, `value` dikembalikan di dalam `PushError`.
    /// Tidak pernah overwrite element lama.
    #[inline(always)]
    pub fn push(&mut self, value: T) -> Result<(), PushError<T>> {
        if self.cursors.is_full() {
            return Err(PushError { element: value });
        }

        let slot = self.cursors.advance_tail();
        self.buffer[slot].write(value);

        Ok(())
    }

    /// Pop element terdepan.
    #[inline(always)]
    pub fn pop(&mut self) -> RingResult<T> {
        if self.cursors.is_empty() {
            return Err(RingError::Empty);
        }

        let slot = self.cursors.advance_head();

        // SAFETY: slot di antara head dan tail selalu sudah ditulis oleh push,
        // dan head baru saja melewatinya sehingga tidak akan dibaca lagi
        Ok(unsafe { self.buffer[slot].assume_init_read() })
    }

    /// Referensi ke element terdepan tanpa pop
    #[inline(always)]
    pub fn peek(&self) -> Option<&T> {
        self.cursors
            .front()
            // SAFETY: front() hanya mengembalikan slot yang hidup
            .map(|slot| unsafe { self.buffer[slot].assume_init_ref() })
    }

    /// Iterator element hidup, urutan FIFO
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            ring: self,
            position: self.cursors.head(),
            remaining: self.cursors.len(),
        }
    }

    // Index slot hidup dari depan ke belakang
    fn live_positions(&self) -> impl Iterator<Item = usize> {
        let cursors = self.cursors;
        std::iter::successors(cursors.front(), move |&p| Some(cursors.increment(p)))
            .take(cursors.len())
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.cursors.is_full()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cursors.capacity()
    }

    #[inline(always)]
    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    /// Base address storage saat ini (untuk diagnostik relokasi)
    #[inline(always)]
    pub fn base_ptr(&self) -> *const T {
        self.buffer.as_ptr().cast()
    }

    /// Drop semua element hidup dan kembali ke state kosong
    pub fn clear(&mut self) {
        while self.pop().is_ok() {}
        self.cursors.reset();
    }

    /// Cek head dan tail berada dalam storage saat ini.
    pub fn validate(&self) -> RingResult<()> {
        let result = self.check_storage().and_then(|_| self.cursors.validate());
        if let Err(ref e) = result {
            warn!(
                error = %e,
                head = self.cursors.head(),
                tail = self.cursors.tail(),
                "ring validation failed"
            );
        }
        result
    }

    /// Pindahkan semua element ke `storage` baru; ring ini di-reset ke kosong.
    ///
    /// Element dipindah bitwise, tidak di-clone dan tidak di-drop dua kali.
    /// Jika `storage` salah ukuran, tidak ada yang berubah.
    pub fn transfer_into(&mut self, mut storage: Slots<T>) -> RingResult<RingBuffer<T>> {
        self.check_destination(&storage)?;

        // SAFETY: dua alokasi berbeda dengan panjang sama. Setelah copy,
        // kepemilikan element pindah ke `storage` dan cursor sumber di-reset
        // sehingga slot lama tidak pernah dibaca atau di-drop lagi.
        unsafe {
            ptr::copy_nonoverlapping(
                self.buffer.as_ptr(),
                storage.as_mut_ptr(),
                self.buffer.len(),
            );
        }

        let moved = RingBuffer {
            cursors: self.cursors,
            buffer: storage,
        };
        self.cursors.reset();
        moved.validate()?;

        debug!(
            from = ?self.base_ptr(),
            to = ?moved.base_ptr(),
            len = moved.len(),
            "ring transferred"
        );

        Ok(moved)
    }

    /// `transfer_into` dengan storage baru yang dialokasi otomatis
    pub fn transfer(&mut self) -> RingResult<RingBuffer<T>> {
        let storage = alloc_slots(self.cursors.slots())?;
        self.transfer_into(storage)
    }

    fn check_destination(&self, storage: &Slots<T>) -> RingResult<()> {
        if storage.len() != self.buffer.len() {
            return Err(RingError::SlotMismatch {
                expected: self.buffer.len(),
                actual: storage.len(),
            });
        }
        Ok(())
    }

    fn check_storage(&self) -> RingResult<()> {
        if self.buffer.len() != self.cursors.slots() {
            return Err(Corruption::Geometry {
                slots: self.buffer.len(),
                element_size: mem::size_of::<T>(),
            }
            .into());
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn force_cursors(&mut self, cursors: Cursors) {
        self.cursors = cursors;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy semua element ke `storage` baru (relokasi non-destruktif).
    ///
    /// Element hidup di-clone ke index slot yang sama, jadi cursor
    /// tetap berlaku di storage baru.
    pub fn relocate_into(&self, storage: Slots<T>) -> RingResult<RingBuffer<T>> {
        self.check_destination(&storage)?;

        let copy = self.clone_to_storage(storage);
        copy.validate()?;

        debug!(
            from = ?self.base_ptr(),
            to = ?copy.base_ptr(),
            len = copy.len(),
            "ring relocated"
        );

        Ok(copy)
    }

    /// `relocate_into` dengan storage baru yang dialokasi otomatis
    pub fn relocate(&self) -> RingResult<RingBuffer<T>> {
        self.relocate_into(alloc_slots(self.cursors.slots())?)
    }

    // Element hidup di-clone ke index slot yang sama; `storage` harus
    // sudah dicek punya jumlah slot yang sama
    fn clone_to_storage(&self, mut storage: Slots<T>) -> RingBuffer<T> {
        for (position, value) in self.live_positions().zip(self.iter()) {
            storage[position].write(value.clone());
        }

        RingBuffer {
            cursors: self.cursors,
            buffer: storage,
        }
    }
}

impl<T: Clone> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        // Geometry ini sudah pernah berhasil dialokasi; gagal di sini berarti
        // kehabisan memory, sama seperti `Vec::clone`
        let mut storage = Vec::with_capacity(self.cursors.slots());
        storage.resize_with(self.cursors.slots(), MaybeUninit::uninit);
        self.clone_to_storage(storage.into_boxed_slice())
    }
}

impl<T> Drop for RingBuffer<T> {
    fn drop(&mut self) {
        while self.pop().is_ok() {}
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("head", &self.cursors.head())
            .field("tail", &self.cursors.tail())
            .field("capacity", &self.capacity())
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, T>(&'a RingBuffer<T>);

impl<T: std::fmt::Debug> std::fmt::Debug for DebugEntries<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Iterator element hidup dari depan ke belakang
pub struct Iter<'a, T> {
    ring: &'a RingBuffer<T>,
    position: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.position = self.ring.cursors.increment(self.position);
        self.remaining -= 1;
        // SAFETY: `remaining` membatasi iterasi ke slot yang hidup
        Some(unsafe { self.ring.buffer[self.position].assume_init_ref() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CursorKind;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_basic_push_pop() {
        let mut rb: RingBuffer<u64> = RingBuffer::new(16).unwrap();

        assert!(rb.is_empty());
        assert!(!rb.is_full());

        rb.push(42).unwrap();
        assert!(!rb.is_empty());
        assert_eq!(rb.peek(), Some(&42));

        assert_eq!(rb.pop(), Ok(42));
        assert!(rb.is_empty());
        assert_eq!(rb.pop(), Err(RingError::Empty));
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(
            RingBuffer::<u8>::new(0),
            Err(RingError::ZeroCapacity)
        ));
        assert!(matches!(
            RingBuffer::<u8>::with_storage(alloc_slots(1).unwrap()),
            Err(RingError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_capacity_overflow_rejected() {
        assert!(matches!(
            RingBuffer::<u64>::new(usize::MAX / 4),
            Err(RingError::SizeOverflow)
        ));
        assert!(matches!(
            RingBuffer::<[u8; 64]>::new(isize::MAX as usize / 32),
            Err(RingError::SizeOverflow)
        ));
        assert!(matches!(
            alloc_slots::<u32>(usize::MAX),
            Err(RingError::SizeOverflow)
        ));
    }

    #[test]
    fn test_full_buffer() {
        let mut rb: RingBuffer<u64> = RingBuffer::new(4).unwrap();

        for i in 1..=4 {
            rb.push(i).unwrap();
        }

        assert!(rb.is_full());
        assert_eq!(rb.len(), 4);
        // Harus gagal - buffer penuh, element dikembalikan
        assert_eq!(rb.push(5).map_err(PushError::into_inner), Err(5));

        assert_eq!(rb.pop(), Ok(1));
        rb.push(5).unwrap();
    }

    #[test]
    fn test_capacity_two_scenario() {
        let mut rb: RingBuffer<u32> = RingBuffer::new(2).unwrap();

        rb.push(10).unwrap();
        rb.push(11).unwrap();
        assert!(rb.push(12).is_err());
        assert_eq!(rb.pop(), Ok(10));
        assert_eq!(rb.pop(), Ok(11));
        assert_eq!(rb.pop(), Err(RingError::Empty));
        rb.push(12).unwrap();
        assert_eq!(rb.pop(), Ok(12));
    }

    #[test]
    fn test_wraparound() {
        let mut rb: RingBuffer<u64> = RingBuffer::new(4).unwrap();

        // Fill dan drain berkali-kali untuk test wraparound
        for round in 0..10 {
            for i in 0..4 {
                rb.push(round * 4 + i).unwrap();
            }
            for i in 0..4 {
                assert_eq!(rb.pop(), Ok(round * 4 + i));
            }
        }
        rb.validate().unwrap();
    }

    #[test]
    fn test_iter_and_debug() {
        let mut rb: RingBuffer<u32> = RingBuffer::new(3).unwrap();
        rb.push(1).unwrap();
        rb.push(2).unwrap();
        rb.pop().unwrap();
        rb.push(3).unwrap();
        rb.push(4).unwrap();

        let items: Vec<u32> = rb.iter().copied().collect();
        assert_eq!(items, vec![2, 3, 4]);
        assert_eq!(rb.iter().len(), 3);
        assert_eq!(
            format!("{:?}", rb),
            "RingBuffer { head: 1, tail: 1, capacity: 3, entries: [2, 3, 4] }"
        );
    }

    #[test]
    fn test_relocate_copy() {
        let mut rb: RingBuffer<String> = RingBuffer::new(2).unwrap();
        rb.push("a".to_string()).unwrap();
        rb.push("b".to_string()).unwrap();

        let mut copy = rb.relocate().unwrap();
        assert_ne!(copy.base_ptr(), rb.base_ptr());
        assert_eq!(copy.cursors(), rb.cursors());
        copy.validate().unwrap();

        assert_eq!(copy.pop().as_deref(), Ok("a"));
        assert_eq!(copy.pop().as_deref(), Ok("b"));
        assert_eq!(rb.pop().as_deref(), Ok("a"));
        assert_eq!(rb.pop().as_deref(), Ok("b"));
    }

    #[test]
    fn test_transfer_resets_source() {
        let mut rb: RingBuffer<String> = RingBuffer::new(3).unwrap();
        rb.push("x".to_string()).unwrap();
        rb.pop().unwrap();
        rb.push("y".to_string()).unwrap();
        rb.push("z".to_string()).unwrap();

        let mut moved = rb.transfer().unwrap();
        assert!(rb.is_empty());
        assert_eq!((rb.cursors().head(), rb.cursors().tail()), (0, 1));
        rb.validate().unwrap();

        assert_eq!(moved.pop().as_deref(), Ok("y"));
        assert_eq!(moved.pop().as_deref(), Ok("z"));

        // Sumber tetap bisa dipakai ulang
        rb.push("again".to_string()).unwrap();
        assert_eq!(rb.pop().as_deref(), Ok("again"));
    }

    #[test]
    fn test_transfer_wrong_storage_is_noop() {
        let mut rb: RingBuffer<u8> = RingBuffer::new(2).unwrap();
        rb.push(1).unwrap();

        assert_eq!(
            rb.transfer_into(alloc_slots(5).unwrap()).err(),
            Some(RingError::SlotMismatch {
                expected: 3,
                actual: 5
            })
        );
        assert_eq!(rb.len(), 1);
        assert!(rb.relocate_into(alloc_slots(2).unwrap()).is_err());
    }

    #[test]
    fn test_validate_detects_bad_cursor() {
        let mut rb: RingBuffer<u8> = RingBuffer::new(2).unwrap();
        rb.force_cursors(Cursors::from_raw(0, 9, 3));

        assert_eq!(
            rb.validate(),
            Err(RingError::Corrupt(Corruption::Cursor {
                cursor: CursorKind::Tail,
                position: 9,
                slots: 3,
            }))
        );
        rb.force_cursors(Cursors::from_raw(0, 1, 3));
    }

    #[test]
    fn test_validate_detects_storage_mismatch() {
        let rb: RingBuffer<u32> = RingBuffer {
            cursors: Cursors::new(2).unwrap(),
            buffer: alloc_slots(5).unwrap(),
        };

        assert_eq!(
            rb.validate(),
            Err(RingError::Corrupt(Corruption::Geometry {
                slots: 5,
                element_size: 4,
            }))
        );
    }

    #[derive(Clone)]
    struct Bump(Rc<Cell<usize>>);

    impl Drop for Bump {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_drop_live_elements_once() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut rb = RingBuffer::new(3).unwrap();
            for _ in 0..3 {
                assert!(rb.push(Bump(drops.clone())).is_ok());
            }
            drop(rb.pop());
            assert_eq!(drops.get(), 1);
        }
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn test_transfer_does_not_double_drop() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut rb = RingBuffer::new(2).unwrap();
            assert!(rb.push(Bump(drops.clone())).is_ok());
            assert!(rb.push(Bump(drops.clone())).is_ok());

            let moved = rb.transfer().unwrap();
            drop(rb);
            assert_eq!(drops.get(), 0);
            assert_eq!(moved.len(), 2);
        }
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_clear_drops_elements() {
        let drops = Rc::new(Cell::new(0));
        let mut rb = RingBuffer::new(4).unwrap();
        for _ in 0..4 {
            assert!(rb.push(Bump(drops.clone())).is_ok());
        }
        rb.clear();
        assert_eq!(drops.get(), 4);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_clone_uses_fresh_storage() {
        let mut rb: RingBuffer<u32> = RingBuffer::new(3).unwrap();
        rb.push(7).unwrap();
        rb.push(8).unwrap();

        let mut cloned = rb.clone();
        assert_ne!(cloned.base_ptr(), rb.base_ptr());
        cloned.validate().unwrap();
        assert_eq!(cloned.pop(), Ok(7));
        assert_eq!(cloned.pop(), Ok(8));
        assert_eq!(rb.len(), 2);
    }
}
