//! Core module: Fixed-Capacity Ring Buffer dengan cursor relatif
//!
//! Prinsip desain:
//! - Sentinel Slot: `capacity + 1` slot, full/empty dibedakan tanpa counter
//! - Base-Relative Cursors: head/tail berupa index, bukan address
//! - Explicit Relocation: copy/move ke storage lain selalu me-rebase cursor
//! - No-Allocation: storage pre-allocated saat init

mod cursor;
mod layout;
mod mmap_region;
mod raw_ring;
mod ring_buffer;

pub use cursor::Cursors;
pub use layout::{required_size, HEADER_SIZE, MAGIC};
pub use mmap_region::MmapRegion;
pub use raw_ring::RawRing;
pub use ring_buffer::{alloc_slots, Iter, RingBuffer, Slots};
