//! relring - Fixed-Capacity Ring Buffer dengan Relocation-Safe Cursors
//!
//! Arsitektur:
//! - `RingBuffer<T>`: typed ring, storage boxed `capacity + 1` slot
//! - `RawRing`: byte-stride ring di dalam region milik caller (header + slot)
//! - `MmapRegion`: region anonim via mmap sebagai backing alternatif
//! - Relokasi eksplisit: copy / move ke storage lain dengan cursor di-rebase

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::RingConfig;
pub use crate::core::{required_size, MmapRegion, RawRing, RingBuffer};
pub use crate::error::{Corruption, CursorKind, PushError, RingError, RingResult};
