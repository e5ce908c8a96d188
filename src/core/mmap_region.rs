//! Anonymous Memory-Mapped Region sebagai backing `RawRing`
//!
//! Region di-mmap langsung dari kernel, page aligned dan zero-filled.
//! Address-nya tidak pernah sama dengan alokasi heap, jadi cocok sebagai
//! tujuan relokasi untuk membuktikan cursor benar-benar di-rebase.
//! Tidak ada file backing: isi region hilang saat di-drop.

use std::io;

use memmap2::{MmapMut, MmapOptions};
use tracing::debug;

use crate::core::layout::required_size;
use crate::core::RawRing;
use crate::error::RingResult;

/// Region bytes milik sendiri untuk ditempati satu `RawRing`
pub struct MmapRegion {
    mmap: MmapMut,
}

impl MmapRegion {
    /// Map region anonim sebesar `len` bytes
    pub fn anon(len: usize) -> io::Result<Self> {
        let mmap = MmapOptions::new().len(len).map_anon()?;
        debug!(len, addr = ?mmap.as_ptr(), "anonymous region mapped");
        Ok(Self { mmap })
    }

    /// Map region yang pas untuk ring `capacity` x `element_size`
    pub fn for_ring(capacity: usize, element_size: usize) -> io::Result<Self> {
        let len = required_size(capacity, element_size)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Self::anon(len)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap[..]
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Layout ring baru di region ini
    pub fn ring(&mut self, capacity: usize, element_size: usize) -> RingResult<RawRing<'_>> {
        RawRing::new(self.as_mut_slice(), capacity, element_size)
    }

    /// Buka kembali ring yang sudah ada di region ini
    pub fn attach(&mut self) -> RingResult<RawRing<'_>> {
        RawRing::attach(self.as_mut_slice())
    }
}
