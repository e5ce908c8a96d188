//! Error types untuk ring buffer
//!
//! Semua error bersifat lokal dan recoverable: dikembalikan ke caller,
//! tidak pernah panic, tidak ada retry otomatis.

use thiserror::Error;

/// Cursor mana yang bermasalah
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Head,
    Tail,
}

impl std::fmt::Display for CursorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Head => f.write_str("head"),
            Self::Tail => f.write_str("tail"),
        }
    }
}

/// Detail korupsi yang ditemukan oleh `validate()` / `attach()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Corruption {
    /// Cursor berada di luar `[0, slots)`
    #[error("{cursor} cursor at slot {position} outside {slots} slots")]
    Cursor {
        cursor: CursorKind,
        position: usize,
        slots: usize,
    },

    /// Header region tidak membawa magic number yang benar
    #[error("bad header magic {found:#018x}")]
    Magic { found: u64 },

    /// Geometry di header tidak cocok dengan region / ring
    #[error("inconsistent geometry: {slots} slots of {element_size} bytes")]
    Geometry { slots: usize, element_size: usize },
}

/// Error utama ring buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    #[error("ring buffer is full")]
    Full,

    #[error("ring buffer is empty")]
    Empty,

    #[error("ring buffer corrupt: {0}")]
    Corrupt(#[from] Corruption),

    #[error("capacity must be at least 1")]
    ZeroCapacity,

    #[error("element size must be at least 1 byte")]
    ZeroElementSize,

    #[error("required size overflows usize")]
    SizeOverflow,

    #[error("region too small: need {required} bytes, got {actual}")]
    RegionTooSmall { required: usize, actual: usize },

    #[error("element size mismatch: expected {expected} bytes, got {actual}")]
    ElementSize { expected: usize, actual: usize },

    #[error("slot count mismatch: expected {expected}, got {actual}")]
    SlotMismatch { expected: usize, actual: usize },
}

pub type RingResult<T> = Result<T, RingError>;

/// Push ditolak karena buffer penuh.
///
/// Element yang ditolak dikembalikan ke caller, tidak di-drop.
#[derive(Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer is full")]
pub struct PushError<T> {
    /// Element yang gagal di-push
    pub element: T,
}

impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        self.element
    }
}

impl<T> std::fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PushError(Full)")
    }
}

impl<T> From<PushError<T>> for RingError {
    fn from(_: PushError<T>) -> Self {
        RingError::Full
    }
}
