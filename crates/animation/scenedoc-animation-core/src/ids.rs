//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Stable identity of a Curve. Never reused within one allocator, so a stale
/// id simply fails to resolve once its Curve is destroyed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CurveId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u32);

/// Weak handle to an animated value registered with a Document.
/// The generation invalidates handles whose slot was released and reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AnimatedHandle {
    pub index: u32,
    pub generation: u32,
}

/// Monotonic allocator for CurveId and ClipId.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_curve: u32,
    next_clip: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_curve(&mut self) -> CurveId {
        let id = CurveId(self.next_curve);
        self.next_curve = self.next_curve.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_clip(&mut self) -> ClipId {
        let id = ClipId(self.next_clip);
        self.next_clip = self.next_clip.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
