/// Rendering layers.
///
/// Every drawable belongs to one layer; a camera draws the layers set in
/// its culling mask. Frustum visualization geometry goes on a dedicated
/// layer that ordinary cameras leave out.

use bitflags::bitflags;

bitflags! {
    /// 32-bit rendering layer mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LayerMask: u32 {
        /// Layer 0, where regular scene geometry lives
        const DEFAULT = 1 << 0;

        // Every other bit is a valid, unnamed layer
        const _ = !0;
    }
}

impl LayerMask {
    /// Number of addressable layers
    pub const LAYER_COUNT: u32 = 32;

    /// Mask containing only layer `index`.
    ///
    /// Returns `None` when `index` is out of range.
    pub fn layer(index: u32) -> Option<Self> {
        if index < Self::LAYER_COUNT {
            Some(Self::from_bits_retain(1 << index))
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "layer_tests.rs"]
mod tests;
