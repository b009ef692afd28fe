//! Collision layers and layer masks.
//!
//! Every body in the scene lives on exactly one [`Layer`]. Ray queries filter
//! what they can hit with a [`LayerMask`], a 32-bit set of layers.

use serde::{Deserialize, Serialize};

/// A single collision layer, `0..=31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Layer(pub u8);

impl Layer {
    /// Layer every body starts on.
    pub const DEFAULT: Self = Self(0);

    /// Highest valid layer index.
    pub const MAX: u8 = 31;

    /// Unused layer bodies are parked on while they cast rays.
    pub const SCRATCH: Self = Self(31);

    /// Check if the index fits in a [`LayerMask`].
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 <= Self::MAX
    }

    /// Mask containing only this layer.
    ///
    /// Invalid layers map to an empty mask.
    #[inline]
    pub fn mask(self) -> LayerMask {
        if self.is_valid() {
            LayerMask(1 << self.0)
        } else {
            LayerMask::NONE
        }
    }
}

/// A set of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Hits nothing.
    pub const NONE: Self = Self(0);

    /// Hits every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Only the default layer. Used as the solid mask unless configured.
    pub const DEFAULT: Self = Self(1);

    /// Build a mask from a list of layers.
    pub fn from_layers(layers: &[Layer]) -> Self {
        layers.iter().fold(Self::NONE, |mask, layer| mask | layer.mask())
    }

    /// Check if a layer is part of this mask.
    #[inline]
    pub fn contains(self, layer: Layer) -> bool {
        layer.is_valid() && (self.0 & layer.mask().0) != 0
    }

    /// Check if any layer is shared with another mask.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Add a layer to this mask.
    #[inline]
    pub fn with(self, layer: Layer) -> Self {
        self | layer.mask()
    }

    /// Remove a layer from this mask.
    #[inline]
    pub fn without(self, layer: Layer) -> Self {
        Self(self.0 & !layer.mask().0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for LayerMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        layer.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_operations() {
        let ground = Layer(0);
        let platforms = Layer(8);
        let mask = LayerMask::from_layers(&[ground, platforms]);

        assert!(mask.contains(ground));
        assert!(mask.contains(platforms));
        assert!(!mask.contains(Layer(3)));
        assert!(mask.intersects(platforms.mask()));

        let without = mask.without(platforms);
        assert!(!without.contains(platforms));
        assert_eq!(without, LayerMask::DEFAULT);
    }

    #[test]
    fn test_invalid_layer() {
        let layer = Layer(40);
        assert!(!layer.is_valid());
        assert_eq!(layer.mask(), LayerMask::NONE);
        assert!(!LayerMask::ALL.contains(layer));
    }

    #[test]
    fn test_scratch_layer_outside_default_mask() {
        assert!(!LayerMask::DEFAULT.contains(Layer::SCRATCH));
        assert!(LayerMask::ALL.contains(Layer::SCRATCH));
    }
}
