//! Packed `(width, height)` keys for the sprite bank.

use crate::util::{MosaicError, MosaicResult};

/// A sprite size packed into one integer: width in the high 32 bits, height
/// in the low 32 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteKey(u64);

impl SpriteKey {
    /// Packs a non-zero size that fits in 32 bits per axis.
    pub fn new(width: usize, height: usize) -> MosaicResult<Self> {
        let invalid = MosaicError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        let w = u32::try_from(width).map_err(|_| invalid.clone())?;
        let h = u32::try_from(height).map_err(|_| invalid)?;
        Ok(Self((u64::from(w) << 32) | u64::from(h)))
    }

    pub fn width(self) -> usize {
        (self.0 >> 32) as usize
    }

    pub fn height(self) -> usize {
        (self.0 & u64::from(u32::MAX)) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::SpriteKey;
    use crate::util::MosaicError;

    #[test]
    fn packs_and_unpacks_both_axes() {
        let key = SpriteKey::new(640, 3).unwrap();
        assert_eq!((key.width(), key.height()), (640, 3));
        assert_ne!(key, SpriteKey::new(3, 640).unwrap());
    }

    #[test]
    fn rejects_zero_sizes() {
        assert_eq!(
            SpriteKey::new(0, 4).unwrap_err(),
            MosaicError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
    }
}
