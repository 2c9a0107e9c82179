use serde::{Deserialize, Serialize};

/// Sector-to-sector visibility table.
///
/// Bit `a * sector_count + b` set means nothing in sector `b` can be seen
/// from sector `a`. Stored LSB-first, as produced by node builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reject {
    /// Packed bit table.
    pub bits: Vec<u8>,
}

impl Reject {
    /// Table that rejects nothing.
    pub fn permissive(sector_count: usize) -> Self {
        Self {
            bits: vec![0; Self::required_bytes(sector_count)],
        }
    }

    /// Minimum byte length for `sector_count` sectors.
    pub fn required_bytes(sector_count: usize) -> usize {
        (sector_count * sector_count).div_ceil(8)
    }

    /// Whether `to` is rejected from `from`. Bits past the end read as clear.
    pub fn is_rejected(&self, sector_count: usize, from: usize, to: usize) -> bool {
        if from >= sector_count || to >= sector_count {
            return false;
        }
        let bit = from * sector_count + to;
        self.bits
            .get(bit / 8)
            .is_some_and(|byte| byte & (1 << (bit % 8)) != 0)
    }

    /// Mark `to` as invisible from `from`.
    pub fn reject(&mut self, sector_count: usize, from: usize, to: usize) {
        if from >= sector_count || to >= sector_count {
            return;
        }
        let bit = from * sector_count + to;
        if let Some(byte) = self.bits.get_mut(bit / 8) {
            *byte |= 1 << (bit % 8);
        }
    }
}
