use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// 256-bit membership set over byte values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    pub const fn new() -> Self {
        Self([0; 4])
    }

    pub const fn full() -> Self {
        Self([u64::MAX; 4])
    }

    #[inline]
    pub fn insert(&mut self, b: u8) {
        let blk = (b as usize) >> 6;
        let bit = 1u64 << ((b as usize) & 63);
        self.0[blk] |= bit;
    }

    pub fn insert_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.insert(b);
        }
    }

    pub fn insert_range(&mut self, range: RangeInclusive<u8>) {
        for b in range {
            self.insert(b);
        }
    }

    #[inline]
    pub fn contains(&self, b: u8) -> bool {
        let blk = (b as usize) >> 6;
        let bit = 1u64 << ((b as usize) & 63);
        self.0[blk] & bit != 0
    }

    pub fn contains_all(&self, bytes: &[u8]) -> bool {
        bytes.iter().all(|&b| self.contains(b))
    }

    pub fn union_with(&mut self, other: &ByteSet) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            *mine |= *theirs;
        }
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_spans_all_blocks() {
        let mut set = ByteSet::new();
        set.insert_all(&[0, 63, 64, 200, 255]);
        assert!(set.contains(0) && set.contains(63) && set.contains(64));
        assert!(set.contains(200) && set.contains(255));
        assert!(!set.contains(1));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn union_and_ranges() {
        let mut digits = ByteSet::new();
        digits.insert_range(b'0'..=b'9');
        let mut dash = ByteSet::new();
        dash.insert(b'-');
        digits.union_with(&dash);
        assert!(digits.contains_all(b"-123"));
        assert!(!digits.contains_all(b"12a"));
        assert_eq!(ByteSet::full().len(), 256);
    }
}
