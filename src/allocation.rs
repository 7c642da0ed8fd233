//! # Allocation
//!
//! An `Allocation` is the distribution of a commander's units over the
//! contested fronts. It is used both for candidate solutions and for the
//! recorded opponent strategies.

use std::fmt;
use std::ops::Index;

/// Number of contested fronts.
pub const FRONTS: usize = 10;

/// Number of units every search-produced allocation distributes.
pub const TOTAL: u32 = 100;

/// Units per front. Value type: copying never aliases the underlying array.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Allocation([u32; FRONTS]);

impl Allocation {
    pub fn new(units: [u32; FRONTS]) -> Self {
        Self(units)
    }

    /// Builds an allocation from a slice of exactly `FRONTS` values.
    pub fn from_slice(units: &[u32]) -> Option<Self> {
        <[u32; FRONTS]>::try_from(units).ok().map(Self)
    }

    pub fn units(&self) -> &[u32; FRONTS] {
        &self.0
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Sum of units over all fronts.
    pub fn sum(&self) -> u32 {
        self.0.iter().sum()
    }

    pub(crate) fn units_mut(&mut self) -> &mut [u32; FRONTS] {
        &mut self.0
    }
}

impl Default for Allocation {
    fn default() -> Self {
        Self([0; FRONTS])
    }
}

impl From<[u32; FRONTS]> for Allocation {
    fn from(units: [u32; FRONTS]) -> Self {
        Self(units)
    }
}

impl Index<usize> for Allocation {
    type Output = u32;

    fn index(&self, front: usize) -> &u32 {
        &self.0[front]
    }
}

impl AsRef<[u32]> for Allocation {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, units) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", units)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum() {
        let a = Allocation::new([2, 2, 2, 2, 2, 2, 2, 2, 2, 82]);
        assert_eq!(a.sum(), TOTAL);
    }

    #[test]
    fn test_from_slice_requires_exact_width() {
        assert!(Allocation::from_slice(&[10; FRONTS]).is_some());
        assert!(Allocation::from_slice(&[10; 9]).is_none());
        assert!(Allocation::from_slice(&[10; 11]).is_none());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = Allocation::new([10; FRONTS]);
        let mut copy = original;
        copy.units_mut()[0] = 100;
        assert_eq!(original[0], 10);
        assert_eq!(copy[0], 100);
    }

    #[test]
    fn test_display() {
        let a = Allocation::new([0, 1, 2, 3, 4, 5, 6, 7, 8, 64]);
        assert_eq!(a.to_string(), "[0, 1, 2, 3, 4, 5, 6, 7, 8, 64]");
    }
}
