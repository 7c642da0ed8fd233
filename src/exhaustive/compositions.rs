//! # Compositions
//!
//! Enumerates every way to write `total` as an ordered sum of `parts`
//! non-negative integers, each at most `cap`, in lexicographic order (first
//! part slowest). All parts but the last are odometer digits; the last part
//! takes the remainder and the candidate is skipped unless the remainder is
//! within the cap.
//!
//! The generator lends each composition as a slice of its internal buffer,
//! so enumeration does not allocate.
//!
//! ## Example
//!
//! ```rust
//! use blotto::exhaustive::Compositions;
//!
//! let mut compositions = Compositions::new(2, 3, 2).unwrap();
//! let mut seen = Vec::new();
//! while let Some(c) = compositions.next_composition() {
//!     seen.push(c.to_vec());
//! }
//! assert_eq!(seen, vec![vec![1, 2], vec![2, 1]]);
//! ```

use crate::error::{BlottoError, Result};

#[derive(Debug, Clone)]
pub struct Compositions {
    total: u32,
    cap: u32,
    /// Leading parts held constant by [`Compositions::with_first_part`].
    fixed: usize,
    current: Vec<u32>,
    /// Sum of all parts but the last.
    prefix_sum: u32,
    started: bool,
    exhausted: bool,
}

impl Compositions {
    /// # Errors
    ///
    /// Returns `BlottoError::Configuration` if `parts` is zero.
    pub fn new(parts: usize, total: u32, cap: u32) -> Result<Self> {
        if parts == 0 {
            return Err(BlottoError::Configuration(
                "A composition needs at least one part".to_string(),
            ));
        }
        Ok(Self {
            total,
            cap,
            fixed: 0,
            current: vec![0; parts],
            prefix_sum: 0,
            started: false,
            exhausted: false,
        })
    }

    /// Enumerates only the compositions whose first part equals `first`.
    ///
    /// Splitting on the first part partitions the full enumeration into
    /// independent branches.
    ///
    /// # Errors
    ///
    /// Returns `BlottoError::Configuration` if `parts` is less than two.
    pub fn with_first_part(parts: usize, total: u32, cap: u32, first: u32) -> Result<Self> {
        if parts < 2 {
            return Err(BlottoError::Configuration(
                "Fixing the first part needs at least two parts".to_string(),
            ));
        }
        let mut compositions = Self::new(parts, total, cap)?;
        compositions.fixed = 1;
        compositions.current[0] = first;
        compositions.prefix_sum = first;
        compositions.exhausted = first > cap || first > total;
        Ok(compositions)
    }

    pub fn parts(&self) -> usize {
        self.current.len()
    }

    /// Rewinds to the first composition.
    pub fn reset(&mut self) {
        let first = if self.fixed > 0 { self.current[0] } else { 0 };
        self.current.iter_mut().for_each(|part| *part = 0);
        self.prefix_sum = 0;
        if self.fixed > 0 {
            self.current[0] = first;
            self.prefix_sum = first;
        }
        self.started = false;
        self.exhausted = self.fixed > 0 && (first > self.cap || first > self.total);
    }

    /// Advances to the next composition and lends it.
    pub fn next_composition(&mut self) -> Option<&[u32]> {
        let last = self.current.len() - 1;
        loop {
            if !self.step() {
                return None;
            }

            let mut remainder = self.total - self.prefix_sum;
            if remainder > self.cap {
                if last == self.fixed {
                    // no free digit left to absorb the excess
                    continue;
                }
                // Raise the last digit just enough for the remainder to fit,
                // or push it to the cap so the next step carries.
                let excess = remainder - self.cap;
                let digit = last - 1;
                let room = self.cap - self.current[digit];
                let raise = excess.min(room);
                self.current[digit] += raise;
                self.prefix_sum += raise;
                if raise < excess {
                    continue;
                }
                remainder = self.cap;
            }

            self.current[last] = remainder;
            return Some(&self.current);
        }
    }

    /// Moves the odometer one position. The first call keeps the initial
    /// position, with every free digit at zero.
    fn step(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if !self.started {
            self.started = true;
            return true;
        }

        let last = self.current.len() - 1;
        for digit in (self.fixed..last).rev() {
            if self.current[digit] < self.cap && self.prefix_sum < self.total {
                self.current[digit] += 1;
                self.prefix_sum += 1;
                return true;
            }
            self.prefix_sum -= self.current[digit];
            self.current[digit] = 0;
        }

        self.exhausted = true;
        false
    }
}
