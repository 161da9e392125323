// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Sparse bit vector with Elias-Fano position encoding.
//!
//! Stores the sorted positions of the set bits split into `l`-bit lower
//! parts (packed flat) and unary-coded upper parts (a dense bit vector with
//! one 1 per element). Space is about `m * (2 + log2(n/m))` bits for m ones
//! in an n-bit universe, which is why the index overlay keeps its long,
//! sparse vectors (`focc`, `L`, `t`) in this form.
//!
//! `select1` is a single upper-vector select plus a lower read; `rank1`
//! binary-searches over `select1`, which is plenty for construction-time and
//! verification use.

use crate::bitvec::{BitBuf, RankSelect};
use crate::intvec::IntVector;

/// An immutable sparse bit vector.
#[derive(Clone)]
pub struct SparseBits {
    lower: IntVector,
    upper: RankSelect,
    l: u32,
    n: usize,
    universe: usize,
}

impl std::fmt::Debug for SparseBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseBits")
            .field("universe", &self.universe)
            .field("ones", &self.n)
            .finish()
    }
}

impl SparseBits {
    /// Encode the sorted `positions` of set bits in a `universe`-bit vector.
    pub fn from_positions(positions: &[u64], universe: usize) -> Self {
        let n = positions.len();
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(positions.last().map_or(true, |&p| (p as usize) < universe));

        let l = if n == 0 || universe <= n {
            0
        } else {
            (universe / n).ilog2()
        };

        let mut lower = IntVector::with_capacity(n, l.max(1));
        let mut upper = BitBuf::new(n + (universe >> l) + 1);
        for (j, &p) in positions.iter().enumerate() {
            if l > 0 {
                lower.push(p & ((1u64 << l) - 1));
            }
            upper.set((p >> l) as usize + j, true);
        }

        Self {
            lower,
            upper: RankSelect::build(upper),
            l,
            n,
            universe,
        }
    }

    /// Encode every set bit of a dense buffer.
    pub fn from_bitbuf(buf: &BitBuf) -> Self {
        let positions: Vec<u64> = (0..buf.len())
            .filter(|&i| buf.get(i))
            .map(|i| i as u64)
            .collect();
        Self::from_positions(&positions, buf.len())
    }

    /// Rebuild from serialized raw parts.
    pub fn from_raw_parts(
        lower: IntVector,
        upper: RankSelect,
        l: u32,
        n: usize,
        universe: usize,
    ) -> Self {
        Self {
            lower,
            upper,
            l,
            n,
            universe,
        }
    }

    /// Universe size in bits.
    pub fn len(&self) -> usize {
        self.universe
    }

    /// True if the universe is empty.
    pub fn is_empty(&self) -> bool {
        self.universe == 0
    }

    /// Number of set bits.
    pub fn ones(&self) -> usize {
        self.n
    }

    /// Internal parts, for serialization.
    pub fn raw_parts(&self) -> (&IntVector, &RankSelect, u32) {
        (&self.lower, &self.upper, self.l)
    }

    #[inline]
    fn value(&self, j: usize) -> usize {
        let hi = self.upper.select1(j + 1).expect("upper select in range") - j;
        if self.l > 0 {
            (hi << self.l) | self.lower.get(j) as usize
        } else {
            hi
        }
    }

    /// Position of the k-th set bit, 1-indexed.
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k == 0 || k > self.n {
            return None;
        }
        Some(self.value(k - 1))
    }

    /// Number of set bits in `[0, i)`.
    pub fn rank1(&self, i: usize) -> usize {
        let i = i.min(self.universe);
        let mut lo = 0usize;
        let mut hi = self.n;
        while lo < hi {
            let mid = (lo + hi) / 2;
            if self.value(mid) < i {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Read bit `i`.
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.universe);
        self.rank1(i + 1) > self.rank1(i)
    }
}
