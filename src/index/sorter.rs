// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Reverse-lexicographic rule sorting and lexicographic suffix sorting.
//!
//! Both sorts compare *expansions* of grammar entities without ever
//! materializing them. The oracle is the classical SA/ISA/LCP/RMQ stack: the
//! LCP of two expansions read from known text positions is a single
//! range-minimum over the LCP array between their ISA ranks, after which one
//! rank comparison decides the order.
//!
//! Rules are compared by *reversed* expansion, so their oracle is built over
//! the reversed text and each rule's position is mirrored into it. Rule
//! suffixes are compared forward, over the text itself.
//!
//! The scratch structures (SA, reversed text) are dropped as soon as the
//! ISA/LCP/RMQ triple exists; only that triple lives for the duration of the
//! sort.

use crate::sais;

use super::rmq::Rmq;
use super::{RuleInfo, SuffixInfo};

/// ISA + LCP + RMQ over one text; answers expansion-LCP queries in O(1).
struct SortOracle {
    isa: Vec<u32>,
    rmq: Rmq,
}

impl SortOracle {
    /// Build over `text` (sentinel appended internally). The suffix array is
    /// a local: it dies here once the ISA and LCP exist.
    fn over(text: &[u8]) -> Self {
        let sa = sais::suffix_array(text);
        let isa = sais::inverse(&sa);
        let mut padded = text.to_vec();
        padded.push(0);
        let lcp = sais::lcp_from_sa(&padded, &sa);
        let rmq = Rmq::new(&lcp);
        Self { isa, rmq }
    }

    /// LCP of the suffixes starting at text positions `pa` and `pb`
    /// (`pa != pb`).
    fn suffix_lcp(&self, pa: usize, pb: usize) -> u64 {
        let ia = self.isa[pa] as usize;
        let ib = self.isa[pb] as usize;
        let (lo, hi) = if ia < ib { (ia, ib) } else { (ib, ia) };
        self.rmq.query(lo + 1, hi) as u64
    }

    /// Order two expansions anchored at `pa`/`pb` with lengths `la`/`lb`.
    fn compare(&self, pa: usize, la: u64, pb: usize, lb: u64) -> std::cmp::Ordering {
        if pa == pb {
            // Same anchor: the shorter expansion is a prefix of the longer.
            return la.cmp(&lb);
        }
        let lcp = self.suffix_lcp(pa, pb);
        if la.min(lb) <= lcp {
            // One expansion is a prefix of the other.
            la.cmp(&lb)
        } else {
            self.isa[pa].cmp(&self.isa[pb])
        }
    }
}

/// Sort rule records by the reverse-lexicographic order of their expansions.
pub(crate) fn sort_rules(rules: &mut [RuleInfo], text: &[u8]) {
    let n = text.len() as u64;
    let rev: Vec<u8> = text.iter().rev().copied().collect();
    let oracle = SortOracle::over(&rev);
    rules.sort_by(|a, b| {
        // A rule expanding T[p..p+len) reads backwards from rev-position
        // n - (p + len).
        let pa = (n - (a.pos + a.len)) as usize;
        let pb = (n - (b.pos + b.len)) as usize;
        oracle.compare(pa, a.len, pb, b.len)
    });
}

/// Sort rule-suffix records by the lexicographic order of their expansions.
pub(crate) fn sort_suffixes(suffixes: &mut [SuffixInfo], text: &[u8]) {
    let oracle = SortOracle::over(text);
    suffixes.sort_by(|a, b| oracle.compare(a.pos as usize, a.len, b.pos as usize, b.len));
}
