// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Expansion: from grammar back to bytes.
//!
//! `decode` materializes the text level by level, sizing each buffer from
//! the stored level lengths so expansion never reallocates. The SA/LCP
//! variants run the crate's induced suffix sort over the freshly expanded
//! buffer, which is how the `sa` and `sa-lcp` CLI modes are served.
//!
//! `extract_batch` answers substring queries without expanding the whole
//! text: expansion lengths steer the walk into exactly the subtrees that
//! overlap each query range.

use crate::error::{Error, Result};
use crate::sais;

use super::codec::{decode_level, LevelRules};
use super::Grammar;

impl Grammar {
    /// Reconstruct the original text.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let mut cur = self.top.clone();
        for (li, level) in self.levels.iter().enumerate().rev() {
            let rules = decode_level(level)?;
            let mut next = Vec::with_capacity(self.level_sizes[li]);
            for &name in &cur {
                let r = name as usize;
                if r == 0 || r > level.rule_count {
                    return Err(Error::CorruptInput { field: "rule name" });
                }
                next.extend_from_slice(rules.rhs(r - 1));
            }
            cur = next;
        }

        debug_assert_eq!(cur.len(), self.text_len);
        Ok(cur.into_iter().map(|c| c as u8).collect())
    }

    /// Reconstruct the text and its suffix array (sentinel row included, so
    /// the array has `text_len + 1` entries and starts with `text_len`).
    pub fn decode_with_sa(&self) -> Result<(Vec<u8>, Vec<u32>)> {
        let text = self.decode()?;
        let sa = sais::suffix_array(&text);
        Ok((text, sa))
    }

    /// Reconstruct the text, its suffix array, and its LCP array.
    pub fn decode_with_sa_lcp(&self) -> Result<(Vec<u8>, Vec<u32>, Vec<u32>)> {
        let text = self.decode()?;
        let sa = sais::suffix_array(&text);
        let mut padded = text.clone();
        padded.push(0);
        let lcp = sais::lcp_from_sa(&padded, &sa);
        Ok((text, sa, lcp))
    }

    /// Extract `T[l..=r]` for every query pair without full decompression.
    ///
    /// Bounds are inclusive; `l > r` or `r >= text_len` is an error.
    pub fn extract_batch(&self, queries: &[(usize, usize)]) -> Result<Vec<Vec<u8>>> {
        let tables: Vec<LevelRules> = self
            .levels
            .iter()
            .map(decode_level)
            .collect::<Result<_>>()?;
        let lens = expansion_lengths(self, &tables);

        queries
            .iter()
            .map(|&(l, r)| self.extract_one(&tables, &lens, l, r))
            .collect()
    }

    fn extract_one(
        &self,
        tables: &[LevelRules],
        lens: &[Vec<u64>],
        l: usize,
        r: usize,
    ) -> Result<Vec<u8>> {
        if l > r || r >= self.text_len {
            return Err(Error::InvalidInput(format!(
                "extract range [{}, {}] out of bounds for text of {} bytes",
                l, r, self.text_len
            )));
        }

        let depth = self.levels.len();
        let mut out = Vec::with_capacity(r - l + 1);
        let mut skip = l as u64;
        let mut take = (r - l + 1) as u64;
        for &child in &self.top {
            if take == 0 {
                break;
            }
            let clen = symbol_len(lens, depth, child);
            if skip >= clen {
                skip -= clen;
                continue;
            }
            emit(tables, lens, depth, child, skip, &mut take, &mut out);
            skip = 0;
        }
        debug_assert_eq!(out.len(), r - l + 1);
        Ok(out)
    }
}

/// Expansion length in bytes of `sym` at `depth` (0 = raw byte).
#[inline]
fn symbol_len(lens: &[Vec<u64>], depth: usize, sym: u32) -> u64 {
    if depth == 0 {
        1
    } else {
        lens[depth - 1][(sym - 1) as usize]
    }
}

/// Per-level expansion lengths: `lens[li][r]` is the byte length of rule
/// `r+1` of level `li`.
pub(crate) fn expansion_lengths(grammar: &Grammar, tables: &[LevelRules]) -> Vec<Vec<u64>> {
    let mut lens: Vec<Vec<u64>> = Vec::with_capacity(grammar.levels.len());
    for (li, level) in grammar.levels.iter().enumerate() {
        let table = &tables[li];
        let mut level_lens = Vec::with_capacity(level.rule_count);
        for r in 0..level.rule_count {
            let sum = table
                .rhs(r)
                .iter()
                .map(|&c| if li == 0 { 1 } else { lens[li - 1][(c - 1) as usize] })
                .sum();
            level_lens.push(sum);
        }
        lens.push(level_lens);
    }
    lens
}

/// Write `take` bytes of `sym`'s expansion starting `skip` bytes in.
fn emit(
    tables: &[LevelRules],
    lens: &[Vec<u64>],
    depth: usize,
    sym: u32,
    mut skip: u64,
    take: &mut u64,
    out: &mut Vec<u8>,
) {
    if *take == 0 {
        return;
    }
    if depth == 0 {
        debug_assert_eq!(skip, 0);
        out.push(sym as u8);
        *take -= 1;
        return;
    }
    let table = &tables[depth - 1];
    for &child in table.rhs((sym - 1) as usize) {
        if *take == 0 {
            return;
        }
        let clen = symbol_len(lens, depth - 1, child);
        if skip >= clen {
            skip -= clen;
            continue;
        }
        emit(tables, lens, depth - 1, child, skip, take, out);
        skip = 0;
    }
}
