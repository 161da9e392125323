// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-level rule encoding: delta-LCP plus suffix concatenation.
//!
//! Rules arrive sorted by right-hand side, so rule `i` usually shares a long
//! prefix with rule `i-1`. A level therefore stores, per rule: the LCP
//! length against its predecessor, the first symbol of what remains, and the
//! rest of the remainder in one concatenated bit-packed stream. The two
//! length sequences (LCP lengths, remainder lengths) are gap-encoded bit
//! vectors behind the pluggable [`GapStream`].
//!
//! Decoding is strictly sequential: rule `i` is reconstructed by copying the
//! LCP prefix out of the previously decoded rule (`copy_lcp`), appending the
//! first symbol, and draining the concatenated stream (`copy_suffix`). The
//! whole level lands in one flat symbol array addressed by rule offsets.

use crate::bitvec::{BitBuf, RankSelect};
use crate::error::{Error, Result};
use crate::intvec::{width_for, IntVector};
use crate::sparse::SparseBits;

use super::Level;

/// Which encoding the two per-level gap streams use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapCodec {
    /// Dense unary-coded bit vector: a gap of `g` is `g` zeros and a one.
    Unary,
    /// Elias-Fano over the positions of the ones of the unary form.
    EliasFano,
}

impl GapCodec {
    /// Serialization tag.
    pub fn tag(self) -> u8 {
        match self {
            GapCodec::Unary => 0,
            GapCodec::EliasFano => 1,
        }
    }

    /// Inverse of [`GapCodec::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(GapCodec::Unary),
            1 => Some(GapCodec::EliasFano),
            _ => None,
        }
    }
}

/// A sequence of non-negative gaps behind a select-capable bit vector.
///
/// The `i`-th one (1-indexed) of the underlying vector sits at position
/// `gap_1 + ... + gap_i + i - 1`, so a single select yields a running sum.
pub enum GapStream {
    /// Dense representation.
    Unary(RankSelect),
    /// Sparse representation of the same positions.
    EliasFano(SparseBits),
}

impl GapStream {
    /// Encode `gaps` with the chosen codec.
    pub fn encode(gaps: &[u64], codec: GapCodec) -> Self {
        match codec {
            GapCodec::Unary => {
                let total: u64 = gaps.iter().sum();
                let mut buf = BitBuf::new(total as usize + gaps.len());
                let mut pos = 0u64;
                for (i, &g) in gaps.iter().enumerate() {
                    pos += g;
                    buf.set(pos as usize + i, true);
                }
                GapStream::Unary(RankSelect::build(buf))
            }
            GapCodec::EliasFano => {
                let total: u64 = gaps.iter().sum();
                let mut positions = Vec::with_capacity(gaps.len());
                let mut pos = 0u64;
                for (i, &g) in gaps.iter().enumerate() {
                    pos += g;
                    positions.push(pos + i as u64);
                }
                GapStream::EliasFano(SparseBits::from_positions(
                    &positions,
                    total as usize + gaps.len(),
                ))
            }
        }
    }

    /// Number of encoded gaps.
    pub fn count(&self) -> usize {
        match self {
            GapStream::Unary(bv) => bv.ones(),
            GapStream::EliasFano(sb) => sb.ones(),
        }
    }

    /// Total bit length of the underlying vector.
    pub fn bit_len(&self) -> usize {
        match self {
            GapStream::Unary(bv) => bv.len(),
            GapStream::EliasFano(sb) => sb.len(),
        }
    }

    /// Sum of the first `i` gaps; `prefix_sum(0)` is 0. `None` when `i`
    /// exceeds the gap count.
    pub fn prefix_sum(&self, i: usize) -> Option<u64> {
        if i == 0 {
            return Some(0);
        }
        let pos = match self {
            GapStream::Unary(bv) => bv.select1(i)?,
            GapStream::EliasFano(sb) => sb.select1(i)?,
        };
        Some(pos as u64 + 1 - i as u64)
    }
}

/// Front-code the sorted `rules` (byte ranges into the level string `s`)
/// into a compact [`Level`].
pub(crate) fn encode_level(
    s: &[u32],
    rules: &[(u32, u32)],
    sigma: u64,
    codec: GapCodec,
) -> Level {
    let sym_width = width_for(sigma - 1);
    let mut first_symbols = IntVector::with_capacity(rules.len(), sym_width);
    let mut concat = IntVector::with_capacity(0, sym_width);
    let mut lcp_lens = Vec::with_capacity(rules.len());
    let mut suffix_lens = Vec::with_capacity(rules.len());

    let mut prev: &[u32] = &[];
    for &(a, b) in rules {
        let rule = &s[a as usize..b as usize];
        let lcp = rule
            .iter()
            .zip(prev)
            .take_while(|(x, y)| x == y)
            .count();
        let suffix = &rule[lcp..];
        // Distinct sorted rules always leave a non-empty remainder.
        debug_assert!(!suffix.is_empty());
        lcp_lens.push(lcp as u64);
        suffix_lens.push(suffix.len() as u64);
        first_symbols.push(suffix[0] as u64);
        for &c in &suffix[1..] {
            concat.push(c as u64);
        }
        prev = rule;
    }

    Level {
        rule_count: rules.len(),
        sigma,
        first_symbols,
        concat,
        lcp_gaps: GapStream::encode(&lcp_lens, codec),
        delim_gaps: GapStream::encode(&suffix_lens, codec),
    }
}

/// A decoded level: every rule's full right-hand side in one flat array,
/// rule `r` (0-based) occupying `symbols[pos[r]..pos[r+1]]`.
pub(crate) struct LevelRules {
    pub symbols: Vec<u32>,
    pub pos: Vec<u32>,
}

impl LevelRules {
    #[inline]
    pub fn rhs(&self, r: usize) -> &[u32] {
        &self.symbols[self.pos[r] as usize..self.pos[r + 1] as usize]
    }
}

/// Copy the first `lcp_len` symbols of the previously decoded rule (which
/// starts at `prev_start` in `dst`) onto the end of `dst`.
fn copy_lcp(dst: &mut Vec<u32>, prev_start: usize, lcp_len: usize) {
    for k in 0..lcp_len {
        let v = dst[prev_start + k];
        dst.push(v);
    }
}

/// Copy `count` symbols from the concatenated suffix stream, advancing the
/// stream cursor.
fn copy_suffix(
    dst: &mut Vec<u32>,
    concat: &IntVector,
    cursor: &mut usize,
    count: usize,
) -> Result<()> {
    if *cursor + count > concat.len() {
        return Err(Error::CorruptInput {
            field: "rules_concat",
        });
    }
    for _ in 0..count {
        dst.push(concat.get(*cursor) as u32);
        *cursor += 1;
    }
    Ok(())
}

/// Reconstruct every rule of a level, in order, sharing the previous rule
/// as the LCP source.
pub(crate) fn decode_level(level: &Level) -> Result<LevelRules> {
    let rc = level.rule_count;
    let mut symbols = Vec::new();
    let mut pos = Vec::with_capacity(rc + 1);
    pos.push(0u32);

    let mut cursor = 0usize;
    let mut prev_start = 0usize;
    let mut prev_len = 0usize;
    let mut lcp_sum = 0u64;
    let mut suffix_sum = 0u64;

    for i in 0..rc {
        let next_lcp_sum = level.lcp_gaps.prefix_sum(i + 1).ok_or(Error::CorruptInput {
            field: "rules_lcp",
        })?;
        let lcp_len = (next_lcp_sum - lcp_sum) as usize;
        lcp_sum = next_lcp_sum;

        let next_suffix_sum = level
            .delim_gaps
            .prefix_sum(i + 1)
            .ok_or(Error::CorruptInput {
                field: "rules_delim",
            })?;
        let suffix_len = (next_suffix_sum - suffix_sum) as usize;
        suffix_sum = next_suffix_sum;

        if lcp_len > prev_len {
            return Err(Error::CorruptInput { field: "rules_lcp" });
        }
        if suffix_len == 0 {
            return Err(Error::CorruptInput {
                field: "rules_delim",
            });
        }

        let start = symbols.len();
        copy_lcp(&mut symbols, prev_start, lcp_len);
        symbols.push(level.first_symbols.get(i) as u32);
        copy_suffix(&mut symbols, &level.concat, &mut cursor, suffix_len - 1)?;

        pos.push(symbols.len() as u32);
        prev_start = start;
        prev_len = lcp_len + suffix_len;
    }

    if cursor != level.concat.len() {
        return Err(Error::CorruptInput {
            field: "rules_concat",
        });
    }
    if symbols.iter().any(|&c| c as u64 >= level.sigma) {
        return Err(Error::CorruptInput {
            field: "rule symbol",
        });
    }

    Ok(LevelRules {
        symbols,
        pos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(rules: &[&[u32]], sigma: u64, codec: GapCodec) {
        let mut s = Vec::new();
        let mut ranges = Vec::new();
        for r in rules {
            let a = s.len() as u32;
            s.extend_from_slice(r);
            ranges.push((a, s.len() as u32));
        }
        let level = encode_level(&s, &ranges, sigma, codec);
        let decoded = decode_level(&level).unwrap();
        assert_eq!(decoded.pos.len(), rules.len() + 1);
        for (i, r) in rules.iter().enumerate() {
            assert_eq!(decoded.rhs(i), *r, "rule {} under {:?}", i, codec);
        }
    }

    #[test]
    fn front_coding_roundtrips() {
        let rules: Vec<&[u32]> = vec![
            &[1, 2],
            &[1, 2, 3],
            &[1, 3],
            &[2],
            &[2, 1, 1, 4],
            &[2, 1, 2],
        ];
        roundtrip(&rules, 5, GapCodec::Unary);
        roundtrip(&rules, 5, GapCodec::EliasFano);
    }

    #[test]
    fn single_rule_level() {
        roundtrip(&[&[97, 98]], 256, GapCodec::Unary);
        roundtrip(&[&[97, 98]], 256, GapCodec::EliasFano);
    }

    #[test]
    fn gap_stream_prefix_sums() {
        for codec in [GapCodec::Unary, GapCodec::EliasFano] {
            let gaps = [0u64, 3, 0, 7, 1];
            let stream = GapStream::encode(&gaps, codec);
            assert_eq!(stream.count(), 5);
            let mut sum = 0;
            assert_eq!(stream.prefix_sum(0), Some(0));
            for (i, &g) in gaps.iter().enumerate() {
                sum += g;
                assert_eq!(stream.prefix_sum(i + 1), Some(sum), "{:?} i={}", codec, i);
            }
            assert_eq!(stream.prefix_sum(6), None);
        }
    }

    #[test]
    fn decode_rejects_truncated_concat() {
        let rules: Vec<&[u32]> = vec![&[1, 2, 3, 4]];
        let mut s = Vec::new();
        s.extend_from_slice(rules[0]);
        let mut level = encode_level(&s, &[(0, 4)], 5, GapCodec::Unary);
        // Drop the concatenated remainder entirely.
        level.concat = IntVector::with_capacity(0, level.concat.width());
        assert!(decode_level(&level).is_err());
    }
}
