// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary container for gcix grammars.
//!
//! # Format overview (v1)
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ HEADER (24 bytes)                                          │
//! │   magic: [u8; 4] = "GCIX"                                  │
//! │   version: u8 = 1                                          │
//! │   codec: u8 (0 = unary, 1 = Elias-Fano)                    │
//! │   reserved: [u8; 2]                                        │
//! │   text_len: u64                                            │
//! │   level_count: u32                                         │
//! │   top_len: u32                                             │
//! ├────────────────────────────────────────────────────────────┤
//! │ LEVEL SIZES ((level_count + 1) x u64)                      │
//! │   text length at every level, byte level first             │
//! ├────────────────────────────────────────────────────────────┤
//! │ LEVEL BLOCKS (level_count times)                           │
//! │   rule_count: u32                                          │
//! │   sigma: u64 (right-hand-side symbol bound)                │
//! │   rules_lcp: gap stream                                    │
//! │   rules_delim: gap stream                                  │
//! │   first_symbol: int vector                                 │
//! │   rules_concat: int vector                                 │
//! ├────────────────────────────────────────────────────────────┤
//! │ TOP RULE (int vector)                                      │
//! ├────────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes)                                           │
//! │   crc32: u32 (over header + all sections)                  │
//! │   magic: [u8; 4] = "XICG" (reversed, marks valid end)      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers little-endian. Bit vectors are length-prefixed (a bit
//! count, then the packed 64-bit words). Every size field is bounds-checked
//! against the buffer and the per-field limits before any allocation, and
//! the CRC is verified before parsing begins.

use crc32fast::Hasher as Crc32Hasher;

use crate::bitvec::{BitBuf, RankSelect};
use crate::error::{Error, Result};
use crate::grammar::{GapCodec, GapStream, Grammar};
use crate::intvec::IntVector;
use crate::sparse::SparseBits;

/// Header magic: "GCIX".
pub const MAGIC: [u8; 4] = *b"GCIX";

/// Footer magic: "XICG" (reversed, marks a complete file).
pub const FOOTER_MAGIC: [u8; 4] = *b"XICG";

/// Current format version.
pub const VERSION: u8 = 1;

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 24;

/// Footer size in bytes: CRC32 plus reversed magic.
pub const FOOTER_SIZE: usize = 8;

/// Level-count ceiling. Each level strictly shrinks the string, so even a
/// petabyte text stays far below this.
pub const MAX_LEVELS: u32 = 64;

// ============================================================================
// WRITER
// ============================================================================

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_words(buf: &mut Vec<u8>, words: &[u64]) {
    for w in words {
        buf.extend_from_slice(&w.to_le_bytes());
    }
}

fn put_intvec(buf: &mut Vec<u8>, iv: &IntVector) {
    buf.push(iv.width() as u8);
    put_u64(buf, iv.len() as u64);
    put_words(buf, iv.words());
}

fn put_bits(buf: &mut Vec<u8>, len: usize, words: &[u64]) {
    put_u64(buf, len as u64);
    put_words(buf, words);
}

fn put_gap_stream(buf: &mut Vec<u8>, stream: &GapStream) {
    match stream {
        GapStream::Unary(bv) => {
            buf.push(0);
            put_bits(buf, bv.len(), bv.words());
        }
        GapStream::EliasFano(sb) => {
            buf.push(1);
            let (lower, upper, l) = sb.raw_parts();
            put_u64(buf, sb.len() as u64);
            put_u64(buf, sb.ones() as u64);
            buf.push(l as u8);
            put_intvec(buf, lower);
            put_bits(buf, upper.len(), upper.words());
        }
    }
}

/// Serialize a grammar into one checksummed buffer.
pub fn to_bytes(grammar: &Grammar) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&MAGIC);
    buf.push(VERSION);
    buf.push(grammar.codec().tag());
    buf.extend_from_slice(&[0u8; 2]);
    put_u64(&mut buf, grammar.text_len() as u64);
    put_u32(&mut buf, grammar.level_count() as u32);
    put_u32(&mut buf, grammar.top_len() as u32);
    debug_assert_eq!(buf.len(), HEADER_SIZE);

    for &size in grammar.level_sizes() {
        put_u64(&mut buf, size as u64);
    }

    for level in grammar.levels() {
        put_u32(&mut buf, level.rule_count() as u32);
        put_u64(&mut buf, level.sigma());
        put_gap_stream(&mut buf, level.lcp_gaps());
        put_gap_stream(&mut buf, level.delim_gaps());
        put_intvec(&mut buf, level.first_symbols());
        put_intvec(&mut buf, level.concat());
    }

    let mut top = IntVector::with_capacity(
        grammar.top_len(),
        crate::intvec::width_for(grammar.top_sigma() - 1),
    );
    for &sym in grammar.top() {
        top.push(sym as u64);
    }
    put_intvec(&mut buf, &top);

    let mut hasher = Crc32Hasher::new();
    hasher.update(&buf);
    put_u32(&mut buf, hasher.finalize());
    buf.extend_from_slice(&FOOTER_MAGIC);
    buf
}

// ============================================================================
// READER
// ============================================================================

struct Reader<'a> {
    bytes: &'a [u8],
    off: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8]> {
        if self.off + n > self.bytes.len() {
            return Err(Error::CorruptInput { field });
        }
        let slice = &self.bytes[self.off..self.off + n];
        self.off += n;
        Ok(slice)
    }

    fn u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.take(1, field)?[0])
    }

    fn u32(&mut self, field: &'static str) -> Result<u32> {
        let b = self.take(4, field)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self, field: &'static str) -> Result<u64> {
        let b = self.take(8, field)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn words(&mut self, count: usize, field: &'static str) -> Result<Vec<u64>> {
        let b = self.take(count * 8, field)?;
        Ok(b.chunks_exact(8)
            .map(|c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect())
    }

    /// Remaining payload, in bits. Length fields are validated against this
    /// before any allocation happens.
    fn remaining_bits(&self) -> u128 {
        (self.bytes.len() - self.off) as u128 * 8
    }

    fn intvec(&mut self, field: &'static str) -> Result<IntVector> {
        let width = self.u8(field)? as u32;
        if !(1..=64).contains(&width) {
            return Err(Error::CorruptInput { field });
        }
        let len = self.u64(field)? as usize;
        if len as u128 * width as u128 > self.remaining_bits() {
            return Err(Error::CorruptInput { field });
        }
        let word_count = (len * width as usize).div_ceil(64);
        let words = self.words(word_count, field)?;
        Ok(IntVector::from_raw_parts(words, len, width))
    }

    fn bits(&mut self, field: &'static str) -> Result<BitBuf> {
        let len = self.u64(field)? as usize;
        if len as u128 > self.remaining_bits() {
            return Err(Error::CorruptInput { field });
        }
        let words = self.words(len.div_ceil(64), field)?;
        Ok(BitBuf::from_raw_parts(words, len))
    }

    fn gap_stream(&mut self, field: &'static str) -> Result<GapStream> {
        match self.u8(field)? {
            0 => Ok(GapStream::Unary(RankSelect::build(self.bits(field)?))),
            1 => {
                let universe = self.u64(field)? as usize;
                let n = self.u64(field)? as usize;
                let l = self.u8(field)? as u32;
                if l > 63 {
                    return Err(Error::CorruptInput { field });
                }
                let lower = self.intvec(field)?;
                let upper = RankSelect::build(self.bits(field)?);
                if upper.ones() != n || (l > 0 && lower.len() != n) {
                    return Err(Error::CorruptInput { field });
                }
                Ok(GapStream::EliasFano(SparseBits::from_raw_parts(
                    lower, upper, l, n, universe,
                )))
            }
            _ => Err(Error::CorruptInput { field }),
        }
    }
}

/// Deserialize a grammar, verifying magic, version, checksum, and every
/// section bound.
pub fn from_bytes(bytes: &[u8]) -> Result<Grammar> {
    if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(Error::CorruptInput { field: "file size" });
    }

    let footer_start = bytes.len() - FOOTER_SIZE;
    if bytes[footer_start + 4..] != FOOTER_MAGIC {
        return Err(Error::CorruptInput {
            field: "footer magic",
        });
    }
    let stored_crc = u32::from_le_bytes([
        bytes[footer_start],
        bytes[footer_start + 1],
        bytes[footer_start + 2],
        bytes[footer_start + 3],
    ]);
    let mut hasher = Crc32Hasher::new();
    hasher.update(&bytes[..footer_start]);
    if hasher.finalize() != stored_crc {
        return Err(Error::CorruptInput { field: "crc32" });
    }

    let mut r = Reader {
        bytes: &bytes[..footer_start],
        off: 0,
    };
    if r.take(4, "magic")? != MAGIC {
        return Err(Error::CorruptInput { field: "magic" });
    }
    if r.u8("version")? != VERSION {
        return Err(Error::CorruptInput { field: "version" });
    }
    let codec = GapCodec::from_tag(r.u8("codec")?).ok_or(Error::CorruptInput { field: "codec" })?;
    r.take(2, "reserved")?;
    let text_len = r.u64("text_len")? as usize;
    let level_count = r.u32("level_count")?;
    if level_count > MAX_LEVELS {
        return Err(Error::CorruptInput {
            field: "level_count",
        });
    }
    let top_len = r.u32("top_len")? as usize;

    let mut level_sizes = Vec::with_capacity(level_count as usize + 1);
    for _ in 0..=level_count {
        level_sizes.push(r.u64("level_sizes")? as usize);
    }
    if level_sizes[0] != text_len || *level_sizes.last().unwrap() != top_len {
        return Err(Error::CorruptInput {
            field: "level_sizes",
        });
    }

    let mut levels = Vec::with_capacity(level_count as usize);
    let mut sigma_bound = 256u64;
    for li in 0..level_count as usize {
        let rule_count = r.u32("rule_count")? as usize;
        if rule_count == 0 || rule_count > level_sizes[li] {
            return Err(Error::CorruptInput {
                field: "rule_count",
            });
        }
        let sigma = r.u64("sigma")?;
        if sigma != sigma_bound {
            return Err(Error::CorruptInput { field: "sigma" });
        }
        let lcp_gaps = r.gap_stream("rules_lcp")?;
        let delim_gaps = r.gap_stream("rules_delim")?;
        if lcp_gaps.count() != rule_count || delim_gaps.count() != rule_count {
            return Err(Error::CorruptInput {
                field: "gap stream count",
            });
        }
        let first_symbols = r.intvec("first_symbol")?;
        if first_symbols.len() != rule_count {
            return Err(Error::CorruptInput {
                field: "first_symbol",
            });
        }
        let concat = r.intvec("rules_concat")?;
        levels.push(Grammar::level_from_parts(
            rule_count,
            sigma,
            first_symbols,
            concat,
            lcp_gaps,
            delim_gaps,
        ));
        sigma_bound = rule_count as u64 + 1;
    }

    let top_iv = r.intvec("top_rule")?;
    if top_iv.len() != top_len {
        return Err(Error::CorruptInput { field: "top_rule" });
    }
    let top: Vec<u32> = top_iv.iter().map(|v| v as u32).collect();
    if top.iter().any(|&sym| sym as u64 >= sigma_bound || sym == 0) {
        return Err(Error::CorruptInput { field: "top_rule" });
    }

    if r.off != r.bytes.len() {
        return Err(Error::CorruptInput {
            field: "trailing bytes",
        });
    }

    Ok(Grammar::from_parts(levels, top, text_len, level_sizes, codec))
}
