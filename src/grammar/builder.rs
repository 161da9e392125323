// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Grammar construction by induced sorting.
//!
//! Each round factors the current level string at its LMS positions: the
//! factors tile the string, equal factors collapse to one rule, and the
//! string is rewritten as the sequence of rule names. Rounds repeat until a
//! string has no interior LMS position left, at which point it becomes the
//! top rule.
//!
//! The induction pass hands back the LMS factors already sorted by content;
//! a final `sort_unstable` pass canonicalizes the order (induced sorting
//! compares LMS substrings with their trailing overlap symbol, which can
//! transpose a factor with one it is a proper prefix of) so that stored
//! rules are exactly lexicographic, which the front-coder relies on.

use crate::error::{Error, Result};
use crate::sais::lms_factorize;

use super::codec::{encode_level, GapCodec};
use super::{Grammar, Level};

/// Build the grammar for `text`. Bytes must be non-zero.
pub(crate) fn build(text: &[u8], codec: GapCodec) -> Result<Grammar> {
    if text.contains(&0) {
        return Err(Error::InvalidInput(
            "text contains the reserved sentinel byte 0x00".into(),
        ));
    }

    let mut s: Vec<u32> = text.iter().map(|&b| b as u32).collect();
    let mut sigma = 256u64;
    let mut levels: Vec<Level> = Vec::new();
    let mut level_sizes = vec![s.len()];

    while s.len() > 1 {
        s.push(0);
        let view = lms_factorize(&s, sigma as usize);
        s.pop();

        if view.cuts.len() <= 1 {
            // No interior LMS position: the whole string is one factor and
            // further rounds cannot shrink it.
            break;
        }

        let (level, reduced, rule_count) = reduce(&s, &view.cuts, &view.sorted_lms, sigma, codec);
        levels.push(level);
        sigma = rule_count as u64 + 1;
        s = reduced;
        level_sizes.push(s.len());
    }

    Ok(Grammar {
        levels,
        top: s,
        text_len: text.len(),
        level_sizes,
        codec,
    })
}

/// Factor `s` at `cuts`, name the distinct factors, and emit the level plus
/// the reduced string of names.
fn reduce(
    s: &[u32],
    cuts: &[u32],
    sorted_lms: &[u32],
    sigma: u64,
    codec: GapCodec,
) -> (Level, Vec<u32>, usize) {
    let end_of = |start: u32| -> u32 {
        match cuts.binary_search(&start) {
            Ok(i) if i + 1 < cuts.len() => cuts[i + 1],
            _ => s.len() as u32,
        }
    };

    // Candidates in induced order, head factor first; duplicates collapse
    // after the canonical sort.
    let mut distinct: Vec<(u32, u32)> = Vec::with_capacity(sorted_lms.len() + 1);
    distinct.push((0, end_of(0)));
    distinct.extend(sorted_lms.iter().map(|&p| (p, end_of(p))));
    distinct.sort_unstable_by(|&(a0, a1), &(b0, b1)| {
        s[a0 as usize..a1 as usize].cmp(&s[b0 as usize..b1 as usize])
    });
    distinct.dedup_by(|&mut (a0, a1), &mut (b0, b1)| {
        s[a0 as usize..a1 as usize] == s[b0 as usize..b1 as usize]
    });

    // Rewrite the string as 1-based names of its factors.
    let reduced: Vec<u32> = cuts
        .iter()
        .map(|&start| {
            let seg = &s[start as usize..end_of(start) as usize];
            let idx = distinct
                .binary_search_by(|&(a, b)| s[a as usize..b as usize].cmp(seg))
                .expect("every factor is in the distinct set");
            (idx + 1) as u32
        })
        .collect();

    let level = encode_level(s, &distinct, sigma, codec);
    (level, reduced, distinct.len())
}
