// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The self-index overlay: succinct structures for locate/count queries.
//!
//! Built once from a grammar and its decoded text, after which nothing here
//! mutates. Construction is a strict pipeline: decode the per-level rule
//! tables into one global derivation array, compute every rule's expansion
//! length, run the DFS layout, freeze the bit vectors into their sparse
//! forms, and finally sort the rule and rule-suffix records with the
//! SA/ISA/LCP/RMQ oracle.
//!
//! Rule identifiers here are global: `0..256` are the byte terminals,
//! grammar rules follow level by level, and the last id is the top rule.

mod dfs;
mod rmq;
mod sorter;
mod wavelet;

pub use wavelet::WaveletTree;

use crate::bitvec::RankSelect;
use crate::error::{Error, Result};
use crate::grammar::{decode_level, Grammar, LevelRules};
use crate::intvec::{width_for, IntVector};
use crate::sparse::SparseBits;

/// One non-terminal (or the top rule) with the anchor of its first
/// expansion occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    /// Global rule identifier.
    pub id: u32,
    /// Byte offset in the text of the expansion's first occurrence.
    pub pos: u64,
    /// Expansion length in bytes.
    pub len: u64,
}

/// One rule suffix: a sibling of the derivation tree together with the
/// text anchor of its expansion and its left neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixInfo {
    /// Preorder slot of the sibling.
    pub id: u32,
    /// Global id of the previous sibling (0 for a first child).
    pub prev_rule: u32,
    /// Byte offset in the text where this suffix's expansion begins.
    pub pos: u64,
    /// Expansion length in bytes of the suffix (this sibling through the
    /// end of its parent's expansion).
    pub len: u64,
}

/// The complete overlay.
pub struct SelfIndex {
    total_rules: usize,
    grammar_size: usize,
    text_len: usize,

    rules_derivation: IntVector,
    rules_pos: IntVector,
    rules_expansion_len: Vec<u64>,
    rules_expansion_pos: IntVector,
    suffixes_expansion_pos: IntVector,
    prev_rule: IntVector,

    pi: IntVector,
    inv_pi: Vec<i64>,
    focc: SparseBits,
    l: SparseBits,
    t: SparseBits,
    dfuds: RankSelect,
    wt: WaveletTree,
    leaf_str: Vec<u8>,

    rules: Vec<RuleInfo>,
    suffixes: Vec<SuffixInfo>,
}

impl SelfIndex {
    /// Build the overlay for `grammar`, whose decoded text is `text`.
    pub fn build(grammar: &Grammar, text: &[u8]) -> Result<Self> {
        if text.len() != grammar.text_len() {
            return Err(Error::InvalidInput(format!(
                "text of {} bytes does not match grammar for {} bytes",
                text.len(),
                grammar.text_len()
            )));
        }

        let tables: Vec<LevelRules> = grammar
            .levels()
            .iter()
            .map(decode_level)
            .collect::<Result<_>>()?;
        let level_lens = crate::grammar::expansion_lengths(grammar, &tables);

        let total_rules = grammar.total_rules();
        let root = grammar.top_rule_id();
        let derived: usize =
            tables.iter().map(|t| t.symbols.len()).sum::<usize>() + grammar.top_len();
        let grammar_size = derived + 256;

        // Global id base of each level's rules.
        let mut bases = Vec::with_capacity(grammar.level_count());
        let mut next = 256usize;
        for level in grammar.levels() {
            bases.push(next);
            next += level.rule_count();
        }

        // Flatten every right-hand side, terminals first, into the global
        // derivation array.
        let mut derivation = IntVector::new(grammar_size, width_for(total_rules as u64 - 1));
        let mut rules_pos = IntVector::new(total_rules + 1, width_for(grammar_size as u64));
        for b in 0..256usize {
            derivation.set(b, b as u64);
            rules_pos.set(b, b as u64);
        }
        let mut idx = 256usize;
        let mut id = 256usize;
        for (li, table) in tables.iter().enumerate() {
            for r in 0..grammar.levels()[li].rule_count() {
                rules_pos.set(id, idx as u64);
                id += 1;
                for &c in table.rhs(r) {
                    derivation.set(idx, global_id(&bases, li, c));
                    idx += 1;
                }
            }
        }
        debug_assert_eq!(id, root);
        rules_pos.set(root, idx as u64);
        for &c in grammar.top() {
            derivation.set(idx, top_global_id(&bases, grammar.level_count(), c));
            idx += 1;
        }
        rules_pos.set(total_rules, grammar_size as u64);
        debug_assert_eq!(idx, grammar_size);

        // Expansion lengths: terminals are single bytes, everything else
        // sums its children. Ids grow with level, so children come first.
        let mut expansion_len = vec![0u64; total_rules];
        expansion_len[..256].fill(1);
        for (li, lens) in level_lens.iter().enumerate() {
            for (r, &len) in lens.iter().enumerate() {
                expansion_len[bases[li] + r] = len;
            }
        }
        expansion_len[root] = (rules_pos.get(root) as usize..grammar_size)
            .map(|i| expansion_len[derivation.get(i) as usize])
            .sum();
        if expansion_len[root] as usize != text.len() {
            return Err(Error::Invariant("top rule expansion length"));
        }

        let leaves = derived - grammar.rule_count();
        let terminal_leaves = if grammar.level_count() == 0 {
            grammar.top_len()
        } else {
            tables[0].symbols.len()
        };
        let dims = dfs::DfsDims {
            total_rules,
            grammar_size,
            text_len: text.len(),
            leaves,
            terminal_leaves,
            root,
        };

        let out = dfs::DfsState::new(&derivation, &rules_pos, &expansion_len, &dims).run(&dims);

        let wt = WaveletTree::new(&out.wt_seq, total_rules as u32);
        let focc = SparseBits::from_bitbuf(&out.focc);
        let l = SparseBits::from_bitbuf(&out.l);
        let t = SparseBits::from_bitbuf(&out.t);
        let dfuds = RankSelect::build(out.bv_dfuds);

        // Rule records in pi order, then reverse-lexicographically sorted by
        // expansion. Record 0 is the top rule covering the whole text.
        let mut rules = Vec::with_capacity(total_rules - 256);
        rules.push(RuleInfo {
            id: root as u32,
            pos: 0,
            len: text.len() as u64,
        });
        for i in 257..total_rules {
            let rid = out.pi.get(i) as usize;
            rules.push(RuleInfo {
                id: rid as u32,
                pos: out.rules_expansion_pos.get(rid),
                len: expansion_len[rid],
            });
        }
        sorter::sort_rules(&mut rules, text);

        let mut suffixes = out.suffixes;
        sorter::sort_suffixes(&mut suffixes, text);

        Ok(Self {
            total_rules,
            grammar_size,
            text_len: text.len(),
            rules_derivation: derivation,
            rules_pos,
            rules_expansion_len: expansion_len,
            rules_expansion_pos: out.rules_expansion_pos,
            suffixes_expansion_pos: out.suffixes_expansion_pos,
            prev_rule: out.prev_rule,
            pi: out.pi,
            inv_pi: out.inv_pi,
            focc,
            l,
            t,
            dfuds,
            wt,
            leaf_str: out.leaf_str,
            rules,
            suffixes,
        })
    }

    /// Terminals + grammar rules + top rule.
    pub fn total_rules(&self) -> usize {
        self.total_rules
    }

    /// Derivation length including the 256 alphabet slots.
    pub fn grammar_size(&self) -> usize {
        self.grammar_size
    }

    /// Length of the indexed text in bytes.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Global derivation array.
    pub fn derivation(&self) -> &IntVector {
        &self.rules_derivation
    }

    /// Start offset of every rule inside the derivation array.
    pub fn rules_pos(&self) -> &IntVector {
        &self.rules_pos
    }

    /// Expansion length in bytes of rule `id`.
    pub fn expansion_len(&self, id: usize) -> u64 {
        self.rules_expansion_len[id]
    }

    /// First-occurrence expansion offset of rule `id`.
    pub fn expansion_pos(&self, id: usize) -> u64 {
        self.rules_expansion_pos.get(id)
    }

    /// Expansion offset of the rule suffix in preorder slot `slot`.
    pub fn suffix_expansion_pos(&self, slot: usize) -> u64 {
        self.suffixes_expansion_pos.get(slot)
    }

    /// Previous sibling of the rule suffix in preorder slot `slot`.
    pub fn prev_rule(&self, slot: usize) -> u64 {
        self.prev_rule.get(slot)
    }

    /// The rule permutation in DFS first-occurrence order.
    pub fn pi(&self) -> &IntVector {
        &self.pi
    }

    /// Inverse permutation; `-1` never survives construction.
    pub fn inv_pi(&self) -> &[i64] {
        &self.inv_pi
    }

    /// First-occurrence bit vector.
    pub fn focc(&self) -> &SparseBits {
        &self.focc
    }

    /// Leaf-start bit vector over text positions.
    pub fn l(&self) -> &SparseBits {
        &self.l
    }

    /// Terminal markers over DFS leaves.
    pub fn t(&self) -> &SparseBits {
        &self.t
    }

    /// DFUDS encoding of the derivation tree.
    pub fn dfuds(&self) -> &RankSelect {
        &self.dfuds
    }

    /// Wavelet tree over repeated non-terminal leaves.
    pub fn wt(&self) -> &WaveletTree {
        &self.wt
    }

    /// Bytes produced at terminal leaves in DFS order.
    pub fn leaf_str(&self) -> &[u8] {
        &self.leaf_str
    }

    /// Rule records, reverse-lexicographically sorted by expansion.
    pub fn rules(&self) -> &[RuleInfo] {
        &self.rules
    }

    /// Rule-suffix records, lexicographically sorted by expansion.
    pub fn suffixes(&self) -> &[SuffixInfo] {
        &self.suffixes
    }
}

#[inline]
fn global_id(bases: &[usize], level: usize, sym: u32) -> u64 {
    if level == 0 {
        sym as u64
    } else {
        (bases[level - 1] + (sym as usize - 1)) as u64
    }
}

#[inline]
fn top_global_id(bases: &[usize], level_count: usize, sym: u32) -> u64 {
    if level_count == 0 {
        sym as u64
    } else {
        (bases[level_count - 1] + (sym as usize - 1)) as u64
    }
}
