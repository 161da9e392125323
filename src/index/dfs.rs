// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Depth-first layout of the grammar's derivation tree.
//!
//! One preorder walk from the top rule produces every positional structure
//! of the overlay at once:
//!
//! - `bv_dfuds`: the DFUDS tree shape (arity ones then a zero per internal
//!   node, a zero per leaf), pre-filled with ones and selectively zeroed;
//! - `pi` / `inv_pi`: non-terminals in first-occurrence order, terminals
//!   pre-seeded at slots `1..=256` and the top rule at slot 0;
//! - `focc`: set exactly at each non-terminal's first DFS visit;
//! - `t`: marks which DFS leaves are terminals;
//! - `str`: the bytes produced at terminal leaves, in DFS order;
//! - `wt_seq`: the ids of repeated non-terminal leaves, in DFS order;
//! - `l`: one bit per text position, set where a leaf's expansion begins;
//! - `rules_expansion_pos` / `suffixes_expansion_pos` / `prev_rule`: where
//!   every rule and rule-suffix expansion starts in the text, and each
//!   sibling's left neighbor.
//!
//! The walk never descends into a non-terminal twice: a repeated occurrence
//! is a leaf, and `l` skips its whole expansion in one stride. Every counter
//! lands exactly on its derived bound, which the builder asserts.
//!
//! The vector is laid out behind a virtual super-root (`110`), with the 256
//! alphabet leaves as the root's leading children, so the tree shape is
//! identical for every grammar over the byte alphabet.

use crate::bitvec::BitBuf;
use crate::intvec::IntVector;

use super::SuffixInfo;

/// Everything the DFS produces.
pub(crate) struct DfsOutput {
    pub pi: IntVector,
    pub inv_pi: Vec<i64>,
    pub focc: BitBuf,
    pub l: BitBuf,
    pub t: BitBuf,
    pub bv_dfuds: BitBuf,
    pub wt_seq: Vec<u32>,
    pub leaf_str: Vec<u8>,
    pub rules_expansion_pos: IntVector,
    pub suffixes_expansion_pos: IntVector,
    pub prev_rule: IntVector,
    pub suffixes: Vec<SuffixInfo>,
}

/// The DFS itself: borrowed rule tables plus the output arrays and their
/// running cursors, owned together so every mutation goes through one
/// receiver.
pub(crate) struct DfsState<'a> {
    derivation: &'a IntVector,
    rules_pos: &'a IntVector,
    expansion_len: &'a [u64],

    pi: IntVector,
    inv_pi: Vec<i64>,
    focc: BitBuf,
    l: BitBuf,
    t: BitBuf,
    bv_dfuds: BitBuf,
    wt_seq: Vec<u32>,
    leaf_str: Vec<u8>,
    rules_expansion_pos: IntVector,
    suffixes_expansion_pos: IntVector,
    prev_rule: IntVector,
    suffixes: Vec<SuffixInfo>,

    pi_idx: usize,
    focc_idx: usize,
    dfs_idx: usize,
    leaf_idx: usize,
    l_idx: usize,
    bv_idx: usize,
    global_dfs_idx: usize,
}

/// Dimensions derived from the grammar before the walk starts.
pub(crate) struct DfsDims {
    pub total_rules: usize,
    /// Derivation length including the 256 alphabet slots.
    pub grammar_size: usize,
    pub text_len: usize,
    /// Number of DFS leaves (terminal and repeated non-terminal).
    pub leaves: usize,
    /// Number of terminal leaves (= length of `str`).
    pub terminal_leaves: usize,
    pub root: usize,
}

impl<'a> DfsState<'a> {
    pub fn new(
        derivation: &'a IntVector,
        rules_pos: &'a IntVector,
        expansion_len: &'a [u64],
        dims: &DfsDims,
    ) -> Self {
        let DfsDims {
            total_rules,
            grammar_size,
            text_len,
            leaves,
            terminal_leaves,
            root,
        } = *dims;

        let rule_width = crate::intvec::width_for(total_rules as u64 - 1);
        let pos_width = crate::intvec::width_for(text_len.saturating_sub(1) as u64);

        let mut pi = IntVector::new(total_rules, rule_width);
        let mut inv_pi = vec![-1i64; total_rules];
        let mut focc = BitBuf::new(grammar_size + 1);

        // Slot 0 is the top rule; the alphabet always occupies 1..=256.
        pi.set(0, root as u64);
        inv_pi[root] = 0;
        focc.set(0, true);
        for b in 0..256usize {
            pi.set(b + 1, b as u64);
            inv_pi[b] = (b + 1) as i64;
            focc.set(b + 1, true);
        }

        // DFUDS prefix: super-root, then the root's run covering the 256
        // implicit alphabet leaves plus its real children, then those
        // alphabet leaves.
        let root_arity =
            (rules_pos.get(root + 1) - rules_pos.get(root)) as usize;
        let mut bv_dfuds = BitBuf::filled(2 * grammar_size + 4, true);
        bv_dfuds.set(2, false);
        for i in 3 + root_arity + 256..=3 + root_arity + 512 {
            bv_dfuds.set(i, false);
        }

        Self {
            derivation,
            rules_pos,
            expansion_len,
            pi,
            inv_pi,
            focc,
            l: BitBuf::new(text_len),
            t: BitBuf::new(leaves),
            bv_dfuds,
            wt_seq: Vec::with_capacity(leaves - terminal_leaves),
            leaf_str: Vec::with_capacity(terminal_leaves),
            rules_expansion_pos: IntVector::new(total_rules, pos_width),
            suffixes_expansion_pos: IntVector::new(grammar_size + 1, pos_width),
            prev_rule: IntVector::new(grammar_size + 1, rule_width),
            suffixes: Vec::with_capacity(grammar_size - 256),
            pi_idx: 257,
            focc_idx: 257,
            dfs_idx: 257,
            leaf_idx: 0,
            l_idx: 0,
            bv_idx: 516 + root_arity,
            global_dfs_idx: 257,
        }
    }

    /// Walk every child of the top rule and freeze the output.
    pub fn run(mut self, dims: &DfsDims) -> DfsOutput {
        let pos = self.rules_pos.get(dims.root) as usize;
        let len = (self.rules_pos.get(dims.root + 1) as usize) - pos;
        let parent_end = dims.text_len as u64;

        let mut offset = 0u64;
        for i in pos..pos + len {
            let node = self.derivation.get(i) as usize;
            self.suffixes_expansion_pos.set(self.global_dfs_idx, offset);
            let prev = if i > pos {
                let p = self.derivation.get(i - 1);
                self.prev_rule.set(self.global_dfs_idx, p);
                p as u32
            } else {
                0
            };
            self.suffixes.push(SuffixInfo {
                id: self.global_dfs_idx as u32,
                prev_rule: prev,
                pos: offset,
                len: parent_end - offset,
            });
            self.visit(node, offset);
            offset += self.expansion_len[node];
            self.global_dfs_idx += 1;
        }

        self.assert_exhausted(dims, offset);

        DfsOutput {
            pi: self.pi,
            inv_pi: self.inv_pi,
            focc: self.focc,
            l: self.l,
            t: self.t,
            bv_dfuds: self.bv_dfuds,
            wt_seq: self.wt_seq,
            leaf_str: self.leaf_str,
            rules_expansion_pos: self.rules_expansion_pos,
            suffixes_expansion_pos: self.suffixes_expansion_pos,
            prev_rule: self.prev_rule,
            suffixes: self.suffixes,
        }
    }

    fn visit(&mut self, rule: usize, offset: u64) {
        if rule < 256 {
            // Terminal leaf: one byte of the text.
            self.t.set(self.leaf_idx, true);
            self.leaf_idx += 1;
            self.leaf_str.push(rule as u8);
            self.focc_idx += 1;
            self.bv_dfuds.set(self.bv_idx, false);
            self.bv_idx += 1;
            self.l.set(self.l_idx, true);
            self.l_idx += 1;
        } else if self.inv_pi[rule] == -1 {
            // First occurrence: expand in place.
            let pos = self.rules_pos.get(rule) as usize;
            let len = (self.rules_pos.get(rule + 1) as usize) - pos;

            self.pi.set(self.pi_idx, rule as u64);
            self.pi_idx += 1;
            self.inv_pi[rule] = self.dfs_idx as i64;
            self.dfs_idx += 1;
            self.focc.set(self.focc_idx, true);
            self.focc_idx += 1;

            self.bv_dfuds.set(self.bv_idx + len, false);
            self.bv_idx += len + 1;

            let parent_end = offset + self.expansion_len[rule];
            let mut local_offset = offset;
            for i in pos..pos + len {
                self.global_dfs_idx += 1;
                let child = self.derivation.get(i) as usize;
                self.suffixes_expansion_pos
                    .set(self.global_dfs_idx, local_offset);
                let prev = if i > pos {
                    let p = self.derivation.get(i - 1);
                    self.prev_rule.set(self.global_dfs_idx, p);
                    p as u32
                } else {
                    0
                };
                self.suffixes.push(SuffixInfo {
                    id: self.global_dfs_idx as u32,
                    prev_rule: prev,
                    pos: local_offset,
                    len: parent_end - local_offset,
                });
                self.visit(child, local_offset);
                local_offset += self.expansion_len[child];
            }
            self.rules_expansion_pos.set(rule, offset);
        } else {
            // Repeated non-terminal: a leaf whose expansion the walk skips.
            self.leaf_idx += 1;
            self.wt_seq.push(rule as u32);
            self.bv_dfuds.set(self.bv_idx, false);
            self.bv_idx += 1;
            self.focc_idx += 1;
            self.l.set(self.l_idx, true);
            self.l_idx += self.expansion_len[rule] as usize;
        }
    }

    fn assert_exhausted(&self, dims: &DfsDims, final_offset: u64) {
        debug_assert_eq!(final_offset as usize, dims.text_len);
        debug_assert_eq!(self.pi_idx, dims.total_rules);
        debug_assert_eq!(self.dfs_idx, dims.total_rules);
        debug_assert_eq!(self.focc_idx, dims.grammar_size + 1);
        debug_assert_eq!(self.leaf_idx, dims.leaves);
        debug_assert_eq!(self.l_idx, dims.text_len);
        debug_assert_eq!(self.bv_idx, self.bv_dfuds.len());
        debug_assert_eq!(self.global_dfs_idx, dims.grammar_size + 1);
        debug_assert_eq!(self.leaf_str.len(), dims.terminal_leaves);
        debug_assert_eq!(self.wt_seq.len(), dims.leaves - dims.terminal_leaves);
        debug_assert!(self.inv_pi.iter().all(|&v| v >= 0));
    }
}
