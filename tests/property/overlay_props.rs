//! Overlay properties: the permutation, first-occurrence vector, DFUDS, and
//! sorted rule tables hold their invariants for arbitrary texts.

use proptest::prelude::*;

use gcix::{Grammar, SelfIndex};

fn text_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(1u8..=255, 1..300),
        prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b')], 1..300),
    ]
}

proptest! {
    #[test]
    fn overlay_invariants_hold(text in text_strategy()) {
        let g = Grammar::encode(&text).unwrap();
        let idx = SelfIndex::build(&g, &text).unwrap();
        let total = idx.total_rules();

        // pi: top rule at 0, alphabet identity, bijection.
        prop_assert_eq!(idx.pi().get(0) as usize, total - 1);
        for b in 0..256 {
            prop_assert_eq!(idx.pi().get(b + 1), b as u64);
        }
        let mut seen = vec![false; total];
        for i in 0..total {
            let r = idx.pi().get(i) as usize;
            prop_assert!(!seen[r]);
            seen[r] = true;
            prop_assert_eq!(idx.inv_pi()[r], i as i64);
        }

        // focc counts each rule exactly once.
        prop_assert_eq!(idx.focc().ones(), total);

        // The top rule expands to the whole text.
        prop_assert_eq!(idx.expansion_len(total - 1) as usize, text.len());

        // DFUDS bit counts balance.
        let bv = idx.dfuds();
        let zeros = bv.len() - bv.rank1(bv.len());
        prop_assert_eq!(zeros, idx.grammar_size() + 2);
    }

    #[test]
    fn rule_table_is_reverse_lex_sorted(text in text_strategy()) {
        let g = Grammar::encode(&text).unwrap();
        let idx = SelfIndex::build(&g, &text).unwrap();
        let rev = |pos: u64, len: u64| -> Vec<u8> {
            text[pos as usize..(pos + len) as usize]
                .iter()
                .rev()
                .copied()
                .collect()
        };
        for w in idx.rules().windows(2) {
            prop_assert!(rev(w[0].pos, w[0].len) <= rev(w[1].pos, w[1].len));
        }
    }

    #[test]
    fn suffix_table_is_lex_sorted(text in text_strategy()) {
        let g = Grammar::encode(&text).unwrap();
        let idx = SelfIndex::build(&g, &text).unwrap();
        for w in idx.suffixes().windows(2) {
            let a = &text[w[0].pos as usize..(w[0].pos + w[0].len) as usize];
            let b = &text[w[1].pos as usize..(w[1].pos + w[1].len) as usize];
            prop_assert!(a <= b);
        }
    }
}
