//! Codec properties: encode/decode, SA emission, extraction, and container
//! round trips over arbitrary sentinel-free byte strings.

use proptest::prelude::*;

use super::common::naive_sa;
use gcix::{binary, GapCodec, Grammar};

fn text_strategy() -> impl Strategy<Value = Vec<u8>> {
    // Bytes 1..=255; zero is the reserved sentinel. Mix wide-alphabet and
    // narrow-alphabet texts so grammars of several depths get exercised.
    prop_oneof![
        prop::collection::vec(1u8..=255, 0..600),
        prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c')], 0..600),
    ]
}

proptest! {
    #[test]
    fn decode_inverts_encode(text in text_strategy()) {
        for codec in [GapCodec::Unary, GapCodec::EliasFano] {
            let g = Grammar::encode_with(&text, codec).unwrap();
            prop_assert_eq!(&g.decode().unwrap(), &text);
        }
    }

    #[test]
    fn sa_under_decompression_matches_reference(text in text_strategy()) {
        let g = Grammar::encode(&text).unwrap();
        let (decoded, sa) = g.decode_with_sa().unwrap();
        prop_assert_eq!(&decoded, &text);
        prop_assert_eq!(sa, naive_sa(&text));
    }

    #[test]
    fn lcp_under_decompression_is_pairwise_lcp(text in text_strategy()) {
        let g = Grammar::encode(&text).unwrap();
        let (_, sa, lcp) = g.decode_with_sa_lcp().unwrap();
        let mut padded = text.clone();
        padded.push(0);
        prop_assert_eq!(lcp[0], 0);
        for i in 1..sa.len() {
            let a = &padded[sa[i - 1] as usize..];
            let b = &padded[sa[i] as usize..];
            let expected = a.iter().zip(b).take_while(|(x, y)| x == y).count();
            prop_assert_eq!(lcp[i] as usize, expected);
        }
    }

    #[test]
    fn extraction_equals_slicing(text in text_strategy(), ranges in prop::collection::vec((0usize..600, 0usize..600), 1..8)) {
        prop_assume!(!text.is_empty());
        let g = Grammar::encode(&text).unwrap();
        let queries: Vec<(usize, usize)> = ranges
            .into_iter()
            .map(|(a, b)| {
                let l = a % text.len();
                let r = l + b % (text.len() - l).max(1);
                (l, r.min(text.len() - 1))
            })
            .collect();
        let answers = g.extract_batch(&queries).unwrap();
        for (&(l, r), got) in queries.iter().zip(&answers) {
            prop_assert_eq!(got, &text[l..=r]);
        }
    }

    #[test]
    fn container_roundtrips(text in text_strategy()) {
        let g = Grammar::encode(&text).unwrap();
        let bytes = binary::to_bytes(&g);
        let back = binary::from_bytes(&bytes).unwrap();
        prop_assert_eq!(back.decode().unwrap(), text);
    }

    #[test]
    fn truncated_containers_never_parse(text in text_strategy(), frac in 0.0f64..1.0) {
        let g = Grammar::encode(&text).unwrap();
        let bytes = binary::to_bytes(&g);
        let cut = ((bytes.len() - 1) as f64 * frac) as usize;
        prop_assert!(binary::from_bytes(&bytes[..cut]).is_err());
    }
}
