#![allow(dead_code)]

//! Shared helpers for the integration and property suites.

/// Deterministic pseudo-random byte text over `1..=255` (0 is the reserved
/// sentinel and never appears in valid inputs).
pub fn random_text(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) % 255) as u8 + 1
        })
        .collect()
}

/// Reference suffix array over `text` plus an appended sentinel, by direct
/// suffix comparison. Includes the sentinel row, matching `gcix::suffix_array`.
pub fn naive_sa(text: &[u8]) -> Vec<u32> {
    let mut padded = text.to_vec();
    padded.push(0);
    let mut sa: Vec<u32> = (0..padded.len() as u32).collect();
    sa.sort_by(|&a, &b| padded[a as usize..].cmp(&padded[b as usize..]));
    sa
}

/// Reference LCP of two byte slices.
pub fn naive_lcp(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
