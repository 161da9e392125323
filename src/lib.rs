// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Grammar-compressed self-index and codec for byte strings.
//!
//! gcix compresses a text by grammar compression with induced sorting
//! (GCIS): each round factors the string at its LMS positions, collapses
//! equal factors into rules, and rewrites the string as rule names, until
//! nothing shrinks. The grammar is stored succinctly (rules sorted by
//! right-hand side, front-coded, bit-packed) and supports exact
//! reconstruction, suffix-array and LCP emission during reconstruction,
//! substring extraction without decompression, and a self-index overlay
//! (DFUDS tree, rule permutation, wavelet tree, sorted rule tables) for
//! locate/count machinery.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐      ┌─────────────────┐      ┌──────────────────┐
//! │  sais.rs  │─────▶│    grammar/     │─────▶│     index/       │
//! │ (SA-IS,   │      │ builder, codec, │      │ DFS, wavelet,    │
//! │  LCP, LMS)│      │ expand/extract  │      │ rule sorters     │
//! └───────────┘      └─────────────────┘      └──────────────────┘
//!       │                     │                        │
//!       ▼                     ▼                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │        intvec / bitvec / sparse (succinct primitives)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                  ┌──────────────────────┐
//!                  │ binary.rs (container)│
//!                  └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use gcix::Grammar;
//!
//! let text = b"abracadabra abracadabra";
//! let grammar = Grammar::encode(text).unwrap();
//!
//! assert_eq!(grammar.decode().unwrap(), text);
//!
//! // Substring extraction straight from the compressed form.
//! let parts = grammar.extract_batch(&[(0, 10)]).unwrap();
//! assert_eq!(parts[0], b"abracadabra");
//! ```
//!
//! Texts are sequences of non-zero bytes; `0x00` is reserved for the
//! sentinel the suffix sorter appends.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binary;
pub mod bitvec;
pub mod error;
pub mod events;
pub mod grammar;
pub mod index;
pub mod intvec;
pub mod sais;
pub mod sparse;

pub use error::{Error, Result};
pub use grammar::{GapCodec, Grammar};
pub use index::{RuleInfo, SelfIndex, SuffixInfo, WaveletTree};
pub use sais::{lcp_from_sa, suffix_array};
