// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the gcix command-line interface.
//!
//! Six subcommands covering the codec's modes: `compress` and `decompress`
//! for the round trip, `sa` and `sa-lcp` to decompress while emitting the
//! suffix array (and LCP array), `sais` to build a suffix array directly
//! from a plain file, and `extract` to answer substring queries against a
//! compressed file without decompressing it.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gcix",
    about = "Grammar-compressed self-index and codec for byte strings",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a file into a .gcix grammar container
    Compress {
        /// File to be encoded
        input: String,

        /// Output .gcix file
        output: String,

        /// Encode the per-level gap streams as dense unary bit vectors
        /// instead of Elias-Fano
        #[arg(long)]
        unary: bool,
    },

    /// Decompress a .gcix file back to the original bytes
    Decompress {
        /// File to be decoded
        input: String,

        /// Output file
        output: String,
    },

    /// Decompress and emit the suffix array of the text
    Sa {
        /// File to be decoded
        input: String,

        /// Output file: u64 count, then 32-bit suffix array entries
        output: String,
    },

    /// Decompress and emit the suffix array and LCP array of the text
    SaLcp {
        /// File to be decoded
        input: String,

        /// Output file: u64 count, then suffix array, then LCP array
        output: String,
    },

    /// Build the suffix array of a plain file directly
    Sais {
        /// Input file
        input: String,

        /// Output file: u64 count, then 32-bit suffix array entries
        output: String,
    },

    /// Extract substrings from a compressed file
    Extract {
        /// Encoded .gcix file
        input: String,

        /// Query file with whitespace-separated `l r` pairs (inclusive,
        /// 0-based byte offsets)
        queries: String,
    },
}
