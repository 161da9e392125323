// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! gcix CLI: compress, decompress, and query grammar-compressed indexes.
//!
//! ```bash
//! # Compress a text
//! gcix compress corpus.txt corpus.gcix
//!
//! # Round-trip it back
//! gcix decompress corpus.gcix corpus.out
//!
//! # Decompress and emit the suffix array as well
//! gcix sa corpus.gcix corpus.sa
//!
//! # Extract T[5..=20] and T[100..=199] without decompressing
//! printf '5 20\n100 199\n' > ranges.txt
//! gcix extract corpus.gcix ranges.txt
//! ```

use std::fs;
use std::io::Write;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use gcix::binary;
use gcix::events;
use gcix::{GapCodec, Grammar, Result};

mod cli;
use cli::{Cli, Commands};

fn main() {
    events::event("gcix init");
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Compress {
            input,
            output,
            unary,
        } => guard_output(&output, || run_compress(&input, &output, unary)),
        Commands::Decompress { input, output } => {
            guard_output(&output, || run_decompress(&input, &output))
        }
        Commands::Sa { input, output } => guard_output(&output, || run_sa(&input, &output, false)),
        Commands::SaLcp { input, output } => {
            guard_output(&output, || run_sa(&input, &output, true))
        }
        Commands::Sais { input, output } => guard_output(&output, || run_sais(&input, &output)),
        Commands::Extract { input, queries } => run_extract(&input, &queries),
    };

    events::event("gcix finish");
    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Run `f`; on failure remove whatever partial output it left behind.
fn guard_output(output: &str, f: impl FnOnce() -> Result<()>) -> Result<()> {
    let result = f();
    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result
}

fn spinner(msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

fn run_compress(input: &str, output: &str, unary: bool) -> Result<()> {
    let text = fs::read(input)?;
    let codec = if unary {
        GapCodec::Unary
    } else {
        GapCodec::EliasFano
    };

    events::event("compress");
    let pb = spinner("Compressing...");
    let start = Instant::now();
    let grammar = Grammar::encode_with(&text, codec)?;
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    events::event("save");
    let bytes = binary::to_bytes(&grammar);
    fs::write(output, &bytes)?;

    println!("input:\t{} bytes", text.len());
    println!("output:\t{} bytes", bytes.len());
    println!("time:\t{:.3} seconds", elapsed.as_secs_f64());
    Ok(())
}

fn run_decompress(input: &str, output: &str) -> Result<()> {
    events::event("load");
    let bytes = fs::read(input)?;
    let grammar = binary::from_bytes(&bytes)?;

    events::event("decompress");
    let pb = spinner("Decompressing...");
    let start = Instant::now();
    let text = grammar.decode()?;
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    fs::write(output, &text)?;
    println!("input:\t{} bytes", bytes.len());
    println!("output:\t{} bytes", text.len());
    println!("time:\t{:.3} seconds", elapsed.as_secs_f64());
    Ok(())
}

fn run_sa(input: &str, output: &str, with_lcp: bool) -> Result<()> {
    events::event("load");
    let bytes = fs::read(input)?;
    let grammar = binary::from_bytes(&bytes)?;

    events::event("decompress");
    let pb = spinner(if with_lcp {
        "Building SA+LCP under decompression..."
    } else {
        "Building SA under decompression..."
    });
    let start = Instant::now();
    let (text, sa, lcp) = if with_lcp {
        let (text, sa, lcp) = grammar.decode_with_sa_lcp()?;
        (text, sa, Some(lcp))
    } else {
        let (text, sa) = grammar.decode_with_sa()?;
        (text, sa, None)
    };
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    write_arrays(output, &sa, lcp.as_deref())?;

    println!("input:\t{} bytes", bytes.len());
    println!("output:\t{} bytes", text.len());
    println!("SA:\t{} bytes", sa.len() * 4);
    if let Some(lcp) = &lcp {
        println!("LCP:\t{} bytes", lcp.len() * 4);
    }
    println!("time:\t{:.3} seconds", elapsed.as_secs_f64());
    Ok(())
}

fn run_sais(input: &str, output: &str) -> Result<()> {
    let text = fs::read(input)?;
    if text.contains(&0) {
        return Err(gcix::Error::InvalidInput(
            "input contains the reserved sentinel byte 0x00".into(),
        ));
    }

    events::event("saca");
    let pb = spinner("Building SA with SA-IS...");
    let start = Instant::now();
    let sa = gcix::suffix_array(&text);
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    write_arrays(output, &sa, None)?;

    println!("input:\t{} bytes", text.len());
    println!("SA:\t{} bytes", sa.len() * 4);
    println!("time:\t{:.3} seconds", elapsed.as_secs_f64());
    Ok(())
}

fn run_extract(input: &str, queries: &str) -> Result<()> {
    events::event("load");
    let bytes = fs::read(input)?;
    let grammar = binary::from_bytes(&bytes)?;

    let query_text = fs::read_to_string(queries)?;
    let mut ranges = Vec::new();
    let mut numbers = query_text.split_whitespace();
    while let Some(l) = numbers.next() {
        let r = numbers.next().ok_or_else(|| {
            gcix::Error::InvalidInput("query file has an unpaired offset".into())
        })?;
        let l: usize = l
            .parse()
            .map_err(|_| gcix::Error::InvalidInput(format!("bad query offset: {l}")))?;
        let r: usize = r
            .parse()
            .map_err(|_| gcix::Error::InvalidInput(format!("bad query offset: {r}")))?;
        ranges.push((l, r));
    }

    events::event("extract");
    let answers = grammar.extract_batch(&ranges)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for answer in &answers {
        out.write_all(answer)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// SA (and optionally LCP) output: an 8-byte count, then each array as
/// little-endian 32-bit signed integers.
fn write_arrays(path: &str, sa: &[u32], lcp: Option<&[u32]>) -> Result<()> {
    let mut buf = Vec::with_capacity(8 + sa.len() * 4 * if lcp.is_some() { 2 } else { 1 });
    buf.extend_from_slice(&(sa.len() as u64).to_le_bytes());
    for &v in sa {
        buf.extend_from_slice(&(v as i32).to_le_bytes());
    }
    if let Some(lcp) = lcp {
        for &v in lcp {
            buf.extend_from_slice(&(v as i32).to_le_bytes());
        }
    }
    fs::write(path, buf)?;
    Ok(())
}
