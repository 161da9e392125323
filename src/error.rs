// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types for the gcix codec and index.
//!
//! Nothing here is recoverable: the construction pipeline is a hard
//! dependency chain, so the first fault aborts the whole operation. The CLI
//! maps every variant to a stderr diagnostic and a non-zero exit.

use thiserror::Error;

/// Error variants for encoding, decoding, and index construction.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller handed us something we cannot encode or answer.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred while reading or writing a container.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialized container failed validation; `field` names the first
    /// offending section.
    #[error("corrupt input: {field}")]
    CorruptInput {
        /// The header field or section that failed validation.
        field: &'static str,
    },

    /// A structural invariant did not hold after construction.
    #[error("invariant violated: {0}")]
    Invariant(&'static str),
}

/// A specialized Result type for gcix operations.
pub type Result<T> = std::result::Result<T, Error>;
