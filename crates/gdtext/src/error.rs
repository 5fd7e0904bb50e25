//! Error types for gdtext operations.
//!
//! This module provides the main error type [`GdtextError`] returned by
//! every [`Project`](crate::Project) operation.

use std::io;

use thiserror::Error;

use gdtext_core::sandbox::AccessDenied;
use gdtext_parser::error::ParseError;

/// The main error type for gdtext operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant is only produced in strict mode. It carries every
/// diagnostic of the refused file together with its text, so that reports
/// can point at the offending lines.
#[derive(Debug, Error)]
pub enum GdtextError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GdtextError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}
