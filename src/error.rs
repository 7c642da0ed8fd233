//! # Error Types
//!
//! This module defines the error type shared by the dataset loader, the
//! evolutionary engine and the exhaustive search.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use blotto::error::{BlottoError, Result};
//!
//! fn population_size(requested: usize) -> Result<usize> {
//!     if requested == 0 {
//!         return Err(BlottoError::Configuration(
//!             "Population size cannot be zero".to_string(),
//!         ));
//!     }
//!     Ok(requested)
//! }
//!
//! assert!(population_size(0).is_err());
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use blotto::error::{Result, ResultExt};
//! use std::fs::File;
//!
//! fn open_scores(path: &str) -> Result<File> {
//!     File::open(path).context("Failed to open opponent table")
//! }
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use blotto::error::{BlottoError, OptionExt};
//!
//! fn best_score(scores: &[f64]) -> blotto::error::Result<f64> {
//!     scores
//!         .iter()
//!         .cloned()
//!         .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
//!         .ok_or_else_blotto(|| BlottoError::EmptyPopulation)
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while loading opponents or running a search.
#[derive(Error, Debug)]
pub enum BlottoError {
    /// A cell of the opponent dataset could not be read.
    ///
    /// `line` and `column` are 1-based positions in the source text.
    #[error("Dataset error at line {line}, column {column}: {message}")]
    Dataset {
        line: usize,
        column: usize,
        message: String,
    },

    /// The opponent table has an unusable shape.
    #[error("Invalid opponent table: {0}")]
    InvalidTable(String),

    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, BlottoError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use blotto::error::ResultExt;
///
/// fn parse_units(cell: &str) -> blotto::error::Result<u32> {
///     cell.trim().parse::<u32>().context("Failed to parse units")
/// }
///
/// assert!(parse_units("12").is_ok());
/// assert!(parse_units("twelve").is_err());
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to a `BlottoError::Other` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| BlottoError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, BlottoError>` using a closure
    /// to generate the error.
    fn ok_or_else_blotto<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> BlottoError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_blotto<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> BlottoError,
    {
        self.ok_or_else(err_fn)
    }
}
