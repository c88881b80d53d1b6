//! Runtime error type for the evaluator.
//!
//! Compile-time diagnostics never appear here; the scanner, parser, and
//! resolver report through [`crate::session::Session`] at the point of
//! detection and carry on.

use crate::token::Token;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A language-level failure attributed to a source token.
    #[error("{message}\n[line {line}]")]
    Raised { message: String, line: usize },

    /// The print sink rejected a write.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RuntimeError {
    pub fn new<S: Into<String>>(token: &Token, message: S) -> RuntimeError {
        RuntimeError::Raised {
            message: message.into(),
            line: token.line,
        }
    }
}
