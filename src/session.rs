//! Per-run interpreter state shared by every phase: the error sink and the
//! two sticky flags the driver consults for its exit code.

use crate::error::RuntimeError;
use crate::token::{Token, TokenType};
use log::debug;

#[derive(Debug, Default)]
pub struct Session {
    had_error: bool,
    had_runtime_error: bool,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Report a compile error with no token context (scanner errors).
    pub fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Report a compile error at a token (parser and resolver errors).
    pub fn token_error(&mut self, token: &Token, message: &str) {
        if let TokenType::Eof = token.kind {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    pub fn runtime_error(&mut self, error: &RuntimeError) {
        eprintln!("{error}");
        self.had_runtime_error = true;
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        debug!("compile error: [line {line}] Error{location}: {message}");
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clear the compile-error flag so one bad line does not poison the
    /// rest of an interactive session.
    pub fn reset(&mut self) {
        self.had_error = false;
    }
}
