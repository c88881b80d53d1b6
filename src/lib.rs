//! A tree-walking interpreter for the Lox language.
//!
//! The pipeline is strictly sequential: source text goes through the
//! [`scanner`], the [`parser`], and the [`resolver`] before the
//! [`interpreter`] walks the tree. Compile diagnostics are reported through
//! a [`session::Session`] as they are found; only runtime errors travel as
//! values.
//!
//! # Example
//!
//! ```
//! use rlox::interpreter::Interpreter;
//! use rlox::parser::Parser;
//! use rlox::resolver::Resolver;
//! use rlox::scanner::Scanner;
//! use rlox::session::Session;
//!
//! let mut session = Session::new();
//! let tokens = Scanner::new("print 1 + 2;", &mut session).scan_tokens();
//! let mut parser = Parser::new(tokens, &mut session);
//! let program = parser.parse();
//! let mut resolver = Resolver::new(&mut session);
//! resolver.resolve(&program);
//! assert!(!session.had_error());
//!
//! let mut output: Vec<u8> = Vec::new();
//! let mut interpreter = Interpreter::new(&mut output);
//! interpreter.interpret(&program).expect("no runtime error");
//! assert_eq!(output, b"3\n");
//! ```

#![warn(rust_2018_idioms)]

pub mod ast;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod instance;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod token;
pub mod value;
