//! Recognizer for a small statement language of assignments, `print` and
//! parenthesised boolean expressions. Answers accept or reject with the
//! position of the first error; no tree is built.

pub mod error;
pub mod parser;
pub mod span;

pub use error::{Expected, RecognizeError};
pub use parser::lexer::{Token, TokenKind, Tokenizer, tokenize};
pub use parser::{Summary, parse};
