use thiserror::Error;

use crate::parser::lexer::TokenKind;
use crate::span::Span;

#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("Scanner error: unexpected character {found:?} at {span}")]
    LexicalError { found: char, span: Span },

    #[error("Parser error: {expected}, found {found} {lexeme:?} at {span}")]
    SyntaxError {
        expected: Expected,
        found: TokenKind,
        lexeme: String,
        span: Span,
    },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl RecognizeError {
    /// Where the failure happened. I/O errors have no source position.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::LexicalError { span, .. } | Self::SyntaxError { span, .. } => Some(*span),
            Self::IoError { .. } => None,
        }
    }
}

/// The category a parser state was waiting for when it gave up.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    #[error("identifier or print command expected")]
    StatementStart,
    #[error("valid expression expected")]
    Expression,
    #[error("boolean value expected")]
    BooleanValue,
    #[error("logical operator expected")]
    LogicalOperator,
    // AssignOp also reports this when the token after '=' can't start an expression
    #[error("assignment operator expected")]
    AssignmentOperator,
    #[error("print command expected")]
    PrintCommand,
    #[error("identifier expected")]
    Identifier,
    #[error("closing parenthesis expected")]
    ClosingParen,
    #[error("matching '(' expected")]
    OpeningParen,
}
