use std::fmt;

use log::debug;

use crate::error::RecognizeError;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Print,          // print
    Assign,         // =
    LParen,         // (
    RParen,         // )
    BooleanLiteral, // true, false, t, f, 1, 0 in any case
    LogicalOp,      // and, or, not
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "IDENTIFIER",
            Self::Print => "PRINT",
            Self::Assign => "ASSIGN",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::BooleanLiteral => "BOOLEAN_LITERAL",
            Self::LogicalOp => "LOGICAL_OP",
            Self::EndOfInput => "END_OF_INPUT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    /// Compares the matched text, for the few places the parser looks past the kind.
    pub fn is(&self, lexeme: &str) -> bool {
        self.lexeme == lexeme
    }
}

/// Returns the length of the prefix a rule accepts, if any.
type Matcher = fn(&str) -> Option<usize>;

struct Rule {
    /// `None` means the match is skipped.
    kind: Option<TokenKind>,
    matcher: Matcher,
}

// Порядок важен: при равной длине побеждает правило выше
const RULES: &[Rule] = &[
    Rule { kind: Some(TokenKind::LogicalOp), matcher: logical_op },
    Rule { kind: Some(TokenKind::BooleanLiteral), matcher: boolean_literal },
    Rule { kind: None, matcher: whitespace },
    Rule { kind: Some(TokenKind::Assign), matcher: assign },
    Rule { kind: Some(TokenKind::Print), matcher: print_keyword },
    Rule { kind: Some(TokenKind::Identifier), matcher: identifier },
    Rule { kind: Some(TokenKind::LParen), matcher: left_paren },
    Rule { kind: Some(TokenKind::RParen), matcher: right_paren },
];

fn any_of(input: &str, words: &[&str], ignore_case: bool) -> Option<usize> {
    words
        .iter()
        .filter(|word| match input.get(..word.len()) {
            Some(prefix) if ignore_case => prefix.eq_ignore_ascii_case(word),
            Some(prefix) => prefix == **word,
            None => false,
        })
        .map(|word| word.len())
        .max()
}

fn logical_op(input: &str) -> Option<usize> {
    any_of(input, &["and", "or", "not"], false)
}

fn boolean_literal(input: &str) -> Option<usize> {
    any_of(input, &["true", "false", "t", "f", "1", "0"], true)
}

fn whitespace(input: &str) -> Option<usize> {
    matches!(input.chars().next(), Some(' ' | '\t' | '\n')).then_some(1)
}

fn assign(input: &str) -> Option<usize> {
    input.starts_with('=').then_some(1)
}

fn print_keyword(input: &str) -> Option<usize> {
    input.starts_with("print").then_some("print".len())
}

// Leading digits are allowed, so `10` and `2x` are identifiers too
fn identifier(input: &str) -> Option<usize> {
    let len = input.bytes().take_while(u8::is_ascii_alphanumeric).count();
    (len > 0).then_some(len)
}

fn left_paren(input: &str) -> Option<usize> {
    input.starts_with('(').then_some(1)
}

fn right_paren(input: &str) -> Option<usize> {
    input.starts_with(')').then_some(1)
}

/// Longest match over all rules, the earliest rule wins a tie.
fn longest_match(input: &str) -> Option<(&'static Rule, usize)> {
    let mut best: Option<(&'static Rule, usize)> = None;
    for rule in RULES {
        if let Some(len) = (rule.matcher)(input) {
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((rule, len));
            }
        }
    }
    best
}

/// Pull-based scanner over a source string. Single forward pass; once it has
/// produced `EndOfInput` or an error the iterator is exhausted.
pub struct Tokenizer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Span {
        Span::at(self.line, self.column, self.offset)
    }

    /// Next significant token. Keeps returning `EndOfInput` once the source is used up.
    pub fn next_token(&mut self) -> Result<Token, RecognizeError> {
        loop {
            let rest = &self.source[self.offset..];
            let start = self.cursor();

            let Some(first) = rest.chars().next() else {
                return Ok(Token {
                    kind: TokenKind::EndOfInput,
                    lexeme: String::new(),
                    span: start,
                });
            };

            let Some((rule, len)) = longest_match(rest) else {
                return Err(RecognizeError::LexicalError { found: first, span: start });
            };

            let lexeme = &rest[..len];
            self.bump(lexeme);

            let Some(kind) = rule.kind else {
                continue;
            };

            let token = Token {
                kind,
                lexeme: lexeme.to_string(),
                span: Span { end: self.offset, ..start },
            };
            debug!("scanned {} {:?} at {}", token.kind, token.lexeme, token.span);
            return Ok(token);
        }
    }

    fn bump(&mut self, lexeme: &str) {
        for ch in lexeme.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += lexeme.len();
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, RecognizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_token();
        self.finished = match &item {
            Ok(token) => token.kind == TokenKind::EndOfInput,
            Err(_) => true,
        };
        Some(item)
    }
}

/// Scans the whole source, `EndOfInput` included.
pub fn tokenize(source: &str) -> Result<Vec<Token>, RecognizeError> {
    Tokenizer::new(source).collect()
}
