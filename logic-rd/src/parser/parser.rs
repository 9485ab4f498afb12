use log::{debug, trace};

use crate::error::{Expected, RecognizeError};
use super::lexer::{Token, TokenKind, Tokenizer};

pub fn parse_source(source: &str) -> Result<Summary, RecognizeError> {
    let mut parser = Parser::new(Tokenizer::new(source))?;
    parser.parse_program()
}

/// What an accepted run saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Statement heads (identifier or `print`) entered through `Stmt`.
    pub statements: usize,
    /// Tokens consumed, `END_OF_INPUT` excluded.
    pub tokens: usize,
}

/// One state per nonterminal of the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stmt,
    /// `after_operand` is set when entered right after a boolean literal or `)`.
    Expr { after_operand: bool },
    BooleanVal,
    LogOp,
    AssignOp,
    PrintCheck,
    StringCheck,
}

enum Step {
    Next(State),
    Accept,
}

/// Recursive-descent recognizer with one token of lookahead.
///
/// Every transition ends in a tail call to the next nonterminal, so instead of
/// recursing each one returns the state to enter and `parse_program` drives
/// them in a loop. Input length never grows the call stack.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    lookahead: Token,
    open_parens: usize,
    summary: Summary,
}

impl<'a> Parser<'a> {
    /// Reads the first lookahead straight away, so a lexical error in the first
    /// token surfaces here.
    pub fn new(mut tokenizer: Tokenizer<'a>) -> Result<Self, RecognizeError> {
        let lookahead = tokenizer.next_token()?;
        Ok(Self {
            tokenizer,
            lookahead,
            open_parens: 0,
            summary: Summary::default(),
        })
    }

    pub fn parse_program(&mut self) -> Result<Summary, RecognizeError> {
        let mut state = State::Stmt;
        loop {
            trace!("{:?} with lookahead {} {:?}", state, self.lookahead.kind, self.lookahead.lexeme);
            state = match self.step(state)? {
                Step::Next(next) => next,
                Step::Accept => {
                    debug!("end of program reached");
                    return Ok(self.summary);
                }
            };
        }
    }

    fn step(&mut self, state: State) -> Result<Step, RecognizeError> {
        match state {
            State::Stmt => self.stmt(),
            State::Expr { after_operand } => self.expr(after_operand),
            State::BooleanVal => self.boolean_val(),
            State::LogOp => self.log_op(),
            State::AssignOp => self.assign_op(),
            State::PrintCheck => self.print_check(),
            State::StringCheck => self.string_check(),
        }
    }

    // Stmt -> IDENTIFIER = Expr | print Expr
    fn stmt(&mut self) -> Result<Step, RecognizeError> {
        match self.lookahead.kind {
            TokenKind::Identifier | TokenKind::Print => {
                debug!("statement starting with {:?}", self.lookahead.lexeme);
                self.summary.statements += 1;
                self.advance()?;
                Ok(Step::Next(State::Expr { after_operand: false }))
            }
            TokenKind::EndOfInput if self.open_parens > 0 => Err(self.error(Expected::ClosingParen)),
            TokenKind::EndOfInput => Ok(Step::Accept),
            _ => Err(self.error(Expected::StatementStart)),
        }
    }

    // Expr -> ( Expr LogOp Expr ) | BooleanVal
    fn expr(&mut self, after_operand: bool) -> Result<Step, RecognizeError> {
        let kind = self.lookahead.kind;

        // FOLLOW(Expr) outside parentheses: the statement is over
        let ends_statement = matches!(
            kind,
            TokenKind::Identifier | TokenKind::Print | TokenKind::EndOfInput
        );
        if after_operand && self.open_parens == 0 && ends_statement {
            return Ok(Step::Next(State::Stmt));
        }

        match kind {
            TokenKind::BooleanLiteral => Ok(Step::Next(State::BooleanVal)),
            TokenKind::LogicalOp => Ok(Step::Next(State::LogOp)),
            TokenKind::Assign => Ok(Step::Next(State::AssignOp)),
            TokenKind::Print => Ok(Step::Next(State::PrintCheck)),
            TokenKind::Identifier => {
                self.advance()?;
                Ok(Step::Next(State::Stmt))
            }
            _ if self.lookahead.is("(") => {
                self.open_parens += 1;
                self.advance()?;
                Ok(Step::Next(State::Expr { after_operand: false }))
            }
            _ if self.lookahead.is(")") => {
                if self.open_parens == 0 {
                    return Err(self.error(Expected::OpeningParen));
                }
                self.open_parens -= 1;
                self.advance()?;
                Ok(Step::Next(State::Expr { after_operand: true }))
            }
            TokenKind::EndOfInput if after_operand => Err(self.error(Expected::ClosingParen)),
            _ => Err(self.error(Expected::Expression)),
        }
    }

    // BooleanVal -> true | TRUE | t | T | 1 | false | FALSE | f | F | 0
    fn boolean_val(&mut self) -> Result<Step, RecognizeError> {
        self.expect(TokenKind::BooleanLiteral, Expected::BooleanValue)?;
        Ok(Step::Next(State::Expr { after_operand: true }))
    }

    // LogOp -> and | or | not
    fn log_op(&mut self) -> Result<Step, RecognizeError> {
        self.expect(TokenKind::LogicalOp, Expected::LogicalOperator)?;
        Ok(Step::Next(State::Expr { after_operand: false }))
    }

    fn assign_op(&mut self) -> Result<Step, RecognizeError> {
        self.expect(TokenKind::Assign, Expected::AssignmentOperator)?;
        let starts_value = matches!(self.lookahead.kind, TokenKind::LParen | TokenKind::BooleanLiteral)
            || self.lookahead.is("not");
        if !starts_value {
            return Err(self.error(Expected::AssignmentOperator));
        }
        Ok(Step::Next(State::Expr { after_operand: false }))
    }

    fn print_check(&mut self) -> Result<Step, RecognizeError> {
        self.expect(TokenKind::Print, Expected::PrintCommand)?;
        Ok(Step::Next(State::StringCheck))
    }

    fn string_check(&mut self) -> Result<Step, RecognizeError> {
        self.expect(TokenKind::Identifier, Expected::Identifier)?;
        Ok(Step::Next(State::Stmt))
    }

    // Вспомогательные методы

    /// Consumes the lookahead and pulls the next one.
    fn advance(&mut self) -> Result<Token, RecognizeError> {
        let next = self.tokenizer.next_token()?;
        let consumed = std::mem::replace(&mut self.lookahead, next);
        debug!("matched {} {:?} at {}", consumed.kind, consumed.lexeme, consumed.span);
        self.summary.tokens += 1;
        Ok(consumed)
    }

    fn expect(&mut self, kind: TokenKind, expected: Expected) -> Result<Token, RecognizeError> {
        if self.lookahead.kind == kind {
            self.advance()
        } else {
            Err(self.error(expected))
        }
    }

    fn error(&self, expected: Expected) -> RecognizeError {
        RecognizeError::SyntaxError {
            expected,
            found: self.lookahead.kind,
            lexeme: self.lookahead.lexeme.clone(),
            span: self.lookahead.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_of(source: &str) -> Expected {
        match parse_source(source) {
            Err(RecognizeError::SyntaxError { expected, .. }) => expected,
            other => panic!("expected syntax error for {source:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(parse_source("").unwrap(), Summary::default());
        assert_eq!(parse_source("\n\t \n").unwrap(), Summary::default());
    }

    #[test]
    fn test_assignment() {
        let summary = parse_source("x = true").unwrap();
        assert_eq!(summary, Summary { statements: 1, tokens: 3 });
    }

    #[test]
    fn test_nested_print() {
        let summary = parse_source("print ( true and ( false or not ) )").unwrap();
        assert_eq!(summary.statements, 1);
        assert_eq!(summary.tokens, 10);
    }

    #[test]
    fn test_statement_sequence() {
        let source = "a = true\nb = (t or f)\nprint (T and 0)\nprint b\n";
        let summary = parse_source(source).unwrap();
        assert_eq!(summary.statements, 4);
    }

    #[test]
    fn test_identifier_inside_expression_restarts_statement() {
        // IDENTIFIER while an operand is expected is consumed and Stmt needs another head
        assert_eq!(expected_of("b = (a1 or f)"), Expected::StatementStart);
        assert_eq!(expected_of("print (a1 or f)"), Expected::StatementStart);
        assert!(parse_source("print (a1 b = t)").is_ok());
    }

    #[test]
    fn test_print_variable_through_print_check() {
        // Expr sees PRINT while an operand is expected: PrintCheck then StringCheck
        assert!(parse_source("x print y").is_ok());
        assert_eq!(expected_of("x print true"), Expected::Identifier);
    }

    #[test]
    fn test_assign_op_requires_value_start() {
        assert!(parse_source("x = not t").is_ok());
        assert!(parse_source("x = (t or f)").is_ok());
        assert_eq!(expected_of("x = and t"), Expected::AssignmentOperator);
        assert_eq!(expected_of("x = = t"), Expected::AssignmentOperator);
        assert_eq!(expected_of("x ="), Expected::AssignmentOperator);
    }

    #[test]
    fn test_statement_start_errors() {
        assert_eq!(expected_of("= true"), Expected::StatementStart);
        assert_eq!(expected_of("( true and false"), Expected::StatementStart);
        assert_eq!(expected_of("true"), Expected::StatementStart);
    }

    #[test]
    fn test_expression_errors() {
        assert_eq!(expected_of("print"), Expected::Expression);
        assert_eq!(expected_of("x = t and"), Expected::Expression);
    }

    #[test]
    fn test_trailing_identifier_starts_new_statement() {
        // after a complete value the identifier is a statement head, not a consumed operand
        match parse_source("x = t y") {
            Err(RecognizeError::SyntaxError { expected, found, span, .. }) => {
                assert_eq!(expected, Expected::Expression);
                assert_eq!(found, TokenKind::EndOfInput);
                assert_eq!((span.line, span.column), (1, 8));
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(expected_of("print ( t or f ) z"), Expected::Expression);
    }

    #[test]
    fn test_parenthesis_balance() {
        assert_eq!(expected_of("print ( true and false"), Expected::ClosingParen);
        assert_eq!(expected_of("print ( x"), Expected::ClosingParen);
        assert_eq!(expected_of("x = true )"), Expected::OpeningParen);
    }

    #[test]
    fn test_error_points_at_lookahead() {
        match parse_source("x = true\nprint and") {
            Err(RecognizeError::SyntaxError { found, lexeme, span, .. }) => {
                assert_eq!(found, TokenKind::EndOfInput);
                assert_eq!(lexeme, "");
                assert_eq!((span.line, span.column), (2, 10));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_deep_input_does_not_overflow() {
        let mut source = String::from("x = ");
        for _ in 0..50_000 {
            source.push_str("( t and ");
        }
        source.push('f');
        for _ in 0..50_000 {
            source.push_str(" )");
        }
        let summary = parse_source(&source).unwrap();
        assert_eq!(summary.statements, 1);
    }

    #[test]
    fn test_lexical_error_in_first_token() {
        assert!(matches!(
            Parser::new(Tokenizer::new("%")),
            Err(RecognizeError::LexicalError { found: '%', .. })
        ));
    }
}
