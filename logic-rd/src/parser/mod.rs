pub mod lexer;
pub mod parser;

use crate::error::RecognizeError;

pub use parser::Summary;

/// Главная функция: текст -> принят / ошибка с позицией
pub fn parse(source: &str) -> Result<Summary, RecognizeError> {
    parser::parse_source(source)
}
