use crate::token::Token;

/// The closed error taxonomy for the lexer, parser, and evaluator.
///
/// `ReturnSignal` from the source interpreter is not a member here — it is
/// not an error, it is the `Flow::Return` control value threaded through
/// statement execution (see `interpreter::Flow`).
#[derive(Debug, thiserror::Error)]
pub enum ApolloError {
    #[error("unexpected character '{character}' at line {line}")]
    UnexpectedCharacter { character: char, line: usize },

    #[error("string started on line {start_line} is unterminated at line {line}")]
    UnterminatedString { start_line: usize, line: usize },

    #[error("indentation cannot be reconciled at line {line}")]
    IndentationError { line: usize },

    #[error("{message}")]
    ParseException { message: String, token: Token },

    #[error("name '{name}' is not defined")]
    NameNotFoundException { name: String, token: Token },

    #[error("{message}")]
    RuntimeException { message: String, token: Token },
}

impl ApolloError {
    /// The token to anchor a `[line N] Error at ...` diagnostic on, if one
    /// is carried. Lexer-stage errors have no token to point at.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ApolloError::ParseException { token, .. } => Some(token),
            ApolloError::RuntimeException { token, .. } => Some(token),
            ApolloError::NameNotFoundException { token, .. } => Some(token),
            _ => Option::None,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ApolloError::UnexpectedCharacter { line, .. } => *line,
            ApolloError::UnterminatedString { line, .. } => *line,
            ApolloError::IndentationError { line } => *line,
            ApolloError::ParseException { token, .. } => token.line,
            ApolloError::NameNotFoundException { token, .. } => token.line,
            ApolloError::RuntimeException { token, .. } => token.line,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApolloError>;
