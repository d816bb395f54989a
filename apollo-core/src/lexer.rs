use crate::error::{ApolloError, Result};
use crate::token::{Literal, Token, TokenType as TT};

const KEYWORDS: &[(&str, TT)] = &[
    ("and", TT::And),
    ("or", TT::Or),
    ("not", TT::Not),
    ("if", TT::If),
    ("elif", TT::Elif),
    ("else", TT::Else),
    ("True", TT::True),
    ("False", TT::False),
    ("None", TT::None),
    ("in", TT::In),
    ("do", TT::Do),
    ("for", TT::For),
    ("while", TT::While),
    ("return", TT::Return),
    ("class", TT::Class),
    ("def", TT::Def),
    ("self", TT::Self_),
    ("import", TT::Import),
];

fn keyword(text: &str) -> Option<TT> {
    KEYWORDS
        .iter()
        .find(|(kw, _)| *kw == text)
        .map(|(_, tt)| *tt)
}

/// Scans source text into a token stream, tracking indentation with a
/// monotonically increasing stack seeded at `[0]`.
pub struct Lexer {
    chars: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    leading_spaces: usize,
    indents: Vec<usize>,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            leading_spaces: 0,
            indents: vec![0],
            tokens: Vec::new(),
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>> {
        while !self.at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        for indent in self.indents.iter().rev() {
            if *indent > 0 {
                self.tokens.push(Token::new(TT::Dedent, self.line));
            }
        }
        self.tokens.push(Token::new(TT::Eof, self.line));
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();
        match c {
            '(' => self.add_token(TT::LParen)?,
            ')' => self.add_token(TT::RParen)?,
            '{' => self.add_token(TT::LBrace)?,
            '}' => self.add_token(TT::RBrace)?,
            '[' => self.add_token(TT::LBrack)?,
            ']' => self.add_token(TT::RBrack)?,
            ',' => self.add_token(TT::Comma)?,
            '.' => self.add_token(TT::Dot)?,
            '+' => self.add_token(TT::Plus)?,
            '-' => self.add_token(TT::Minus)?,
            '*' => self.add_token(TT::Star)?,
            '/' => self.add_token(TT::Slash)?,
            '%' => self.add_token(TT::Percent)?,
            ';' => self.add_token(TT::SColon)?,
            ':' => self.add_token(TT::Colon)?,
            '!' => {
                let kind = if self.match_char('=') { TT::NEqual } else { TT::Bang };
                self.add_token(kind)?;
            }
            '=' => {
                let kind = if self.match_char('=') { TT::Equal } else { TT::Assign };
                self.add_token(kind)?;
            }
            '<' => {
                let kind = if self.match_char('=') { TT::LEqual } else { TT::Lesser };
                self.add_token(kind)?;
            }
            '>' => {
                let kind = if self.match_char('=') { TT::GEqual } else { TT::Greater };
                self.add_token(kind)?;
            }
            '#' => {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            }
            ' ' => {
                if self.tokens.is_empty() || self.tokens.last().unwrap().kind == TT::Newline {
                    self.leading_spaces += 1;
                }
            }
            '\r' | '\t' => {}
            '\n' => {
                self.add_token(TT::Newline)?;
                self.line += 1;
                self.leading_spaces = 0;
            }
            '"' | '\'' => self.string(c)?,
            c if c.is_ascii_digit() => self.number()?,
            c if c.is_alphabetic() => self.identifier_or_keyword()?,
            c => {
                return Err(ApolloError::UnexpectedCharacter {
                    character: c,
                    line: self.line,
                })
            }
        }
        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<()> {
        let start_line = self.line;
        while let Some(c) = self.peek() {
            if c == quote {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.at_end() {
            return Err(ApolloError::UnterminatedString {
                start_line,
                line: self.line,
            });
        }

        self.advance(); // closing quote
        let value: String = self.chars[self.start + 1..self.current - 1].iter().collect();
        let lexeme: String = self.chars[self.start..self.current].iter().collect();
        self.add_token_with_literal(TT::String, lexeme, Literal::Str(value))
    }

    fn number(&mut self) -> Result<()> {
        let mut is_float = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text: String = self.chars[self.start..self.current].iter().collect();
        let literal = if is_float {
            Literal::Float(text.parse().unwrap())
        } else {
            Literal::Int(text.parse().unwrap())
        };
        self.add_token_with_literal(TT::Number, text, literal)
    }

    fn identifier_or_keyword(&mut self) -> Result<()> {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text: String = self.chars[self.start..self.current].iter().collect();
        match keyword(&text) {
            Some(kind) => self.add_token_with_lexeme(kind, text),
            Option::None => self.add_token_with_lexeme(TT::Identifier, text),
        }
    }

    fn add_token(&mut self, kind: TT) -> Result<()> {
        let lexeme: String = self.chars[self.start..self.current].iter().collect();
        self.add_token_with_lexeme(kind, lexeme)
    }

    fn add_token_with_lexeme(&mut self, kind: TT, lexeme: String) -> Result<()> {
        self.resolve_pending_indentation()?;
        self.tokens.push(Token::with_lexeme(kind, self.line, lexeme));
        Ok(())
    }

    fn add_token_with_literal(&mut self, kind: TT, lexeme: String, literal: Literal) -> Result<()> {
        self.resolve_pending_indentation()?;
        self.tokens
            .push(Token::with_literal(kind, self.line, lexeme, literal));
        Ok(())
    }

    /// Resolves the indentation stack against `leading_spaces` if the
    /// previous emitted token was a NEWLINE (or none has been emitted yet).
    /// Blank and comment-only lines never reach here, since they end on a
    /// NEWLINE/comment token without an intervening non-NEWLINE token.
    fn resolve_pending_indentation(&mut self) -> Result<()> {
        let previous_was_newline = self
            .tokens
            .last()
            .map(|t| t.kind == TT::Newline)
            .unwrap_or(true);
        if !previous_was_newline {
            return Ok(());
        }

        let current_indent = self.leading_spaces;
        let top = *self.indents.last().unwrap();

        if current_indent == top {
            // no change
        } else if current_indent > top {
            self.indents.push(current_indent);
            self.tokens.push(Token::new(TT::Indent, self.line));
        } else {
            while *self.indents.last().unwrap() > current_indent {
                self.indents.pop();
                self.tokens.push(Token::new(TT::Dedent, self.line));
            }
            if *self.indents.last().unwrap() != current_indent {
                return Err(ApolloError::IndentationError { line: self.line });
            }
        }
        self.leading_spaces = 0;
        Ok(())
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    fn at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}

/// Tokenizes `source` in full, matching `spec.md` §4.1.
pub fn scan(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).scan_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TT> {
        scan(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn print_hello_world() {
        let tokens = scan(r#"print("hello, world!")"#).unwrap();
        assert_eq!(
            tokens
                .iter()
                .map(|t| (t.kind, t.lexeme.clone(), t.literal.clone()))
                .collect::<Vec<_>>(),
            vec![
                (TT::Identifier, Some("print".into()), Option::None),
                (TT::LParen, Some("(".into()), Option::None),
                (
                    TT::String,
                    Some(r#""hello, world!""#.into()),
                    Some(Literal::Str("hello, world!".into()))
                ),
                (TT::RParen, Some(")".into()), Option::None),
                (TT::Eof, Option::None, Option::None),
            ]
        );
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("== != <= >= < > = !"),
            vec![
                TT::Equal,
                TT::NEqual,
                TT::LEqual,
                TT::GEqual,
                TT::Lesser,
                TT::Greater,
                TT::Assign,
                TT::Bang,
                TT::Eof,
            ]
        );
    }

    #[test]
    fn integer_vs_float() {
        let tokens = scan("1 1.5").unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Int(1)));
        assert_eq!(tokens[1].literal, Some(Literal::Float(1.5)));
    }

    #[test]
    fn comment_is_consumed_to_newline() {
        assert_eq!(
            kinds("# a comment\nx"),
            vec![TT::Newline, TT::Identifier, TT::Eof]
        );
    }

    #[test]
    fn unterminated_string_fails() {
        let err = scan("'hello").unwrap_err();
        assert!(matches!(err, ApolloError::UnterminatedString { .. }));
    }

    #[test]
    fn leading_underscore_is_scan_failure() {
        let err = scan("_foo").unwrap_err();
        assert!(matches!(err, ApolloError::UnexpectedCharacter { character: '_', .. }));
    }

    #[test]
    fn simple_indent_dedent() {
        assert_eq!(
            kinds("if True:\n    a = 1\nb = 2"),
            vec![
                TT::If,
                TT::True,
                TT::Colon,
                TT::Newline,
                TT::Indent,
                TT::Identifier,
                TT::Assign,
                TT::Number,
                TT::Newline,
                TT::Dedent,
                TT::Identifier,
                TT::Assign,
                TT::Number,
                TT::Eof,
            ]
        );
    }

    #[test]
    fn multiple_dedents_at_eof() {
        assert_eq!(
            kinds("if True:\n    if True:\n        a = 1"),
            vec![
                TT::If, TT::True, TT::Colon, TT::Newline,
                TT::Indent,
                TT::If, TT::True, TT::Colon, TT::Newline,
                TT::Indent,
                TT::Identifier, TT::Assign, TT::Number,
                TT::Dedent,
                TT::Dedent,
                TT::Eof,
            ]
        );
    }

    #[test]
    fn blank_lines_do_not_affect_indentation() {
        assert_eq!(
            kinds("if True:\n\n    a = 1\n\nb = 2"),
            vec![
                TT::If, TT::True, TT::Colon, TT::Newline,
                TT::Newline,
                TT::Indent,
                TT::Identifier, TT::Assign, TT::Number, TT::Newline,
                TT::Newline,
                TT::Dedent,
                TT::Identifier, TT::Assign, TT::Number,
                TT::Eof,
            ]
        );
    }

    #[test]
    fn balanced_indent_dedent_counts() {
        let tokens = scan("if True:\n    if True:\n        a = 1\nb = 2").unwrap();
        let indents = tokens.iter().filter(|t| t.kind == TT::Indent).count();
        let dedents = tokens.iter().filter(|t| t.kind == TT::Dedent).count();
        assert_eq!(indents, dedents);
        assert_eq!(tokens.iter().filter(|t| t.kind == TT::Eof).count(), 1);
    }

    #[test]
    fn mismatched_dedent_is_indentation_error() {
        // 4-space block, then a line indented to 2 spaces matches no open level.
        let err = scan("if True:\n    a = 1\n  b = 2").unwrap_err();
        assert!(matches!(err, ApolloError::IndentationError { .. }));
    }
}
