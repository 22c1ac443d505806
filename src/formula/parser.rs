//! LTL text parser.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! implication := disjunction ( "->" implication )?
//! disjunction := conjunction ( "||" conjunction )*
//! conjunction := temporal ( "&&" temporal )*
//! temporal    := unary ( ( "U" | "R" ) temporal )?
//! unary       := ( "!" | "X" | "G" | "F" ) unary | primary
//! primary     := identifier | "0" | "1" | "(" implication ")"
//! ```
//!
//! Identifiers are `[a-z][a-z0-9_]*`. Operators and constants are reserved
//! uppercase letters and digits, so `G a` and `Ga` both parse as globally-`a`.

use super::{BinaryOp, Formula, UnaryOp};
use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    True,
    False,
    Unary(UnaryOp),
    Binary(BinaryOp),
    LParen,
    RParen,
}

impl TokenKind {
    fn text(&self) -> String {
        match self {
            TokenKind::Ident(name) => name.clone(),
            TokenKind::True => "1".to_string(),
            TokenKind::False => "0".to_string(),
            TokenKind::Unary(op) => op.symbol().to_string(),
            TokenKind::Binary(op) => op.symbol().to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    position: usize,
}

/// Parse LTL formula text.
pub fn parse(text: &str) -> Result<Formula, ParseError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser { tokens, cursor: 0 };
    let formula = parser.implication()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::TrailingInput {
            position: token.position,
            found: token.kind.text(),
        });
    }
    Ok(formula)
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '0' => TokenKind::False,
            '1' => TokenKind::True,
            '!' => TokenKind::Unary(UnaryOp::Neg),
            'X' => TokenKind::Unary(UnaryOp::Next),
            'G' => TokenKind::Unary(UnaryOp::Globally),
            'F' => TokenKind::Unary(UnaryOp::Finally),
            'U' => TokenKind::Binary(BinaryOp::Until),
            'R' => TokenKind::Binary(BinaryOp::Release),
            '&' | '|' | '-' => {
                let (second, op) = match c {
                    '&' => ('&', BinaryOp::And),
                    '|' => ('|', BinaryOp::Or),
                    _ => ('>', BinaryOp::Implies),
                };
                match chars.next() {
                    Some((_, found)) if found == second => TokenKind::Binary(op),
                    Some((position, found)) => return Err(ParseError::UnexpectedChar { position, found }),
                    None => {
                        return Err(ParseError::UnexpectedEnd {
                            expected: "a two-character operator",
                        })
                    }
                }
            }
            c if c.is_ascii_lowercase() => {
                let mut name = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_lowercase() || next.is_ascii_digit() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                TokenKind::Ident(name)
            }
            found => return Err(ParseError::UnexpectedChar { position, found }),
        };
        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn peek_binary(&self) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Binary(op),
                ..
            }) => Some(*op),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn implication(&mut self) -> Result<Formula, ParseError> {
        let left = self.disjunction()?;
        if self.peek_binary() == Some(BinaryOp::Implies) {
            self.cursor += 1;
            let right = self.implication()?;
            return Ok(left.implies(right));
        }
        Ok(left)
    }

    fn disjunction(&mut self) -> Result<Formula, ParseError> {
        let mut left = self.conjunction()?;
        while self.peek_binary() == Some(BinaryOp::Or) {
            self.cursor += 1;
            left = left.or(self.conjunction()?);
        }
        Ok(left)
    }

    fn conjunction(&mut self) -> Result<Formula, ParseError> {
        let mut left = self.temporal()?;
        while self.peek_binary() == Some(BinaryOp::And) {
            self.cursor += 1;
            left = left.and(self.temporal()?);
        }
        Ok(left)
    }

    fn temporal(&mut self) -> Result<Formula, ParseError> {
        let left = self.unary()?;
        match self.peek_binary() {
            Some(op @ (BinaryOp::Until | BinaryOp::Release)) => {
                self.cursor += 1;
                let right = self.temporal()?;
                Ok(Formula::binary(op, left, right))
            }
            _ => Ok(left),
        }
    }

    fn unary(&mut self) -> Result<Formula, ParseError> {
        const EXPECTED: &str = "a proposition, constant, unary operator or '('";

        let token = self.advance().ok_or(ParseError::UnexpectedEnd { expected: EXPECTED })?;
        match token.kind {
            TokenKind::Unary(op) => Ok(Formula::unary(op, self.unary()?)),
            TokenKind::Ident(name) => Ok(Formula::var(name)),
            TokenKind::True => Ok(Formula::top()),
            TokenKind::False => Ok(Formula::bottom()),
            TokenKind::LParen => {
                let inner = self.implication()?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ParseError::UnexpectedToken {
                        position: other.position,
                        found: other.kind.text(),
                        expected: "')'",
                    }),
                    None => Err(ParseError::UnexpectedEnd { expected: "')'" }),
                }
            }
            other => Err(ParseError::UnexpectedToken {
                position: token.position,
                found: other.text(),
                expected: EXPECTED,
            }),
        }
    }
}
