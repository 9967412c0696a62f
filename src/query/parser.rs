use crate::errors::ParseError;

use super::expr::Expr;
use super::lexer::{Token, TokenKind};

/// Deepest tree the parser builds. Evaluation, rendering and dropping all
/// recurse over the tree, so this also bounds their stack use.
pub const MAX_DEPTH: usize = 256;

/// Recursive descent over the token stream.
///
/// There are no precedence levels: operators fold strictly left to right in
/// the order they are written, and `~` applies to exactly one unit.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// `~` and `(` currently open
    nesting: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at_compound_end(&self) -> bool {
        matches!(
            self.peek().map(|t| &t.kind),
            None | Some(TokenKind::Eof) | Some(TokenKind::RParen)
        )
    }

    /// compound = unit (op unit)*
    ///
    /// Returns the tree with its height; a long chain grows the tree one level
    /// per operator.
    fn parse_compound(&mut self) -> Result<(Expr, usize), ParseError> {
        let (mut left, mut height) = self.parse_unit()?;
        while !self.at_compound_end() {
            let (op, offset): (fn(Expr, Expr) -> Expr, usize) = match self.advance() {
                Some(Token {
                    kind: TokenKind::And,
                    offset,
                }) => (Expr::and, offset),
                Some(Token {
                    kind: TokenKind::Or,
                    offset,
                }) => (Expr::or, offset),
                Some(tok) => {
                    return Err(ParseError::ExpectedOperator {
                        token: tok.to_string(),
                        offset: tok.offset,
                    })
                }
                None => return Err(ParseError::UnexpectedEof),
            };
            let (right, right_height) = self.parse_unit()?;
            height = height.max(right_height) + 1;
            if height > MAX_DEPTH {
                return Err(ParseError::TooDeep { offset });
            }
            left = op(left, right);
        }
        Ok((left, height))
    }

    /// unit = ATOM | "~" unit | "(" compound ")"
    fn parse_unit(&mut self) -> Result<(Expr, usize), ParseError> {
        let Token { kind, offset } = self.advance().ok_or(ParseError::UnexpectedEof)?;
        match kind {
            TokenKind::Atom(name) => Ok((Expr::Atom(name), 1)),
            TokenKind::Not => {
                self.descend(offset)?;
                let (inner, height) = self.parse_unit()?;
                self.nesting -= 1;
                if height >= MAX_DEPTH {
                    return Err(ParseError::TooDeep { offset });
                }
                Ok((Expr::negate(inner), height + 1))
            }
            TokenKind::LParen => {
                self.descend(offset)?;
                let inner = self.parse_compound()?;
                self.expect_rparen(offset)?;
                self.nesting -= 1;
                Ok(inner)
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEof),
            kind => Err(ParseError::UnexpectedToken {
                token: Token { kind, offset }.to_string(),
                offset,
            }),
        }
    }

    fn descend(&mut self, offset: usize) -> Result<(), ParseError> {
        if self.nesting >= MAX_DEPTH {
            return Err(ParseError::TooDeep { offset });
        }
        self.nesting += 1;
        Ok(())
    }

    fn expect_rparen(&mut self, opened_at: usize) -> Result<(), ParseError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => Ok(()),
            _ => Err(ParseError::UnclosedParen { offset: opened_at }),
        }
    }
}

/// Parse a token stream produced by the lexer into an expression tree.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    if tokens
        .iter()
        .all(|t| matches!(t.kind, TokenKind::Eof))
    {
        return Err(ParseError::EmptyQuery);
    }

    let mut parser = Parser::new(tokens);
    let (expr, _) = parser.parse_compound()?;

    match parser.advance() {
        None
        | Some(Token {
            kind: TokenKind::Eof,
            ..
        }) => Ok(expr),
        Some(Token {
            kind: TokenKind::RParen,
            offset,
        }) => Err(ParseError::UnmatchedCloseParen { offset }),
        Some(tok) => Err(ParseError::UnexpectedToken {
            token: tok.to_string(),
            offset: tok.offset,
        }),
    }
}
