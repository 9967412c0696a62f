use std::fmt;

use crate::errors::LexError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Atom(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
    Eof,
}

/// A token and the character position it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Atom(name) => write!(f, "term \"{name}\""),
            TokenKind::And => write!(f, "'&'"),
            TokenKind::Or => write!(f, "'|'"),
            TokenKind::Not => write!(f, "'~'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

const WORD_OPERATORS: [(&str, TokenKind); 3] = [
    ("and ", TokenKind::And),
    ("or ", TokenKind::Or),
    ("not ", TokenKind::Not),
];

/// Pending unquoted atom and the position it started at.
struct Pending {
    text: String,
    start: usize,
}

impl Pending {
    fn push(&mut self, c: char, at: usize) {
        if self.text.is_empty() {
            self.start = at;
        }
        self.text.push(c);
    }

    fn flush(&mut self, tokens: &mut Vec<Token>) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            tokens.push(Token::new(TokenKind::Atom(text), self.start));
        }
    }
}

/// Split a query into tokens, ending with `Eof`.
///
/// Runs of spaces never produce empty atoms; only `""` does.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut pending = Pending {
        text: String::new(),
        start: 0,
    };
    let mut i = 0;

    while i < len {
        match chars[i] {
            '"' => {
                // anything already typed becomes part of the quoted atom
                let start = if pending.text.is_empty() { i } else { pending.start };
                let mut text = std::mem::take(&mut pending.text);
                i = read_quoted(&chars, i, &mut text)?;
                tokens.push(Token::new(TokenKind::Atom(text), start));
                continue;
            }
            ' ' => pending.flush(&mut tokens),
            '(' => {
                pending.flush(&mut tokens);
                tokens.push(Token::new(TokenKind::LParen, i));
            }
            ')' => {
                pending.flush(&mut tokens);
                tokens.push(Token::new(TokenKind::RParen, i));
            }
            '&' => {
                pending.flush(&mut tokens);
                tokens.push(Token::new(TokenKind::And, i));
            }
            '|' => {
                pending.flush(&mut tokens);
                tokens.push(Token::new(TokenKind::Or, i));
            }
            '~' => {
                pending.flush(&mut tokens);
                tokens.push(Token::new(TokenKind::Not, i));
            }
            c => {
                if pending.text.is_empty() {
                    if let Some((word, kind)) = word_operator(&chars[i..]) {
                        tokens.push(Token::new(kind, i));
                        i += word.chars().count();
                        continue;
                    }
                }
                pending.push(c, i);
            }
        }
        i += 1;
    }

    pending.flush(&mut tokens);
    tokens.push(Token::new(TokenKind::Eof, len));
    Ok(tokens)
}

/// `and `, `or ` or `not ` at the start of `rest`, including the space.
fn word_operator(rest: &[char]) -> Option<(&'static str, TokenKind)> {
    WORD_OPERATORS.iter().find_map(|(word, kind)| {
        let matched = word.chars().count() <= rest.len()
            && word.chars().zip(rest).all(|(w, c)| w == *c);
        matched.then(|| (*word, kind.clone()))
    })
}

/// Read a quoted atom whose opening quote is at `open`, appending to `text`.
/// Returns the index to resume scanning from.
fn read_quoted(chars: &[char], open: usize, text: &mut String) -> Result<usize, LexError> {
    let mut i = open + 1;
    while i < chars.len() {
        if chars[i] == '"' {
            return match chars.get(i + 1) {
                None => Err(LexError::QuoteAtEndOfInput { offset: i }),
                Some(' ') => Ok(i + 2),
                Some(')') => Ok(i + 1),
                Some(&found) => Err(LexError::MisplacedClosingQuote { offset: i, found }),
            };
        }
        text.push(chars[i]);
        i += 1;
    }
    Err(LexError::UnterminatedQuote { offset: open })
}
