use thiserror::Error;

/// Malformed quoting in a query string. No tokens are salvaged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated quoted atom starting at position {offset}")]
    UnterminatedQuote { offset: usize },

    #[error("closing quote at position {offset} must be followed by a space or ')', got '{found}'")]
    MisplacedClosingQuote { offset: usize, found: char },

    #[error("closing quote at position {offset} must be followed by a space or ')', got end of input")]
    QuoteAtEndOfInput { offset: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty search query")]
    EmptyQuery,

    #[error("unexpected {token} at position {offset}")]
    UnexpectedToken { token: String, offset: usize },

    #[error("unexpected end of input, expected a term, '~' or '('")]
    UnexpectedEof,

    #[error("expected an operator at position {offset}, got {token}")]
    ExpectedOperator { token: String, offset: usize },

    #[error("parenthesis opened at position {offset} is never closed")]
    UnclosedParen { offset: usize },

    #[error("unmatched ')' at position {offset}")]
    UnmatchedCloseParen { offset: usize },

    #[error("query nests too deeply at position {offset}")]
    TooDeep { offset: usize },
}

/// Anything that stops a query string from compiling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// The evaluator met a name the assignment does not define.
///
/// This is never caused by user input: it means whoever built the
/// assignment skipped a variable the expression references. `search` builds
/// its assignments from the compiled variable set and so never sees it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("variable '{0}' is missing from the assignment")]
pub struct AssignmentError(pub String);

/// Why a search produced no result list. Only the query text can be at
/// fault; every entry is evaluated against a complete assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl From<LexError> for SearchError {
    fn from(err: LexError) -> Self {
        Self::Compile(err.into())
    }
}

impl From<ParseError> for SearchError {
    fn from(err: ParseError) -> Self {
        Self::Compile(err.into())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("config file is not valid utf8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f64),
}
