mod expr;
mod lexer;
mod parser;

use std::{collections::BTreeSet, str::FromStr};

use crate::errors::{AssignmentError, CompileError};

pub use expr::{Assignment, Expr};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::parse;

/// An expression tree together with the names it references.
///
/// Built once and evaluated against many entries; the variable set tells the
/// search which predicates to compute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    expr: Expr,
    variables: BTreeSet<String>,
    text: Option<String>,
}

impl CompiledQuery {
    /// Wrap a tree built with the `Expr` combinators.
    pub fn from_expr(expr: Expr) -> Self {
        let variables = expr.variables();
        Self {
            expr,
            variables,
            text: None,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// The query string this was compiled from, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn evaluate(&self, assignment: &Assignment) -> Result<bool, AssignmentError> {
        self.expr.evaluate(assignment)
    }
}

impl From<Expr> for CompiledQuery {
    fn from(expr: Expr) -> Self {
        CompiledQuery::from_expr(expr)
    }
}

impl FromStr for CompiledQuery {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

/// Tokenize and parse a query string.
///
/// Behavior:
/// - Empty/whitespace → error (no query)
/// - Unterminated quotes, or a closing quote not followed by a space or `)` → lex error
///   (`"foo bar"` alone is rejected; write `("foo bar")` or add a trailing space)
/// - Missing or extra parens, dangling operators, two terms with no operator → parse error
/// - Trees deeper than 256 levels, through nesting or long operator chains → parse error
/// - `""` is a valid, empty term that every entry contains
pub fn compile(input: &str) -> Result<CompiledQuery, CompileError> {
    let tokens = lexer::tokenize(input)?;
    let expr = parser::parse(tokens)?;
    let compiled = CompiledQuery {
        variables: expr.variables(),
        expr,
        text: Some(input.to_string()),
    };
    log::debug!(
        "compiled query={input:?} variables={}",
        compiled.variables.len()
    );
    Ok(compiled)
}
