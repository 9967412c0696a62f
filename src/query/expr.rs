use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    ops::{BitAnd, BitOr, Not},
};

use crate::errors::AssignmentError;

/// Truth value of every atomic name for one catalog entry.
pub type Assignment = HashMap<String, bool>;

/// Boolean expression over named predicates.
///
/// Trees are plain values: combining two expressions builds a new node and
/// leaves the operands untouched, so one compiled query can be evaluated
/// against any number of entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Atom(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn atom(name: impl Into<String>) -> Self {
        Expr::Atom(name.into())
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn negate(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Distinct atomic names in this tree.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Atom(name) => {
                vars.insert(name.clone());
            }
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_variables(vars);
                b.collect_variables(vars);
            }
            Expr::Not(inner) => inner.collect_variables(vars),
        }
    }

    pub fn evaluate(&self, assignment: &Assignment) -> Result<bool, AssignmentError> {
        match self {
            Expr::Atom(name) => assignment
                .get(name)
                .copied()
                .ok_or_else(|| AssignmentError(name.clone())),
            Expr::And(a, b) => Ok(a.evaluate(assignment)? && b.evaluate(assignment)?),
            Expr::Or(a, b) => Ok(a.evaluate(assignment)? || b.evaluate(assignment)?),
            Expr::Not(inner) => Ok(!inner.evaluate(assignment)?),
        }
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        Expr::and(self, rhs)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        Expr::or(self, rhs)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::negate(self)
    }
}

/// A name the lexer reads back as a single atom without quoting.
fn is_plain_word(name: &str) -> bool {
    !name.is_empty()
        && !matches!(name, "and" | "or" | "not")
        && !name.contains([' ', '"', '(', ')', '&', '|', '~'])
}

/// Renders the tree back into query syntax. Every binary node is wrapped in
/// parentheses. Names that are not plain words are quoted inside their own
/// parentheses, since a closing quote has to be followed by a space or `)`.
///
/// Query syntax has no escape for `"`, so a tree holding such a name (only
/// possible through [`Expr::atom`] or deserialization) renders text that
/// does not compile.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(name) if is_plain_word(name) => write!(f, "{name}"),
            Expr::Atom(name) => write!(f, "(\"{name}\")"),
            Expr::And(a, b) => write!(f, "({a} & {b})"),
            Expr::Or(a, b) => write!(f, "({a} | {b})"),
            Expr::Not(inner) => write!(f, "~{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign(pairs: &[(&str, bool)]) -> Assignment {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_variables_union() {
        let e = (Expr::atom("a") & Expr::atom("b")) | !Expr::atom("a");
        let vars: Vec<String> = e.variables().into_iter().collect();
        assert_eq!(vars, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_operators_build_nodes() {
        assert_eq!(
            Expr::atom("a") & Expr::atom("b"),
            Expr::And(Box::new(Expr::atom("a")), Box::new(Expr::atom("b")))
        );
        assert_eq!(!Expr::atom("a"), Expr::Not(Box::new(Expr::atom("a"))));
    }

    #[test]
    fn test_combining_leaves_operands_reusable() {
        let a = Expr::atom("a");
        let b = Expr::atom("b");
        let both = a.clone() & b.clone();
        let either = a.clone() | b;
        let env = assign(&[("a", true), ("b", false)]);
        assert_eq!(a.evaluate(&env), Ok(true));
        assert_eq!(both.evaluate(&env), Ok(false));
        assert_eq!(either.evaluate(&env), Ok(true));
    }

    #[test]
    fn test_evaluate_truth_table() {
        let e = Expr::atom("a") & !Expr::atom("b");
        for (a, b, expected) in [
            (false, false, false),
            (false, true, false),
            (true, false, true),
            (true, true, false),
        ] {
            assert_eq!(e.evaluate(&assign(&[("a", a), ("b", b)])), Ok(expected));
        }
    }

    #[test]
    fn test_evaluate_missing_variable() {
        let e = Expr::atom("a") | Expr::atom("b");
        assert_eq!(
            e.evaluate(&assign(&[("a", false)])),
            Err(AssignmentError("b".to_string()))
        );
    }

    #[test]
    fn test_display() {
        let e = !(Expr::atom("a") & Expr::atom("b c")) | Expr::atom("d");
        assert_eq!(e.to_string(), "(~(a & (\"b c\")) | d)");
        assert_eq!(Expr::atom("or").to_string(), "(\"or\")");
        assert_eq!(Expr::atom("").to_string(), "(\"\")");
        assert_eq!((!Expr::atom("x y")).to_string(), "~(\"x y\")");
    }

    #[test]
    fn test_serde() {
        let e = Expr::atom("a") & !Expr::atom("b");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"and": [{"atom": "a"}, {"not": {"atom": "b"}}]})
        );
        let back: Expr = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }
}
