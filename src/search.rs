use std::borrow::Cow;

use rayon::prelude::*;

use crate::{
    entry::CatalogEntry,
    errors::SearchError,
    matcher,
    query::{self, Assignment, CompiledQuery},
};

/// Similarity a fuzzy match has to reach when nothing else is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// A query as handed to `search`: raw text still to be compiled, or a tree
/// compiled earlier and reused.
#[derive(Debug, Clone, Copy)]
pub enum Query<'q> {
    Text(&'q str),
    Compiled(&'q CompiledQuery),
}

impl<'q> From<&'q str> for Query<'q> {
    fn from(text: &'q str) -> Self {
        Query::Text(text)
    }
}

impl<'q> From<&'q String> for Query<'q> {
    fn from(text: &'q String) -> Self {
        Query::Text(text)
    }
}

impl<'q> From<&'q CompiledQuery> for Query<'q> {
    fn from(compiled: &'q CompiledQuery) -> Self {
        Query::Compiled(compiled)
    }
}

impl<'q> Query<'q> {
    fn resolve(self) -> Result<Cow<'q, CompiledQuery>, SearchError> {
        match self {
            Query::Text(text) => Ok(Cow::Owned(query::compile(text)?)),
            Query::Compiled(compiled) => Ok(Cow::Borrowed(compiled)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub threshold: f64,
    /// Evaluate entries on the rayon pool. Results keep catalog order.
    pub parallel: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            parallel: false,
        }
    }
}

/// Entries of `catalog` the query selects, in catalog order.
pub fn search<'c, 'q>(
    catalog: &'c [CatalogEntry],
    query: impl Into<Query<'q>>,
    threshold: f64,
) -> Result<Vec<&'c CatalogEntry>, SearchError> {
    search_with(
        catalog,
        query,
        &SearchOptions {
            threshold,
            ..Default::default()
        },
    )
}

pub fn search_with<'c, 'q>(
    catalog: &'c [CatalogEntry],
    query: impl Into<Query<'q>>,
    opts: &SearchOptions,
) -> Result<Vec<&'c CatalogEntry>, SearchError> {
    // compile before touching the catalog so malformed queries fail fast
    let compiled = query.into().resolve()?;
    let compiled = compiled.as_ref();
    let threshold = opts.threshold;

    let hits: Vec<&CatalogEntry> = if opts.parallel {
        catalog
            .par_iter()
            .filter_map(|entry| select(entry, compiled, threshold))
            .collect()
    } else {
        catalog
            .iter()
            .filter_map(|entry| select(entry, compiled, threshold))
            .collect()
    };

    log::debug!(
        "search query={:?} variables={} entries={} hits={} threshold={threshold} parallel={}",
        compiled.text().unwrap_or("<expr>"),
        compiled.variables().len(),
        catalog.len(),
        hits.len(),
        opts.parallel
    );

    Ok(hits)
}

fn select<'c>(
    entry: &'c CatalogEntry,
    compiled: &CompiledQuery,
    threshold: f64,
) -> Option<&'c CatalogEntry> {
    let assignment = assignment_for(entry, compiled, threshold);
    // the assignment covers every compiled variable, so this cannot miss
    let keep = compiled.evaluate(&assignment).unwrap_or_else(|err| {
        debug_assert!(false, "{err}");
        log::error!("search entry={:?} outcome=error err={err}", entry.title());
        false
    });
    keep.then_some(entry)
}

/// One `matches` call per distinct variable, however often it recurs in the
/// tree.
pub fn assignment_for(entry: &CatalogEntry, compiled: &CompiledQuery, threshold: f64) -> Assignment {
    compiled
        .variables()
        .iter()
        .map(|name| (name.clone(), matcher::matches(entry, name, threshold)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CompileError, LexError, ParseError};
    use crate::query::{compile, Expr};
    use std::collections::BTreeSet;

    fn catalog(titles: &[&str]) -> Vec<CatalogEntry> {
        titles.iter().map(|t| CatalogEntry::new(t, "test")).collect()
    }

    fn titles<'a>(hits: &[&'a CatalogEntry]) -> Vec<&'a str> {
        hits.iter().map(|e| e.title()).collect()
    }

    #[test]
    fn test_single_term() {
        let cat = catalog(&["Touhou Jazz Connection Vol.6", "Some Other Title"]);
        let hits = search(&cat, "jazz", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(titles(&hits), vec!["Touhou Jazz Connection Vol.6"]);
    }

    #[test]
    fn test_and_not() {
        let cat = catalog(&["Touhou Remix", "Touhou Jazz Connection Vol.6"]);
        let hits = search(&cat, "touhou & ~jazz", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(titles(&hits), vec!["Touhou Remix"]);
    }

    #[test]
    fn test_fuzzy_fallback() {
        let cat = catalog(&["Touhou Jazz Connection Vol.6", "Some Other Title"]);
        let hits = search(&cat, "(\"jazz conection\")", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(titles(&hits), vec!["Touhou Jazz Connection Vol.6"]);
        // a threshold above 1 disables the fuzzy pass entirely
        assert!(search(&cat, "\"jazz conection\" ", 1.1).unwrap().is_empty());
    }

    #[test]
    fn test_normalization_variants() {
        let cat = catalog(&["【C95】 ポヤッチオ ＯＳＴ", "Other"]);
        let decomposed = "\u{30DB}\u{309A}ヤッチオ & ost";
        let hits = search(&cat, decomposed, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_order_preserved() {
        let cat = catalog(&["b remix", "a", "c remix", "d", "a remix"]);
        let hits = search(&cat, "remix", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(titles(&hits), vec!["b remix", "c remix", "a remix"]);
    }

    #[test]
    fn test_duplicates_kept() {
        let cat = vec![
            CatalogEntry::new("Same", "rtl"),
            CatalogEntry::new("Same", "gist"),
        ];
        let hits = search(&cat, "same", DEFAULT_THRESHOLD).unwrap();
        let sources: Vec<&str> = hits.iter().map(|e| e.source()).collect();
        assert_eq!(sources, vec!["rtl", "gist"]);
    }

    #[test]
    fn test_empty_catalog() {
        let hits = search(&[], "a & (b | ~c)", DEFAULT_THRESHOLD).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_compile_errors_fail_fast() {
        let cat = catalog(&["anything"]);
        assert!(matches!(
            search(&cat, "(a & b", DEFAULT_THRESHOLD),
            Err(SearchError::Compile(CompileError::Parse(ParseError::UnclosedParen { .. })))
        ));
        assert!(matches!(
            search(&[], "\"unterminated", DEFAULT_THRESHOLD),
            Err(SearchError::Compile(CompileError::Lex(LexError::UnterminatedQuote { .. })))
        ));
    }

    #[test]
    fn test_precompiled_query_reused() {
        let q = compile("touhou | jazz").unwrap();
        let first = catalog(&["Touhou Remix", "Nothing"]);
        let second = catalog(&["Nothing", "Jazz Standards"]);
        assert_eq!(titles(&search(&first, &q, 0.8).unwrap()), vec!["Touhou Remix"]);
        assert_eq!(titles(&search(&second, &q, 0.8).unwrap()), vec!["Jazz Standards"]);
    }

    #[test]
    fn test_expression_built_with_combinators() {
        let q = CompiledQuery::from(Expr::atom("touhou") & !Expr::atom("jazz"));
        let cat = catalog(&["Touhou Remix", "Touhou Jazz Connection Vol.6"]);
        let hits = search(&cat, &q, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(titles(&hits), vec!["Touhou Remix"]);
    }

    #[test]
    fn test_assignment_covers_each_variable_once() {
        let q = compile("remix & (remix | jazz)").unwrap();
        let entry = CatalogEntry::new("Touhou Remix", "test");
        let assignment = assignment_for(&entry, &q, DEFAULT_THRESHOLD);
        assert_eq!(assignment.len(), 2);
        assert_eq!(assignment.get("remix"), Some(&true));
        assert_eq!(assignment.get("jazz"), Some(&false));
    }

    #[test]
    fn test_assignment_always_complete() {
        let entry = CatalogEntry::new("Touhou Jazz Connection Vol.6", "test");
        for input in ["jazz", "~(a | \"b c\") & (jazz | ~~d)", "x & y & x | (\"\")"] {
            let q = compile(input).unwrap();
            let assignment = assignment_for(&entry, &q, DEFAULT_THRESHOLD);
            let keys: BTreeSet<&str> = assignment.keys().map(String::as_str).collect();
            let expected: BTreeSet<&str> = q.variables().iter().map(String::as_str).collect();
            assert_eq!(keys, expected, "input {input}");
            assert!(q.evaluate(&assignment).is_ok());
        }
    }

    #[test]
    fn test_empty_atom_matches_everything() {
        let cat = catalog(&["a", "b"]);
        assert_eq!(search(&cat, "(\"\")", DEFAULT_THRESHOLD).unwrap().len(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let titles_list: Vec<String> = (0..200)
            .map(|i| {
                if i % 3 == 0 {
                    format!("Touhou Remix {i}")
                } else {
                    format!("Vocal Collection {i}")
                }
            })
            .collect();
        let refs: Vec<&str> = titles_list.iter().map(String::as_str).collect();
        let cat = catalog(&refs);
        let sequential = search(&cat, "touhou | (\"vocal collection 1\")", 0.95).unwrap();
        let parallel = search_with(
            &cat,
            "touhou | (\"vocal collection 1\")",
            &SearchOptions {
                threshold: 0.95,
                parallel: true,
            },
        )
        .unwrap();
        assert_eq!(sequential, parallel);
        // every Touhou title plus the vocal titles numbered 1, 1x and 1xx
        assert_eq!(sequential.len(), 67 + 75);
    }
}
