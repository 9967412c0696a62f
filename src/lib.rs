//! Search aggregated catalog listings with a small boolean query language.
//!
//! ```text
//! touhou & ~jazz
//! "vocal collection" | (arrange & not remix)
//! ```
//!
//! A query is compiled once into an [`Expr`] tree over named terms. For each
//! catalog entry every distinct term is resolved to true or false, by
//! normalized containment or by a fuzzy partial-similarity fallback, and the
//! tree decides whether the entry is kept. Operators have no precedence and
//! fold left to right: `a & b | c` is `(a & b) | c`.

pub mod config;
pub mod entry;
pub mod errors;
pub mod finder;
pub mod matcher;
pub mod normalize;
pub mod query;
pub mod search;
pub mod source;

pub use config::FinderConfig;
pub use entry::CatalogEntry;
pub use errors::{AssignmentError, CompileError, ConfigError, LexError, ParseError, SearchError};
pub use finder::Finder;
pub use query::{compile, Assignment, CompiledQuery, Expr};
pub use search::{search, search_with, Query, SearchOptions, DEFAULT_THRESHOLD};
pub use source::{CatalogSource, CsvSource, StaticSource};
