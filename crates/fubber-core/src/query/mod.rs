//! User query parsing and rewriting.
//!
//! The user-facing query language is a superset of the FTS5 MATCH
//! language: boolean combinators, grouping, phrases, prefix matches,
//! column filters, start-of-column anchors, adjacency `+` and `NEAR`.
//! Parsing builds an operator tree; rewriting re-emits it with every
//! leaf run through the tokenizer so queries and indexed text share one
//! vocabulary.

pub mod ast;
pub mod parser;
pub mod rewriter;

pub use ast::{Column, QueryAtom, QueryExpr};
pub use parser::parse_query;
pub use rewriter::rewrite_expr;

use crate::errors::QueryParseError;

/// Parse a user query and rewrite it into FTS5 MATCH syntax.
pub fn rewrite_query(input: &str) -> Result<String, QueryParseError> {
    let expr = parse_query(input)?;
    rewrite_expr(&expr)
}
