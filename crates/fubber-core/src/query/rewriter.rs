//! Rewrite a parsed query into FTS5 MATCH syntax.
//!
//! Operators, grouping and column filters pass through unchanged; every
//! leaf is tokenized, with multiple tokens joined by the adjacency
//! operator `+`. NEAR distances are not tokenized.

use crate::errors::QueryParseError;
use crate::tokenizer::tokenize;

use super::ast::{QueryAtom, QueryExpr};

/// Re-emit the tree as a backend query string.
pub fn rewrite_expr(expr: &QueryExpr) -> Result<String, QueryParseError> {
    match expr {
        QueryExpr::Or(lhs, rhs) => {
            Ok(format!("{} OR {}", rewrite_expr(lhs)?, rewrite_expr(rhs)?))
        }
        QueryExpr::And { lhs, rhs, explicit } => {
            let op = if *explicit { " AND " } else { " " };
            Ok(format!("{}{op}{}", rewrite_expr(lhs)?, rewrite_expr(rhs)?))
        }
        QueryExpr::Not(lhs, rhs) => {
            Ok(format!("{} NOT {}", rewrite_expr(lhs)?, rewrite_expr(rhs)?))
        }
        QueryExpr::Group(inner) => Ok(format!("({})", rewrite_expr(inner)?)),
        QueryExpr::Near { atoms, distance } => {
            let mut parts = Vec::with_capacity(atoms.len());
            for atom in atoms {
                // NEAR operands must stay single units, so multi-token
                // leaves get phrase quotes.
                parts.push(rewrite_atom(atom, true)?);
            }
            let inner = parts.join(" ");
            match distance {
                Some(k) => Ok(format!("NEAR({inner}, {k})")),
                None => Ok(format!("NEAR({inner})")),
            }
        }
        QueryExpr::Atom(atom) => rewrite_atom(atom, false),
    }
}

fn rewrite_atom(atom: &QueryAtom, single_term: bool) -> Result<String, QueryParseError> {
    let tokens = tokenize(&atom.text);
    let mut pieces: Vec<String> = tokens.split_whitespace().map(str::to_string).collect();
    if pieces.is_empty() {
        return Err(QueryParseError {
            offset: atom.offset,
            expected: "searchable term",
        });
    }

    if atom.prefix {
        if let Some(last) = pieces.last_mut() {
            last.push('*');
        }
    }

    let mut body = pieces.join(" + ");
    if atom.phrase || (single_term && pieces.len() > 1) {
        body = format!("\"{body}\"");
    }
    if atom.anchored {
        body = format!("^{body}");
    }
    if let Some(column) = atom.column {
        body = format!("{}:{body}", column.name());
    }
    if atom.proximity {
        body = format!("+ {body}");
    }
    Ok(body)
}
