//! Query operator tree.

/// The indexed columns a query may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Preamble,
    Signature,
    Body,
    Namespace,
    Ext,
    Path,
}

impl Column {
    /// Parse a column name. Anything else is not a filter and folds back
    /// into the term text.
    pub fn from_name(name: &str) -> Option<Column> {
        match name {
            "preamble" => Some(Column::Preamble),
            "signature" => Some(Column::Signature),
            "body" => Some(Column::Body),
            "namespace" => Some(Column::Namespace),
            "ext" => Some(Column::Ext),
            "path" => Some(Column::Path),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Column::Preamble => "preamble",
            Column::Signature => "signature",
            Column::Body => "body",
            Column::Namespace => "namespace",
            Column::Ext => "ext",
            Column::Path => "path",
        }
    }
}

/// A leaf of the query tree: one term or phrase with its modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAtom {
    /// Column filter, if the atom was written `col:...`.
    pub column: Option<Column>,
    /// `^` anchor to the start of the column.
    pub anchored: bool,
    /// Trailing `*` prefix match.
    pub prefix: bool,
    /// Written as a quoted phrase.
    pub phrase: bool,
    /// Leading `+` phrase-proximity unary.
    pub proximity: bool,
    /// The raw term or phrase interior, untokenized.
    pub text: String,
    /// Byte offset of the atom in the original query.
    pub offset: usize,
}

/// A parsed user query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    /// `a OR b`.
    Or(Box<QueryExpr>, Box<QueryExpr>),
    /// `a AND b`; `explicit` is false for plain adjacency.
    And {
        lhs: Box<QueryExpr>,
        rhs: Box<QueryExpr>,
        explicit: bool,
    },
    /// `a NOT b`.
    Not(Box<QueryExpr>, Box<QueryExpr>),
    /// `( ... )`.
    Group(Box<QueryExpr>),
    /// `NEAR(a b ..., k)`; `distance` is None when `, k` was omitted.
    Near {
        atoms: Vec<QueryAtom>,
        distance: Option<u32>,
    },
    Atom(QueryAtom),
}

impl QueryExpr {
    /// The operator shape of the tree with leaf contents erased.
    /// Two queries with the same shape differ only in their atoms.
    pub fn shape(&self) -> String {
        match self {
            QueryExpr::Or(a, b) => format!("Or({},{})", a.shape(), b.shape()),
            QueryExpr::And { lhs, rhs, explicit } => {
                let tag = if *explicit { "And" } else { "Adj" };
                format!("{tag}({},{})", lhs.shape(), rhs.shape())
            }
            QueryExpr::Not(a, b) => format!("Not({},{})", a.shape(), b.shape()),
            QueryExpr::Group(inner) => format!("Group({})", inner.shape()),
            QueryExpr::Near { atoms, distance } => {
                format!("Near[{};{:?}]", atoms.len(), distance)
            }
            QueryExpr::Atom(_) => "Atom".to_string(),
        }
    }
}
