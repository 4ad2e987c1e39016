//! Hand-rolled lexer and recursive-descent parser for the user query
//! language. Precedence, tightest first: NOT, adjacency/AND, OR.

use crate::errors::QueryParseError;

use super::ast::{Column, QueryAtom, QueryExpr};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Comma,
    /// Quoted phrase interior.
    Phrase(String),
    /// Everything else between separators.
    Word(String),
}

#[derive(Debug)]
struct Lexed {
    token: Token,
    offset: usize,
}

fn lex(input: &str) -> Result<Vec<Lexed>, QueryParseError> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() {
            i += 1;
        } else if c == '(' {
            out.push(Lexed { token: Token::LParen, offset: i });
            i += 1;
        } else if c == ')' {
            out.push(Lexed { token: Token::RParen, offset: i });
            i += 1;
        } else if c == ',' {
            out.push(Lexed { token: Token::Comma, offset: i });
            i += 1;
        } else if c == '"' {
            let start = i;
            i += 1;
            let begin = i;
            while i < bytes.len() && bytes[i] != b'"' {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(QueryParseError {
                    offset: start,
                    expected: "closing quote",
                });
            }
            out.push(Lexed {
                token: Token::Phrase(input[begin..i].to_string()),
                offset: start,
            });
            i += 1;
        } else {
            let start = i;
            while i < bytes.len() {
                let c = bytes[i] as char;
                if c.is_whitespace() || matches!(c, '(' | ')' | ',' | '"') {
                    break;
                }
                i += 1;
            }
            out.push(Lexed {
                token: Token::Word(input[start..i].to_string()),
                offset: start,
            });
        }
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<Lexed>,
    pos: usize,
    input_len: usize,
}

/// Parse a user query into its operator tree.
pub fn parse_query(input: &str) -> Result<QueryExpr, QueryParseError> {
    let tokens = lex(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        input_len: input.len(),
    };
    let expr = parser.parse_or()?;
    if let Some(lexed) = parser.peek() {
        return Err(QueryParseError {
            offset: lexed.offset,
            expected: "end of query",
        });
    }
    Ok(expr)
}

impl Parser {
    fn peek(&self) -> Option<&Lexed> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|l| l.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn here(&self) -> usize {
        self.peek().map_or(self.input_len, |l| l.offset)
    }

    fn peek_keyword(&self) -> Option<&str> {
        match self.peek().map(|l| &l.token) {
            Some(Token::Word(w)) if matches!(w.as_str(), "AND" | "OR" | "NOT" | "NEAR") => {
                Some(w.as_str())
            }
            _ => None,
        }
    }

    /// Whether the next token can begin an atom or group.
    fn at_operand(&self) -> bool {
        match self.peek().map(|l| &l.token) {
            Some(Token::Word(w)) => !matches!(w.as_str(), "AND" | "OR" | "NOT"),
            Some(Token::Phrase(_)) | Some(Token::LParen) => true,
            _ => false,
        }
    }

    fn parse_or(&mut self) -> Result<QueryExpr, QueryParseError> {
        let mut lhs = self.parse_and()?;
        while self.peek_keyword() == Some("OR") {
            self.pos += 1;
            let rhs = self.parse_and()?;
            lhs = QueryExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<QueryExpr, QueryParseError> {
        let mut lhs = self.parse_not()?;
        loop {
            if self.peek_keyword() == Some("AND") {
                self.pos += 1;
                let rhs = self.parse_not()?;
                lhs = QueryExpr::And {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    explicit: true,
                };
            } else if self.at_operand() {
                // Implicit AND between adjacent terms.
                let rhs = self.parse_not()?;
                lhs = QueryExpr::And {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    explicit: false,
                };
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<QueryExpr, QueryParseError> {
        let mut lhs = self.parse_primary()?;
        while self.peek_keyword() == Some("NOT") {
            self.pos += 1;
            let rhs = self.parse_primary()?;
            lhs = QueryExpr::Not(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<QueryExpr, QueryParseError> {
        let offset = self.here();
        match self.peek().map(|l| l.token.clone()) {
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(QueryExpr::Group(Box::new(inner))),
                    _ => Err(QueryParseError {
                        offset: self.here(),
                        expected: "closing parenthesis",
                    }),
                }
            }
            Some(Token::Word(w)) if w == "NEAR" => {
                self.pos += 1;
                self.parse_near()
            }
            Some(Token::Word(_)) | Some(Token::Phrase(_)) => {
                let atom = self.parse_atom()?;
                Ok(QueryExpr::Atom(atom))
            }
            _ => Err(QueryParseError {
                offset,
                expected: "term, phrase or group",
            }),
        }
    }

    fn parse_near(&mut self) -> Result<QueryExpr, QueryParseError> {
        match self.bump() {
            Some(Token::LParen) => {}
            _ => {
                return Err(QueryParseError {
                    offset: self.here(),
                    expected: "( after NEAR",
                })
            }
        }

        let mut atoms = Vec::new();
        while self.at_operand() {
            match self.peek().map(|l| &l.token) {
                Some(Token::LParen) => break,
                _ => atoms.push(self.parse_atom()?),
            }
        }
        if atoms.is_empty() {
            return Err(QueryParseError {
                offset: self.here(),
                expected: "NEAR operand",
            });
        }

        let distance = if matches!(self.peek().map(|l| &l.token), Some(Token::Comma)) {
            self.pos += 1;
            let offset = self.here();
            match self.bump() {
                Some(Token::Word(w)) => match w.parse::<u32>() {
                    Ok(k) => Some(k),
                    Err(_) => {
                        return Err(QueryParseError {
                            offset,
                            expected: "NEAR distance",
                        })
                    }
                },
                _ => {
                    return Err(QueryParseError {
                        offset,
                        expected: "NEAR distance",
                    })
                }
            }
        } else {
            None
        };

        match self.bump() {
            Some(Token::RParen) => Ok(QueryExpr::Near { atoms, distance }),
            _ => Err(QueryParseError {
                offset: self.here(),
                expected: "closing parenthesis",
            }),
        }
    }

    /// Parse one term or phrase together with its modifiers.
    fn parse_atom(&mut self) -> Result<QueryAtom, QueryParseError> {
        let offset = self.here();
        let token = self.bump().ok_or(QueryParseError {
            offset,
            expected: "term or phrase",
        })?;

        match token {
            Token::Phrase(interior) => Ok(QueryAtom {
                column: None,
                anchored: false,
                prefix: false,
                phrase: true,
                proximity: false,
                text: interior,
                offset,
            }),
            Token::Word(word) => self.atom_from_word(word, offset),
            _ => Err(QueryParseError {
                offset,
                expected: "term or phrase",
            }),
        }
    }

    fn atom_from_word(
        &mut self,
        word: String,
        offset: usize,
    ) -> Result<QueryAtom, QueryParseError> {
        let mut rest = word.as_str();
        let proximity = if let Some(stripped) = rest.strip_prefix('+') {
            rest = stripped;
            true
        } else {
            false
        };

        // `col:` restricts to a column only for the fixed column set; any
        // other identifier keeps its colon and tokenizes as a plain term.
        let mut column = None;
        if let Some(idx) = rest.find(':') {
            if let Some(col) = Column::from_name(&rest[..idx]) {
                column = Some(col);
                rest = &rest[idx + 1..];
            }
        }

        // `col:"..."`: the lexer split the quoted part off as a phrase.
        if rest.is_empty() && column.is_some() {
            if let Some(Token::Phrase(interior)) = self.peek().map(|l| l.token.clone()) {
                self.pos += 1;
                return Ok(QueryAtom {
                    column,
                    anchored: false,
                    prefix: false,
                    phrase: true,
                    proximity,
                    text: interior,
                    offset,
                });
            }
        }

        let anchored = if let Some(stripped) = rest.strip_prefix('^') {
            rest = stripped;
            true
        } else {
            false
        };
        let prefix = if let Some(stripped) = rest.strip_suffix('*') {
            rest = stripped;
            true
        } else {
            false
        };

        if rest.is_empty() {
            return Err(QueryParseError {
                offset,
                expected: "search term",
            });
        }

        Ok(QueryAtom {
            column,
            anchored,
            prefix,
            phrase: false,
            proximity,
            text: rest.to_string(),
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom_text(expr: &QueryExpr) -> &str {
        match expr {
            QueryExpr::Atom(a) => &a.text,
            _ => panic!("not an atom: {expr:?}"),
        }
    }

    #[test]
    fn implicit_and_between_terms() {
        let expr = parse_query("foo bar").unwrap();
        match &expr {
            QueryExpr::And { lhs, rhs, explicit } => {
                assert!(!explicit);
                assert_eq!(atom_text(lhs), "foo");
                assert_eq!(atom_text(rhs), "bar");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn or_binds_loosest() {
        let expr = parse_query("a b OR c").unwrap();
        assert_eq!(expr.shape(), "Or(Adj(Atom,Atom),Atom)");
    }

    #[test]
    fn not_binds_tightest() {
        let expr = parse_query("a b NOT c").unwrap();
        assert_eq!(expr.shape(), "Adj(Atom,Not(Atom,Atom))");
    }

    #[test]
    fn grouping() {
        let expr = parse_query("(a OR b) c").unwrap();
        assert_eq!(expr.shape(), "Adj(Group(Or(Atom,Atom)),Atom)");
    }

    #[test]
    fn column_filter() {
        let expr = parse_query("signature:getUser").unwrap();
        match expr {
            QueryExpr::Atom(a) => {
                assert_eq!(a.column, Some(Column::Signature));
                assert_eq!(a.text, "getUser");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_column_folds_into_term() {
        let expr = parse_query("foo:bar").unwrap();
        match expr {
            QueryExpr::Atom(a) => {
                assert_eq!(a.column, None);
                assert_eq!(a.text, "foo:bar");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn anchor_and_prefix() {
        let expr = parse_query("path:^src term*").unwrap();
        match expr {
            QueryExpr::And { lhs, rhs, .. } => {
                match *lhs {
                    QueryExpr::Atom(ref a) => {
                        assert_eq!(a.column, Some(Column::Path));
                        assert!(a.anchored);
                        assert_eq!(a.text, "src");
                    }
                    ref other => panic!("unexpected: {other:?}"),
                }
                match *rhs {
                    QueryExpr::Atom(ref a) => {
                        assert!(a.prefix);
                        assert_eq!(a.text, "term");
                    }
                    ref other => panic!("unexpected: {other:?}"),
                }
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn near_with_distance() {
        let expr = parse_query("NEAR(alpha beta, 5)").unwrap();
        match expr {
            QueryExpr::Near { atoms, distance } => {
                assert_eq!(atoms.len(), 2);
                assert_eq!(distance, Some(5));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn near_without_distance() {
        let expr = parse_query("NEAR(alpha beta)").unwrap();
        match expr {
            QueryExpr::Near { distance, .. } => assert_eq!(distance, None),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unterminated_quote_reports_offset() {
        let err = parse_query("foo \"bar").unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.expected, "closing quote");
    }

    #[test]
    fn missing_paren_reports_expected() {
        let err = parse_query("(a OR b").unwrap_err();
        assert_eq!(err.expected, "closing parenthesis");
    }

    #[test]
    fn bare_plus_is_an_error() {
        let err = parse_query("+").unwrap_err();
        assert_eq!(err.expected, "search term");
    }

    #[test]
    fn lowercase_and_is_a_term() {
        let expr = parse_query("and").unwrap();
        assert_eq!(atom_text(&expr), "and");
    }
}
