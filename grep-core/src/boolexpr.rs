//! Boolean query planning (C2): combining several patterns with `AND`,
//! `OR` and `NOT` into a single predicate over a file or a line.

use std::fmt;

/// The cap on the number of clauses produced by [`BoolExpr::to_cnf`].
/// A handful of terms combined with `OR` over `AND`-of-`OR` groups can
/// blow up combinatorially; past this point the query is almost certainly
/// a mistake rather than a real search, so it is rejected up front instead
/// of silently taking a long time.
const MAX_CNF_CLAUSES: usize = 64;

/// Whether a leaf predicate in a [`BoolExpr`] is evaluated against a single
/// line or against the file as a whole (i.e. "this pattern occurs
/// somewhere in the file", independent of which line).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The leaf must match on the same line as the other line-scoped
    /// leaves it is combined with.
    Line,
    /// The leaf must match anywhere in the file.
    File,
}

/// A boolean combination of leaf patterns.
///
/// `L` is left generic so this tree can hold either raw pattern strings
/// (as produced by the parser) or compiled `Grep` values (after the CLI
/// layer resolves each leaf).
#[derive(Clone, Debug)]
pub enum BoolExpr<L> {
    /// A single pattern, paired with the scope it is evaluated in.
    Leaf(L, Scope),
    /// Negation of a sub-expression.
    Not(Box<BoolExpr<L>>),
    /// Conjunction of two or more sub-expressions.
    And(Vec<BoolExpr<L>>),
    /// Disjunction of two or more sub-expressions.
    Or(Vec<BoolExpr<L>>),
}

impl<L> BoolExpr<L> {
    /// Evaluates this expression, calling `eval` once per leaf to test
    /// whether that leaf's pattern matches, and returning the combined
    /// boolean result. `eval` is called at most once per leaf regardless
    /// of tree shape, but may be called fewer times than there are leaves
    /// because evaluation short-circuits.
    pub fn eval<F>(&self, eval: &mut F) -> bool
    where
        F: FnMut(&L, Scope) -> bool,
    {
        match *self {
            BoolExpr::Leaf(ref l, scope) => eval(l, scope),
            BoolExpr::Not(ref e) => !e.eval(eval),
            BoolExpr::And(ref es) => es.iter().all(|e| e.eval(eval)),
            BoolExpr::Or(ref es) => es.iter().any(|e| e.eval(eval)),
        }
    }

    /// Returns every leaf that can contribute to a positive match, i.e.
    /// every leaf not underneath a `Not`. These are the patterns that
    /// should be highlighted in output: a leaf inside a `Not` describes an
    /// absence, and there is nothing in the text to highlight for it.
    pub fn highlighted_leaves(&self) -> Vec<&L> {
        let mut out = Vec::new();
        self.collect_positive(&mut out);
        out
    }

    fn collect_positive<'a>(&'a self, out: &mut Vec<&'a L>) {
        match *self {
            BoolExpr::Leaf(ref l, _) => out.push(l),
            BoolExpr::Not(_) => {}
            BoolExpr::And(ref es) | BoolExpr::Or(ref es) => {
                for e in es {
                    e.collect_positive(out);
                }
            }
        }
    }

    /// Rewrites this expression into conjunctive normal form: a list of
    /// clauses, each of which is a list of (possibly negated) leaves,
    /// where the overall expression is true iff every clause has at least
    /// one true literal.
    ///
    /// Returns an error if expanding `Or` over nested `And` groups would
    /// produce more than [`MAX_CNF_CLAUSES`] clauses.
    pub fn to_cnf(&self) -> Result<Vec<Vec<Literal<&L>>>, BoolExprError>
    where
        L: Clone,
    {
        let clauses = self.cnf_clauses()?;
        if clauses.len() > MAX_CNF_CLAUSES {
            return Err(BoolExprError::TooManyClauses(clauses.len()));
        }
        Ok(clauses)
    }

    fn cnf_clauses(&self) -> Result<Vec<Vec<Literal<&L>>>, BoolExprError> {
        match *self {
            BoolExpr::Leaf(ref l, scope) => {
                Ok(vec![vec![Literal { leaf: l, scope, negated: false }]])
            }
            BoolExpr::Not(ref inner) => match **inner {
                BoolExpr::Leaf(ref l, scope) => {
                    Ok(vec![vec![Literal { leaf: l, scope, negated: true }]])
                }
                _ => Err(BoolExprError::UnsupportedNegation),
            },
            BoolExpr::And(ref es) => {
                let mut clauses = Vec::new();
                for e in es {
                    clauses.extend(e.cnf_clauses()?);
                    if clauses.len() > MAX_CNF_CLAUSES {
                        return Err(BoolExprError::TooManyClauses(clauses.len()));
                    }
                }
                Ok(clauses)
            }
            BoolExpr::Or(ref es) => {
                // Distribute: cross-product the clause lists of each
                // sub-expression.
                let mut acc: Vec<Vec<Literal<&L>>> = vec![Vec::new()];
                for e in es {
                    let sub = e.cnf_clauses()?;
                    let mut next = Vec::with_capacity(acc.len() * sub.len());
                    for a in &acc {
                        for s in &sub {
                            let mut merged = a.clone();
                            merged.extend(s.iter().cloned());
                            next.push(merged);
                        }
                    }
                    acc = next;
                    if acc.len() > MAX_CNF_CLAUSES {
                        return Err(BoolExprError::TooManyClauses(acc.len()));
                    }
                }
                Ok(acc)
            }
        }
    }
}

/// A single literal within a CNF clause: a leaf plus whether it is
/// negated.
#[derive(Clone, Debug)]
pub struct Literal<L> {
    /// The underlying leaf value.
    pub leaf: L,
    /// The scope the leaf is evaluated in.
    pub scope: Scope,
    /// Whether this literal is negated within its clause.
    pub negated: bool,
}

/// An error produced while parsing or normalizing a boolean query.
#[derive(Debug)]
pub enum BoolExprError {
    /// The query text could not be parsed.
    Parse(String),
    /// Converting to CNF would exceed [`MAX_CNF_CLAUSES`].
    TooManyClauses(usize),
    /// A `NOT` was applied to something other than a single leaf; nested
    /// negation of a compound expression has no clean CNF form and is
    /// rejected rather than silently expanded via De Morgan's laws, which
    /// the query language this parses does not expose.
    UnsupportedNegation,
}

impl fmt::Display for BoolExprError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BoolExprError::Parse(ref msg) => write!(f, "invalid boolean query: {}", msg),
            BoolExprError::TooManyClauses(n) => {
                write!(f, "boolean query expands to {} clauses, exceeding the limit of {}", n, MAX_CNF_CLAUSES)
            }
            BoolExprError::UnsupportedNegation => {
                write!(f, "NOT may only be applied to a single pattern, not a parenthesized group")
            }
        }
    }
}

impl ::std::error::Error for BoolExprError {}

/// Parses a boolean query string (e.g. `foo AND (bar OR NOT baz)`) into a
/// `BoolExpr<String>`, where each leaf is the literal pattern text as
/// written, with surrounding quotes stripped. All leaves default to
/// [`Scope::Line`]; callers that want file-scoped terms should transform
/// the tree afterward.
pub fn parse(query: &str) -> Result<BoolExpr<String>, BoolExprError> {
    let tokens = tokenize(query)?;
    let mut pos = 0;
    let expr = parse_or(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(BoolExprError::Parse(format!(
            "unexpected trailing token near {:?}",
            tokens.get(pos)
        )));
    }
    Ok(expr)
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Token {
    And,
    Or,
    Not,
    LParen,
    RParen,
    Term(String),
}

fn tokenize(query: &str) -> Result<Vec<Token>, BoolExprError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = query.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '(' {
            tokens.push(Token::LParen);
            i += 1;
            continue;
        }
        if c == ')' {
            tokens.push(Token::RParen);
            i += 1;
            continue;
        }
        if c == '"' {
            let start = i + 1;
            let mut j = start;
            while j < chars.len() && chars[j] != '"' {
                j += 1;
            }
            if j >= chars.len() {
                return Err(BoolExprError::Parse("unterminated quoted term".to_string()));
            }
            let term: String = chars[start..j].iter().collect();
            tokens.push(Token::Term(term));
            i = j + 1;
            continue;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '(' && chars[i] != ')' {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        match word.as_str() {
            "AND" => tokens.push(Token::And),
            "OR" => tokens.push(Token::Or),
            "NOT" => tokens.push(Token::Not),
            _ => tokens.push(Token::Term(word)),
        }
    }
    Ok(tokens)
}

fn parse_or(tokens: &[Token], pos: &mut usize) -> Result<BoolExpr<String>, BoolExprError> {
    let mut terms = vec![parse_and(tokens, pos)?];
    while matches!(tokens.get(*pos), Some(Token::Or)) {
        *pos += 1;
        terms.push(parse_and(tokens, pos)?);
    }
    Ok(if terms.len() == 1 {
        terms.pop().unwrap()
    } else {
        BoolExpr::Or(terms)
    })
}

fn parse_and(tokens: &[Token], pos: &mut usize) -> Result<BoolExpr<String>, BoolExprError> {
    let mut terms = vec![parse_not(tokens, pos)?];
    while matches!(tokens.get(*pos), Some(Token::And)) {
        *pos += 1;
        terms.push(parse_not(tokens, pos)?);
    }
    Ok(if terms.len() == 1 {
        terms.pop().unwrap()
    } else {
        BoolExpr::And(terms)
    })
}

fn parse_not(tokens: &[Token], pos: &mut usize) -> Result<BoolExpr<String>, BoolExprError> {
    if matches!(tokens.get(*pos), Some(Token::Not)) {
        *pos += 1;
        let inner = parse_primary(tokens, pos)?;
        return Ok(BoolExpr::Not(Box::new(inner)));
    }
    parse_primary(tokens, pos)
}

fn parse_primary(tokens: &[Token], pos: &mut usize) -> Result<BoolExpr<String>, BoolExprError> {
    match tokens.get(*pos) {
        Some(Token::LParen) => {
            *pos += 1;
            let expr = parse_or(tokens, pos)?;
            match tokens.get(*pos) {
                Some(Token::RParen) => {
                    *pos += 1;
                    Ok(expr)
                }
                other => Err(BoolExprError::Parse(format!(
                    "expected closing parenthesis, found {:?}",
                    other
                ))),
            }
        }
        Some(Token::Term(t)) => {
            *pos += 1;
            Ok(BoolExpr::Leaf(t.clone(), Scope::Line))
        }
        other => Err(BoolExprError::Parse(format!(
            "expected a term or '(', found {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(expr: &BoolExpr<String>) -> Vec<&str> {
        expr.highlighted_leaves().into_iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn parses_and_or_not() {
        let expr = parse("foo AND (bar OR NOT baz)").unwrap();
        match expr {
            BoolExpr::And(ref es) => assert_eq!(es.len(), 2),
            _ => panic!("expected And at top level"),
        }
        assert_eq!(leaves(&expr), vec!["foo", "bar"]);
    }

    #[test]
    fn eval_short_circuits_and() {
        let expr = parse("foo AND bar").unwrap();
        let mut calls = Vec::new();
        let result = expr.eval(&mut |l, _scope| {
            calls.push(l.clone());
            l == "bar"
        });
        assert!(!result);
        assert_eq!(calls, vec!["foo".to_string()]);
    }

    #[test]
    fn to_cnf_distributes_or_over_and() {
        let expr = parse("(a OR b) AND (c OR d)").unwrap();
        let cnf = expr.to_cnf().unwrap();
        assert_eq!(cnf.len(), 2);
    }

    #[test]
    fn rejects_negated_group() {
        let expr = parse("NOT (a OR b)");
        assert!(expr.is_ok());
        let expr = expr.unwrap();
        assert!(expr.to_cnf().is_err());
    }

    #[test]
    fn too_many_clauses_is_rejected() {
        let query = (0..8)
            .map(|i| format!("(t{}a OR t{}b OR t{}c)", i, i, i))
            .collect::<Vec<_>>()
            .join(" AND ");
        let expr = parse(&query).unwrap();
        assert!(expr.to_cnf().is_err());
    }
}
