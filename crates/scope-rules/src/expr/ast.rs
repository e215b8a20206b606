//! Parsed rule trees and their evaluation.
//!
//! Rules recognise membership atoms, unary `!`, binary `&&` and `||`, and
//! parentheses for grouping. `!` binds tightest, then `&&`, then `||`, so
//! `a || b && c` reads as `a || (b && c)`. Chains of the same operator are
//! flattened into one n-ary node and evaluated left to right with
//! short-circuiting; atoms are pure, so the order only affects cost.

use std::fmt;

use super::atom::Atom;
use crate::tags::TagSet;

/// A node of a parsed rule.
///
/// `Or` and `And` always hold at least two children; single operands are
/// collapsed while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// True when any child is true.
    Or(Vec<Expr>),
    /// True when every child is true.
    And(Vec<Expr>),
    /// Negation of the child.
    Not(Box<Expr>),
    /// A membership predicate.
    Atom(Atom),
}

impl Expr {
    /// Evaluate the tree against `tags`.
    #[must_use]
    pub fn evaluate(&self, tags: &TagSet<'_>) -> bool {
        match self {
            Self::Or(children) => children.iter().any(|child| child.evaluate(tags)),
            Self::And(children) => children.iter().all(|child| child.evaluate(tags)),
            Self::Not(inner) => !inner.evaluate(tags),
            Self::Atom(atom) => atom.matches(tags),
        }
    }

    /// Every atom in the tree, in source order.
    #[must_use]
    pub fn atoms(&self) -> Vec<&Atom> {
        let mut atoms = Vec::new();
        self.collect_atoms(&mut atoms);
        atoms
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a Atom>) {
        match self {
            Self::Or(children) | Self::And(children) => {
                for child in children {
                    child.collect_atoms(out);
                }
            }
            Self::Not(inner) => inner.collect_atoms(out),
            Self::Atom(atom) => out.push(atom),
        }
    }

    /// Wrap `children` in `wrap`, or return the sole child unchanged.
    pub(crate) fn group(mut children: Vec<Self>, wrap: fn(Vec<Self>) -> Self) -> Self {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        wrap(children)
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, parent_binds_tighter: bool) -> fmt::Result {
        if parent_binds_tighter {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

fn write_chain(
    f: &mut fmt::Formatter<'_>,
    children: &[Expr],
    separator: &str,
    needs_parens: fn(&Expr) -> bool,
) -> fmt::Result {
    for (index, child) in children.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        child.write_operand(f, needs_parens(child))?;
    }
    Ok(())
}

/// Renders the canonical form: minimal parentheses, single spaces around
/// operators, and double-quoted keys.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Or(children) => write_chain(f, children, " || ", |_| false),
            Self::And(children) => {
                write_chain(f, children, " && ", |child| matches!(child, Self::Or(_)))
            }
            Self::Not(inner) => {
                f.write_str("!")?;
                inner.write_operand(f, matches!(**inner, Self::Or(_) | Self::And(_)))
            }
            Self::Atom(atom) => write!(f, "{atom}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(key: &str) -> Expr {
        Expr::Atom(Atom::Has(key.to_string()))
    }

    #[test]
    fn short_circuits_like_boolean_operators() {
        let tags = TagSet::from(["a"]);
        let expr = Expr::Or(vec![
            Expr::And(vec![has("a"), has("b")]),
            Expr::Not(Box::new(has("c"))),
        ]);
        assert!(expr.evaluate(&tags));
        assert!(!Expr::And(vec![has("a"), has("b")]).evaluate(&tags));
    }

    #[test]
    fn collapses_single_child_groups() {
        assert_eq!(Expr::group(vec![has("a")], Expr::And), has("a"));
        assert_eq!(
            Expr::group(vec![has("a"), has("b")], Expr::Or),
            Expr::Or(vec![has("a"), has("b")])
        );
    }

    #[test]
    fn renders_minimal_parentheses() {
        let expr = Expr::And(vec![
            Expr::Or(vec![has("a"), has("b")]),
            Expr::Not(Box::new(Expr::And(vec![has("c"), has("d")]))),
        ]);
        assert_eq!(
            expr.to_string(),
            r#"(scope.has("a") || scope.has("b")) && !(scope.has("c") && scope.has("d"))"#
        );
    }

    #[test]
    fn lists_atoms_in_source_order() {
        let expr = Expr::Or(vec![has("x"), Expr::Not(Box::new(has("y")))]);
        let keys: Vec<_> = expr
            .atoms()
            .into_iter()
            .flat_map(Atom::keys)
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["x", "y"]);
    }
}
