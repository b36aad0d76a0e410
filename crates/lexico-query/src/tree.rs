//! Parse tree produced by the shift-reduce parser.

use std::fmt;

use crate::{
    grammar::NonTerminal,
    token::{Token, TokenKind, quote_term},
};

/// A node in the parse tree.
///
/// Trees are immutable once built and can be evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    /// A shifted token.
    Leaf(Token),
    /// A reduced production.
    Node {
        /// Left-hand side of the production.
        label: NonTerminal,
        /// Right-hand side nodes, in source order.
        children: Vec<Self>,
    },
}

impl ParseTree {
    /// Creates an internal node.
    pub fn node(label: NonTerminal, children: Vec<Self>) -> Self {
        Self::Node { label, children }
    }

    /// Returns the label of an internal node.
    pub fn label(&self) -> Option<NonTerminal> {
        match self {
            Self::Node { label, .. } => Some(*label),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the children of an internal node; leaves have none.
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Node { children, .. } => children,
            Self::Leaf(_) => &[],
        }
    }

    /// Returns the token of a leaf.
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Leaf(token) => Some(token),
            Self::Node { .. } => None,
        }
    }

    /// Returns true for a leaf of the given kind.
    pub fn is_token(&self, kind: TokenKind) -> bool {
        self.token().is_some_and(|t| t.kind == kind)
    }

    /// Returns true for an internal node reduced from an ε-production.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Node { children, .. } if children.is_empty())
    }

    /// Returns the leaves in source order.
    pub fn leaves(&self) -> Vec<&Token> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    /// Appends leaves to `out` depth-first.
    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            Self::Leaf(token) => out.push(token),
            Self::Node { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Renders the tree back into query text.
    ///
    /// Search terms are quoted where needed, so the result lexes and parses to the same tree
    /// shape.
    pub fn to_query_string(&self) -> String {
        let parts: Vec<String> = self
            .leaves()
            .into_iter()
            .map(|token| match token.kind {
                TokenKind::SearchTerm => quote_term(&token.lexeme()).into_owned(),
                _ => token.lexeme().into_owned(),
            })
            .collect();
        parts.join(" ")
    }

    /// Writes the tree with two spaces of indentation per level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Self::Leaf(token) => {
                writeln!(f, "{indent}{:?} {:?}", token.kind, token.lexeme())
            }
            Self::Node { label, children } => {
                if children.is_empty() {
                    return writeln!(f, "{indent}{label} ε");
                }
                writeln!(f, "{indent}{label}")?;
                for child in children {
                    child.fmt_tree(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
