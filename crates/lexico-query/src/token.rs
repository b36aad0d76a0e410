//! Token types shared by the lexer, the parse table and the parser.

use std::{borrow::Cow, fmt};

/// The terminal kinds of the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    /// A bare or quoted search term.
    SearchTerm,
    /// The `:` separating a scope path from its term.
    GroupTerminator,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// The `AND` connective (case-sensitive).
    And,
    /// The `OR` connective (case-sensitive).
    Or,
    /// Negation prefix (`!`).
    Exclude,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Gte,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Lte,
    /// A numeric operand following a comparison operator.
    Number,
}

impl TokenKind {
    /// Every terminal kind, in parse table column order.
    pub const ALL: [Self; 12] = [
        Self::SearchTerm,
        Self::GroupTerminator,
        Self::LParen,
        Self::RParen,
        Self::And,
        Self::Or,
        Self::Exclude,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Number,
    ];

    /// Returns the parse table column of this kind.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns true for `>`, `>=`, `<` and `<=`.
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    /// Returns the fixed lexeme for punctuation and keyword kinds.
    pub fn literal(self) -> Option<&'static str> {
        match self {
            Self::GroupTerminator => Some(":"),
            Self::LParen => Some("("),
            Self::RParen => Some(")"),
            Self::And => Some("AND"),
            Self::Or => Some("OR"),
            Self::Exclude => Some("!"),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            Self::SearchTerm | Self::Number => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchTerm => write!(f, "search term"),
            Self::Number => write!(f, "number"),
            Self::And | Self::Or => write!(f, "{}", self.literal().unwrap_or_default()),
            _ => write!(f, "'{}'", self.literal().unwrap_or_default()),
        }
    }
}

/// The value carried by a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// Textual lexeme.
    Text(String),
    /// Numeric operand of a comparison.
    Number(f64),
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Terminal kind.
    pub kind: TokenKind,
    /// Lexeme or coerced number.
    pub value: TokenValue,
    /// Byte offset of the lexeme in the query.
    pub position: usize,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, value: TokenValue, position: usize) -> Self {
        Self {
            kind,
            value,
            position,
        }
    }

    /// Creates a textual token.
    pub fn text(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self::new(kind, TokenValue::Text(text.into()), position)
    }

    /// Returns the token's value as text, formatting numbers.
    pub fn lexeme(&self) -> Cow<'_, str> {
        match &self.value {
            TokenValue::Text(text) => Cow::Borrowed(text),
            TokenValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Returns the numeric value if this token carries one.
    pub fn number(&self) -> Option<f64> {
        match self.value {
            TokenValue::Number(n) => Some(n),
            TokenValue::Text(_) => None,
        }
    }
}

/// A parse table column: a terminal kind or the end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lookahead {
    /// A real token of the given kind.
    Token(TokenKind),
    /// End of input.
    End,
}

impl Lookahead {
    /// Number of parse table columns.
    pub const COUNT: usize = TokenKind::ALL.len() + 1;

    /// Returns the parse table column of this lookahead.
    pub fn column(self) -> usize {
        match self {
            Self::Token(kind) => kind.index(),
            Self::End => TokenKind::ALL.len(),
        }
    }

    /// Inverse of [`Lookahead::column`].
    pub fn from_column(column: usize) -> Self {
        TokenKind::ALL
            .get(column)
            .map_or(Self::End, |kind| Self::Token(*kind))
    }

    /// Returns the lookahead for an optional token.
    pub fn of(token: Option<&Token>) -> Self {
        token.map_or(Self::End, |t| Self::Token(t.kind))
    }
}

impl fmt::Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(kind) => kind.fmt(f),
            Self::End => write!(f, "end of input"),
        }
    }
}

/// Characters that end a bare lexeme.
pub(crate) const DELIMITERS: &[char] = &[':', '"', '<', '>', '!', '(', ')'];

/// Returns true if `text` must be quoted to lex back as a single search term.
pub fn needs_quoting(text: &str) -> bool {
    text.is_empty()
        || text == "AND"
        || text == "OR"
        || text.chars().any(|c| c.is_whitespace() || DELIMITERS.contains(&c))
}

/// Renders a search term so that it lexes back to the same text.
///
/// Text that already contains a double quote cannot be escaped and is returned as is.
pub fn quote_term(text: &str) -> Cow<'_, str> {
    if needs_quoting(text) && !text.contains('"') {
        Cow::Owned(format!("\"{text}\""))
    } else {
        Cow::Borrowed(text)
    }
}
