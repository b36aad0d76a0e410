//! Terminal coloring for query text.

use lexico_query::{Lexer, Token, TokenKind, quote_term};

use crate::colors;

/// Color for a token of the given kind, or None to print it unstyled.
fn token_color(kind: TokenKind, scoped: bool) -> Option<&'static str> {
    match kind {
        TokenKind::SearchTerm if scoped => Some(colors::CYAN),
        TokenKind::SearchTerm => None,
        TokenKind::GroupTerminator | TokenKind::LParen | TokenKind::RParen => Some(colors::DIM),
        TokenKind::And | TokenKind::Or => Some(colors::YELLOW),
        TokenKind::Exclude => Some(colors::RED),
        TokenKind::Gt | TokenKind::Gte | TokenKind::Lt | TokenKind::Lte => Some(colors::GREEN),
        TokenKind::Number => Some(colors::MAGENTA),
    }
}

/// Colors a token sequence, joined by single spaces.
///
/// Search terms that name a scope (those followed by `:`) are cyan; connectives, negation,
/// comparisons and numbers each get their own color.
pub fn highlight_tokens<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a Token>,
{
    let tokens: Vec<&Token> = tokens.into_iter().collect();
    let mut parts = Vec::with_capacity(tokens.len());

    for (i, token) in tokens.iter().enumerate() {
        let scoped = tokens
            .get(i + 1)
            .is_some_and(|next| next.kind == TokenKind::GroupTerminator);
        let text = match token.kind {
            TokenKind::SearchTerm => quote_term(&token.lexeme()).into_owned(),
            _ => token.lexeme().into_owned(),
        };
        parts.push(match token_color(token.kind, scoped) {
            Some(color) => format!("{color}{text}{}", colors::RESET),
            None => text,
        });
    }

    parts.join(" ")
}

/// Tokenizes and colors a raw query.
pub fn highlight_query(query: &str) -> String {
    let tokens: Vec<Token> = Lexer::new(query).collect();
    highlight_tokens(&tokens)
}

/// Renders the query with a caret under the byte `position`.
///
/// Positions past the end point just after the last character.
pub fn error_pointer(query: &str, position: usize) -> String {
    let column = query
        .char_indices()
        .take_while(|(offset, _)| *offset < position)
        .count();
    format!(
        "{query}\n{}{}^{}",
        " ".repeat(column),
        colors::RED,
        colors::RESET
    )
}
