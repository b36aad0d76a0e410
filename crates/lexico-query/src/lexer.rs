//! Query lexer (tokenizer).
//!
//! Splits a query on `:`, `"`, `<=`, `>=`, `<`, `>`, `!`, parentheses and whitespace, and
//! yields tokens lazily. The lexer never fails: any input produces some token sequence.

use std::{
    iter::{FusedIterator, Peekable},
    str::CharIndices,
};

use crate::token::{DELIMITERS, Token, TokenKind, TokenValue};

/// Pull-based tokenizer over a query string.
pub struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with byte offsets and one-character lookahead.
    chars: Peekable<CharIndices<'a>>,
    /// Kind of the most recently emitted token, used for numeric coercion.
    previous: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            previous: None,
        }
    }

    /// Returns the next token, or None at end of input.
    fn next_token(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace();
            let &(start, ch) = self.chars.peek()?;

            let token = match ch {
                ':' => self.punctuation(start, TokenKind::GroupTerminator),
                '(' => self.punctuation(start, TokenKind::LParen),
                ')' => self.punctuation(start, TokenKind::RParen),
                '!' => self.punctuation(start, TokenKind::Exclude),
                '<' | '>' => self.read_comparison(start, ch),
                '"' => match self.read_quoted(start) {
                    Some(token) => token,
                    None => continue,
                },
                _ => self.read_word(start),
            };

            self.previous = Some(token.kind);
            return Some(token);
        }
    }

    /// Consumes a single-character punctuation token.
    fn punctuation(&mut self, start: usize, kind: TokenKind) -> Token {
        self.chars.next();
        Token::text(kind, kind.literal().unwrap_or_default(), start)
    }

    /// Reads `<`, `<=`, `>` or `>=`.
    fn read_comparison(&mut self, start: usize, ch: char) -> Token {
        self.chars.next();
        let inclusive = self.chars.next_if(|&(_, c)| c == '=').is_some();
        let kind = match (ch, inclusive) {
            ('<', false) => TokenKind::Lt,
            ('<', true) => TokenKind::Lte,
            (_, false) => TokenKind::Gt,
            (_, true) => TokenKind::Gte,
        };
        Token::text(kind, kind.literal().unwrap_or_default(), start)
    }

    /// Reads a quoted term verbatim up to the closing quote or end of input.
    ///
    /// Returns None for quotes enclosing only whitespace. Quoted keywords and punctuation stay
    /// search terms, but a quoted number after a comparison is still coerced.
    fn read_quoted(&mut self, start: usize) -> Option<Token> {
        self.chars.next();
        let content_start = start + 1;
        let mut content_end = self.input.len();
        for (offset, ch) in self.chars.by_ref() {
            if ch == '"' {
                content_end = offset;
                break;
            }
        }

        let content = &self.input[content_start..content_end];
        if content.trim().is_empty() {
            return None;
        }
        Some(
            self.coerce_number(content, start)
                .unwrap_or_else(|| Token::text(TokenKind::SearchTerm, content, start)),
        )
    }

    /// Reads a bare word: a keyword, a coerced number, or a search term.
    fn read_word(&mut self, start: usize) -> Token {
        let mut end = self.input.len();
        while let Some(&(offset, ch)) = self.chars.peek() {
            if ch.is_whitespace() || DELIMITERS.contains(&ch) {
                end = offset;
                break;
            }
            self.chars.next();
        }

        let word = &self.input[start..end];
        match word {
            "AND" => return Token::text(TokenKind::And, word, start),
            "OR" => return Token::text(TokenKind::Or, word, start),
            _ => {}
        }

        self.coerce_number(word, start)
            .unwrap_or_else(|| Token::text(TokenKind::SearchTerm, word, start))
    }

    /// Turns a fully numeric lexeme into a number token when it follows a comparison.
    fn coerce_number(&self, lexeme: &str, start: usize) -> Option<Token> {
        if !self.previous.is_some_and(TokenKind::is_comparison) {
            return None;
        }
        parse_number(lexeme)
            .map(|number| Token::new(TokenKind::Number, TokenValue::Number(number), start))
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

impl FusedIterator for Lexer<'_> {}

/// Parses a lexeme that is entirely a finite number.
fn parse_number(word: &str) -> Option<f64> {
    word.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Tokenizes a query string into a vector.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}
