//! Error recovery for the shift-reduce parser.
//!
//! When the parse table has no action for the current lookahead, the parser asks an
//! [`ErrorRecovery`] policy what to do. The policy only decides; the parser applies the
//! decision and retries.

use tracing::debug;

use crate::{
    token::{Lookahead, Token, TokenKind},
    tree::ParseTree,
};

/// A recovery decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    /// Use this token instead of the failing lookahead. Over a real token the failing token is
    /// consumed; at end of input the token is inserted before the end.
    Replace(Token),
    /// Treat the input as exhausted and accept what has been parsed so far.
    Stop,
    /// Give up; the parse fails with the acceptable set.
    Fail,
}

/// The parser state at the point where no action exists.
#[derive(Debug, Clone, Copy)]
pub struct Stalled<'a> {
    /// Nodes on the parse stack, bottom first.
    pub stack: &'a [ParseTree],
    /// The failing token, or None at end of input.
    pub found: Option<&'a Token>,
    /// Lookaheads with an action in the current state.
    pub acceptable: &'a [Lookahead],
}

impl Stalled<'_> {
    /// Returns true if a token of `kind` would be accepted.
    pub fn accepts(&self, kind: TokenKind) -> bool {
        self.acceptable.contains(&Lookahead::Token(kind))
    }
}

/// A policy turning malformed input into a best-effort parse.
pub trait ErrorRecovery {
    /// Decides how to continue from a stalled parse.
    fn recover(&mut self, stalled: &Stalled<'_>) -> Recovery;
}

impl<F> ErrorRecovery for F
where
    F: FnMut(&Stalled<'_>) -> Recovery,
{
    fn recover(&mut self, stalled: &Stalled<'_>) -> Recovery {
        self(stalled)
    }
}

/// The query language's recovery policy.
///
/// In order of preference:
/// 1. if a search term is acceptable, the offending lexeme becomes a search term (empty at end
///    of input);
/// 2. if a closing parenthesis is acceptable, one is synthesized;
/// 3. if only the end of input is acceptable, the remainder is discarded;
/// 4. otherwise recovery fails.
#[derive(Debug, Clone)]
pub struct DefaultRecovery {
    /// Position assigned to the next token synthesized at end of input.
    next_offset: usize,
}

impl DefaultRecovery {
    /// Creates the policy for a query; synthesized tokens are positioned past its end.
    pub fn for_input(input: &str) -> Self {
        Self {
            next_offset: input.len(),
        }
    }

    /// Position for a synthesized token.
    fn position(&mut self, found: Option<&Token>) -> usize {
        match found {
            Some(token) => token.position,
            None => {
                let position = self.next_offset;
                self.next_offset += 1;
                position
            }
        }
    }
}

impl ErrorRecovery for DefaultRecovery {
    fn recover(&mut self, stalled: &Stalled<'_>) -> Recovery {
        let decision = if stalled.accepts(TokenKind::SearchTerm) {
            let text = stalled
                .found
                .map(|token| token.lexeme().into_owned())
                .unwrap_or_default();
            let position = self.position(stalled.found);
            Recovery::Replace(Token::text(TokenKind::SearchTerm, text, position))
        } else if stalled.accepts(TokenKind::RParen) {
            let position = self.position(stalled.found);
            Recovery::Replace(Token::text(TokenKind::RParen, ")", position))
        } else if stalled.acceptable == [Lookahead::End] {
            Recovery::Stop
        } else {
            Recovery::Fail
        };

        debug!(
            found = %Lookahead::of(stalled.found),
            ?decision,
            "recovering from syntax error"
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stalled<'a>(found: Option<&'a Token>, acceptable: &'a [Lookahead]) -> Stalled<'a> {
        Stalled {
            stack: &[],
            found,
            acceptable,
        }
    }

    #[test]
    fn offending_token_becomes_search_term() {
        let colon = Token::text(TokenKind::GroupTerminator, ":", 4);
        let acceptable = [
            Lookahead::Token(TokenKind::SearchTerm),
            Lookahead::Token(TokenKind::RParen),
        ];
        let decision =
            DefaultRecovery::for_input("abc :").recover(&stalled(Some(&colon), &acceptable));
        assert_eq!(
            decision,
            Recovery::Replace(Token::text(TokenKind::SearchTerm, ":", 4))
        );
    }

    #[test]
    fn end_of_input_synthesizes_empty_terms_past_the_end() {
        let acceptable = [Lookahead::Token(TokenKind::SearchTerm)];
        let mut recovery = DefaultRecovery::for_input("name:");
        assert_eq!(
            recovery.recover(&stalled(None, &acceptable)),
            Recovery::Replace(Token::text(TokenKind::SearchTerm, "", 5))
        );
        assert_eq!(
            recovery.recover(&stalled(None, &acceptable)),
            Recovery::Replace(Token::text(TokenKind::SearchTerm, "", 6))
        );
    }

    #[test]
    fn closes_open_group() {
        let acceptable = [Lookahead::Token(TokenKind::RParen)];
        let decision = DefaultRecovery::for_input("(a").recover(&stalled(None, &acceptable));
        assert_eq!(
            decision,
            Recovery::Replace(Token::text(TokenKind::RParen, ")", 2))
        );
    }

    #[test]
    fn stops_when_only_end_is_acceptable() {
        let paren = Token::text(TokenKind::RParen, ")", 2);
        let decision =
            DefaultRecovery::for_input("a )").recover(&stalled(Some(&paren), &[Lookahead::End]));
        assert_eq!(decision, Recovery::Stop);
    }

    #[test]
    fn fails_otherwise() {
        let and = Token::text(TokenKind::And, "AND", 0);
        let acceptable = [Lookahead::Token(TokenKind::Number), Lookahead::End];
        let decision = DefaultRecovery::for_input("AND").recover(&stalled(Some(&and), &acceptable));
        assert_eq!(decision, Recovery::Fail);
    }

    #[test]
    fn closures_are_policies() {
        let mut calls = 0;
        let mut policy = |_: &Stalled<'_>| {
            calls += 1;
            Recovery::Stop
        };
        assert_eq!(policy.recover(&stalled(None, &[])), Recovery::Stop);
        assert_eq!(calls, 1);
    }
}
