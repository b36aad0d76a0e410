//! Table-driven shift-reduce parser.

use tracing::{trace, warn};

use crate::{
    error::{ParseError, ParseErrorKind},
    recovery::{ErrorRecovery, Recovery, Stalled},
    table::{Action, ParseTable},
    token::{Lookahead, Token, TokenKind},
    tree::ParseTree,
};

/// Maximum consecutive recoveries without a shift.
const MAX_RECOVERIES: usize = TokenKind::ALL.len() + 1;

/// An LR parser driven by a [`ParseTable`].
#[derive(Debug, Clone, Copy)]
pub struct LrParser<'t> {
    /// Action and goto tables.
    table: &'t ParseTable,
}

impl<'t> LrParser<'t> {
    /// Creates a parser over `table`.
    pub fn new(table: &'t ParseTable) -> Self {
        Self { table }
    }

    /// Parses a token sequence into a tree.
    ///
    /// Without a recovery policy the first token with no table action fails the parse. With one,
    /// the policy's decision is applied and the parse retried; a policy that keeps intervening
    /// without the parser shifting a token fails with [`ParseErrorKind::RecoveryStalled`].
    pub fn parse<I>(
        &self,
        tokens: I,
        mut recovery: Option<&mut dyn ErrorRecovery>,
    ) -> Result<ParseTree, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut tokens = tokens.into_iter().fuse();
        let mut states: Vec<usize> = vec![0];
        let mut nodes: Vec<ParseTree> = Vec::new();
        let mut lookahead = tokens.next();
        let mut exhausted = false;
        let mut recoveries = 0;

        loop {
            let state = states.last().copied().unwrap_or_default();
            let column = Lookahead::of(lookahead.as_ref());

            match self.table.action(state, column) {
                Some(Action::Shift(next)) => {
                    let Some(token) = lookahead.take() else {
                        return Err(self.error(ParseErrorKind::Unexpected, state, None));
                    };
                    trace!(state, next, kind = ?token.kind, "shift");
                    nodes.push(ParseTree::Leaf(token));
                    states.push(next);
                    lookahead = if exhausted { None } else { tokens.next() };
                    recoveries = 0;
                }
                Some(Action::Reduce(index)) => {
                    let Some(production) = self.table.production(index) else {
                        let found = lookahead.as_ref();
                        return Err(self.error(ParseErrorKind::InvalidTable, state, found));
                    };
                    let arity = production.rhs.len();
                    let children = nodes.split_off(nodes.len() - arity);
                    states.truncate(states.len() - arity);

                    let exposed = states.last().copied().unwrap_or_default();
                    let Some(next) = self.table.goto(exposed, production.lhs) else {
                        let found = lookahead.as_ref();
                        return Err(self.error(ParseErrorKind::InvalidTable, exposed, found));
                    };
                    trace!(state, %production, next, "reduce");
                    nodes.push(ParseTree::node(production.lhs, children));
                    states.push(next);
                }
                Some(Action::Accept) => {
                    return match (nodes.pop(), nodes.is_empty()) {
                        (Some(tree), true) => Ok(tree),
                        _ => Err(self.error(ParseErrorKind::InvalidTable, state, None)),
                    };
                }
                None => {
                    let Some(policy) = recovery.as_deref_mut() else {
                        let found = lookahead.as_ref();
                        return Err(self.error(ParseErrorKind::Unexpected, state, found));
                    };
                    if recoveries == MAX_RECOVERIES {
                        return Err(self.error(
                            ParseErrorKind::RecoveryStalled,
                            state,
                            lookahead.as_ref(),
                        ));
                    }
                    recoveries += 1;

                    let acceptable = self.table.expected(state);
                    let decision = policy.recover(&Stalled {
                        stack: &nodes,
                        found: lookahead.as_ref(),
                        acceptable: &acceptable,
                    });
                    match decision {
                        Recovery::Replace(token) => lookahead = Some(token),
                        Recovery::Stop => {
                            warn!(state, "discarding remaining input");
                            exhausted = true;
                            lookahead = None;
                        }
                        Recovery::Fail => {
                            return Err(self.error(
                                ParseErrorKind::RecoveryFailed,
                                state,
                                lookahead.as_ref(),
                            ));
                        }
                    }
                }
            }
        }
    }

    /// Builds an error for `state` with its acceptable set.
    fn error(&self, kind: ParseErrorKind, state: usize, found: Option<&Token>) -> ParseError {
        ParseError::new(
            kind,
            found.map(|t| t.position),
            found.map(|t| t.kind),
            self.table.expected(state),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grammar::NonTerminal, lexer::tokenize};

    fn parse(input: &str) -> Result<ParseTree, ParseError> {
        LrParser::new(ParseTable::query()).parse(tokenize(input), None)
    }

    fn collect_labels(tree: &ParseTree, out: &mut Vec<NonTerminal>) {
        if let Some(label) = tree.label() {
            out.push(label);
        }
        for child in tree.children() {
            collect_labels(child, out);
        }
    }

    fn labels(tree: &ParseTree) -> Vec<NonTerminal> {
        let mut out = Vec::new();
        collect_labels(tree, &mut out);
        out
    }

    #[test]
    fn empty_query_is_an_empty_list() {
        let tree = parse("").unwrap();
        assert_eq!(tree.label(), Some(NonTerminal::S));
        assert!(tree.is_empty());
    }

    #[test]
    fn single_term() {
        let tree = parse("heavy").unwrap();
        assert_eq!(
            labels(&tree),
            vec![
                NonTerminal::S,
                NonTerminal::Search,
                NonTerminal::SearchType,
                NonTerminal::Term,
                NonTerminal::SearchTerm,
                NonTerminal::S,
            ]
        );
        assert_eq!(tree.leaves()[0].lexeme(), "heavy");
    }

    #[test]
    fn implicit_and_is_right_recursive() {
        let tree = parse("a b c").unwrap();
        let children = tree.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].label(), Some(NonTerminal::S));
        assert_eq!(children[1].children().len(), 2);
    }

    #[test]
    fn explicit_connectives() {
        let tree = parse("a AND b OR c").unwrap();
        let search = &tree.children()[0];
        let and = &search.children()[0];
        assert_eq!(and.label(), Some(NonTerminal::And));
        assert!(and.children()[1].is_token(TokenKind::And));
        let rhs = &and.children()[2].children()[0];
        assert_eq!(rhs.label(), Some(NonTerminal::Or));
    }

    #[test]
    fn group_and_comparison() {
        let tree = parse("year:>2010").unwrap();
        assert!(labels(&tree).contains(&NonTerminal::Group));
        assert!(labels(&tree).contains(&NonTerminal::CmpOp));
        assert!(tree.leaves().iter().any(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn comparison_with_text_operand_parses() {
        assert!(parse(">abc").is_ok());
    }

    #[test]
    fn parenthesized_list() {
        let tree = parse("!(a b)").unwrap();
        assert!(tree.leaves().iter().any(|t| t.kind == TokenKind::Exclude));
        assert!(parse("()").is_ok());
    }

    #[test]
    fn nested_groups() {
        assert!(parse("a:(b:c OR d)").is_ok());
    }

    #[test]
    fn strict_dangling_group_lists_search_term() {
        let err = parse("name:").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Unexpected);
        assert!(err.accepts(TokenKind::SearchTerm));
        assert_eq!(err.position, None);
    }

    #[test]
    fn strict_unexpected_token_has_position() {
        let err = parse("a )").unwrap_err();
        assert_eq!(err.position, Some(2));
        assert_eq!(err.found, Some(TokenKind::RParen));
        assert_eq!(err.acceptable, vec![Lookahead::End]);
    }

    #[test]
    fn recovery_inserts_missing_term() {
        let mut policy = crate::recovery::DefaultRecovery::for_input("name:");
        let tree = LrParser::new(ParseTable::query())
            .parse(tokenize("name:"), Some(&mut policy))
            .unwrap();
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[2].lexeme(), "");
    }

    #[test]
    fn stalled_policy_is_cut_off() {
        let mut policy = |stalled: &Stalled<'_>| match stalled.found {
            Some(token) => Recovery::Replace(token.clone()),
            None => Recovery::Replace(Token::text(TokenKind::And, "AND", 0)),
        };
        let err = LrParser::new(ParseTable::query())
            .parse(tokenize("a )"), Some(&mut policy))
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::RecoveryStalled);
    }

    #[test]
    fn failing_policy_reports_acceptable_set() {
        let mut policy = |_: &Stalled<'_>| Recovery::Fail;
        let err = LrParser::new(ParseTable::query())
            .parse(tokenize("a AND"), Some(&mut policy))
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::RecoveryFailed);
        assert!(err.accepts(TokenKind::SearchTerm));
    }

    #[test]
    fn performance_of_long_queries() {
        use std::time::Instant;

        let query = (0..500)
            .map(|i| format!("field{i}:(term{i} OR !other{i})"))
            .collect::<Vec<_>>()
            .join(" ");
        let start = Instant::now();
        assert!(parse(&query).is_ok());
        assert!(start.elapsed().as_secs() < 2);
    }
}
