//! SLR(1) parse table construction.
//!
//! The table is generated from a production list: the canonical LR(0) collection gives the
//! states and shift/goto transitions, and reductions are placed on the FOLLOW set of each
//! production's left-hand side. Any shift/reduce or reduce/reduce conflict is an error.

use std::{
    collections::{BTreeSet, HashMap},
    sync::LazyLock,
};

use tracing::debug;

use crate::{
    error::GrammarError,
    grammar::{NonTerminal, Production, QUERY_GRAMMAR, QUERY_START, Symbol},
    token::{Lookahead, TokenKind},
};

/// A parse table action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Push the lookahead and move to the given state.
    Shift(usize),
    /// Reduce by the production with the given index.
    Reduce(usize),
    /// The input is a complete sentence.
    Accept,
}

/// Dense action and goto tables for a grammar.
#[derive(Debug)]
pub struct ParseTable {
    /// Productions, indexed by [`Action::Reduce`].
    productions: &'static [Production],
    /// `states × Lookahead::COUNT` actions.
    actions: Vec<Option<Action>>,
    /// `states × NonTerminal::ALL.len()` goto targets.
    gotos: Vec<Option<usize>>,
    /// Number of states.
    states: usize,
}

/// The query language table, built on first use.
static QUERY_TABLE: LazyLock<ParseTable> = LazyLock::new(|| {
    ParseTable::build(QUERY_START, QUERY_GRAMMAR).expect("query grammar is SLR(1)")
});

impl ParseTable {
    /// Returns the table for the query language.
    pub fn query() -> &'static Self {
        &QUERY_TABLE
    }

    /// Builds the SLR(1) table for `productions`, starting at `start`.
    pub fn build(
        start: NonTerminal,
        productions: &'static [Production],
    ) -> Result<Self, GrammarError> {
        let builder = TableBuilder::new(start, productions);
        let collection = builder.canonical_collection();
        let states = collection.states.len();

        let mut table = Self {
            productions,
            actions: vec![None; states * Lookahead::COUNT],
            gotos: vec![None; states * NonTerminal::ALL.len()],
            states,
        };

        for (state, transitions) in collection.transitions.iter().enumerate() {
            for &(symbol, target) in transitions {
                match symbol {
                    Symbol::Terminal(kind) => {
                        table.set_action(state, Lookahead::Token(kind), Action::Shift(target))?;
                    }
                    Symbol::NonTerminal(nt) => {
                        table.gotos[state * NonTerminal::ALL.len() + nt.index()] = Some(target);
                    }
                }
            }
        }

        for (state, items) in collection.states.iter().enumerate() {
            for item in items.iter().filter(|item| builder.is_complete(**item)) {
                if item.production == builder.augmented() {
                    table.set_action(state, Lookahead::End, Action::Accept)?;
                    continue;
                }
                let follow = builder.follow[productions[item.production].lhs.index()];
                for column in (0..Lookahead::COUNT).filter(|c| follow & bit(*c) != 0) {
                    table.set_action(
                        state,
                        Lookahead::from_column(column),
                        Action::Reduce(item.production),
                    )?;
                }
            }
        }

        debug!(states, productions = productions.len(), "built parse table");
        Ok(table)
    }

    /// Records an action, rejecting conflicting entries.
    fn set_action(
        &mut self,
        state: usize,
        lookahead: Lookahead,
        action: Action,
    ) -> Result<(), GrammarError> {
        let slot = &mut self.actions[state * Lookahead::COUNT + lookahead.column()];
        match *slot {
            Some(existing) if existing != action => Err(GrammarError::Conflict {
                state,
                lookahead,
                existing,
                incoming: action,
            }),
            _ => {
                *slot = Some(action);
                Ok(())
            }
        }
    }

    /// Returns the action for `state` on `lookahead`.
    pub fn action(&self, state: usize, lookahead: Lookahead) -> Option<Action> {
        self.actions
            .get(state * Lookahead::COUNT + lookahead.column())
            .copied()
            .flatten()
    }

    /// Returns the goto target for `state` on `nt`.
    pub fn goto(&self, state: usize, nt: NonTerminal) -> Option<usize> {
        self.gotos
            .get(state * NonTerminal::ALL.len() + nt.index())
            .copied()
            .flatten()
    }

    /// Returns every lookahead with an action in `state`.
    pub fn expected(&self, state: usize) -> Vec<Lookahead> {
        (0..Lookahead::COUNT)
            .map(Lookahead::from_column)
            .filter(|lookahead| self.action(state, *lookahead).is_some())
            .collect()
    }

    /// Returns the production with the given index.
    pub fn production(&self, index: usize) -> Option<&Production> {
        self.productions.get(index)
    }

    /// Number of states in the table.
    pub fn state_count(&self) -> usize {
        self.states
    }
}

/// Bitmask over lookahead columns.
type TerminalSet = u32;

/// Returns the bit for a lookahead column.
fn bit(column: usize) -> TerminalSet {
    1 << column
}

/// An LR(0) item: a production with a dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    /// Production index; the augmented start production is `productions.len()`.
    production: usize,
    /// Number of right-hand side symbols already seen.
    dot: usize,
}

/// States and transitions of the canonical LR(0) collection.
struct Collection {
    /// Item sets, indexed by state.
    states: Vec<BTreeSet<Item>>,
    /// Outgoing transitions per state.
    transitions: Vec<Vec<(Symbol, usize)>>,
}

/// Grammar analysis used while building a table.
struct TableBuilder {
    /// The grammar's productions.
    productions: &'static [Production],
    /// Right-hand side of the augmented production `S' → start`.
    augmented_rhs: [Symbol; 1],
    /// Nullable flag per nonterminal.
    nullable: [bool; NonTerminal::ALL.len()],
    /// FIRST set per nonterminal.
    first: [TerminalSet; NonTerminal::ALL.len()],
    /// FOLLOW set per nonterminal.
    follow: [TerminalSet; NonTerminal::ALL.len()],
}

impl TableBuilder {
    /// Analyses the grammar.
    fn new(start: NonTerminal, productions: &'static [Production]) -> Self {
        let mut builder = Self {
            productions,
            augmented_rhs: [Symbol::NonTerminal(start)],
            nullable: [false; NonTerminal::ALL.len()],
            first: [0; NonTerminal::ALL.len()],
            follow: [0; NonTerminal::ALL.len()],
        };
        builder.compute_first();
        builder.follow[start.index()] = bit(Lookahead::End.column());
        builder.compute_follow();
        builder
    }

    /// Index of the augmented start production.
    fn augmented(&self) -> usize {
        self.productions.len()
    }

    /// Right-hand side of a production, including the augmented one.
    fn rhs(&self, production: usize) -> &[Symbol] {
        self.productions
            .get(production)
            .map_or(&self.augmented_rhs[..], |p| p.rhs)
    }

    /// Returns the symbol after the dot, if any.
    fn next_symbol(&self, item: Item) -> Option<Symbol> {
        self.rhs(item.production).get(item.dot).copied()
    }

    /// Returns true when the dot is at the end of the production.
    fn is_complete(&self, item: Item) -> bool {
        item.dot == self.rhs(item.production).len()
    }

    /// FIRST set and nullability of a symbol sequence.
    fn first_of(&self, symbols: &[Symbol]) -> (TerminalSet, bool) {
        let mut set = 0;
        for symbol in symbols {
            match *symbol {
                Symbol::Terminal(kind) => return (set | bit(kind.index()), false),
                Symbol::NonTerminal(nt) => {
                    set |= self.first[nt.index()];
                    if !self.nullable[nt.index()] {
                        return (set, false);
                    }
                }
            }
        }
        (set, true)
    }

    /// Computes nullable flags and FIRST sets to a fixpoint.
    fn compute_first(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.productions {
                let (first, nullable) = self.first_of(production.rhs);
                let lhs = production.lhs.index();
                if self.first[lhs] | first != self.first[lhs] {
                    self.first[lhs] |= first;
                    changed = true;
                }
                if nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
    }

    /// Computes FOLLOW sets to a fixpoint.
    fn compute_follow(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.productions {
                for (i, symbol) in production.rhs.iter().enumerate() {
                    let Symbol::NonTerminal(nt) = *symbol else {
                        continue;
                    };
                    let (mut follow, rest_nullable) = self.first_of(&production.rhs[i + 1..]);
                    if rest_nullable {
                        follow |= self.follow[production.lhs.index()];
                    }
                    let target = &mut self.follow[nt.index()];
                    if *target | follow != *target {
                        *target |= follow;
                        changed = true;
                    }
                }
            }
        }
    }

    /// Closes an item set over nonterminals after the dot.
    fn closure(&self, kernel: BTreeSet<Item>) -> BTreeSet<Item> {
        let mut items = kernel;
        let mut pending: Vec<Item> = items.iter().copied().collect();
        while let Some(item) = pending.pop() {
            let Some(Symbol::NonTerminal(nt)) = self.next_symbol(item) else {
                continue;
            };
            for (production, _) in self
                .productions
                .iter()
                .enumerate()
                .filter(|(_, p)| p.lhs == nt)
            {
                let added = Item { production, dot: 0 };
                if items.insert(added) {
                    pending.push(added);
                }
            }
        }
        items
    }

    /// Builds the canonical LR(0) collection.
    fn canonical_collection(&self) -> Collection {
        let symbols: Vec<Symbol> = TokenKind::ALL
            .iter()
            .map(|kind| Symbol::Terminal(*kind))
            .chain(NonTerminal::ALL.iter().map(|nt| Symbol::NonTerminal(*nt)))
            .collect();

        let initial = self.closure(BTreeSet::from([Item {
            production: self.augmented(),
            dot: 0,
        }]));
        let mut ids = HashMap::from([(initial.clone(), 0)]);
        let mut states = vec![initial];
        let mut transitions = Vec::new();

        let mut current = 0;
        while current < states.len() {
            let mut outgoing = Vec::new();
            for &symbol in &symbols {
                let kernel: BTreeSet<Item> = states[current]
                    .iter()
                    .filter(|item| self.next_symbol(**item) == Some(symbol))
                    .map(|item| Item {
                        dot: item.dot + 1,
                        ..*item
                    })
                    .collect();
                if kernel.is_empty() {
                    continue;
                }
                let target = self.closure(kernel);
                let id = match ids.get(&target) {
                    Some(&id) => id,
                    None => {
                        let id = states.len();
                        ids.insert(target.clone(), id);
                        states.push(target);
                        id
                    }
                };
                outgoing.push((symbol, id));
            }
            transitions.push(outgoing);
            current += 1;
        }

        Collection {
            states,
            transitions,
        }
    }
}
