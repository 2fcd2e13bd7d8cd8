//! DPDA validator — checks section order and paired dependencies
//!
//! The automaton walks a strictly linear chain of states, one per contract
//! section. Each state accepts its own symbol as a self-loop (repeated lines
//! of the same section) and exactly one advancing symbol. Two advancing
//! transitions push a dependency marker and two later ones pop it:
//!
//! ```text
//! start ─H→ header ─R→ role ─D→ term ─S→ scope ─C→ pay_base ─B→ benefits ─F→ legal ─T→ term_clause ─X→ accept
//!                  push(role)        pop(role)   push(pay)    pop(pay)
//! ```
//!
//! A stream is accepted iff it ends in `accept` with an empty stack.
//! Every outcome, including rejection, is reported through the returned
//! [`Validation`]; validation itself never fails.

use std::fmt;

use crate::symbol::Symbol;

// ── States, markers, transitions ──────────────────────────

/// Automaton state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Start,
    Header,
    Role,
    Term,
    Scope,
    PayBase,
    Benefits,
    Legal,
    TermClause,
    Accept,
}

impl State {
    pub const ALL: [State; 10] = [
        State::Start,
        State::Header,
        State::Role,
        State::Term,
        State::Scope,
        State::PayBase,
        State::Benefits,
        State::Legal,
        State::TermClause,
        State::Accept,
    ];

    pub fn name(self) -> &'static str {
        match self {
            State::Start => "start",
            State::Header => "header",
            State::Role => "role",
            State::Term => "term",
            State::Scope => "scope",
            State::PayBase => "pay_base",
            State::Benefits => "benefits",
            State::Legal => "legal",
            State::TermClause => "term_clause",
            State::Accept => "accept",
        }
    }

    pub fn is_accepting(self) -> bool {
        self == State::Accept
    }

    /// The transition taken on `symbol`, or `None` if the symbol is not
    /// valid in this state
    pub fn transition(self, symbol: Symbol) -> Option<Transition> {
        use StackAction::{Pop, Push};
        use Symbol::*;

        let (next, action) = match (self, symbol) {
            (State::Start, Header) => (State::Header, None),

            (State::Header, Header) => (State::Header, None),
            (State::Header, Role) => (State::Role, Some(Push(Marker::Role))),

            (State::Role, Role) => (State::Role, None),
            (State::Role, Duration) => (State::Term, None),

            (State::Term, Duration) => (State::Term, None),
            (State::Term, Scope) => (State::Scope, Some(Pop(Marker::Role))),

            (State::Scope, Scope) => (State::Scope, None),
            (State::Scope, Compensation) => (State::PayBase, Some(Push(Marker::Pay))),

            (State::PayBase, Compensation) => (State::PayBase, None),
            (State::PayBase, Benefits) => (State::Benefits, Some(Pop(Marker::Pay))),

            (State::Benefits, Benefits) => (State::Benefits, None),
            (State::Benefits, Confidentiality) => (State::Legal, None),

            (State::Legal, Confidentiality) => (State::Legal, None),
            (State::Legal, Termination) => (State::TermClause, None),

            (State::TermClause, Termination) => (State::TermClause, None),
            (State::TermClause, Signatures) => (State::Accept, None),

            (State::Accept, Signatures) => (State::Accept, None),

            _ => return None,
        };
        Some(Transition { next, action })
    }

    /// Symbols this state has a transition for, in section order
    pub fn expected(self) -> Vec<Symbol> {
        Symbol::ALL
            .into_iter()
            .filter(|s| self.transition(*s).is_some())
            .collect()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Dependency marker kept on the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Marker {
    /// Opened by the role section, closed by the duties section
    #[serde(rename = "role_marker")]
    Role,
    /// Opened by the compensation section, closed by the benefits section
    #[serde(rename = "pay_marker")]
    Pay,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Role => write!(f, "role_marker"),
            Marker::Pay => write!(f, "pay_marker"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAction {
    Push(Marker),
    Pop(Marker),
}

/// Result of looking up `(state, symbol)` in the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: State,
    pub action: Option<StackAction>,
}

/// Render a stack bottom-to-top, e.g. `[role_marker, pay_marker]`
pub fn format_stack(stack: &[Marker]) -> String {
    let items: Vec<String> = stack.iter().map(|m| m.to_string()).collect();
    format!("[{}]", items.join(", "))
}

fn format_symbols(symbols: &[Symbol]) -> String {
    let items: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
    format!("[{}]", items.join(", "))
}

// ── Trace ─────────────────────────────────────────────────

/// Why a token stream was rejected
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// No tokens at all
    EmptyInput,
    /// Symbol has no transition from the current state
    UnexpectedToken {
        /// 1-based position in the token stream
        position: usize,
        symbol: Symbol,
        state: State,
        expected: Vec<Symbol>,
    },
    /// Pop requested with an empty stack or a different marker on top
    DependencyError {
        position: usize,
        symbol: Symbol,
        expected: Marker,
        stack: Vec<Marker>,
    },
    /// Input ended before the accept state
    IncompleteContract { state: State },
    /// Accept state reached with markers still open
    UnresolvedDependencies { stack: Vec<Marker> },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyInput => write!(f, "Empty token stream."),
            Rejection::UnexpectedToken {
                position,
                symbol,
                state,
                expected,
            } => write!(
                f,
                "Unexpected token '{}' at position {} in state '{}'. Expected: {}",
                symbol,
                position,
                state,
                format_symbols(expected)
            ),
            Rejection::DependencyError {
                position,
                symbol,
                expected,
                stack,
            } => write!(
                f,
                "Dependency error at token '{}' (position {}). Expected to close '{}', but stack was {}.",
                symbol,
                position,
                expected,
                format_stack(stack)
            ),
            Rejection::IncompleteContract { state } => {
                write!(f, "Contract incomplete. Ended in state '{}'.", state)
            }
            Rejection::UnresolvedDependencies { stack } => {
                write!(f, "Unresolved dependencies. Stack: {}", format_stack(stack))
            }
        }
    }
}

/// One entry of the validation trace
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEntry {
    Transition {
        symbol: Symbol,
        from: State,
        to: State,
    },
    Push {
        marker: Marker,
        stack: Vec<Marker>,
    },
    Pop {
        marker: Marker,
        stack: Vec<Marker>,
    },
    Reject(Rejection),
}

impl TraceEntry {
    pub fn is_reject(&self) -> bool {
        matches!(self, TraceEntry::Reject(_))
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEntry::Transition { symbol, from, to } => {
                write!(f, "TRANSITION: {} --{}--> {}", from, symbol, to)
            }
            TraceEntry::Push { marker, stack } => {
                write!(f, "PUSH: '{}' (stack: {})", marker, format_stack(stack))
            }
            TraceEntry::Pop { marker, stack } => {
                write!(f, "POP: '{}' (stack: {})", marker, format_stack(stack))
            }
            TraceEntry::Reject(rejection) => write!(f, "REJECT: {}", rejection),
        }
    }
}

/// Outcome of one validation run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Validation {
    pub accepted: bool,
    pub trace: Vec<TraceEntry>,
    /// State when processing stopped
    pub final_state: State,
    /// Stack contents when processing stopped, bottom first
    pub final_stack: Vec<Marker>,
    /// Tokens consumed before halting
    pub consumed: usize,
}

impl Validation {
    /// The rejection reason, if the stream was rejected
    pub fn rejection(&self) -> Option<&Rejection> {
        self.trace.iter().rev().find_map(|entry| match entry {
            TraceEntry::Reject(r) => Some(r),
            _ => None,
        })
    }

    /// Human-readable trace, one line per entry
    pub fn trace_lines(&self) -> Vec<String> {
        self.trace.iter().map(|e| e.to_string()).collect()
    }

    pub fn into_parts(self) -> (bool, Vec<TraceEntry>) {
        (self.accepted, self.trace)
    }
}

// ── Automaton ─────────────────────────────────────────────

/// Pushdown automaton for a single validation run
#[derive(Debug, Clone)]
pub struct Automaton {
    state: State,
    stack: Vec<Marker>,
    trace: Vec<TraceEntry>,
    consumed: usize,
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

impl Automaton {
    pub fn new() -> Self {
        Automaton {
            state: State::Start,
            stack: Vec::new(),
            trace: Vec::new(),
            consumed: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn stack(&self) -> &[Marker] {
        &self.stack
    }

    /// Consume one symbol. On rejection the reason is also appended to the
    /// trace and the automaton must not be stepped again.
    pub fn step(&mut self, symbol: Symbol) -> Result<(), Rejection> {
        let position = self.consumed + 1;

        let Some(transition) = self.state.transition(symbol) else {
            return Err(self.reject(Rejection::UnexpectedToken {
                position,
                symbol,
                state: self.state,
                expected: self.state.expected(),
            }));
        };

        match transition.action {
            Some(StackAction::Push(marker)) => {
                self.stack.push(marker);
                self.trace.push(TraceEntry::Push {
                    marker,
                    stack: self.stack.clone(),
                });
            }
            Some(StackAction::Pop(marker)) => {
                if self.stack.last() != Some(&marker) {
                    return Err(self.reject(Rejection::DependencyError {
                        position,
                        symbol,
                        expected: marker,
                        stack: self.stack.clone(),
                    }));
                }
                self.stack.pop();
                self.trace.push(TraceEntry::Pop {
                    marker,
                    stack: self.stack.clone(),
                });
            }
            None => {}
        }

        tracing::debug!(position, %symbol, from = %self.state, to = %transition.next, "transition");
        self.trace.push(TraceEntry::Transition {
            symbol,
            from: self.state,
            to: transition.next,
        });
        self.state = transition.next;
        self.consumed = position;
        Ok(())
    }

    /// Apply the end-of-input checks and produce the final outcome
    pub fn finish(mut self) -> Validation {
        let mut accepted = true;

        if !self.state.is_accepting() {
            accepted = false;
            self.reject(Rejection::IncompleteContract { state: self.state });
        } else if !self.stack.is_empty() {
            accepted = false;
            self.reject(Rejection::UnresolvedDependencies {
                stack: self.stack.clone(),
            });
        }

        self.into_validation(accepted)
    }

    fn reject(&mut self, rejection: Rejection) -> Rejection {
        tracing::debug!(%rejection, "reject");
        self.trace.push(TraceEntry::Reject(rejection.clone()));
        rejection
    }

    fn into_validation(self, accepted: bool) -> Validation {
        Validation {
            accepted,
            trace: self.trace,
            final_state: self.state,
            final_stack: self.stack,
            consumed: self.consumed,
        }
    }
}

// ── Public API ────────────────────────────────────────────

/// Validate a token stream.
///
/// Halts at the first rejecting token; otherwise consumes the whole stream
/// and applies the end-of-input checks. Each call starts from a fresh
/// automaton, so identical input always yields an identical result.
pub fn validate(tokens: &[Symbol]) -> Validation {
    let mut automaton = Automaton::new();

    if tokens.is_empty() {
        automaton.reject(Rejection::EmptyInput);
        let validation = automaton.into_validation(false);
        tracing::info!(accepted = false, "empty token stream");
        return validation;
    }

    for &symbol in tokens {
        if automaton.step(symbol).is_err() {
            let validation = automaton.into_validation(false);
            tracing::info!(accepted = false, consumed = validation.consumed, "rejected");
            return validation;
        }
    }

    let validation = automaton.finish();
    tracing::info!(
        accepted = validation.accepted,
        consumed = validation.consumed,
        "validation finished"
    );
    validation
}
