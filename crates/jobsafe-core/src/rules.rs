//! Rule table — ordered keyword patterns per contract section
//!
//! Rules are data, not code: each symbol owns an ordered list of patterns and
//! the table itself is ordered. Lookup returns the first symbol (in table
//! order) with any matching pattern, so declaration order decides ties.
//!
//! Patterns are literal phrases matched case-insensitively anywhere in the
//! text. A pattern flagged `whole_word` only matches between word boundaries
//! (`rank` matches "the rank of" but not "frankly"). A pattern flagged
//! `regex` is taken as a raw regular expression instead of a literal.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::symbol::Symbol;
use crate::{Error, Result};

/// Standard employment-contract rules: `(symbol, [(phrase, whole_word)])`.
/// Order matters: symbols are tried top to bottom.
const STANDARD_RULES: &[(Symbol, &[(&str, bool)])] = &[
    (
        Symbol::Header,
        &[
            ("employment agreement", false),
            ("contract of employment", false),
            ("know all men", false),
            ("service agreement", false),
            ("letter of offer", false),
        ],
    ),
    (
        Symbol::Role,
        &[
            ("position", false),
            ("job title", false),
            ("designation", false),
            ("hired as", false),
            ("rank", true),
        ],
    ),
    (
        Symbol::Duration,
        &[
            ("term of employment", false),
            ("effective date", false),
            ("probationary", false),
            ("start date", false),
            ("period of employment", false),
            ("duration", true),
        ],
    ),
    (
        Symbol::Scope,
        &[
            ("duties", false),
            ("responsibilities", false),
            ("functions", false),
            ("deliverables", false),
            ("scope of work", false),
            ("obligations", false),
            ("job description", false),
        ],
    ),
    (
        Symbol::Compensation,
        &[
            ("basic pay", false),
            ("monthly rate", false),
            ("gross salary", false),
            ("remuneration", false),
            ("hourly rate", false),
            ("compensation", false),
            ("salary", true),
        ],
    ),
    (
        Symbol::Benefits,
        &[
            ("allowance", false),
            ("13th month", false),
            ("hmo", false),
            ("incentives", false),
            ("sss", false),
            ("philhealth", false),
            ("pag-ibig", false),
            ("insurance", false),
            ("benefits", false),
        ],
    ),
    (
        Symbol::Confidentiality,
        &[
            ("confidentiality", false),
            ("non-disclosure", false),
            ("data privacy", false),
            ("proprietary", false),
            ("intellectual property", false),
        ],
    ),
    (
        Symbol::Termination,
        &[
            ("resignation", false),
            ("termination", false),
            ("notice period", false),
            ("breach", false),
            ("separation", false),
            ("end of contract", false),
        ],
    ),
    (
        Symbol::Signatures,
        &[
            ("signed", false),
            ("witness", false),
            ("conforme", false),
            ("accepted by", false),
            ("signature", false),
        ],
    ),
];

static STANDARD_TABLE: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::compile(&standard_specs()).expect("standard rule table must compile")
});

// ── Serializable rule definitions ─────────────────────────

/// Declarative form of a single pattern
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatternSpec {
    /// Phrase (or regular expression when `regex` is set)
    pub text: String,
    /// Require word boundaries on both sides of the match
    #[serde(default)]
    pub whole_word: bool,
    /// Treat `text` as a raw regular expression
    #[serde(default)]
    pub regex: bool,
}

impl PatternSpec {
    pub fn literal(text: &str) -> Self {
        PatternSpec {
            text: text.to_string(),
            whole_word: false,
            regex: false,
        }
    }

    pub fn word(text: &str) -> Self {
        PatternSpec {
            whole_word: true,
            ..PatternSpec::literal(text)
        }
    }
}

/// Declarative form of one symbol's rule
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RuleSpec {
    pub symbol: Symbol,
    pub patterns: Vec<PatternSpec>,
}

/// The standard rule table in declarative form
pub fn standard_specs() -> Vec<RuleSpec> {
    STANDARD_RULES
        .iter()
        .map(|(symbol, patterns)| RuleSpec {
            symbol: *symbol,
            patterns: patterns
                .iter()
                .map(|(text, whole_word)| PatternSpec {
                    text: (*text).to_string(),
                    whole_word: *whole_word,
                    regex: false,
                })
                .collect(),
        })
        .collect()
}

// ── Compiled rules ────────────────────────────────────────

/// A compiled, case-insensitive pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    spec: PatternSpec,
    matcher: Regex,
}

impl Pattern {
    /// Compile a pattern belonging to `symbol`.
    ///
    /// # Errors
    /// `InvalidPattern` if the text is empty or the regex does not compile.
    pub fn compile(symbol: Symbol, spec: &PatternSpec) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidPattern {
            symbol: symbol.to_string(),
            pattern: spec.text.clone(),
            reason,
        };

        if spec.text.trim().is_empty() {
            return Err(invalid("pattern text is empty".to_string()));
        }

        let body = if spec.regex {
            format!("(?:{})", spec.text)
        } else {
            regex::escape(&spec.text)
        };
        let source = if spec.whole_word {
            format!(r"\b{}\b", body)
        } else {
            body
        };

        let matcher = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Pattern {
            spec: spec.clone(),
            matcher,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    pub fn spec(&self) -> &PatternSpec {
        &self.spec
    }
}

/// All patterns for one symbol, in priority order
#[derive(Debug, Clone)]
pub struct Rule {
    pub symbol: Symbol,
    pub patterns: Vec<Pattern>,
}

/// Immutable ordered rule table
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// The built-in employment-contract table, compiled once and shared
    pub fn standard() -> &'static RuleTable {
        &STANDARD_TABLE
    }

    /// Compile a table from declarative rules, preserving their order.
    ///
    /// # Errors
    /// - `ConfigError` if a symbol appears in more than one rule
    /// - `InvalidPattern` if any pattern fails to compile
    pub fn compile(specs: &[RuleSpec]) -> Result<Self> {
        let mut rules: Vec<Rule> = Vec::with_capacity(specs.len());

        for spec in specs {
            if rules.iter().any(|r| r.symbol == spec.symbol) {
                return Err(Error::ConfigError(format!(
                    "symbol '{}' has more than one rule",
                    spec.symbol
                )));
            }
            let patterns = spec
                .patterns
                .iter()
                .map(|p| Pattern::compile(spec.symbol, p))
                .collect::<Result<Vec<_>>>()?;
            rules.push(Rule {
                symbol: spec.symbol,
                patterns,
            });
        }

        Ok(RuleTable { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First symbol whose patterns match, together with the winning pattern
    pub fn find(&self, text: &str) -> Option<(Symbol, &Pattern)> {
        self.rules.iter().find_map(|rule| {
            rule.patterns
                .iter()
                .find(|p| p.is_match(text))
                .map(|p| (rule.symbol, p))
        })
    }

    /// First symbol whose patterns match `text`
    pub fn first_match(&self, text: &str) -> Option<Symbol> {
        self.find(text).map(|(symbol, _)| symbol)
    }

    /// Declarative form of this table (round-trips through `compile`)
    pub fn specs(&self) -> Vec<RuleSpec> {
        self.rules
            .iter()
            .map(|rule| RuleSpec {
                symbol: rule.symbol,
                patterns: rule.patterns.iter().map(|p| p.spec().clone()).collect(),
            })
            .collect()
    }
}
