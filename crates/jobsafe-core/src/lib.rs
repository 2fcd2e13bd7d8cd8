//! JobSafe Core - Structural validation of employment contracts
//!
//! Contract text is reduced to a stream of section symbols, and the stream
//! is checked by a deterministic pushdown automaton that enforces section
//! order and paired dependencies (role ↔ duties, pay ↔ benefits).
//!
//! # Architecture
//!
//! ```text
//! Contract Text → lines → Classifier → Token Stream → Automaton → Validation
//!                            ↑                                      ↓
//!                        Rule Table                     verdict + trace log
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: Same input always produces identical tokens and trace
//! - **Total**: Classification and validation never fail; rejections are values
//! - **Shareable**: Rule tables and classifiers are immutable and `Send + Sync`

pub mod automaton;
pub mod classifier;
pub mod error;
pub mod fingerprint;
pub mod rules;
pub mod symbol;

pub use automaton::{validate, Marker, Rejection, State, TraceEntry, Validation};
pub use classifier::{classify, ClassifiedLine, Classifier, ClassifierConfig, Truncation};
pub use error::{Error, Result};
pub use rules::{PatternSpec, RuleSpec, RuleTable};
pub use symbol::Symbol;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Full analysis of one document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    /// Token generation log: every line that produced a symbol
    pub lines: Vec<ClassifiedLine>,
    /// Token stream fed to the automaton
    pub tokens: Vec<Symbol>,
    pub validation: Validation,
}

impl Analysis {
    pub fn accepted(&self) -> bool {
        self.validation.accepted
    }

    /// Structural fingerprint of the token stream
    pub fn fingerprint(&self) -> String {
        fingerprint::fingerprint(&self.tokens)
    }
}

/// Classifier + validator pipeline over whole documents
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    classifier: Classifier,
}

impl Analyzer {
    pub fn new(classifier: Classifier) -> Self {
        Analyzer { classifier }
    }

    /// Build an analyzer from classifier configuration.
    ///
    /// # Errors
    /// Propagates configuration and pattern errors.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(Analyzer::new(Classifier::from_config(config)?))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify every line of `text` and validate the resulting stream
    pub fn analyze(&self, text: &str) -> Analysis {
        let lines = self.classifier.classify_lines(text);
        let tokens: Vec<Symbol> = lines.iter().map(|l| l.symbol).collect();
        tracing::debug!(
            tokens = %symbol::format_stream(&tokens),
            "token stream generated"
        );
        let validation = validate(&tokens);
        Analysis {
            lines,
            tokens,
            validation,
        }
    }
}

/// Analyze a document with the standard rules
pub fn analyze(text: &str) -> Analysis {
    Analyzer::default().analyze(text)
}
