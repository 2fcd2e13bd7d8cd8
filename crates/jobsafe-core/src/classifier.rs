//! Symbol classifier — maps one line of contract text to at most one symbol
//!
//! # Pipeline
//!
//! ```text
//! line → trim + lowercase → (empty? → None) → truncate long lines → rule table
//! ```
//!
//! Long narrative lines are cut down to their leading words before matching,
//! so a keyword mentioned in passing near the end of a sentence does not
//! classify the whole line.
//!
//! The classifier holds no mutable state; one instance can be shared across
//! threads and called concurrently.

use once_cell::sync::Lazy;

use crate::rules::{RuleSpec, RuleTable};
use crate::symbol::Symbol;
use crate::{Error, Result};

static STANDARD_CLASSIFIER: Lazy<Classifier> = Lazy::new(Classifier::standard);

/// Characters of the trimmed line kept in a `ClassifiedLine` excerpt
pub const EXCERPT_CHARS: usize = 50;

// ── Configuration ─────────────────────────────────────────

/// Long-line truncation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Truncation {
    /// Lines with at least this many words are truncated
    pub threshold: usize,
    /// Number of leading words kept when truncating
    pub prefix_words: usize,
}

impl Default for Truncation {
    fn default() -> Self {
        Truncation {
            threshold: 20,
            prefix_words: 15,
        }
    }
}

/// Classifier configuration, loadable from JSON.
///
/// ```json
/// {
///   "truncation": { "threshold": 20, "prefix_words": 15 },
///   "rules": [ { "symbol": "H", "patterns": [ { "text": "employment agreement" } ] } ]
/// }
/// ```
///
/// Omitted fields fall back to the standard settings; omitting `rules`
/// selects the standard rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub truncation: Truncation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleSpec>>,
}

impl ClassifierConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    /// `ConfigError` for malformed JSON or inconsistent truncation settings.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ClassifierConfig =
            serde_json::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let t = &self.truncation;
        if t.prefix_words == 0 {
            return Err(Error::ConfigError(
                "truncation.prefix_words must be at least 1".to_string(),
            ));
        }
        if t.prefix_words > t.threshold {
            return Err(Error::ConfigError(format!(
                "truncation.prefix_words ({}) exceeds truncation.threshold ({})",
                t.prefix_words, t.threshold
            )));
        }
        Ok(())
    }
}

// ── Classifier ────────────────────────────────────────────

/// One line of a document that produced a symbol
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassifiedLine {
    /// 1-based line number in the source text
    pub line_number: usize,
    pub symbol: Symbol,
    /// Pattern text that decided the symbol
    pub pattern: String,
    /// Leading characters of the trimmed line
    pub excerpt: String,
}

/// Line classifier: a rule table plus truncation settings
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleTable,
    truncation: Truncation,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}

impl Classifier {
    /// Classifier over the standard rule table and truncation settings
    pub fn standard() -> Self {
        Classifier {
            rules: RuleTable::standard().clone(),
            truncation: Truncation::default(),
        }
    }

    pub fn new(rules: RuleTable, truncation: Truncation) -> Self {
        Classifier { rules, truncation }
    }

    /// Build a classifier from configuration.
    ///
    /// # Errors
    /// `ConfigError` or `InvalidPattern` if the configuration is unusable.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        config.check()?;
        let rules = match config.rules {
            Some(ref specs) => RuleTable::compile(specs)?,
            None => RuleTable::standard().clone(),
        };
        Ok(Classifier::new(rules, config.truncation))
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn truncation(&self) -> Truncation {
        self.truncation
    }

    /// Classify one line; `None` for blank lines and lines no rule matches
    pub fn classify(&self, line: &str) -> Option<Symbol> {
        let text = self.search_text(line)?;
        self.rules.first_match(&text)
    }

    /// The normalized text that rules are matched against, `None` if blank
    pub fn search_text(&self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lowered = trimmed.to_lowercase();

        if lowered.split_whitespace().count() >= self.truncation.threshold {
            let prefix: Vec<&str> = lowered
                .split_whitespace()
                .take(self.truncation.prefix_words)
                .collect();
            return Some(prefix.join(" "));
        }
        Some(lowered)
    }

    /// Classify every line of `text`, keeping only lines that produce a symbol.
    ///
    /// Line numbers are 1-based positions in `text` itself, leading blank
    /// lines included.
    pub fn classify_lines(&self, text: &str) -> Vec<ClassifiedLine> {
        text.split('\n')
            .enumerate()
            .filter_map(|(index, line)| {
                let search = self.search_text(line)?;
                let (symbol, pattern) = self.rules.find(&search)?;
                tracing::debug!(line = index + 1, %symbol, pattern = %pattern.spec().text, "classified");
                Some(ClassifiedLine {
                    line_number: index + 1,
                    symbol,
                    pattern: pattern.spec().text.clone(),
                    excerpt: line.trim().chars().take(EXCERPT_CHARS).collect(),
                })
            })
            .collect()
    }

    /// Token stream for a whole document, in line order
    pub fn tokenize(&self, text: &str) -> Vec<Symbol> {
        self.classify_lines(text)
            .into_iter()
            .map(|l| l.symbol)
            .collect()
    }
}

/// Classify one line with the standard classifier
pub fn classify(line: &str) -> Option<Symbol> {
    STANDARD_CLASSIFIER.classify(line)
}
