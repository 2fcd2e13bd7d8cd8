//! Contract section symbols — the closed alphabet the automaton reads
//!
//! Every classified line becomes exactly one of nine symbols, each naming a
//! section of an employment contract. Symbols print and parse as their
//! single-letter form (`H`, `R`, ... `X`).

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A contract section symbol
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Symbol {
    /// Agreement title / preamble
    #[serde(rename = "H")]
    Header,
    /// Position, job title, rank
    #[serde(rename = "R")]
    Role,
    /// Term of employment, start date, probation
    #[serde(rename = "D")]
    Duration,
    /// Duties and responsibilities
    #[serde(rename = "S")]
    Scope,
    /// Salary, pay rate, remuneration
    #[serde(rename = "C")]
    Compensation,
    /// Allowances, insurance, statutory benefits
    #[serde(rename = "B")]
    Benefits,
    /// Non-disclosure and intellectual property
    #[serde(rename = "F")]
    Confidentiality,
    /// Resignation, termination, notice period
    #[serde(rename = "T")]
    Termination,
    /// Signature block
    #[serde(rename = "X")]
    Signatures,
}

impl Symbol {
    /// All symbols in section order
    pub const ALL: [Symbol; 9] = [
        Symbol::Header,
        Symbol::Role,
        Symbol::Duration,
        Symbol::Scope,
        Symbol::Compensation,
        Symbol::Benefits,
        Symbol::Confidentiality,
        Symbol::Termination,
        Symbol::Signatures,
    ];

    /// Single-letter form used in token streams and trace entries
    pub fn letter(self) -> char {
        match self {
            Symbol::Header => 'H',
            Symbol::Role => 'R',
            Symbol::Duration => 'D',
            Symbol::Scope => 'S',
            Symbol::Compensation => 'C',
            Symbol::Benefits => 'B',
            Symbol::Confidentiality => 'F',
            Symbol::Termination => 'T',
            Symbol::Signatures => 'X',
        }
    }

    /// Human-readable section name
    pub fn section_name(self) -> &'static str {
        match self {
            Symbol::Header => "Header",
            Symbol::Role => "Role",
            Symbol::Duration => "Duration",
            Symbol::Scope => "Scope/Duties",
            Symbol::Compensation => "Compensation",
            Symbol::Benefits => "Benefits",
            Symbol::Confidentiality => "Confidentiality",
            Symbol::Termination => "Termination",
            Symbol::Signatures => "Signatures",
        }
    }

    fn from_letter(c: char) -> Option<Symbol> {
        Symbol::ALL
            .into_iter()
            .find(|s| s.letter() == c.to_ascii_uppercase())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Symbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Symbol::from_letter(c).ok_or_else(|| Error::UnknownSymbol(trimmed.to_string()))
            }
            _ => Err(Error::UnknownSymbol(trimmed.to_string())),
        }
    }
}

/// Render a token stream as space-separated letters, e.g. `H R D`
pub fn format_stream(tokens: &[Symbol]) -> String {
    tokens
        .iter()
        .map(|s| s.letter().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a token stream written as letters.
///
/// Accepts whitespace- or comma-separated letters (`"H R D"`, `"H,R,D"`)
/// as well as a packed run (`"HRD"`). An empty string is an empty stream.
///
/// # Errors
/// Returns `UnknownSymbol` for the first character that is not a symbol.
pub fn parse_stream(input: &str) -> Result<Vec<Symbol>> {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| Symbol::from_letter(c).ok_or_else(|| Error::UnknownSymbol(c.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_are_unique_and_ordered() {
        let letters: String = Symbol::ALL.iter().map(|s| s.letter()).collect();
        assert_eq!(letters, "HRDSCBFTX");
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("h".parse::<Symbol>().unwrap(), Symbol::Header);
        assert_eq!(" X ".parse::<Symbol>().unwrap(), Symbol::Signatures);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert_eq!(
            "Q".parse::<Symbol>(),
            Err(Error::UnknownSymbol("Q".into()))
        );
        assert!("HR".parse::<Symbol>().is_err());
        assert!("".parse::<Symbol>().is_err());
    }

    #[test]
    fn test_parse_stream_forms() {
        let expected = vec![Symbol::Header, Symbol::Role, Symbol::Duration];
        assert_eq!(parse_stream("H R D").unwrap(), expected);
        assert_eq!(parse_stream("H,R,D").unwrap(), expected);
        assert_eq!(parse_stream("hrd").unwrap(), expected);
        assert!(parse_stream("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_stream_unknown_letter() {
        let err = parse_stream("H R Z").unwrap_err();
        assert_eq!(err, Error::UnknownSymbol("Z".into()));
    }

    #[test]
    fn test_format_stream() {
        assert_eq!(
            format_stream(&[Symbol::Header, Symbol::Signatures]),
            "H X"
        );
        assert_eq!(format_stream(&[]), "");
    }

    #[test]
    fn test_serde_uses_letters() {
        let json = serde_json::to_string(&vec![Symbol::Compensation, Symbol::Benefits]).unwrap();
        assert_eq!(json, r#"["C","B"]"#);
        let back: Vec<Symbol> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Symbol::Compensation, Symbol::Benefits]);
    }
}
