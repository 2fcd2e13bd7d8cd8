//! Structural fingerprint — SHA-256 over a document's canonical token stream
//!
//! Two documents share a fingerprint iff they have the same section
//! structure. Consecutive repeats collapse first, since self-loops never
//! change how the automaton treats a stream.

use sha2::{Digest, Sha256};

use crate::symbol::{format_stream, Symbol};

/// Token stream with consecutive repeats collapsed, as space-separated letters
pub fn canonical_form(tokens: &[Symbol]) -> String {
    let mut collapsed = tokens.to_vec();
    collapsed.dedup();
    format_stream(&collapsed)
}

/// Hex-encoded SHA-256 of the canonical form
pub fn fingerprint(tokens: &[Symbol]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(tokens).as_bytes());
    format!("{:x}", hasher.finalize())
}
