// src/layout/matcher.rs

//! Directory-name classification.
//!
//! Matching is case-insensitive and looks only at the final path component,
//! so it can be exercised against plain strings.

const RUNTIME_PREFIX: &str = "erl";
const SUPPORT_PREFIX: &str = "erts";
const BROKER_PREFIX: &str = "rabbit";
const DATA_NAME: &str = "data";

/// What a base-directory child is, judged by its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// `erl*`: the Erlang runtime root.
    Runtime,
    /// `rabbit*`: the broker distribution.
    Broker,
    /// exactly `data`.
    Data,
}

/// Classify an immediate child of the base directory. First match wins.
pub fn classify(name: &str) -> Option<EntryKind> {
    let lower = name.to_lowercase();
    if lower.starts_with(RUNTIME_PREFIX) {
        Some(EntryKind::Runtime)
    } else if lower.starts_with(BROKER_PREFIX) {
        Some(EntryKind::Broker)
    } else if lower == DATA_NAME {
        Some(EntryKind::Data)
    } else {
        None
    }
}

/// Whether a child of the runtime root is an `erts-*` directory.
pub fn is_support_dir(name: &str) -> bool {
    name.to_lowercase().starts_with(SUPPORT_PREFIX)
}
