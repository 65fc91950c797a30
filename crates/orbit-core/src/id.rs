//! Identifier allocation and prefix resolution.
//!
//! Two ID schemes coexist:
//!
//! - **Sequential** (`NOT-<n>`, `TSK-<n>`): human-readable and ordered, but
//!   allocating one needs a replay to learn the current counter. Two writers
//!   replaying concurrently can allocate the same ID.
//! - **Random** (inbox messages): 16 hex characters generated locally, no
//!   replay needed.

use crate::error::StoreError;

/// Prefix for note IDs.
pub const NOTE_PREFIX: &str = "NOT";

/// Prefix for task IDs.
pub const TASK_PREFIX: &str = "TSK";

/// Shortest candidate accepted by [`resolve_prefix`].
pub const MIN_PREFIX_LEN: usize = 8;

/// Length of IDs produced by [`random_id`].
pub const RANDOM_ID_LEN: usize = 16;

/// The ID following `counter` in the `prefix` sequence.
#[must_use]
pub fn sequential_id(prefix: &str, counter: u64) -> String {
    format!("{prefix}-{}", counter + 1)
}

/// Extract `n` from `<prefix>-<n>`.
///
/// Returns `None` for other prefixes, leading zeros, or non-numeric tails.
#[must_use]
pub fn parse_sequence(prefix: &str, id: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}

/// A fresh random identifier of [`RANDOM_ID_LEN`] lowercase hex characters.
#[must_use]
pub fn random_id() -> String {
    let value: u64 = rand::random();
    format!("{value:016x}")
}

/// Resolve a caller-supplied ID or prefix against the known full IDs.
///
/// An exact match always wins. Otherwise the candidate must be a prefix of
/// exactly one ID. This is a linear scan.
///
/// # Errors
///
/// - [`StoreError::Validation`] if `candidate` is shorter than
///   [`MIN_PREFIX_LEN`] characters.
/// - [`StoreError::NotFound`] if nothing matches.
/// - [`StoreError::Ambiguous`] if two or more IDs share the prefix.
pub fn resolve_prefix<'a, I>(kind: &'static str, candidate: &str, ids: I) -> Result<String, StoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    if candidate.chars().count() < MIN_PREFIX_LEN {
        return Err(StoreError::validation(
            "id",
            format!(
                "'{candidate}' is too short; use at least {MIN_PREFIX_LEN} characters"
            ),
        ));
    }

    let mut matches = Vec::new();
    for id in ids {
        if id == candidate {
            return Ok(id.to_string());
        }
        if id.starts_with(candidate) {
            matches.push(id.to_string());
        }
    }

    match matches.len() {
        0 => Err(StoreError::not_found(kind, candidate)),
        1 => Ok(matches.remove(0)),
        _ => {
            matches.sort();
            Err(StoreError::Ambiguous {
                kind,
                prefix: candidate.to_string(),
                matches,
            })
        }
    }
}
