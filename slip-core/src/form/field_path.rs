//! Get/set over a [`FieldGroup`] by ordered key path.
//!
//! `set` never touches its input: it returns a modified copy, so a caller
//! holding the previous state (for example an in-flight submit snapshot)
//! keeps seeing the old values.

use thiserror::Error;

use super::{FieldGroup, FieldValue, PathFault};

/// Full key path of a leaf, as produced by [`leaf_paths`].
pub type LeafPath = Vec<&'static str>;

/// A [`PathFault`] annotated with the dotted path that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{path}': {fault}")]
pub struct PathError {
    pub path: String,
    #[source]
    pub fault: PathFault,
}

impl PathError {
    fn new(
        path: &[&str],
        fault: PathFault,
    ) -> Self {
        Self {
            path: join(path),
            fault,
        }
    }
}

/// Splits a dotted path (`"partyDetails.sender.senderName"`) into segments.
///
/// Blank segments are dropped, so `"a..b"` and `" a.b "` both yield `["a", "b"]`.
pub fn parse(dotted: &str) -> Vec<&str> {
    dotted
        .split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Joins segments back into dotted form.
pub fn join(path: &[&str]) -> String {
    path.join(".")
}

/// Reads the value at `path`.
pub fn get<F: FieldGroup>(
    state: &F,
    path: &[&str],
) -> Result<FieldValue, PathError> {
    if path.is_empty() {
        return Err(PathError::new(path, PathFault::Empty));
    }
    state
        .get_field(path)
        .map_err(|fault| PathError::new(path, fault))
}

/// Returns a copy of `state` with `value` written at `path`.
///
/// Every group along the path must already exist; form types guarantee
/// that through their `Default` impls, so a failure here means the path
/// itself is wrong.
pub fn set<F: FieldGroup + Clone>(
    state: &F,
    path: &[&str],
    value: FieldValue,
) -> Result<F, PathError> {
    if path.is_empty() {
        return Err(PathError::new(path, PathFault::Empty));
    }
    let mut next = state.clone();
    next.set_field(path, value)
        .map_err(|fault| PathError::new(path, fault))?;
    Ok(next)
}

/// Every leaf path in `state`, depth-first in declaration order.
pub fn leaf_paths<F: FieldGroup>(state: &F) -> Vec<LeafPath> {
    let mut out = Vec::new();
    state.collect_leaves(&mut Vec::new(), &mut out);
    out
}
