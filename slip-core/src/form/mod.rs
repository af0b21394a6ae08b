//! Typed access to nested form records by key path.
//!
//! Form structs derive [`FieldGroup`] (see `slip_form_derive`), which maps
//! each camelCase key onto either a nested group or a [`FieldLeaf`]. The free
//! functions in [`field_path`] are the entry points used by the wizard and
//! the calculator; the trait methods are the per-level plumbing the derive
//! generates.

pub mod error_tree;
pub mod field_path;

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

pub use error_tree::{ErrorNode, ErrorTree};
pub use field_path::{LeafPath, PathError};
pub use slip_form_derive::FieldGroup;

/// The shape of a value stored at a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Text,
    Flag,
    Amount,
}

impl fmt::Display for LeafKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Flag => f.write_str("flag"),
            Self::Amount => f.write_str("amount"),
        }
    }
}

/// A value read from or written to a form leaf.
///
/// User input is always `Text` (the literal contents of the input box);
/// `Amount` only appears at calculator outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Amount(Decimal),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn kind(&self) -> LeafKind {
        match self {
            Self::Text(_) => LeafKind::Text,
            Self::Flag(_) => LeafKind::Flag,
            Self::Amount(_) => LeafKind::Amount,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Amount(d) => write!(f, "{d}"),
        }
    }
}

/// Why a single path lookup or write failed, independent of the full path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathFault {
    #[error("path is empty")]
    Empty,

    #[error("no field named '{0}'")]
    UnknownKey(String),

    #[error("path continues past a value at '{0}'")]
    NotAGroup(String),

    #[error("path ends at a group, not a value")]
    NotALeaf,

    #[error("expected a {expected} value, got {found}")]
    KindMismatch { expected: LeafKind, found: LeafKind },

    #[error("'{value}' is not one of: {allowed}")]
    InvalidChoice {
        value: String,
        allowed: &'static str,
    },
}

/// A terminal value type that can live at a form leaf.
pub trait FieldLeaf: Sized {
    fn to_value(&self) -> FieldValue;

    fn from_value(value: FieldValue) -> Result<Self, PathFault>;
}

impl FieldLeaf for String {
    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_value(value: FieldValue) -> Result<Self, PathFault> {
        match value {
            FieldValue::Text(s) => Ok(s),
            other => Err(PathFault::KindMismatch {
                expected: LeafKind::Text,
                found: other.kind(),
            }),
        }
    }
}

impl FieldLeaf for bool {
    fn to_value(&self) -> FieldValue {
        FieldValue::Flag(*self)
    }

    fn from_value(value: FieldValue) -> Result<Self, PathFault> {
        match value {
            FieldValue::Flag(b) => Ok(b),
            other => Err(PathFault::KindMismatch {
                expected: LeafKind::Flag,
                found: other.kind(),
            }),
        }
    }
}

impl FieldLeaf for Decimal {
    fn to_value(&self) -> FieldValue {
        FieldValue::Amount(*self)
    }

    fn from_value(value: FieldValue) -> Result<Self, PathFault> {
        match value {
            FieldValue::Amount(d) => Ok(d),
            other => Err(PathFault::KindMismatch {
                expected: LeafKind::Amount,
                found: other.kind(),
            }),
        }
    }
}

/// A nested record addressable by key path.
///
/// Implemented by `#[derive(FieldGroup)]`; hand implementations are only
/// needed for types with non-field structure.
pub trait FieldGroup {
    /// Keys at this level, in declaration order.
    const KEYS: &'static [&'static str];

    /// Reads the leaf at `path`, relative to this group.
    fn get_field(
        &self,
        path: &[&str],
    ) -> Result<FieldValue, PathFault>;

    /// Writes the leaf at `path`, relative to this group.
    fn set_field(
        &mut self,
        path: &[&str],
        value: FieldValue,
    ) -> Result<(), PathFault>;

    /// Appends the path of every leaf under this group to `out`.
    fn collect_leaves(
        &self,
        prefix: &mut Vec<&'static str>,
        out: &mut Vec<LeafPath>,
    );
}

/// Reads a leaf reached by the derive; `rest` must be empty.
pub fn get_leaf<T: FieldLeaf>(
    leaf: &T,
    rest: &[&str],
) -> Result<FieldValue, PathFault> {
    match rest.first() {
        None => Ok(leaf.to_value()),
        Some(next) => Err(PathFault::NotAGroup((*next).to_string())),
    }
}

/// Writes a leaf reached by the derive; `rest` must be empty.
pub fn set_leaf<T: FieldLeaf>(
    leaf: &mut T,
    rest: &[&str],
    value: FieldValue,
) -> Result<(), PathFault> {
    if let Some(next) = rest.first() {
        return Err(PathFault::NotAGroup((*next).to_string()));
    }
    *leaf = T::from_value(value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn string_leaf_rejects_flag() {
        let result = String::from_value(FieldValue::Flag(true));

        assert_eq!(
            result,
            Err(PathFault::KindMismatch {
                expected: LeafKind::Text,
                found: LeafKind::Flag,
            })
        );
    }

    #[test]
    fn decimal_leaf_round_trips_amount() {
        let value = dec!(12.50).to_value();

        assert_eq!(Decimal::from_value(value), Ok(dec!(12.50)));
    }

    #[test]
    fn get_leaf_rejects_trailing_segments() {
        let leaf = String::from("Pune");

        let result = get_leaf(&leaf, &["city"]);

        assert_eq!(result, Err(PathFault::NotAGroup("city".to_string())));
    }

    #[test]
    fn set_leaf_replaces_value() {
        let mut leaf = false;

        set_leaf(&mut leaf, &[], FieldValue::Flag(true)).unwrap();

        assert!(leaf);
    }
}
