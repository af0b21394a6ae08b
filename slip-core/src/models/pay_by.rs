use std::fmt;

use serde::Serialize;

use crate::form::{FieldLeaf, FieldValue, LeafKind, PathFault};

/// Who settles a charge at the point of loading or delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PayBy {
    #[default]
    Company,
    Driver,
}

impl PayBy {
    pub const ALLOWED: &'static str = "Company, Driver";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Driver => "Driver",
        }
    }

    /// Case-insensitive parse of the selector label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "company" => Some(Self::Company),
            "driver" => Some(Self::Driver),
            _ => None,
        }
    }
}

impl fmt::Display for PayBy {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldLeaf for PayBy {
    fn to_value(&self) -> FieldValue {
        FieldValue::text(self.as_str())
    }

    fn from_value(value: FieldValue) -> Result<Self, PathFault> {
        match value {
            FieldValue::Text(s) => Self::parse(&s).ok_or(PathFault::InvalidChoice {
                value: s,
                allowed: Self::ALLOWED,
            }),
            other => Err(PathFault::KindMismatch {
                expected: LeafKind::Text,
                found: other.kind(),
            }),
        }
    }
}
