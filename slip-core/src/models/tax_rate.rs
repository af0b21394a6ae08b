use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::form::{FieldLeaf, FieldValue, LeafKind, PathFault};

static PERCENT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*%\s*$").expect("tax-rate label pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized tax rate '{0}'")]
pub struct TaxRateError(pub String);

/// The tax-rate selector, stored as the label the user picked.
///
/// The label is kept verbatim so that a persisted document round-trips;
/// the percentage is only extracted when totals are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaxRate(String);

impl TaxRate {
    /// Sentinel label meaning no tax applies.
    pub const NO_TAX: &'static str = "No Tax";

    /// Labels offered by the selector.
    pub const OPTIONS: [&'static str; 5] = [Self::NO_TAX, "5.0%", "12.0%", "18.0%", "28.0%"];

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn none() -> Self {
        Self::new(Self::NO_TAX)
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// True for the sentinel (or a blank label).
    pub fn is_none(&self) -> bool {
        let label = self.0.trim();
        label.is_empty() || label.eq_ignore_ascii_case(Self::NO_TAX)
    }

    /// The rate in percent, `None` for the sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError`] when the label is neither the sentinel nor
    /// of the form `<number>%`, or when the rate exceeds 100%.
    pub fn percent(&self) -> Result<Option<Decimal>, TaxRateError> {
        if self.is_none() {
            return Ok(None);
        }
        PERCENT_LABEL
            .captures(&self.0)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<Decimal>().ok())
            .filter(|rate| *rate <= Decimal::ONE_HUNDRED)
            .map(Some)
            .ok_or_else(|| TaxRateError(self.0.clone()))
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FieldLeaf for TaxRate {
    fn to_value(&self) -> FieldValue {
        FieldValue::text(self.0.clone())
    }

    fn from_value(value: FieldValue) -> Result<Self, PathFault> {
        match value {
            FieldValue::Text(label) => Ok(Self(label)),
            other => Err(PathFault::KindMismatch {
                expected: LeafKind::Text,
                found: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn sentinel_has_no_percent() {
        assert_eq!(TaxRate::none().percent(), Ok(None));
        assert_eq!(TaxRate::new("no tax").percent(), Ok(None));
        assert_eq!(TaxRate::new("").percent(), Ok(None));
    }

    #[test]
    fn percent_parses_offered_labels() {
        assert_eq!(TaxRate::new("18.0%").percent(), Ok(Some(dec!(18.0))));
        assert_eq!(TaxRate::new("5 %").percent(), Ok(Some(dec!(5))));
        assert_eq!(TaxRate::new("12%").percent(), Ok(Some(dec!(12))));
    }

    #[test]
    fn percent_rejects_free_text() {
        assert_eq!(
            TaxRate::new("GST").percent(),
            Err(TaxRateError("GST".to_string()))
        );
    }

    #[test]
    fn percent_rejects_rates_above_one_hundred() {
        assert_eq!(TaxRate::new("100%").percent(), Ok(Some(dec!(100))));
        assert!(TaxRate::new("100.5%").percent().is_err());
        assert!(TaxRate::new("79228162514264337593543950335%").percent().is_err());
    }

    #[test]
    fn every_offered_option_parses() {
        for label in TaxRate::OPTIONS {
            assert!(TaxRate::new(label).percent().is_ok(), "{label}");
        }
    }
}
