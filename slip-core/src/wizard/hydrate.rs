//! Builds a form record from a persisted document.
//!
//! Persisted documents are loose JSON: numbers may arrive where the form
//! keeps text, dates arrive as ISO timestamps, and whole groups may be
//! missing. Hydration starts from the form's `Default` and fills in every
//! leaf the document supplies, so the result always has the full shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::StaticPath;
use crate::calculations::common::parse_amount;
use crate::form::{FieldGroup, FieldValue, LeafKind, PathError, PathFault, field_path};

/// Canonical stored date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_INPUTS: [&str; 3] = [DATE_FORMAT, "%d/%m/%Y", "%d-%m-%Y"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydrationError {
    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("required field '{0}' is missing or blank")]
    MissingField(String),

    #[error("field '{path}' holds an unreadable date: {value}")]
    InvalidDate { path: String, value: String },

    #[error("field '{path}' expects a {expected} value, found {found}")]
    UnexpectedType {
        path: String,
        expected: LeafKind,
        found: &'static str,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Per-kind hydration rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationPlan {
    /// Leaves normalized to `YYYY-MM-DD`.
    pub dates: Vec<StaticPath>,
    /// Leaves that must be present and non-blank.
    pub required: Vec<StaticPath>,
}

/// Maps `document` onto a fresh `F`.
///
/// Missing or `null` leaves keep their default. Unknown keys in the
/// document are ignored.
///
/// # Errors
///
/// See [`HydrationError`]; a document that fails any rule is rejected as
/// a whole.
pub fn hydrate<F: FieldGroup + Default>(
    document: &Value,
    plan: &HydrationPlan,
) -> Result<F, HydrationError> {
    if !document.is_object() {
        return Err(HydrationError::NotAnObject);
    }

    let mut form = F::default();
    for path in field_path::leaf_paths(&form) {
        let Some(raw) = lookup(document, &path) else {
            continue;
        };
        let current = field_path::get(&form, &path)?;
        let is_date = plan.dates.iter().any(|d| *d == path.as_slice());
        let value = if is_date {
            FieldValue::Text(date_value(&path, raw)?)
        } else {
            coerce(&path, raw, current.kind())?
        };

        match form.set_field(&path, value) {
            Ok(()) => {}
            Err(PathFault::InvalidChoice { value, allowed }) => {
                warn!(
                    path = %field_path::join(&path),
                    %value,
                    allowed,
                    "unknown choice in stored document, keeping default"
                );
            }
            Err(fault) => {
                return Err(PathError {
                    path: field_path::join(&path),
                    fault,
                }
                .into());
            }
        }
    }

    for path in &plan.required {
        let value = field_path::get(&form, path)?;
        if value.to_string().trim().is_empty() {
            return Err(HydrationError::MissingField(field_path::join(path)));
        }
    }

    debug!("hydrated form from stored document");
    Ok(form)
}

/// Converts a stored date into `YYYY-MM-DD`.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps,
/// `YYYY-MM-DD`, `DD/MM/YYYY`, `DD-MM-YYYY`, epoch milliseconds, and the
/// extended-JSON wrapper `{"$date": ...}`. Returns `None` for anything
/// else.
pub fn normalize_date(raw: &Value) -> Option<String> {
    let date = match raw {
        Value::String(s) => parse_date_text(s.trim())?,
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?)?.date_naive(),
        Value::Object(map) => return map.get("$date").and_then(normalize_date),
        _ => return None,
    };
    Some(date.format(DATE_FORMAT).to_string())
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    DATE_INPUTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn date_value(
    path: &[&str],
    raw: &Value,
) -> Result<String, HydrationError> {
    if raw.as_str().is_some_and(|s| s.trim().is_empty()) {
        return Ok(String::new());
    }
    normalize_date(raw).ok_or_else(|| HydrationError::InvalidDate {
        path: field_path::join(path),
        value: raw.to_string(),
    })
}

fn coerce(
    path: &[&str],
    raw: &Value,
    kind: LeafKind,
) -> Result<FieldValue, HydrationError> {
    let value = match (kind, raw) {
        (LeafKind::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
        (LeafKind::Text, Value::Number(n)) => Some(FieldValue::Text(n.to_string())),
        (LeafKind::Text, Value::Bool(b)) => Some(FieldValue::Text(b.to_string())),

        (LeafKind::Flag, Value::Bool(b)) => Some(FieldValue::Flag(*b)),
        (LeafKind::Flag, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(FieldValue::Flag(true)),
            "false" | "no" | "0" | "" => Some(FieldValue::Flag(false)),
            _ => None,
        },
        (LeafKind::Flag, Value::Number(n)) => Some(FieldValue::Flag(n.as_f64() != Some(0.0))),

        // Stored totals are recomputed after hydration, so an unreadable
        // amount only needs to be well-typed.
        (LeafKind::Amount, Value::Number(n)) => Some(FieldValue::Amount(
            parse_amount(&n.to_string()).unwrap_or(Decimal::ZERO),
        )),
        (LeafKind::Amount, Value::String(s)) => Some(FieldValue::Amount(
            parse_amount(s).unwrap_or(Decimal::ZERO),
        )),
        _ => None,
    };

    value.ok_or_else(|| HydrationError::UnexpectedType {
        path: field_path::join(path),
        expected: kind,
        found: json_type(raw),
    })
}

fn lookup<'v>(
    document: &'v Value,
    path: &[&str],
) -> Option<&'v Value> {
    let value = path
        .iter()
        .try_fold(document, |node, key| node.get(key))?;
    (!value.is_null()).then_some(value)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::models::PayBy;

    #[derive(Debug, Clone, Default, PartialEq, crate::form::FieldGroup)]
    struct Trip {
        slip_no: String,
        date: String,
        packages: String,
        round_off: bool,
        total: Decimal,
        paid_by: PayBy,
    }

    #[derive(Debug, Clone, Default, PartialEq, crate::form::FieldGroup)]
    struct Doc {
        #[field(nested)]
        trip: Trip,
    }

    fn plan() -> HydrationPlan {
        HydrationPlan {
            dates: vec![&["trip", "date"]],
            required: vec![&["trip", "slipNo"]],
        }
    }

    #[test]
    fn fills_leaves_and_keeps_defaults_for_missing_ones() {
        let doc = json!({
            "_id": "abc",
            "trip": {
                "slipNo": "DS-7",
                "date": "2024-03-05T10:30:00.000Z",
                "packages": 12,
                "roundOff": true,
                "total": "590.5",
                "paidBy": "Driver"
            }
        });

        let form: Doc = hydrate(&doc, &plan()).unwrap();

        assert_eq!(
            form.trip,
            Trip {
                slip_no: "DS-7".to_string(),
                date: "2024-03-05".to_string(),
                packages: "12".to_string(),
                round_off: true,
                total: dec!(590.5),
                paid_by: PayBy::Driver,
            }
        );
    }

    #[test]
    fn missing_group_yields_defaults() {
        let doc = json!({ "trip": { "slipNo": "DS-1" } });

        let form: Doc = hydrate(&doc, &plan()).unwrap();

        assert_eq!(form.trip.date, "");
        assert_eq!(form.trip.paid_by, PayBy::Company);
        assert!(!form.trip.round_off);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert_eq!(
            hydrate::<Doc>(&json!([1, 2]), &plan()),
            Err(HydrationError::NotAnObject)
        );
    }

    #[test]
    fn rejects_blank_required_id() {
        let doc = json!({ "trip": { "slipNo": "  " } });

        assert_eq!(
            hydrate::<Doc>(&doc, &plan()),
            Err(HydrationError::MissingField("trip.slipNo".to_string()))
        );
    }

    #[test]
    fn rejects_unreadable_dates() {
        let doc = json!({ "trip": { "slipNo": "DS-1", "date": "next tuesday" } });

        let err = hydrate::<Doc>(&doc, &plan()).unwrap_err();

        assert!(matches!(err, HydrationError::InvalidDate { ref path, .. } if path == "trip.date"));
    }

    #[test]
    fn rejects_structured_values_at_text_leaves() {
        let doc = json!({ "trip": { "slipNo": { "value": "DS-1" } } });

        let err = hydrate::<Doc>(&doc, &plan()).unwrap_err();

        assert_eq!(
            err,
            HydrationError::UnexpectedType {
                path: "trip.slipNo".to_string(),
                expected: LeafKind::Text,
                found: "object",
            }
        );
    }

    #[test]
    fn unknown_choice_keeps_default() {
        let doc = json!({ "trip": { "slipNo": "DS-1", "paidBy": "Broker" } });

        let form: Doc = hydrate(&doc, &plan()).unwrap();

        assert_eq!(form.trip.paid_by, PayBy::Company);
    }

    #[test]
    fn normalize_date_accepts_common_shapes() {
        assert_eq!(normalize_date(&json!("2024-03-05")).as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date(&json!("05/03/2024")).as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date(&json!("05-03-2024")).as_deref(), Some("2024-03-05"));
        assert_eq!(
            normalize_date(&json!("2024-03-05T23:10:00+05:30")).as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(
            normalize_date(&json!("2024-03-05T08:00:00")).as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(
            normalize_date(&json!(1_709_596_800_000_i64)).as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(
            normalize_date(&json!({ "$date": "2024-03-05T00:00:00Z" })).as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(normalize_date(&json!("31/02/2024")), None);
        assert_eq!(normalize_date(&json!(true)), None);
    }
}
