//! Derived totals and balances.
//!
//! # Rules
//!
//! | Output     | Computation                                                        |
//! |------------|--------------------------------------------------------------------|
//! | subtotal   | Σ charges, each blank/invalid/negative charge counting as 0        |
//! | taxAmount  | 0 for the "No Tax" sentinel, else subtotal × rate / 100             |
//! | total      | subtotal + taxAmount, rounded to a whole number when roundOff is set |
//! | balance    | primary − advance, formatted with two decimals                      |
//!
//! `roundOff` is an input the user toggles; it is never written here.
//!
//! All arithmetic is checked. A computation that would leave [`Decimal`]'s
//! range yields zeros and a warning instead of a panic; text inputs are
//! capped at [`MAX_AMOUNT`](super::common::MAX_AMOUNT), so only
//! out-of-range stored amounts can get there.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use slip_core::calculations::compute_totals;
//!
//! let totals = compute_totals(&[dec!(500), dec!(0), dec!(0)], Some(dec!(18.0)), true).unwrap();
//!
//! assert_eq!(totals.subtotal, dec!(500));
//! assert_eq!(totals.tax_amount, dec!(90));
//! assert_eq!(totals.total, dec!(590));
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::common::{format_fixed, parse_number_or_zero, round_to_whole};
use crate::form::{FieldGroup, FieldValue, PathError, field_path};
use crate::models::TaxRate;

/// A path fixed at compile time, e.g. `&["billingDetails", "total"]`.
pub type StaticPath = &'static [&'static str];

/// The totals computed from one charge set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub round_off: bool,
    pub total: Decimal,
}

impl DerivedTotals {
    fn zero(round_off: bool) -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            round_off,
            total: Decimal::ZERO,
        }
    }
}

/// Computes subtotal, tax and total from already-coerced charges.
///
/// `rate_percent` is `None` when no tax applies. Returns `None` if any
/// step overflows.
pub fn compute_totals(
    charges: &[Decimal],
    rate_percent: Option<Decimal>,
    round_off: bool,
) -> Option<DerivedTotals> {
    let subtotal = charges
        .iter()
        .try_fold(Decimal::ZERO, |sum, charge| sum.checked_add(*charge))?;
    let tax_amount = match rate_percent {
        Some(rate) => subtotal
            .checked_mul(rate)?
            .checked_div(Decimal::ONE_HUNDRED)?,
        None => Decimal::ZERO,
    };
    let gross = subtotal.checked_add(tax_amount)?;
    let total = if round_off { round_to_whole(gross) } else { gross };

    Some(DerivedTotals {
        subtotal,
        tax_amount,
        round_off,
        total,
    })
}

/// `primary - advance` as a two-decimal string, `None` on overflow.
///
/// ```
/// use rust_decimal_macros::dec;
/// use slip_core::calculations::compute_balance;
///
/// assert_eq!(compute_balance(dec!(1000), dec!(250)).as_deref(), Some("750.00"));
/// ```
pub fn compute_balance(
    primary: Decimal,
    advance: Decimal,
) -> Option<String> {
    format_fixed(primary.checked_sub(advance)?, 2)
}

/// Binds [`compute_totals`] to form paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsRule {
    pub charges: Vec<StaticPath>,
    pub tax_rate: StaticPath,
    pub round_off: StaticPath,
    pub subtotal: StaticPath,
    pub tax_amount: StaticPath,
    pub total: StaticPath,
}

impl TotalsRule {
    fn inputs(&self) -> impl Iterator<Item = StaticPath> + '_ {
        self.charges
            .iter()
            .copied()
            .chain([self.tax_rate, self.round_off])
    }

    fn outputs(&self) -> [StaticPath; 3] {
        [self.subtotal, self.tax_amount, self.total]
    }
}

/// Binds [`compute_balance`] to form paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRule {
    pub primary: StaticPath,
    pub advance: StaticPath,
    pub balance: StaticPath,
}

/// The set of derivations for one document kind.
///
/// Totals rules run before balance rules, so a balance may take a computed
/// total as its primary amount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calculator {
    totals: Vec<TotalsRule>,
    balances: Vec<BalanceRule>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_totals(
        mut self,
        rule: TotalsRule,
    ) -> Self {
        self.totals.push(rule);
        self
    }

    pub fn with_balance(
        mut self,
        rule: BalanceRule,
    ) -> Self {
        self.balances.push(rule);
        self
    }

    /// True if writing `path` can change a derived value.
    pub fn is_input(
        &self,
        path: &[&str],
    ) -> bool {
        self.totals
            .iter()
            .flat_map(|t| t.inputs())
            .chain(self.balances.iter().flat_map(|b| [b.primary, b.advance]))
            .any(|input| input == path)
    }

    /// True if `path` is written by a rule and must not be edited by hand.
    pub fn is_output(
        &self,
        path: &[&str],
    ) -> bool {
        self.totals
            .iter()
            .flat_map(|t| t.outputs())
            .chain(self.balances.iter().map(|b| b.balance))
            .any(|output| output == path)
    }

    /// Every path any rule reads or writes.
    pub fn paths(&self) -> Vec<StaticPath> {
        let mut paths: Vec<StaticPath> = self
            .totals
            .iter()
            .flat_map(|t| t.inputs().chain(t.outputs()).collect::<Vec<_>>())
            .collect();
        for b in &self.balances {
            paths.extend([b.primary, b.advance, b.balance]);
        }
        paths
    }

    /// Returns a copy of `state` with every derived field recomputed.
    ///
    /// Running it twice yields the same state as running it once.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if a rule names a path the form does not have.
    pub fn recompute<F: FieldGroup + Clone>(
        &self,
        state: &F,
    ) -> Result<F, PathError> {
        let mut next = state.clone();

        for rule in &self.totals {
            let totals = self.read_totals(&next, rule)?;
            debug!(
                subtotal = %totals.subtotal,
                tax_amount = %totals.tax_amount,
                total = %totals.total,
                round_off = totals.round_off,
                "recomputed totals"
            );
            next = field_path::set(&next, rule.subtotal, FieldValue::Amount(totals.subtotal))?;
            next = field_path::set(&next, rule.tax_amount, FieldValue::Amount(totals.tax_amount))?;
            next = field_path::set(&next, rule.total, FieldValue::Amount(totals.total))?;
        }

        for rule in &self.balances {
            let primary = numeric(&field_path::get(&next, rule.primary)?);
            let advance = numeric(&field_path::get(&next, rule.advance)?);
            let balance = compute_balance(primary, advance).unwrap_or_else(|| {
                warn!(%primary, %advance, "balance out of range; writing zero");
                ZERO_BALANCE.to_string()
            });
            debug!(%primary, %advance, %balance, "recomputed balance");
            next = field_path::set(&next, rule.balance, FieldValue::Text(balance))?;
        }

        Ok(next)
    }

    /// The totals each rule would produce for `state`, without writing them.
    pub fn totals<F: FieldGroup>(
        &self,
        state: &F,
    ) -> Result<Vec<DerivedTotals>, PathError> {
        self.totals
            .iter()
            .map(|rule| self.read_totals(state, rule))
            .collect()
    }

    fn read_totals<F: FieldGroup>(
        &self,
        state: &F,
        rule: &TotalsRule,
    ) -> Result<DerivedTotals, PathError> {
        let charges = rule
            .charges
            .iter()
            .map(|path| field_path::get(state, path).map(|v| numeric(&v)))
            .collect::<Result<Vec<_>, _>>()?;

        let label = field_path::get(state, rule.tax_rate)?.to_string();
        let rate = match TaxRate::new(label).percent() {
            Ok(rate) => rate,
            Err(error) => {
                warn!(%error, "treating tax rate as zero");
                None
            }
        };

        let round_off = field_path::get(state, rule.round_off)?
            .as_flag()
            .unwrap_or(false);

        Ok(compute_totals(&charges, rate, round_off).unwrap_or_else(|| {
            warn!(?charges, ?rate, "totals out of range; writing zeros");
            DerivedTotals::zero(round_off)
        }))
    }
}

const ZERO_BALANCE: &str = "0.00";

/// Numeric reading of any leaf: text is coerced, flags count as 0.
fn numeric(value: &FieldValue) -> Decimal {
    match value {
        FieldValue::Text(s) => parse_number_or_zero(s),
        FieldValue::Amount(d) => *d,
        FieldValue::Flag(_) => Decimal::ZERO,
    }
}
