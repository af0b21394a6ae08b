//! Derived-field computation for the document wizards.
//!
//! The pure arithmetic lives in [`common`] and in the `compute_*` functions
//! of [`derived`]; [`Calculator`] binds those functions to form paths so the
//! same engine serves every document kind.

pub mod common;
pub mod derived;

pub use derived::{
    BalanceRule, Calculator, DerivedTotals, StaticPath, TotalsRule, compute_balance, compute_totals,
};
