//! Ordered step definitions and their validators.
//!
//! Each step owns a set of top-level form keys and a pure validator. The
//! [`Checker`] helper reads fields through the same key paths the error tree
//! uses, so a message always lands on the path the UI renders.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::calculations::common::{MAX_AMOUNT, parse_amount};
use crate::form::{ErrorTree, FieldGroup, field_path};

/// A pure validation function for one step.
pub type Validator<F> = fn(&F) -> ErrorTree;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step {index} does not exist (wizard has {count} steps)")]
pub struct StepOutOfRange {
    pub index: usize,
    pub count: usize,
}

/// One screen of a wizard.
pub struct StepDefinition<F> {
    index: usize,
    title: &'static str,
    fields_owned: &'static [&'static str],
    validate: Validator<F>,
}

impl<F> StepDefinition<F> {
    pub fn new(
        title: &'static str,
        fields_owned: &'static [&'static str],
        validate: Validator<F>,
    ) -> Self {
        Self {
            index: 0,
            title,
            fields_owned,
            validate,
        }
    }

    /// 1-based position, assigned by the registry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn fields_owned(&self) -> &'static [&'static str] {
        self.fields_owned
    }

    /// True if `path` starts with a key this step owns.
    pub fn owns(
        &self,
        path: &[&str],
    ) -> bool {
        path.first()
            .is_some_and(|head| self.fields_owned.contains(head))
    }

    pub fn validate(
        &self,
        state: &F,
    ) -> ErrorTree {
        (self.validate)(state)
    }
}

/// Outcome of validating every step at once.
///
/// Only failing steps are recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    steps: BTreeMap<usize, ErrorTree>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn invalid_steps(&self) -> Vec<usize> {
        self.steps.keys().copied().collect()
    }

    pub fn first_invalid_step(&self) -> Option<usize> {
        self.steps.keys().next().copied()
    }

    pub fn errors_for(
        &self,
        step: usize,
    ) -> Option<&ErrorTree> {
        self.steps.get(&step)
    }

    /// All step trees merged into one.
    pub fn combined(&self) -> ErrorTree {
        let mut all = ErrorTree::new();
        for tree in self.steps.values() {
            all.merge(tree.clone());
        }
        all
    }
}

/// The statically ordered steps of one wizard.
pub struct StepRegistry<F> {
    steps: Vec<StepDefinition<F>>,
}

impl<F> StepRegistry<F> {
    /// Numbers the steps 1..=N in the order given.
    pub fn new(steps: Vec<StepDefinition<F>>) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| StepDefinition { index: i + 1, ..step })
            .collect();
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition<F>> {
        self.steps.iter()
    }

    pub fn step_at(
        &self,
        index: usize,
    ) -> Result<&StepDefinition<F>, StepOutOfRange> {
        index
            .checked_sub(1)
            .and_then(|i| self.steps.get(i))
            .ok_or(StepOutOfRange {
                index,
                count: self.steps.len(),
            })
    }

    pub fn validate(
        &self,
        index: usize,
        state: &F,
    ) -> Result<ErrorTree, StepOutOfRange> {
        Ok(self.step_at(index)?.validate(state))
    }

    /// Validates every step regardless of which one is displayed.
    pub fn validate_all(
        &self,
        state: &F,
    ) -> ValidationReport {
        let steps = self
            .steps
            .iter()
            .map(|step| (step.index, step.validate(state)))
            .filter(|(_, tree)| !tree.is_empty())
            .collect();
        ValidationReport { steps }
    }

    /// The step that owns the top-level key of `path`.
    pub fn step_owning(
        &self,
        path: &[&str],
    ) -> Option<&StepDefinition<F>> {
        self.steps.iter().find(|step| step.owns(path))
    }
}

fn number_error(
    text: &str,
    label: &str,
) -> Option<String> {
    match parse_amount(text) {
        Some(value) if value.is_sign_negative() && !value.is_zero() => {
            Some(format!("{label} must be a non-negative number"))
        }
        Some(value) if value > MAX_AMOUNT => {
            Some(format!("{label} must not exceed {MAX_AMOUNT}"))
        }
        Some(_) => None,
        None => Some(format!("{label} must be a non-negative number")),
    }
}

/// Accumulates field errors for one validator run.
pub struct Checker<'a, F> {
    state: &'a F,
    errors: ErrorTree,
}

impl<'a, F: FieldGroup> Checker<'a, F> {
    pub fn new(state: &'a F) -> Self {
        Self {
            state,
            errors: ErrorTree::new(),
        }
    }

    /// Error if the trimmed text at `path` is empty.
    pub fn required_text(
        &mut self,
        path: &[&str],
        label: &str,
    ) -> &mut Self {
        if let Some(text) = self.read(path) {
            if text.trim().is_empty() {
                self.errors.insert(path, format!("{label} is required"));
            }
        }
        self
    }

    /// Error if the text at `path` is blank or not a non-negative number.
    pub fn required_number(
        &mut self,
        path: &[&str],
        label: &str,
    ) -> &mut Self {
        if let Some(text) = self.read(path) {
            if text.trim().is_empty() {
                self.errors.insert(path, format!("{label} is required"));
            } else if let Some(message) = number_error(&text, label) {
                self.errors.insert(path, message);
            }
        }
        self
    }

    /// Like [`Checker::required_number`], but blank input is accepted.
    pub fn optional_number(
        &mut self,
        path: &[&str],
        label: &str,
    ) -> &mut Self {
        if let Some(text) = self.read(path) {
            if text.trim().is_empty() {
                return self;
            }
            if let Some(message) = number_error(&text, label) {
                self.errors.insert(path, message);
            }
        }
        self
    }

    pub fn finish(self) -> ErrorTree {
        self.errors
    }

    fn read(
        &mut self,
        path: &[&str],
    ) -> Option<String> {
        match field_path::get(self.state, path) {
            Ok(value) => Some(value.to_string()),
            Err(err) => {
                error!(%err, "validator references a missing field");
                self.errors.insert(path, "Unknown field");
                None
            }
        }
    }
}
