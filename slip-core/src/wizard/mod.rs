//! The multi-step form state machine.
//!
//! A [`Wizard`] holds one document being created or edited. Forward
//! navigation is gated by the current step's validator; backward navigation
//! never validates. Submission validates every step, recomputes derived
//! fields, and hands a payload snapshot to a [`DocumentRepository`].
//!
//! Submission is split in two ([`Wizard::begin_submit`] and
//! [`Wizard::finish_submit`]) so that the repository call can run while the
//! wizard stays usable; a second submit during that window is ignored.

pub mod error;
pub mod hydrate;
pub mod steps;

use std::marker::PhantomData;
use std::mem;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::calculations::{Calculator, DerivedTotals};
use crate::db::{DocumentRepository, RepositoryError, StoredDocument};
use crate::documents::DocumentKind;
use crate::form::{ErrorTree, FieldValue, PathError, field_path};

pub use error::WizardError;
pub use hydrate::{HydrationError, HydrationPlan, hydrate, normalize_date};
pub use steps::{Checker, StepDefinition, StepOutOfRange, StepRegistry, ValidationReport, Validator};

/// Whether the wizard will create a new document or update an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit { id: String },
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { from: usize, to: usize },
    /// Already at the first or last step.
    Unchanged(usize),
    /// The step has validation errors; see [`Wizard::errors`].
    Blocked(usize),
}

/// User-facing notifications raised by the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    FixRequiredFields { step: usize },
    SubmitRejected { invalid_steps: Vec<usize> },
    SaveFailed { message: String },
    Saved { id: String },
}

/// A validated payload waiting to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmit {
    pub mode: WizardMode,
    pub payload: Value,
}

impl PendingSubmit {
    /// Creates or updates the document, depending on the mode.
    pub async fn send(
        &self,
        repo: &dyn DocumentRepository,
    ) -> Result<StoredDocument, RepositoryError> {
        match &self.mode {
            WizardMode::Create => repo.create(&self.payload).await,
            WizardMode::Edit { id } => repo.update(id, &self.payload).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    Ready(PendingSubmit),
    Invalid(ValidationReport),
    /// A submit is already in flight; nothing was done.
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(StoredDocument),
    Invalid(ValidationReport),
    Ignored,
}

pub struct Wizard<K: DocumentKind> {
    mode: WizardMode,
    steps: StepRegistry<K::Form>,
    calculator: Calculator,
    current_step: usize,
    form: K::Form,
    errors: ErrorTree,
    submitting: bool,
    closed: bool,
    notices: Vec<Notice>,
    kind: PhantomData<K>,
}

impl<K: DocumentKind> Wizard<K> {
    /// A wizard for a new document, starting at step 1 with default values.
    pub fn create() -> Result<Self, WizardError> {
        Self::start(WizardMode::Create, K::Form::default())
    }

    /// A wizard for an existing document, hydrated from its stored JSON.
    pub fn edit(
        id: impl Into<String>,
        document: &Value,
    ) -> Result<Self, WizardError> {
        let form = hydrate::hydrate(document, &K::hydration_plan())?;
        Self::start(WizardMode::Edit { id: id.into() }, form)
    }

    /// Fetches `id` from `repo` and opens it for editing.
    #[instrument(skip(repo), fields(resource = repo.resource()))]
    pub async fn open(
        repo: &dyn DocumentRepository,
        id: &str,
    ) -> Result<Self, WizardError> {
        let stored = repo.get(id).await.inspect_err(|err| {
            error!(%err, "failed to fetch document");
        })?;
        Self::edit(stored.id, &stored.data)
    }

    fn start(
        mode: WizardMode,
        form: K::Form,
    ) -> Result<Self, WizardError> {
        let calculator = K::calculator();
        let form = calculator.recompute(&form)?;
        info!(kind = K::NAME, ?mode, "wizard opened");
        Ok(Self {
            mode,
            steps: K::steps(),
            calculator,
            current_step: 1,
            form,
            errors: ErrorTree::new(),
            submitting: false,
            closed: false,
            notices: Vec::new(),
            kind: PhantomData,
        })
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    /// 1-based index of the displayed step.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_title(&self) -> &'static str {
        self.steps
            .step_at(self.current_step)
            .map(StepDefinition::title)
            .unwrap_or_default()
    }

    pub fn steps(&self) -> &StepRegistry<K::Form> {
        &self.steps
    }

    pub fn form(&self) -> &K::Form {
        &self.form
    }

    pub fn errors(&self) -> &ErrorTree {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn field(
        &self,
        path: &[&str],
    ) -> Result<FieldValue, PathError> {
        field_path::get(&self.form, path)
    }

    /// Current totals, one per totals rule.
    pub fn totals(&self) -> Result<Vec<DerivedTotals>, PathError> {
        self.calculator.totals(&self.form)
    }

    /// Drains queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }

    /// Advances one step if the current step validates.
    pub fn next(&mut self) -> Result<NavOutcome, WizardError> {
        self.ensure_open()?;
        let from = self.current_step;
        let errors = self.steps.validate(from, &self.form)?;

        if !errors.is_empty() {
            warn!(step = from, errors = errors.len(), "step has validation errors");
            self.errors = errors;
            self.notices.push(Notice::FixRequiredFields { step: from });
            return Ok(NavOutcome::Blocked(from));
        }

        self.errors = ErrorTree::new();
        if from >= self.steps.len() {
            return Ok(NavOutcome::Unchanged(from));
        }
        self.current_step = from + 1;
        info!(from, to = self.current_step, "moved forward");
        Ok(NavOutcome::Moved {
            from,
            to: self.current_step,
        })
    }

    /// Goes back one step without validating.
    pub fn previous(&mut self) -> Result<NavOutcome, WizardError> {
        self.ensure_open()?;
        let from = self.current_step;
        if from <= 1 {
            return Ok(NavOutcome::Unchanged(from));
        }
        self.current_step = from - 1;
        info!(from, to = self.current_step, "moved back");
        Ok(NavOutcome::Moved {
            from,
            to: self.current_step,
        })
    }

    /// Writes one leaf and refreshes whatever depends on it.
    ///
    /// # Errors
    ///
    /// * [`WizardError::DerivedField`] if `path` is a calculator output.
    /// * [`WizardError::Path`] if `path` does not exist or `value` has the
    ///   wrong kind.
    pub fn set_field(
        &mut self,
        path: &[&str],
        value: FieldValue,
    ) -> Result<(), WizardError> {
        self.ensure_open()?;
        if self.calculator.is_output(path) {
            return Err(WizardError::DerivedField(field_path::join(path)));
        }

        let mut next = field_path::set(&self.form, path, value)?;
        if self.calculator.is_input(path) {
            next = self.calculator.recompute(&next)?;
        }
        self.form = next;
        debug!(path = %field_path::join(path), "field updated");

        self.revalidate_owner(path);
        Ok(())
    }

    pub fn set_text(
        &mut self,
        path: &[&str],
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.set_field(path, FieldValue::Text(value.into()))
    }

    pub fn set_flag(
        &mut self,
        path: &[&str],
        value: bool,
    ) -> Result<(), WizardError> {
        self.set_field(path, FieldValue::Flag(value))
    }

    /// Validates everything and, if clean, snapshots the payload.
    ///
    /// While the returned submit is pending, further calls return
    /// [`SubmitStart::InFlight`] and change nothing.
    pub fn begin_submit(&mut self) -> Result<SubmitStart, WizardError> {
        self.ensure_open()?;
        if self.submitting {
            debug!("submit already in flight");
            return Ok(SubmitStart::InFlight);
        }

        let report = self.steps.validate_all(&self.form);
        if !report.is_valid() {
            let invalid_steps = report.invalid_steps();
            warn!(?invalid_steps, "submit rejected");
            self.errors = report.combined();
            self.notices.push(Notice::SubmitRejected { invalid_steps });
            return Ok(SubmitStart::Invalid(report));
        }

        self.form = self.calculator.recompute(&self.form)?;
        let payload =
            serde_json::to_value(&self.form).map_err(|e| WizardError::Payload(e.to_string()))?;
        self.errors = ErrorTree::new();
        self.submitting = true;
        info!(kind = K::NAME, mode = ?self.mode, "submitting");

        Ok(SubmitStart::Ready(PendingSubmit {
            mode: self.mode.clone(),
            payload,
        }))
    }

    /// Applies the repository result of a submit started with
    /// [`Wizard::begin_submit`]. Success closes the wizard; failure leaves
    /// every field as it was.
    pub fn finish_submit(
        &mut self,
        result: Result<StoredDocument, RepositoryError>,
    ) -> Result<StoredDocument, WizardError> {
        if !self.submitting {
            return Err(WizardError::NotSubmitting);
        }
        self.submitting = false;

        match result {
            Ok(saved) => {
                info!(kind = K::NAME, id = %saved.id, "document saved");
                self.notices.push(Notice::Saved {
                    id: saved.id.clone(),
                });
                self.closed = true;
                Ok(saved)
            }
            Err(err) => {
                error!(%err, "save failed");
                self.notices.push(Notice::SaveFailed {
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// [`Wizard::begin_submit`], the repository call, then
    /// [`Wizard::finish_submit`].
    pub async fn submit(
        &mut self,
        repo: &dyn DocumentRepository,
    ) -> Result<SubmitOutcome, WizardError> {
        let pending = match self.begin_submit()? {
            SubmitStart::Ready(pending) => pending,
            SubmitStart::Invalid(report) => return Ok(SubmitOutcome::Invalid(report)),
            SubmitStart::InFlight => return Ok(SubmitOutcome::Ignored),
        };
        let result = pending.send(repo).await;
        self.finish_submit(result).map(SubmitOutcome::Saved)
    }

    /// Discards the wizard. Later operations fail with [`WizardError::Closed`].
    pub fn close(&mut self) {
        if !self.closed {
            debug!(kind = K::NAME, "wizard closed");
        }
        self.closed = true;
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.closed {
            Err(WizardError::Closed)
        } else {
            Ok(())
        }
    }

    /// Replaces the owning step's errors if that step currently has any.
    fn revalidate_owner(
        &mut self,
        path: &[&str],
    ) {
        let Some(step) = self.steps.step_owning(path) else {
            return;
        };
        let owned = step.fields_owned();
        if !owned.iter().any(|key| self.errors.contains(&[*key])) {
            return;
        }

        let fresh = step.validate(&self.form);
        for key in owned {
            self.errors.remove(&[*key]);
        }
        debug!(step = step.index(), remaining = fresh.len(), "revalidated step");
        self.errors.merge(fresh);
    }
}

impl<K: DocumentKind> std::fmt::Debug for Wizard<K> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Wizard")
            .field("kind", &K::NAME)
            .field("mode", &self.mode)
            .field("current_step", &self.current_step)
            .field("form", &self.form)
            .field("errors", &self.errors)
            .field("submitting", &self.submitting)
            .field("closed", &self.closed)
            .finish()
    }
}
