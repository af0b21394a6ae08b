//! Command implementations, kept out of `main` so they can be tested.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use slip_core::calculations::DerivedTotals;
use slip_core::db::{DocumentRepository, MemoryRepositoryFactory, RepositoryRegistry};
use slip_core::documents::DocumentKind;
use slip_core::form::{ErrorTree, FieldValue, field_path};
use slip_core::wizard::{NavOutcome, SubmitOutcome, Wizard, WizardError};
use slip_http::HttpRepositoryFactory;
use tracing::{debug, info, warn};

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(HttpRepositoryFactory));
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

/// One answer from an answers file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Flag(bool),
    Number(Number),
    Text(String),
}

impl From<Answer> for FieldValue {
    fn from(answer: Answer) -> Self {
        match answer {
            Answer::Flag(b) => FieldValue::Flag(b),
            Answer::Number(n) => FieldValue::Text(n.to_string()),
            Answer::Text(s) => FieldValue::Text(s),
        }
    }
}

/// Dotted field path to answer, applied in key order.
pub type Answers = BTreeMap<String, Answer>;

pub fn parse_answers(text: &str) -> Result<Answers> {
    serde_json::from_str(text).context("answers must be a JSON object of \"dotted.path\": value")
}

pub fn load_answers(path: &Path) -> Result<Answers> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers: {}", path.display()))?;
    parse_answers(&text).with_context(|| format!("Failed to parse answers: {}", path.display()))
}

/// Writes every answer into the wizard.
pub fn apply_answers<K: DocumentKind>(
    wizard: &mut Wizard<K>,
    answers: &Answers,
) -> Result<(), WizardError> {
    for (dotted, answer) in answers {
        let path = field_path::parse(dotted);
        wizard.set_field(&path, answer.clone().into())?;
    }
    debug!(count = answers.len(), "applied answers");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub index: usize,
    pub title: &'static str,
    pub valid: bool,
    #[serde(skip_serializing_if = "ErrorTree::is_empty")]
    pub errors: ErrorTree,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub document: &'static str,
    pub totals: Vec<DerivedTotals>,
    pub steps: Vec<StepStatus>,
    pub form: Value,
}

/// Fills a fresh wizard and reports totals and per-step validity.
pub fn preview<K: DocumentKind>(answers: &Answers) -> Result<Preview> {
    let mut wizard = Wizard::<K>::create()?;
    apply_answers(&mut wizard, answers)?;

    let steps = wizard
        .steps()
        .iter()
        .map(|step| {
            let errors = step.validate(wizard.form());
            StepStatus {
                index: step.index(),
                title: step.title(),
                valid: errors.is_empty(),
                errors,
            }
        })
        .collect();

    Ok(Preview {
        document: K::NAME,
        totals: wizard.totals()?,
        steps,
        form: serde_json::to_value(wizard.form())?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmitReport {
    Saved { id: String },
    Blocked { step: usize, title: &'static str, errors: ErrorTree },
    Rejected { first_invalid_step: Option<usize>, errors: ErrorTree },
}

/// Walks the wizard forward step by step, then submits to `repo`.
///
/// With `edit` set the document is opened from `repo` first and the
/// answers are applied on top of it.
pub async fn submit<K: DocumentKind>(
    repo: &dyn DocumentRepository,
    answers: &Answers,
    edit: Option<&str>,
) -> Result<SubmitReport> {
    let mut wizard = match edit {
        Some(id) => Wizard::<K>::open(repo, id)
            .await
            .with_context(|| format!("Failed to open {} '{id}'", K::NAME))?,
        None => Wizard::<K>::create()?,
    };
    apply_answers(&mut wizard, answers)?;

    loop {
        match wizard.next()? {
            NavOutcome::Moved { to, .. } => info!(step = to, title = wizard.current_title(), "step complete"),
            NavOutcome::Unchanged(_) => break,
            NavOutcome::Blocked(step) => {
                warn!(step, "cannot continue");
                return Ok(SubmitReport::Blocked {
                    step,
                    title: wizard.current_title(),
                    errors: wizard.errors().clone(),
                });
            }
        }
    }

    match wizard.submit(repo).await? {
        SubmitOutcome::Saved(saved) => Ok(SubmitReport::Saved { id: saved.id }),
        SubmitOutcome::Invalid(report) => Ok(SubmitReport::Rejected {
            first_invalid_step: report.first_invalid_step(),
            errors: report.combined(),
        }),
        SubmitOutcome::Ignored => bail!("a submit is already in flight"),
    }
}

/// Opens `id` for editing and returns the hydrated form.
pub async fn show<K: DocumentKind>(
    repo: &dyn DocumentRepository,
    id: &str,
) -> Result<Value> {
    let wizard = Wizard::<K>::open(repo, id)
        .await
        .with_context(|| format!("Failed to open {} '{id}'", K::NAME))?;
    Ok(serde_json::to_value(wizard.form())?)
}
