use thiserror::Error;

use super::hydrate::HydrationError;
use super::steps::StepOutOfRange;
use crate::db::RepositoryError;
use crate::form::PathError;

/// Errors returned by [`Wizard`](super::Wizard) operations.
///
/// Validation failures are not errors: they come back as outcomes
/// carrying an [`ErrorTree`](crate::form::ErrorTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("wizard is closed")]
    Closed,

    #[error("'{0}' is computed and cannot be edited")]
    DerivedField(String),

    #[error("no submit is in flight")]
    NotSubmitting,

    #[error("cannot serialize form: {0}")]
    Payload(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Step(#[from] StepOutOfRange),

    #[error("cannot load document: {0}")]
    Hydration(#[from] HydrationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
