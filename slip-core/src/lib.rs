// The FieldGroup derive emits `::slip_core::...` paths; this lets it work
// inside this crate too.
extern crate self as slip_core;

pub mod calculations;
pub mod db;
pub mod documents;
pub mod form;
pub mod models;
pub mod wizard;

pub use db::repository::{DocumentRepository, RepositoryError, StoredDocument};
pub use documents::{DeliverySlip, DocumentKind, DocumentType, LoadingSlip};
pub use models::*;
pub use wizard::{NavOutcome, Notice, SubmitOutcome, Wizard, WizardError};
