//! Per-entity wizard configuration.
//!
//! A [`DocumentKind`] ties a form type to its steps, calculator bindings and
//! hydration rules. The wizard is generic over the kind, so adding an entity
//! means adding one module here.

pub mod delivery_slip;
pub mod loading_slip;

use std::fmt;

use serde::Serialize;

use crate::calculations::Calculator;
use crate::form::FieldGroup;
use crate::wizard::{HydrationPlan, StepRegistry};

pub use delivery_slip::DeliverySlip;
pub use loading_slip::LoadingSlip;

/// Static description of one document entity.
pub trait DocumentKind {
    type Form: FieldGroup + Default + Clone + PartialEq + fmt::Debug + Serialize + Send + Sync;

    /// Human-readable name, e.g. `"Delivery Slip"`.
    const NAME: &'static str;

    /// REST collection the documents live in.
    const RESOURCE: &'static str;

    fn steps() -> StepRegistry<Self::Form>;

    fn calculator() -> Calculator;

    fn hydration_plan() -> HydrationPlan;
}

/// The document kinds known to this crate, for callers that pick one at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    DeliverySlip,
    LoadingSlip,
}

impl DocumentType {
    pub const ALL: [DocumentType; 2] = [Self::DeliverySlip, Self::LoadingSlip];

    pub fn name(self) -> &'static str {
        match self {
            Self::DeliverySlip => DeliverySlip::NAME,
            Self::LoadingSlip => LoadingSlip::NAME,
        }
    }

    pub fn resource(self) -> &'static str {
        match self {
            Self::DeliverySlip => DeliverySlip::RESOURCE,
            Self::LoadingSlip => LoadingSlip::RESOURCE,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}
