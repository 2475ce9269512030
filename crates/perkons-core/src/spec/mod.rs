//! Component specs for the five pipeline step kinds.
//!
//! Each spec is an owned record of the values a component runs with.
//! Specs validate their own shape via [`StepSpec::validate`]; cross-step
//! references (volume claims, model registrations) are checked by the
//! pipeline when the topology is resolved.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::param::ParamValue;

mod dataset;
mod packaging;
mod serving;
mod training;
mod volume;

pub use dataset::DatasetSpec;
pub use packaging::{ModelReference, PackagingSpec};
pub use serving::ServingSpec;
pub use training::TrainingSpec;
pub use volume::{AccessMode, VolumeSpec};

/// The role a step plays in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Volume,
    Dataset,
    Training,
    Packaging,
    Serving,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Volume => write!(f, "volume"),
            StepKind::Dataset => write!(f, "dataset"),
            StepKind::Training => write!(f, "training"),
            StepKind::Packaging => write!(f, "packaging"),
            StepKind::Serving => write!(f, "serving"),
        }
    }
}

/// A component spec tagged with its step kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    Volume(VolumeSpec),
    Dataset(DatasetSpec),
    Training(TrainingSpec),
    Packaging(PackagingSpec),
    Serving(ServingSpec),
}

impl StepSpec {
    pub fn kind(&self) -> StepKind {
        match self {
            StepSpec::Volume(_) => StepKind::Volume,
            StepSpec::Dataset(_) => StepKind::Dataset,
            StepSpec::Training(_) => StepKind::Training,
            StepSpec::Packaging(_) => StepKind::Packaging,
            StepSpec::Serving(_) => StepKind::Serving,
        }
    }

    /// Check field-level constraints of the underlying spec.
    pub fn validate(&self) -> Result<(), PipelineError> {
        match self {
            StepSpec::Volume(s) => s.validate(),
            StepSpec::Dataset(s) => s.validate(),
            StepSpec::Training(s) => s.validate(),
            StepSpec::Packaging(s) => s.validate(),
            StepSpec::Serving(s) => s.validate(),
        }
    }

    /// The parameters this step binds, in declaration order.
    ///
    /// The container image is not part of this map; it is surfaced
    /// separately via [`StepSpec::container_image`].
    pub fn parameters(&self) -> IndexMap<String, ParamValue> {
        match self {
            StepSpec::Volume(s) => s.parameters(),
            StepSpec::Dataset(s) => s.parameters(),
            StepSpec::Training(s) => s.parameters(),
            StepSpec::Packaging(s) => s.parameters(),
            StepSpec::Serving(s) => s.parameters(),
        }
    }

    /// Container image the step runs, for kinds that carry one.
    pub fn container_image(&self) -> Option<&str> {
        match self {
            StepSpec::Training(s) => Some(&s.container_image),
            StepSpec::Serving(s) => Some(&s.container_image),
            _ => None,
        }
    }

    /// Claim name this step provides, if it is a volume step.
    pub fn provided_claim(&self) -> Option<&str> {
        match self {
            StepSpec::Volume(s) => Some(s.claim_name()),
            _ => None,
        }
    }

    /// Claim name this step mounts, if it consumes a shared volume.
    pub fn claim_reference(&self) -> Option<&str> {
        match self {
            StepSpec::Training(s) => Some(&s.volume_claim_reference),
            StepSpec::Packaging(s) => Some(&s.volume_claim_reference),
            _ => None,
        }
    }
}

impl From<VolumeSpec> for StepSpec {
    fn from(s: VolumeSpec) -> Self {
        StepSpec::Volume(s)
    }
}

impl From<DatasetSpec> for StepSpec {
    fn from(s: DatasetSpec) -> Self {
        StepSpec::Dataset(s)
    }
}

impl From<TrainingSpec> for StepSpec {
    fn from(s: TrainingSpec) -> Self {
        StepSpec::Training(s)
    }
}

impl From<PackagingSpec> for StepSpec {
    fn from(s: PackagingSpec) -> Self {
        StepSpec::Packaging(s)
    }
}

impl From<ServingSpec> for StepSpec {
    fn from(s: ServingSpec) -> Self {
        StepSpec::Serving(s)
    }
}

pub(crate) fn require_non_empty(
    kind: StepKind,
    field: &'static str,
    value: &str,
) -> Result<(), PipelineError> {
    if value.trim().is_empty() {
        return Err(PipelineError::invalid(kind, field, "must not be empty"));
    }
    Ok(())
}
