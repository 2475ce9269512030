//! Error types for pipeline assembly.

use thiserror::Error;

use crate::spec::StepKind;

/// Errors raised while assembling or inspecting a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid pipeline name {0:?}: must be non-empty without whitespace")]
    InvalidPipelineName(String),

    #[error("Step id cannot be empty")]
    EmptyStepId,

    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Step {0} cannot depend on itself")]
    SelfDependency(String),

    #[error("Invalid {kind} spec: {field}: {reason}")]
    InvalidSpec {
        kind: StepKind,
        field: &'static str,
        reason: String,
    },

    #[error("Step {step} references volume claim {claim:?} but no volume step provides it")]
    DanglingClaim { step: String, claim: String },

    #[error("Volume claim {claim:?} is provided by both {first} and {second}")]
    DuplicateClaim {
        claim: String,
        first: String,
        second: String,
    },

    #[error("Dependency cycle detected involving step {0}")]
    CycleDetected(String),
}

impl PipelineError {
    /// Helper for spec field validation failures.
    pub(crate) fn invalid(kind: StepKind, field: &'static str, reason: impl Into<String>) -> Self {
        PipelineError::InvalidSpec {
            kind,
            field,
            reason: reason.into(),
        }
    }
}
