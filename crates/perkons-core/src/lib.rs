//! Perkons Core - Typed pipeline assembly
//!
//! This crate provides the building blocks for declaring ML workflow
//! pipelines in code:
//! - Component specs for volume provisioning, dataset caching, training,
//!   model packaging, and serving
//! - Typed parameter values that survive serialization without degrading
//!   to strings
//! - A [`Pipeline`] registry that tracks steps, ordering constraints, and
//!   volume-claim data dependencies, and produces a deterministic
//!   execution order
//!
//! Specs are plain owned data. Each step receives its own copy of the
//! values it was built from, so mutating one step never leaks into
//! another. Cross-step references (volume claims, registered models) are
//! carried by name and resolved when the topology is queried.

pub mod error;
pub mod param;
pub mod pipeline;
pub mod spec;

pub use error::PipelineError;
pub use param::ParamValue;
pub use pipeline::{Pipeline, StepId};
pub use spec::{
    AccessMode, DatasetSpec, ModelReference, PackagingSpec, ServingSpec, StepKind, StepSpec,
    TrainingSpec, VolumeSpec,
};
