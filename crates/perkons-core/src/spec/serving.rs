//! Inference serving spec.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::param::ParamValue;
use crate::spec::{require_non_empty, ModelReference, StepKind};

/// Deploys a registered model version as an inference service.
///
/// Prefer [`ServingSpec::for_model`] with the reference returned by
/// [`PackagingSpec::registration`](crate::spec::PackagingSpec::registration);
/// it guarantees the deployed name and version are the registered ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingSpec {
    /// Registry name of the model to deploy.
    pub model_name: String,
    /// Version tag of the model to deploy.
    pub model_version: String,
    /// Port the inference endpoint listens on.
    pub listen_port: u16,
    /// Container image of the serving runtime.
    pub container_image: String,
}

impl ServingSpec {
    pub fn new(
        model_name: impl Into<String>,
        model_version: impl Into<String>,
        listen_port: u16,
        container_image: impl Into<String>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            model_version: model_version.into(),
            listen_port,
            container_image: container_image.into(),
        }
    }

    /// Build a serving spec from a registry reference.
    pub fn for_model(
        model: &ModelReference,
        listen_port: u16,
        container_image: impl Into<String>,
    ) -> Self {
        Self::new(
            model.model_name.clone(),
            model.version_tag.clone(),
            listen_port,
            container_image,
        )
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        require_non_empty(StepKind::Serving, "model_name", &self.model_name)?;
        require_non_empty(StepKind::Serving, "model_version", &self.model_version)?;
        require_non_empty(StepKind::Serving, "container_image", &self.container_image)?;
        if self.listen_port == 0 {
            return Err(PipelineError::invalid(
                StepKind::Serving,
                "listen_port",
                "must be non-zero",
            ));
        }
        Ok(())
    }

    pub fn parameters(&self) -> IndexMap<String, ParamValue> {
        IndexMap::from([
            (
                "model_name".to_string(),
                ParamValue::from(self.model_name.clone()),
            ),
            (
                "model_version".to_string(),
                ParamValue::from(self.model_version.clone()),
            ),
            ("listen_port".to_string(), ParamValue::from(self.listen_port)),
        ])
    }
}
