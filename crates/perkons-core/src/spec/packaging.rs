//! Model packaging and registration spec.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::param::ParamValue;
use crate::spec::{require_non_empty, StepKind};

/// Identifies a model version published to the registry.
///
/// Produced by [`PackagingSpec::registration`] and consumed by
/// [`ServingSpec::for_model`](crate::spec::ServingSpec::for_model), so the
/// serving step deploys exactly what the packaging step registered instead
/// of relying on two string literals staying in sync.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelReference {
    pub model_name: String,
    pub version_tag: String,
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.model_name, self.version_tag)
    }
}

/// Converts a trained artifact into a servable format and registers it.
///
/// Reads the artifact from the shared volume written by the training step
/// and publishes it under `model_name` at `version_tag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingSpec {
    /// Registry name to publish under.
    pub model_name: String,
    /// Version tag for this publication. Tags are opaque labels; `latest`
    /// has no special meaning here.
    pub version_tag: String,
    /// Claim name of the shared volume holding the trained artifact.
    pub volume_claim_reference: String,
}

impl PackagingSpec {
    pub fn new(
        model_name: impl Into<String>,
        version_tag: impl Into<String>,
        volume_claim_reference: impl Into<String>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            version_tag: version_tag.into(),
            volume_claim_reference: volume_claim_reference.into(),
        }
    }

    /// The registry entry this step publishes.
    pub fn registration(&self) -> ModelReference {
        ModelReference {
            model_name: self.model_name.clone(),
            version_tag: self.version_tag.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        require_non_empty(StepKind::Packaging, "model_name", &self.model_name)?;
        require_non_empty(StepKind::Packaging, "version_tag", &self.version_tag)?;
        require_non_empty(
            StepKind::Packaging,
            "volume_claim_reference",
            &self.volume_claim_reference,
        )?;
        Ok(())
    }

    pub fn parameters(&self) -> IndexMap<String, ParamValue> {
        IndexMap::from([
            (
                "model_name".to_string(),
                ParamValue::from(self.model_name.clone()),
            ),
            (
                "version_tag".to_string(),
                ParamValue::from(self.version_tag.clone()),
            ),
            (
                "volume_claim_reference".to_string(),
                ParamValue::from(self.volume_claim_reference.clone()),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_matches_spec_fields() {
        let spec = PackagingSpec::new("ppocr-det", "latest", "ppocr-detection-pvc");
        let model = spec.registration();
        assert_eq!(model.model_name, "ppocr-det");
        assert_eq!(model.version_tag, "latest");
    }

    #[test]
    fn test_model_reference_display() {
        let spec = PackagingSpec::new("ppocr-det", "v3", "pvc");
        assert_eq!(spec.registration().to_string(), "ppocr-det:v3");
    }

    #[test]
    fn test_empty_version_rejected() {
        let spec = PackagingSpec::new("m", "", "pvc");
        assert!(spec.validate().is_err());
    }
}
