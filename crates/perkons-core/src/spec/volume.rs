//! Shared-volume provisioning spec.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::param::ParamValue;
use crate::spec::{require_non_empty, StepKind};

/// Access mode requested for a provisioned volume.
///
/// Serialized with the Kubernetes spelling (`ReadWriteMany` etc.) so the
/// value can be handed to a storage backend unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    ReadWriteOnce,
    ReadOnlyMany,
    ReadWriteMany,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::ReadWriteOnce => write!(f, "ReadWriteOnce"),
            AccessMode::ReadOnlyMany => write!(f, "ReadOnlyMany"),
            AccessMode::ReadWriteMany => write!(f, "ReadWriteMany"),
        }
    }
}

/// Requests a shared volume that downstream steps mount by claim name.
///
/// The claim name equals the resource name: whatever a training or
/// packaging step writes into `volume_claim_reference` must match
/// [`VolumeSpec::claim_name`] of exactly one volume step in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpec {
    /// Resource name of the provisioned claim.
    pub name: String,
    /// Storage class the claim is created under.
    pub storage_class: String,
    /// Requested capacity, e.g. `10Gi`.
    pub size: String,
    pub access_mode: AccessMode,
}

impl VolumeSpec {
    pub fn new(
        name: impl Into<String>,
        storage_class: impl Into<String>,
        size: impl Into<String>,
        access_mode: AccessMode,
    ) -> Self {
        Self {
            name: name.into(),
            storage_class: storage_class.into(),
            size: size.into(),
            access_mode,
        }
    }

    /// Claim name downstream steps reference to mount this volume.
    pub fn claim_name(&self) -> &str {
        &self.name
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        require_non_empty(StepKind::Volume, "name", &self.name)?;
        require_non_empty(StepKind::Volume, "storage_class", &self.storage_class)?;
        if !is_quantity(&self.size) {
            return Err(PipelineError::invalid(
                StepKind::Volume,
                "size",
                format!("{:?} is not a valid quantity (expected digits plus an optional unit such as Gi)", self.size),
            ));
        }
        Ok(())
    }

    pub fn parameters(&self) -> IndexMap<String, ParamValue> {
        IndexMap::from([
            ("name".to_string(), ParamValue::from(self.name.clone())),
            (
                "storage_class".to_string(),
                ParamValue::from(self.storage_class.clone()),
            ),
            ("size".to_string(), ParamValue::from(self.size.clone())),
            (
                "access_mode".to_string(),
                ParamValue::from(self.access_mode.to_string()),
            ),
        ])
    }
}

/// Accepts `<digits>` plus an optional binary (Ki..Ei) or decimal (k..E)
/// suffix, the subset of quantity syntax storage classes understand.
fn is_quantity(s: &str) -> bool {
    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digits_end == 0 {
        return false;
    }
    matches!(
        &s[digits_end..],
        "" | "Ki" | "Mi" | "Gi" | "Ti" | "Pi" | "Ei" | "k" | "M" | "G" | "T" | "P" | "E"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_name_equals_resource_name() {
        let spec = VolumeSpec::new("ppocr-detection-pvc", "task-center", "10Gi", AccessMode::ReadWriteMany);
        assert_eq!(spec.claim_name(), "ppocr-detection-pvc");
    }

    #[test]
    fn test_validate_accepts_demo_values() {
        let spec = VolumeSpec::new("ppocr-detection-pvc", "task-center", "10Gi", AccessMode::ReadWriteMany);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let spec = VolumeSpec::new("", "standard", "1Gi", AccessMode::ReadWriteOnce);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_quantity_forms() {
        assert!(is_quantity("10Gi"));
        assert!(is_quantity("512Mi"));
        assert!(is_quantity("100"));
        assert!(is_quantity("2T"));
        assert!(!is_quantity("Gi"));
        assert!(!is_quantity("10GB"));
        assert!(!is_quantity("ten"));
        assert!(!is_quantity(""));
    }

    #[test]
    fn test_access_mode_serializes_kubernetes_spelling() {
        let yaml = serde_yaml::to_string(&AccessMode::ReadWriteMany).unwrap();
        assert_eq!(yaml.trim(), "ReadWriteMany");
    }

    #[test]
    fn test_parameters_order_and_types() {
        let spec = VolumeSpec::new("pvc", "standard", "1Gi", AccessMode::ReadWriteOnce);
        let params = spec.parameters();
        let keys: Vec<&String> = params.keys().collect();
        assert_eq!(keys, ["name", "storage_class", "size", "access_mode"]);
        assert_eq!(params["access_mode"], ParamValue::Str("ReadWriteOnce".into()));
    }
}
