//! Dataset cache binding spec.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::param::ParamValue;
use crate::spec::{require_non_empty, StepKind};

/// Binds a remote dataset into the cluster-side cache under a well-known
/// name.
///
/// Training steps pick the cached data up by `dataset_name`; credentials
/// for the source store are referenced by secret name, never embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Name the cached dataset is published under.
    pub dataset_name: String,
    /// Number of cache partitions to split the dataset into.
    pub partition_count: u32,
    /// Name of the credential secret used to read the source store.
    pub source_credential_reference: String,
    /// URI of the remote dataset, e.g. `bos://bucket/path/`.
    pub source_uri: String,
}

impl DatasetSpec {
    pub fn new(
        dataset_name: impl Into<String>,
        partition_count: u32,
        source_credential_reference: impl Into<String>,
        source_uri: impl Into<String>,
    ) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            partition_count,
            source_credential_reference: source_credential_reference.into(),
            source_uri: source_uri.into(),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        require_non_empty(StepKind::Dataset, "dataset_name", &self.dataset_name)?;
        require_non_empty(
            StepKind::Dataset,
            "source_credential_reference",
            &self.source_credential_reference,
        )?;
        require_non_empty(StepKind::Dataset, "source_uri", &self.source_uri)?;
        if self.partition_count == 0 {
            return Err(PipelineError::invalid(
                StepKind::Dataset,
                "partition_count",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn parameters(&self) -> IndexMap<String, ParamValue> {
        IndexMap::from([
            (
                "dataset_name".to_string(),
                ParamValue::from(self.dataset_name.clone()),
            ),
            (
                "partition_count".to_string(),
                ParamValue::from(self.partition_count),
            ),
            (
                "source_credential_reference".to_string(),
                ParamValue::from(self.source_credential_reference.clone()),
            ),
            (
                "source_uri".to_string(),
                ParamValue::from(self.source_uri.clone()),
            ),
        ])
    }
}
