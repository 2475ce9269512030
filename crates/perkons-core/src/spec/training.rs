//! Distributed training job spec.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::param::ParamValue;
use crate::spec::{require_non_empty, StepKind};

/// Parameters for a distributed training job.
///
/// The job reads the cached dataset named by `dataset_name`, mounts the
/// shared volume named by `volume_claim_reference` for checkpoints and
/// artifacts, and applies `config_overrides` on top of the config file
/// before launch. An optional pretrained checkpoint seeds the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSpec {
    /// Job resource name.
    pub job_name: String,
    /// Cached dataset to train on.
    pub dataset_name: String,
    /// Project the job is grouped under.
    pub project_name: String,
    /// Number of worker replicas.
    pub worker_replica_count: u32,
    /// GPUs allocated per worker.
    pub gpu_per_worker: u32,
    /// Whether to emit visualization logs during training.
    pub visualization_flag: bool,
    /// Label files consumed by the job, relative to the dataset root.
    pub label_file_paths: Vec<String>,
    /// Training config file inside the container image.
    pub config_file_path: String,
    /// Claim name of the shared volume to mount.
    pub volume_claim_reference: String,
    /// Container image the workers run.
    pub container_image: String,
    /// `key=value` overrides applied on top of the config file, in order.
    #[serde(default)]
    pub config_overrides: Vec<String>,
    /// Checkpoint URI to warm-start from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretrained_checkpoint_uri: Option<String>,
}

impl TrainingSpec {
    pub fn validate(&self) -> Result<(), PipelineError> {
        require_non_empty(StepKind::Training, "job_name", &self.job_name)?;
        require_non_empty(StepKind::Training, "dataset_name", &self.dataset_name)?;
        require_non_empty(StepKind::Training, "project_name", &self.project_name)?;
        require_non_empty(StepKind::Training, "config_file_path", &self.config_file_path)?;
        require_non_empty(
            StepKind::Training,
            "volume_claim_reference",
            &self.volume_claim_reference,
        )?;
        require_non_empty(StepKind::Training, "container_image", &self.container_image)?;
        if self.worker_replica_count == 0 {
            return Err(PipelineError::invalid(
                StepKind::Training,
                "worker_replica_count",
                "must be at least 1",
            ));
        }
        if self.gpu_per_worker == 0 {
            return Err(PipelineError::invalid(
                StepKind::Training,
                "gpu_per_worker",
                "must be at least 1",
            ));
        }
        for entry in &self.config_overrides {
            let valid = entry
                .split_once('=')
                .map(|(key, _)| !key.trim().is_empty())
                .unwrap_or(false);
            if !valid {
                return Err(PipelineError::invalid(
                    StepKind::Training,
                    "config_overrides",
                    format!("{:?} is not of the form key=value", entry),
                ));
            }
        }
        if let Some(uri) = &self.pretrained_checkpoint_uri {
            if uri.trim().is_empty() {
                return Err(PipelineError::invalid(
                    StepKind::Training,
                    "pretrained_checkpoint_uri",
                    "must not be empty when set",
                ));
            }
        }
        Ok(())
    }

    pub fn parameters(&self) -> IndexMap<String, ParamValue> {
        let mut params = IndexMap::from([
            ("job_name".to_string(), ParamValue::from(self.job_name.clone())),
            (
                "dataset_name".to_string(),
                ParamValue::from(self.dataset_name.clone()),
            ),
            (
                "project_name".to_string(),
                ParamValue::from(self.project_name.clone()),
            ),
            (
                "worker_replica_count".to_string(),
                ParamValue::from(self.worker_replica_count),
            ),
            (
                "gpu_per_worker".to_string(),
                ParamValue::from(self.gpu_per_worker),
            ),
            (
                "visualization_flag".to_string(),
                ParamValue::from(self.visualization_flag),
            ),
            (
                "label_file_paths".to_string(),
                ParamValue::from(self.label_file_paths.as_slice()),
            ),
            (
                "config_file_path".to_string(),
                ParamValue::from(self.config_file_path.clone()),
            ),
            (
                "volume_claim_reference".to_string(),
                ParamValue::from(self.volume_claim_reference.clone()),
            ),
            (
                "config_overrides".to_string(),
                ParamValue::from(self.config_overrides.as_slice()),
            ),
        ]);
        if let Some(uri) = &self.pretrained_checkpoint_uri {
            params.insert(
                "pretrained_checkpoint_uri".to_string(),
                ParamValue::from(uri.clone()),
            );
        }
        params
    }
}
