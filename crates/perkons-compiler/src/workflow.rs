//! Portable workflow document model.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use perkons_core::{ParamValue, StepKind};

use crate::CompileError;

/// A compiled workflow, ready to serialize and submit.
///
/// The document is self-contained: a pipeline service needs nothing but
/// this YAML to schedule the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub api_version: String,
    pub kind: String,
    pub metadata: WorkflowMetadata,
    /// Tasks in execution order.
    pub tasks: Vec<WorkflowTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// One schedulable task of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTask {
    pub name: String,
    pub kind: StepKind,
    /// Container image, for kinds that run one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Typed parameters in declaration order.
    #[serde(default)]
    pub parameters: IndexMap<String, ParamValue>,
    /// Names of direct prerequisite tasks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl Workflow {
    /// Look a task up by name.
    pub fn task(&self, name: &str) -> Option<&WorkflowTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn to_yaml(&self) -> Result<String, CompileError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(input: &str) -> Result<Self, CompileError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Serialize and write the document to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), CompileError> {
        let path = path.as_ref();
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "workflow artifact written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_workflow() -> Workflow {
        Workflow {
            api_version: crate::API_VERSION.to_string(),
            kind: crate::WORKFLOW_KIND.to_string(),
            metadata: WorkflowMetadata {
                name: "sample".to_string(),
                description: "a sample".to_string(),
            },
            tasks: vec![
                WorkflowTask {
                    name: "volume".to_string(),
                    kind: StepKind::Volume,
                    image: None,
                    parameters: IndexMap::from([
                        ("name".to_string(), ParamValue::Str("pvc".into())),
                        ("size".to_string(), ParamValue::Str("1Gi".into())),
                    ]),
                    dependencies: Vec::new(),
                },
                WorkflowTask {
                    name: "training".to_string(),
                    kind: StepKind::Training,
                    image: Some("trainer:1.0".to_string()),
                    parameters: IndexMap::from([
                        ("worker_replica_count".to_string(), ParamValue::Int(2)),
                        ("visualization_flag".to_string(), ParamValue::Bool(true)),
                    ]),
                    dependencies: vec!["volume".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_yaml_round_trip() {
        let workflow = sample_workflow();
        let yaml = workflow.to_yaml().unwrap();
        let back = Workflow::from_yaml(&yaml).unwrap();
        assert_eq!(back, workflow);
    }

    #[test]
    fn test_yaml_header_spelling() {
        let yaml = sample_workflow().to_yaml().unwrap();
        assert!(yaml.contains("apiVersion: perkons.dev/v1"));
        assert!(yaml.contains("kind: Workflow"));
    }

    #[test]
    fn test_yaml_keeps_scalar_types() {
        let yaml = sample_workflow().to_yaml().unwrap();
        assert!(yaml.contains("worker_replica_count: 2"));
        assert!(yaml.contains("visualization_flag: true"));
        assert!(!yaml.contains("worker_replica_count: '2'"));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let yaml = sample_workflow().to_yaml().unwrap();
        // the volume task has no image and no dependencies
        let volume_block: String = yaml
            .lines()
            .take_while(|line| !line.contains("name: training"))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(!volume_block.contains("image:"));
        assert!(!volume_block.contains("dependencies:"));
    }

    #[test]
    fn test_task_lookup() {
        let workflow = sample_workflow();
        assert!(workflow.task("training").is_some());
        assert!(workflow.task("missing").is_none());
    }

    #[test]
    fn test_from_yaml_rejects_garbage() {
        assert!(Workflow::from_yaml("tasks: [not a workflow").is_err());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let yaml = "\
apiVersion: perkons.dev/v1
kind: Workflow
metadata:
  name: bare
tasks:
  - name: volume
    kind: volume
";
        let workflow = Workflow::from_yaml(yaml).unwrap();
        assert_eq!(workflow.metadata.description, "");
        let task = workflow.task("volume").unwrap();
        assert!(task.image.is_none());
        assert!(task.parameters.is_empty());
        assert!(task.dependencies.is_empty());
    }

    #[test]
    fn test_write_to_creates_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.yaml");
        sample_workflow().write_to(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let back = Workflow::from_yaml(&contents).unwrap();
        assert_eq!(back, sample_workflow());
    }

    #[test]
    fn test_write_to_unwritable_path_errors() {
        let err = sample_workflow()
            .write_to("/nonexistent-dir/workflow.yaml")
            .unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
    }
}
