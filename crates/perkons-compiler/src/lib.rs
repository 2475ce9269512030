//! Perkons Compiler - Pipeline to workflow document
//!
//! Turns an assembled [`Pipeline`] into a portable [`Workflow`] document:
//! tasks in execution order, each carrying its kind, container image,
//! typed parameters, and direct dependencies. The document serializes to
//! YAML and is what gets submitted to a pipeline service.
//!
//! Compilation is where cross-step problems surface: dangling volume
//! claims, duplicate claim providers, and dependency cycles all fail here
//! with a [`CompileError`].

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use perkons_core::{Pipeline, PipelineError};

pub mod workflow;

pub use workflow::{Workflow, WorkflowMetadata, WorkflowTask};

/// Schema identifier written into every workflow document.
pub const API_VERSION: &str = "perkons.dev/v1";
/// Document kind written into every workflow document.
pub const WORKFLOW_KIND: &str = "Workflow";

/// Errors produced while compiling or serializing a workflow.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Pipeline topology error: {0}")]
    Topology(#[from] PipelineError),

    #[error("Workflow serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Failed to write workflow artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Compile a pipeline into a workflow document.
///
/// Tasks appear in execution order. Each task lists only its direct
/// prerequisites, after transitive reduction, so an engine scheduling by
/// the `dependencies` lists reproduces the pipeline's ordering exactly.
pub fn compile(pipeline: &Pipeline) -> Result<Workflow, CompileError> {
    pipeline.validate()?;
    let order = pipeline.execution_order()?;
    let mut tasks = Vec::with_capacity(order.len());
    for id in &order {
        let spec = pipeline
            .get(id)
            .ok_or_else(|| PipelineError::UnknownStep(id.to_string()))?;
        let dependencies = pipeline
            .dependencies_of(id)?
            .into_iter()
            .map(|dep| dep.to_string())
            .collect();
        tasks.push(WorkflowTask {
            name: id.to_string(),
            kind: spec.kind(),
            image: spec.container_image().map(String::from),
            parameters: spec.parameters(),
            dependencies,
        });
    }
    debug!(
        pipeline = %pipeline.name(),
        tasks = tasks.len(),
        "compiled workflow"
    );
    Ok(Workflow {
        api_version: API_VERSION.to_string(),
        kind: WORKFLOW_KIND.to_string(),
        metadata: WorkflowMetadata {
            name: pipeline.name().to_string(),
            description: pipeline.description().to_string(),
        },
        tasks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use perkons_core::{
        AccessMode, DatasetSpec, PackagingSpec, ParamValue, ServingSpec, StepKind, TrainingSpec,
        VolumeSpec,
    };

    fn sample_pipeline() -> Pipeline {
        let mut p = Pipeline::new("sample", "compiler test pipeline").unwrap();
        let volume = VolumeSpec::new("sample-pvc", "standard", "5Gi", AccessMode::ReadWriteMany);
        let claim = volume.claim_name().to_string();
        p.add_step("volume", volume).unwrap();
        let data = p
            .add_step("dataset", DatasetSpec::new("corpus", 2, "creds", "s3://corpus/"))
            .unwrap();
        let train = p
            .add_step(
                "training",
                TrainingSpec {
                    job_name: "job".to_string(),
                    dataset_name: "corpus".to_string(),
                    project_name: "proj".to_string(),
                    worker_replica_count: 2,
                    gpu_per_worker: 1,
                    visualization_flag: true,
                    label_file_paths: vec!["labels.txt".to_string()],
                    config_file_path: "configs/job.yml".to_string(),
                    volume_claim_reference: claim.clone(),
                    container_image: "trainer:1.0".to_string(),
                    config_overrides: vec!["Global.epoch_num=3".to_string()],
                    pretrained_checkpoint_uri: None,
                },
            )
            .unwrap();
        let packaging = PackagingSpec::new("model", "v1", claim);
        let model = packaging.registration();
        let pack = p.add_step("packaging", packaging).unwrap();
        let serve = p
            .add_step("serving", ServingSpec::for_model(&model, 8080, "server:1.0"))
            .unwrap();
        p.after(&train, &data).unwrap();
        p.after(&pack, &train).unwrap();
        p.after(&serve, &pack).unwrap();
        p
    }

    #[test]
    fn test_compile_orders_tasks_topologically() {
        let workflow = compile(&sample_pipeline()).unwrap();
        let names: Vec<&str> = workflow.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["volume", "dataset", "training", "packaging", "serving"]);
    }

    #[test]
    fn test_compile_header_fields() {
        let workflow = compile(&sample_pipeline()).unwrap();
        assert_eq!(workflow.api_version, API_VERSION);
        assert_eq!(workflow.kind, WORKFLOW_KIND);
        assert_eq!(workflow.metadata.name, "sample");
        assert_eq!(workflow.metadata.description, "compiler test pipeline");
    }

    #[test]
    fn test_compile_dependency_lists_are_reduced() {
        let workflow = compile(&sample_pipeline()).unwrap();
        let dep_names = |task: &str| -> Vec<String> {
            workflow
                .task(task)
                .map(|t| t.dependencies.clone())
                .unwrap_or_default()
        };
        assert!(dep_names("volume").is_empty());
        assert!(dep_names("dataset").is_empty());
        assert_eq!(dep_names("training"), ["volume", "dataset"]);
        // the volume claim edge to packaging is implied via training
        assert_eq!(dep_names("packaging"), ["training"]);
        assert_eq!(dep_names("serving"), ["packaging"]);
    }

    #[test]
    fn test_compile_task_kinds_and_images() {
        let workflow = compile(&sample_pipeline()).unwrap();
        let volume = workflow.task("volume").unwrap();
        assert_eq!(volume.kind, StepKind::Volume);
        assert_eq!(volume.image, None);
        let training = workflow.task("training").unwrap();
        assert_eq!(training.kind, StepKind::Training);
        assert_eq!(training.image.as_deref(), Some("trainer:1.0"));
        let serving = workflow.task("serving").unwrap();
        assert_eq!(serving.image.as_deref(), Some("server:1.0"));
    }

    #[test]
    fn test_compile_keeps_parameter_types() {
        let workflow = compile(&sample_pipeline()).unwrap();
        let training = workflow.task("training").unwrap();
        assert_eq!(
            training.parameters["worker_replica_count"],
            ParamValue::Int(2)
        );
        assert_eq!(
            training.parameters["visualization_flag"],
            ParamValue::Bool(true)
        );
        let serving = workflow.task("serving").unwrap();
        assert_eq!(serving.parameters["listen_port"], ParamValue::Int(8080));
    }

    #[test]
    fn test_compile_serving_matches_packaging_registration() {
        let workflow = compile(&sample_pipeline()).unwrap();
        let packaging = workflow.task("packaging").unwrap();
        let serving = workflow.task("serving").unwrap();
        assert_eq!(
            packaging.parameters["model_name"],
            serving.parameters["model_name"]
        );
        assert_eq!(
            packaging.parameters["version_tag"],
            serving.parameters["model_version"]
        );
    }

    #[test]
    fn test_compile_yaml_round_trip() {
        let workflow = compile(&sample_pipeline()).unwrap();
        let yaml = workflow.to_yaml().unwrap();
        let back = Workflow::from_yaml(&yaml).unwrap();
        assert_eq!(back, workflow);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let first = compile(&sample_pipeline()).unwrap().to_yaml().unwrap();
        for _ in 0..5 {
            let again = compile(&sample_pipeline()).unwrap().to_yaml().unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_compile_rejects_cycle() {
        let mut p = Pipeline::new("cyclic", "").unwrap();
        let a = p
            .add_step("dataset-a", DatasetSpec::new("a", 1, "s", "s3://a/"))
            .unwrap();
        let b = p
            .add_step("dataset-b", DatasetSpec::new("b", 1, "s", "s3://b/"))
            .unwrap();
        p.after(&a, &b).unwrap();
        p.after(&b, &a).unwrap();
        let err = compile(&p).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Topology(PipelineError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_compile_rejects_dangling_claim() {
        let mut p = Pipeline::new("dangling", "").unwrap();
        p.add_step("packaging", PackagingSpec::new("m", "v1", "missing-pvc"))
            .unwrap();
        let err = compile(&p).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Topology(PipelineError::DanglingClaim { .. })
        ));
    }
}
