//! Built-in pipeline definitions.

use perkons_core::{
    AccessMode, DatasetSpec, PackagingSpec, Pipeline, PipelineError, ServingSpec, TrainingSpec,
    VolumeSpec,
};

/// Default artifact filename for the OCR detection demo.
pub const DEFAULT_ARTIFACT: &str = "ppocr_detection_demo.yaml";
/// Default pipeline service endpoint runs are submitted to.
pub const DEFAULT_HOST: &str = "http://www.my-pipeline-ui.com:80";
/// Default run name used on submission.
pub const DEFAULT_RUN_NAME: &str = "paddle ocr detection demo";
/// Default service account runs execute as.
pub const DEFAULT_SERVICE_ACCOUNT: &str = "pipeline-runner";

/// Assemble the PaddleOCR text-detection demo pipeline.
///
/// Five steps: provision a shared volume, cache the ICDAR 2015 dataset,
/// train the detection model on one GPU worker, package and register the
/// result, and deploy the registered version behind an inference
/// endpoint. The volume claim and the model registration are threaded
/// through, so downstream steps cannot drift from their producers.
pub fn ppocr_detection() -> Result<Pipeline, PipelineError> {
    let mut pipeline = Pipeline::new("ppocr-detection-demo", "An example for using ppocr train.")?;

    let volume_spec = VolumeSpec::new(
        "ppocr-detection-pvc",
        "task-center",
        "10Gi",
        AccessMode::ReadWriteMany,
    );
    let claim = volume_spec.claim_name().to_string();
    pipeline.add_step("volume", volume_spec)?;

    let dataset = pipeline.add_step(
        "dataset",
        DatasetSpec::new(
            "icdar2015",
            1,
            "data-source",
            "bos://paddleflow-public.hkg.bcebos.com/icdar2015/",
        ),
    )?;

    let training = pipeline.add_step(
        "training",
        TrainingSpec {
            job_name: "ppocr-det".to_string(),
            dataset_name: "icdar2015".to_string(),
            project_name: "PaddleOCR".to_string(),
            worker_replica_count: 1,
            gpu_per_worker: 1,
            visualization_flag: true,
            label_file_paths: vec![
                "train_icdar2015_label.txt".to_string(),
                "test_icdar2015_label.txt".to_string(),
            ],
            config_file_path: "configs/det/det_mv3_db.yml".to_string(),
            volume_claim_reference: claim.clone(),
            container_image:
                "registry.baidubce.com/paddleflow-public/paddleocr:2.1.3-gpu-cuda10.2-cudnn7"
                    .to_string(),
            config_overrides: vec![
                "Global.epoch_num=10".to_string(),
                "Global.log_smooth_window=2".to_string(),
                "Global.save_epoch_step=5".to_string(),
            ],
            pretrained_checkpoint_uri: Some(
                "https://paddle-imagenet-models-name.bj.bcebos.com/dygraph/MobileNetV3_large_x0_5_pretrained.pdparams"
                    .to_string(),
            ),
        },
    )?;

    let packaging_spec = PackagingSpec::new("ppocr-det", "latest", claim);
    let model = packaging_spec.registration();
    let packaging = pipeline.add_step("packaging", packaging_spec)?;

    let serving = pipeline.add_step(
        "serving",
        ServingSpec::for_model(
            &model,
            9292,
            "registry.baidubce.com/paddleflow-public/serving:v0.6.2",
        ),
    )?;

    pipeline.after(&training, &dataset)?;
    pipeline.after(&packaging, &training)?;
    pipeline.after(&serving, &packaging)?;

    Ok(pipeline)
}
