//! Perkons command-line interface.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use tracing_subscriber::FmtSubscriber;

use perkons_cli::api::CreateRunRequest;
use perkons_cli::client::SubmitClient;
use perkons_cli::config::Config;
use perkons_cli::pipelines;

#[derive(Parser)]
#[command(name = "perkons")]
#[command(author = "Perkons Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Perkons - Typed pipeline assembly and submission", long_about = None)]
struct Cli {
    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, global = true, env = "PERKONS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the demo pipeline to a workflow artifact
    Compile {
        /// Output path for the workflow YAML
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate the pipeline and print its execution order
    Check,
    /// Print compiled tasks with parameters and dependencies
    Show,
    /// Compile the pipeline and submit a run
    Submit {
        /// Pipeline service endpoint
        #[arg(long, env = "PERKONS_HOST")]
        host: Option<String>,
        /// Name the run is created under
        #[arg(long, env = "PERKONS_RUN_NAME")]
        run_name: Option<String>,
        /// Service account the run executes as
        #[arg(long, env = "PERKONS_SERVICE_ACCOUNT")]
        service_account: Option<String>,
        /// Also write the workflow artifact to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate an example configuration file
    ConfigGen {
        /// Output format: yaml or toml
        #[arg(short, long, default_value = "yaml")]
        format: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Initialize logging
    let builder = FmtSubscriber::builder().with_max_level(config.logging.tracing_level());
    if config.logging.timestamps {
        tracing::subscriber::set_global_default(builder.finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.without_time().finish())?;
    }

    match cli.command {
        Commands::Compile { output } => compile_command(&config, output),
        Commands::Check => check_command(),
        Commands::Show => show_command(),
        Commands::Submit {
            host,
            run_name,
            service_account,
            output,
        } => submit_command(&config, host, run_name, service_account, output).await,
        Commands::ConfigGen { format, output } => config_gen_command(&format, output),
    }
}

fn artifact_path(config: &Config, output: Option<PathBuf>) -> PathBuf {
    output
        .or_else(|| config.compile.output.clone())
        .unwrap_or_else(|| PathBuf::from(pipelines::DEFAULT_ARTIFACT))
}

fn compile_command(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let pipeline = pipelines::ppocr_detection()?;
    let workflow = perkons_compiler::compile(&pipeline)?;
    let path = artifact_path(config, output);
    workflow.write_to(&path)?;
    println!("Workflow written to: {}", path.display());
    Ok(())
}

fn check_command() -> Result<()> {
    let pipeline = pipelines::ppocr_detection()?;
    if let Err(e) = pipeline.validate() {
        anyhow::bail!("Pipeline is invalid: {e}");
    }
    let order = pipeline.execution_order()?;
    println!(
        "Pipeline {} is valid: {} steps, {} edges",
        pipeline.name(),
        pipeline.len(),
        pipeline.edge_count()?
    );
    let names: Vec<&str> = order.iter().map(|id| id.as_str()).collect();
    println!("Execution order: {}", names.join(" -> "));
    Ok(())
}

fn show_command() -> Result<()> {
    let pipeline = pipelines::ppocr_detection()?;
    let workflow = perkons_compiler::compile(&pipeline)?;
    println!(
        "Pipeline: {} ({} tasks)",
        workflow.metadata.name,
        workflow.tasks.len()
    );
    for task in &workflow.tasks {
        println!();
        println!("[{}] {}", task.kind, task.name);
        if let Some(image) = &task.image {
            println!("  image: {}", image);
        }
        for (key, value) in &task.parameters {
            println!("  {} = {}", key, value);
        }
        if !task.dependencies.is_empty() {
            println!("  depends on: {}", task.dependencies.join(", "));
        }
    }
    Ok(())
}

async fn submit_command(
    config: &Config,
    host: Option<String>,
    run_name: Option<String>,
    service_account: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let pipeline = pipelines::ppocr_detection()?;
    let workflow = perkons_compiler::compile(&pipeline)?;

    let path = artifact_path(config, output);
    workflow.write_to(&path)?;
    println!("Workflow written to: {}", path.display());

    let host = host
        .or_else(|| config.submit.host.clone())
        .unwrap_or_else(|| pipelines::DEFAULT_HOST.to_string());
    let run_name = run_name
        .or_else(|| config.submit.run_name.clone())
        .unwrap_or_else(|| pipelines::DEFAULT_RUN_NAME.to_string());
    let service_account = service_account
        .or_else(|| config.submit.service_account.clone())
        .unwrap_or_else(|| pipelines::DEFAULT_SERVICE_ACCOUNT.to_string());

    let request = CreateRunRequest {
        run_name,
        service_account,
        workflow: workflow.to_yaml()?,
        arguments: IndexMap::new(),
    };

    let client = SubmitClient::new(&host);
    match client.create_run(&request).await {
        Ok(handle) => {
            println!("Run created: {} ({})", handle.run_name, handle.run_id);
            println!("Status: {}", handle.status);
            Ok(())
        }
        Err(e) => anyhow::bail!("Submission failed: {e}"),
    }
}

fn config_gen_command(format: &str, output: Option<PathBuf>) -> Result<()> {
    let content = match format.to_lowercase().as_str() {
        "yaml" | "yml" => Config::example_yaml(),
        "toml" => Config::example_toml(),
        _ => anyhow::bail!("Unsupported format: {}. Use 'yaml' or 'toml'", format),
    };

    if let Some(path) = output {
        std::fs::write(&path, &content)?;
        println!("Configuration written to: {}", path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}
