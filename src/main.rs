use anyhow::{Context as _, Result};
use llm_processors::cli::commands::{RunCommand, ValidateCommand};
use llm_processors::cli::output::*;
use llm_processors::cli::{Cli, Command};
use llm_processors::core::{Context, Pipeline, PipelineConfig, PipelineError};
use llm_processors::llm::{CommandClient, EchoClient, LlmClient, LlmClientConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let success = match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn llm_client(cmd: &RunCommand) -> Arc<dyn LlmClient> {
    match &cmd.llm_command {
        Some(program) => {
            let config =
                LlmClientConfig::new().with_timeout(Duration::from_secs(cmd.llm_timeout_secs));
            Arc::new(CommandClient::new(program.as_str(), config))
        }
        None => Arc::new(EchoClient::new()),
    }
}

async fn run_pipeline(cmd: &RunCommand) -> Result<bool> {
    let config = PipelineConfig::from_file(&cmd.file).context("Failed to load pipeline config")?;
    let mut pipeline = config.build(llm_client(cmd))?;

    println!(
        "{} Loaded pipeline: {} ({} processors)",
        INFO,
        style(pipeline.name()).bold(),
        pipeline.len()
    );

    let initial_data = cmd.initial_data();
    for (key, value) in &initial_data {
        println!("{} Variable: {} = {}", INFO, style(key).cyan(), style(value).dim());
    }

    if !cmd.json {
        pipeline.add_event_handler(|event| println!("{}", format_execution_event(event)));
    }

    println!();
    let context = Context::with_data(initial_data);
    let result = if cmd.validate {
        pipeline.execute_validated(context).await
    } else {
        pipeline.execute(context).await
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(PipelineError::Validation(errors)) => {
            println!("{} Wiring validation failed:", CROSS);
            for e in &errors {
                println!("  {}", style(e).red());
            }
            return Ok(false);
        }
        Err(e) => {
            error!("{}", e);
            println!("\n{} {} {}", CROSS, style(pipeline.name()).bold(), style("aborted").red());
            return Ok(false);
        }
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!();
        for run in &outcome.results {
            println!("{}", format_run(run));
        }
        println!(
            "\n{} {} {}",
            if outcome.is_success() { CHECK } else { CROSS },
            style(pipeline.name()).bold(),
            format_status(outcome.status)
        );
    }

    Ok(outcome.is_success())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<bool> {
    println!("{} Validating pipeline...", INFO);

    let config = match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => config,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            return Ok(false);
        }
    };

    let pipeline = config.build(Arc::new(EchoClient::new()))?;
    let errors = pipeline.validate_pipeline();

    println!("  Name: {}", style(pipeline.name()).bold());
    println!("  Type: {}", style(format!("{:?}", pipeline.kind()).to_lowercase()).cyan());
    println!("  Processors: {}", style(pipeline.len()).cyan());
    for processor in pipeline.processors() {
        println!(
            "    {} {} -> {}",
            style(processor.name()).bold(),
            style(processor.input_key().unwrap_or("-")).dim(),
            style(processor.output_key().unwrap_or("-")).dim()
        );
    }

    if errors.is_empty() {
        println!("{} Pipeline configuration is valid!", CHECK);
    } else {
        println!("{} Wiring problems:", WARN);
        for e in &errors {
            println!("  {}", style(e).yellow());
        }
    }

    if cmd.json {
        let data = serde_json::json!({
            "config": config,
            "wiring_errors": errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("\n{}", serde_json::to_string_pretty(&data)?);
    }

    Ok(errors.is_empty())
}
