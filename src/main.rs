mod cli;
mod client;
mod error;
mod session;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Args, ClientConfig, Command};
use session::{EvaluationSession, FileSlot, SelectedFile, SessionStatus};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let _subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = load_config(&args)?;

    match args.command {
        Command::Evaluate(evaluate_args) => {
            run_evaluation(&config, evaluate_args).await?;
        }
        Command::Logs(logs_args) => {
            follow_logs(&config, logs_args).await?;
        }
        Command::Download(download_args) => {
            download_result(&config, download_args).await?;
        }
        Command::Init(init_args) => {
            generate_sample_config(init_args)?;
        }
    }

    Ok(())
}

/// Config file (if any), then command-line overrides
fn load_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading client config from {:?}", path);
            ClientConfig::load(path)?
        }
        None => ClientConfig::default(),
    };

    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.clone());
    }

    Ok(config)
}

async fn run_evaluation(config: &ClientConfig, args: cli::EvaluateArgs) -> Result<()> {
    let mut session = EvaluationSession::new(config)?;

    session
        .select_file(FileSlot::AnswerScript, SelectedFile::from_path(&args.answer_script))
        .context(format!("Cannot use {:?} as the answer script", args.answer_script))?;
    session
        .select_file(FileSlot::QuestionPaper, SelectedFile::from_path(&args.question_paper))
        .context(format!("Cannot use {:?} as the question paper", args.question_paper))?;

    println!("{}", SessionStatus::Uploading.message());
    let evaluation_id = session.start_upload().await?;

    println!("Evaluation ID: {}", evaluation_id);
    println!("{}", session.status().message());

    let status = session.follow_logs(|line| println!("  {}", line)).await;
    match session.snapshot().duration_seconds() {
        Some(seconds) => println!("{} ({}s)", status.message(), seconds),
        None => println!("{}", status.message()),
    }

    if status == SessionStatus::Completed && !args.no_download {
        let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());
        // On failure the message stays on the session and is reported below.
        if let Ok(path) = session.download_result(&output_dir).await {
            println!("Evaluated script saved to: {:?}", path);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    }

    if let Some(error) = session.error() {
        bail!("{}", error);
    }

    Ok(())
}

async fn follow_logs(config: &ClientConfig, args: cli::LogsArgs) -> Result<()> {
    let mut session = EvaluationSession::new(config)?;
    session.follow_job(&args.evaluation_id)?;

    println!("Following evaluation {}", args.evaluation_id);
    let status = session.follow_logs(|line| println!("  {}", line)).await;
    println!("{}", status.message());

    if status == SessionStatus::Failed {
        bail!(
            "{}",
            session.error().unwrap_or(SessionStatus::Failed.message())
        );
    }

    Ok(())
}

async fn download_result(config: &ClientConfig, args: cli::DownloadArgs) -> Result<()> {
    let mut session = EvaluationSession::new(config)?;
    session.attach_job(&args.evaluation_id);

    let output_dir: PathBuf = args.output.unwrap_or_else(|| config.output_dir.clone());
    let path = session.download_result(&output_dir).await?;

    println!("Evaluated script saved to: {:?}", path);

    Ok(())
}

fn generate_sample_config(args: cli::InitArgs) -> Result<()> {
    let config = ClientConfig::sample();

    config.save(&args.output)?;
    println!("Generated sample config at: {:?}", args.output);

    Ok(())
}
