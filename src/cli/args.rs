use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PAPER-EVAL: upload an answer script and question paper for grading
///
/// Sends both PDFs to the evaluation service, follows the evaluation log
/// as it runs and saves the graded script when it is done.
#[derive(Parser, Debug)]
#[command(name = "paper-eval")]
#[command(version = "0.1.0")]
#[command(about = "Submit answer scripts for evaluation and fetch the graded PDF")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a client config file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the service base address
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload both PDFs, follow the evaluation and download the result
    Evaluate(EvaluateArgs),

    /// Follow the log stream of an evaluation that is already running
    Logs(LogsArgs),

    /// Download the graded PDF of a finished evaluation
    Download(DownloadArgs),

    /// Generate a sample client config file
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// The student's answer script (PDF)
    #[arg(short, long)]
    pub answer_script: PathBuf,

    /// The question paper (PDF)
    #[arg(short, long)]
    pub question_paper: PathBuf,

    /// Directory to save the graded PDF into
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop after the evaluation finishes, without downloading
    #[arg(long)]
    pub no_download: bool,

    /// Print the final session state as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct LogsArgs {
    /// Evaluation ID returned by the upload
    pub evaluation_id: String,
}

#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Evaluation ID returned by the upload
    pub evaluation_id: String,

    /// Directory to save the graded PDF into
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output path for the config file
    #[arg(short, long, default_value = "client-config.yaml")]
    pub output: PathBuf,
}
