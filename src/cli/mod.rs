mod args;
mod config;

pub use args::{Args, Command, DownloadArgs, EvaluateArgs, InitArgs, LogsArgs};
pub use config::{ClientConfig, CredentialsMode};
