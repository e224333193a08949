use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::builder::FalseyValueParser;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use verteiler::{ApiKeys, CommitContext, DeploymentConfig, Error, Orchestrator, Result};

/// Deploy a built plugin or mod to every platform named in its deployment config
#[derive(Parser, Debug)]
#[command(name = "verteiler")]
#[command(version, about, long_about = None)]
struct Args {
    /// Deployment config, relative to the base path
    #[arg(long, env = "FV_CONFIG_PATH")]
    config_path: PathBuf,

    /// Directory the config and every path inside it are resolved against
    #[arg(long, env = "FV_BASE_PATH", default_value = ".")]
    base_path: PathBuf,

    /// Discord webhook notified after deploying
    #[arg(long, env = "FV_DISCORD_WEBHOOK_URL")]
    discord_webhook_url: Option<String>,

    /// Repository URL used for commit links
    #[arg(long, env = "FV_GITHUB_REPO_URL")]
    github_repo_url: String,

    #[arg(long, env = "FV_COMMIT_SHA")]
    commit_sha: String,

    /// Falls back to FV_MESSAGE_SHA when unset
    #[arg(long, env = "FV_COMMIT_MESSAGE")]
    commit_message: Option<String>,

    /// Fail on missing API keys and exit non-zero when any platform fails
    #[arg(long, env = "FV_STRICT", value_parser = FalseyValueParser::new())]
    strict: bool,
}

fn commit_message(args: &Args) -> Result<String> {
    args.commit_message
        .clone()
        .or_else(|| std::env::var("FV_MESSAGE_SHA").ok())
        .ok_or_else(|| Error::missing_input("FV_COMMIT_MESSAGE is required"))
}

async fn run(args: Args) -> Result<bool> {
    let message = commit_message(&args)?;
    let commit = Arc::new(CommitContext::new(
        args.github_repo_url.as_str(),
        args.commit_sha.as_str(),
        message,
    ));

    info!(path = %args.config_path.display(), "reading config");
    let config = DeploymentConfig::read_from_path(args.base_path.clone(), &args.config_path).await?;
    info!(project = %config.project_name, "read config");

    let orchestrator = Orchestrator::new(commit, args.strict).with_webhook(args.discord_webhook_url);
    let report = orchestrator.run(&config, &ApiKeys::from_env()).await?;

    Ok(report.is_success() || !orchestrator.is_strict())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("deployment failed in strict mode");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "deployment aborted");
            ExitCode::FAILURE
        }
    }
}
