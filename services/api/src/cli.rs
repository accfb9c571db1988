use crate::commands::{
    run_about, run_analyze, run_batch, run_validate, AnalyzeArgs, BatchArgs, ValidateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_ai::error::AppError;
use credit_ai::scoring::ScalingMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Analysis",
    about = "Score credit applications against the exported approval model",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single applicant from command-line inputs
    Analyze(AnalyzeArgs),
    /// Score a CSV of pre-built feature records and export the results
    Batch(BatchArgs),
    /// Show the model card and the optional model comparison table
    About(ArtifactArgs),
    /// Evaluate the model on a labelled test set
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

/// Artifact overrides shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ArtifactArgs {
    /// Path to the classifier artifact (JSON)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Path to the scaler artifact (JSON)
    #[arg(long)]
    pub(crate) scaler: Option<PathBuf>,
    /// Path to the model comparison table (CSV)
    #[arg(long)]
    pub(crate) comparison: Option<PathBuf>,
    /// Whether the scaler runs before classification (apply | passthrough)
    #[arg(long)]
    pub(crate) scaling: Option<ScalingMode>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args),
        Command::Batch(args) => run_batch(args),
        Command::About(args) => run_about(args),
        Command::Validate(args) => run_validate(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["credit-ai-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn analyze_accepts_form_labels() {
        let cli = Cli::try_parse_from([
            "credit-ai-api",
            "analyze",
            "--income",
            "100",
            "--loan-amount",
            "500",
            "--cibil-score",
            "600",
            "--education",
            "Not Graduate",
            "--self-employed",
            "yes",
            "--scaling",
            "passthrough",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Analyze(args)) => {
                let applicant = args.applicant();
                assert_eq!(applicant.income_annum, 100.0);
                assert_eq!(applicant.loan_term, 10);
                assert_eq!(applicant.education.encoded(), 0);
                assert_eq!(applicant.self_employed.encoded(), 1);
                assert_eq!(args.artifacts.scaling, Some(ScalingMode::Passthrough));
            }
            other => panic!("expected analyze command, got {other:?}"),
        }
    }

    #[test]
    fn validate_requires_both_files() {
        assert!(Cli::try_parse_from(["credit-ai-api", "validate", "--features", "X.csv"]).is_err());
    }
}
