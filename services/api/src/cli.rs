use crate::report::{run_model_info, run_score, ModelInfoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use interview_scoring::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Interview Scoring Service",
    about = "Score interview transcripts and run the scoring API from the command line",
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
    /// Score a single transcript and print the breakdown
    Score(ScoreArgs),
    /// Describe the loaded model artifact
    ModelInfo(ModelInfoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model_path: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::ModelInfo(args) => run_model_info(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["interview-scoring-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn score_requires_a_transcript_source() {
        assert!(Cli::try_parse_from(["interview-scoring-api", "score"]).is_err());
        assert!(Cli::try_parse_from([
            "interview-scoring-api",
            "score",
            "--text",
            "a",
            "--file",
            "b.txt"
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "interview-scoring-api",
            "score",
            "--text",
            "I built a rest api",
            "--level",
            "Senior",
            "--external-score",
            "70",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.level, "Senior");
                assert_eq!(args.role, "Software Engineer");
                assert_eq!(args.external_score, Some(70.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "interview-scoring-api",
            "serve",
            "--port",
            "9000",
            "--model-path",
            "model.json",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.model_path, Some(PathBuf::from("model.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
