use crate::demo::{run_demo, run_schema, run_score, DemoArgs, SchemaArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use cosmic_beats::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "CosmicBeats Completion Engine",
    about = "Score profile completion and issue BeatCoin rewards from the command line",
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
    /// Print a completion report for a profile document
    Score(ScoreArgs),
    /// List the fields a role must fill
    Schema(SchemaArgs),
    /// Walk a sample DJ profile through successive edits and show the rewards it earns
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Schema(args) => run_schema(args),
        Command::Demo(args) => run_demo(args),
    }
}
