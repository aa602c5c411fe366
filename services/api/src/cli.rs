use crate::demo::{run_demo, run_drain, run_lookup, DemoArgs, DrainArgs, LookupArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use passline::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Passline",
    about = "Serve and query admission rankings and drain-scenario projections",
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
    /// Show where an applicant currently passes, section by section
    Lookup(LookupArgs),
    /// Print the drain-scenario table for a heading
    Drain(DrainArgs),
    /// Walk every applicant in the dataset through the primary and drained scenarios
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
    /// JSON dataset to serve instead of APP_DATA_PATH or the bundled demo data
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Lookup(args) => run_lookup(args),
        Command::Drain(args) => run_drain(args),
        Command::Demo(args) => run_demo(args),
    }
}
