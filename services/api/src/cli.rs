use crate::export::{run_export, ExportArgs};
use crate::report::{
    run_groups, run_recalculate, run_report, GroupsArgs, RecalculateArgs, ReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use peer_review::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Peer Review Analyzer",
    about = "Score Canvas peer-review exports and audit grader behaviour",
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
    /// Score an export and print work scores, flags and statistics
    Report(ReportArgs),
    /// Re-score graders with approved or rejected comment keywords
    Recalculate(RecalculateArgs),
    /// Summarize scores per roster group
    Groups(GroupsArgs),
    /// Write student or grader scores to a CSV file
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured scoring scheme (penalty or bonus)
    #[arg(long)]
    pub(crate) scheme: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Recalculate(args) => run_recalculate(args),
        Command::Groups(args) => run_groups(args),
        Command::Export(args) => run_export(args),
    }
}
