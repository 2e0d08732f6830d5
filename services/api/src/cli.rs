use crate::demo::{run_demo, run_definitions_list, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use noticeworks::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "NoticeWorks",
    about = "Run and demonstrate the possession notice service from the command line",
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
    /// Inspect the questionnaire and rule definitions this build ships
    Definitions {
        #[command(subcommand)]
        command: DefinitionsCommand,
    },
    /// Walk an England rent arrears case end to end on the command line
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum DefinitionsCommand {
    /// Load every embedded definition and report its version and contents
    List,
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
        Command::Definitions {
            command: DefinitionsCommand::List,
        } => run_definitions_list(),
        Command::Demo(args) => run_demo(args),
    }
}
