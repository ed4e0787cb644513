mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, assign, classify, generate, pool, serve};
use terminal::{logging, print};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    logging::init(commands.verbose, commands.quiet);

    let quiet = commands.quiet;
    let result = match &commands.command {
        Commands::Generate(args) => {
            print::header("generating inventory", quiet);
            generate::generate(args, quiet).await
        }
        Commands::Assign(args) => assign::assign(args, quiet).await,
        Commands::Classify(args) => classify::classify(args, quiet),
        Commands::Pool(args) => pool::pool(args),
        Commands::Serve(args) => {
            print::header("query server", quiet);
            serve::serve(args).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
