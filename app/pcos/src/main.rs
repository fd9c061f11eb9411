use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pcos::commands::{self, InspectArgs, PredictArgs};
use pcos::config::{init_logging, ServeArgs, ServeConfig};
use pcos::server::{self, AppState};
use pcos::sessions::SessionStore;
use pcos::AppError;

#[derive(Debug, Parser)]
#[command(
    name = "pcos",
    version,
    about = "PCOS risk prediction form backed by a trained classifier",
    long_about = "pcos serves a web form that collects clinical measurements, runs them\n\
        through a trained classifier and shows the predicted class with its\n\
        probabilities, a recommendation and the per-session prediction history.\n\n\
        EXAMPLES:\n\
        \n  pcos serve --model assets/demo_bundle.json        Start the web form\n\
        \n  pcos inspect --model assets/demo_bundle.json      List the model's features\n\
        \n  pcos predict --model m.json --set BMI=27,4        Predict from the command line"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the prediction form over HTTP
    Serve(ServeArgs),
    /// Describe a model bundle: features, controls and importances
    Inspect(InspectArgs),
    /// Run a single prediction and print the result
    Predict(PredictArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("{err:?}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Serve(args) => {
            let config = ServeConfig::from_args(&args)?;
            let controller = commands::load_controller(&args.model)?;
            let state = AppState {
                controller: Arc::new(controller),
                sessions: Arc::new(SessionStore::new(config.session_ttl)),
            };
            server::serve(&config, state).await
        }
        Command::Inspect(args) => commands::inspect(&args, &mut io::stdout().lock()),
        Command::Predict(args) => commands::predict(&args, &mut io::stdout().lock()),
    }
}
