use log::debug;

use naraka_tournaments::cli::Command;
use naraka_tournaments::{handle_serve, handle_sync, handle_sync_competitions, interpret};

fn main() {
    sensible_env_logger::init!();

    let command = interpret();
    debug!("Running {:?}", command);

    let outcome = match command {
        Command::Serve { port } => handle_serve(port),
        Command::Sync => handle_sync(),
        Command::SyncCompetitions => handle_sync_competitions(),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
