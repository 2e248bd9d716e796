use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Naraka tournament data sync backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the REST API server
    Serve {
        /// Port number (optional, defaults to 5002)
        #[arg(short, long, default_value_t = 5002)]
        port: u16,
    },
    /// Sync competitions, stages, teams, scores and stats from upstream
    Sync,
    /// Sync the competition list only
    SyncCompetitions,
}
