//! Odyssey CLI binary.
//!
//! This binary provides command-line access to Odyssey:
//! - Play a new hero's journey interactively
//! - Resume or export a saved journey
//! - List saved journeys

use clap::Parser;
use odyssey::OdysseyConfig;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, export_session, list_sessions, play, resume};

    // Parse command-line arguments
    let cli = Cli::parse();

    // OPENAI_API_KEY may live in .env
    dotenvy::dotenv().ok();

    odyssey::init_tracing(cli.verbose)?;
    let config = OdysseyConfig::load()?;

    // Execute the requested command
    match cli.command {
        Commands::Play(args) => {
            play(args, &config).await?;
        }

        Commands::Resume { session_id } => {
            resume(&session_id, &config).await?;
        }

        Commands::Export { session_id, out } => {
            export_session(&session_id, &out, &config).await?;
        }

        Commands::Sessions => {
            list_sessions(&config).await?;
        }
    }

    Ok(())
}
