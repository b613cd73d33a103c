//! CLI command definitions.

use clap::{Parser, Subcommand};
use odyssey_core::AgeBand;
use std::path::PathBuf;

/// Odyssey - interactive hero's journey stories
#[derive(Parser, Debug)]
#[command(name = "odyssey")]
#[command(about = "Interactive hero's journey stories, told and illustrated by hosted models", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new journey; missing hero details are asked for interactively
    Play(PlayArgs),

    /// Continue a saved journey
    Resume {
        /// Session id printed when the journey was saved
        session_id: String,
    },

    /// Write a saved journey to a Markdown file with its illustrations
    Export {
        /// Session to export
        session_id: String,

        /// Output Markdown file
        #[arg(long, short)]
        out: PathBuf,
    },

    /// List saved journeys
    Sessions,
}

/// Hero and presentation options for `play`.
#[derive(clap::Args, Debug, Default)]
pub struct PlayArgs {
    /// Hero's name
    #[arg(long)]
    pub name: Option<String>,

    /// Kind of creature the hero is
    #[arg(long)]
    pub creature: Option<String>,

    /// Something that makes the hero stand out
    #[arg(long)]
    pub feature: Option<String>,

    /// What the hero struggles with
    #[arg(long)]
    pub challenge: Option<String>,

    /// What the hero wants to achieve
    #[arg(long)]
    pub goal: Option<String>,

    /// Reader age band (young, middle, teen)
    #[arg(long)]
    pub age_band: Option<AgeBand>,

    /// Illustration style, e.g. "Watercolor"
    #[arg(long)]
    pub art_style: Option<String>,

    /// Skip illustrations
    #[arg(long)]
    pub no_images: bool,
}
