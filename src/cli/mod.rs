//! CLI command definitions for file-tree
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod guess;
pub mod paths;
pub mod seed;
pub mod trees;

use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use guess::{GuessArgs, GuessTaskArgs};
use paths::{InstancePathArgs, OutputPathArgs, WorkingPathArgs};
use seed::SeedArgs;
use trees::{SetTreeArgs, ShowTreeArgs};

/// Render production file paths from studio templates and guess entities back from paths
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Folder holding tree documents (overrides config)
    #[arg(long, global = true)]
    pub trees_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available tree documents
    Trees,

    /// Print a tree document
    ShowTree(ShowTreeArgs),

    /// Load entities from a JSON fixture into the database
    Seed(SeedArgs),

    /// Assign a tree document to a project
    SetTree(SetTreeArgs),

    /// Build the working file path of a task
    WorkingPath(WorkingPathArgs),

    /// Build the output file path of an entity
    OutputPath(OutputPathArgs),

    /// Build the output file path of an asset instance
    InstancePath(InstancePathArgs),

    /// Find the task a working folder path belongs to
    GuessTask(GuessTaskArgs),

    /// List every template reading of a path
    Guess(GuessArgs),
}
