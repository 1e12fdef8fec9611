//! Seed subcommand for file-tree CLI
//!
//! Loads projects, entities, task types and tasks from a JSON fixture into
//! the entity database.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the seed subcommand
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Path to the fixture file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Assign the default tree to imported projects that have none
    #[arg(long)]
    pub assign_default_tree: bool,
}
