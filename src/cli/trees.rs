//! Tree subcommands: show-tree and set-tree.

use clap::Args;

/// Arguments for the show-tree subcommand
#[derive(Args, Debug)]
pub struct ShowTreeArgs {
    /// Tree name (file stem of `<name>.json`)
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Arguments for the set-tree subcommand
#[derive(Args, Debug)]
pub struct SetTreeArgs {
    /// Project id
    #[arg(value_name = "PROJECT")]
    pub project_id: String,

    /// Tree name (default: the configured default tree)
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}
