//! Path guessing subcommands: guess-task and guess.

use crate::tree::TemplateKind;
use clap::{Args, ValueEnum};

/// Folder template a strict guess matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskPathKind {
    Shot,
    Asset,
    Sequence,
    Episode,
    Scene,
}

impl From<TaskPathKind> for TemplateKind {
    fn from(kind: TaskPathKind) -> Self {
        match kind {
            TaskPathKind::Shot => TemplateKind::Shot,
            TaskPathKind::Asset => TemplateKind::Asset,
            TaskPathKind::Sequence => TemplateKind::Sequence,
            TaskPathKind::Episode => TemplateKind::Episode,
            TaskPathKind::Scene => TemplateKind::Scene,
        }
    }
}

/// Arguments for the guess-task subcommand
#[derive(Args, Debug)]
pub struct GuessTaskArgs {
    /// Folder path to resolve
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Project id
    #[arg(long)]
    pub project: String,

    /// Template the path was built from
    #[arg(long, value_enum, default_value_t = TaskPathKind::Shot)]
    pub kind: TaskPathKind,

    /// Tree mode
    #[arg(long, default_value = "working")]
    pub mode: String,

    /// Path separator
    #[arg(long, default_value = "/")]
    pub sep: String,
}

/// Arguments for the guess subcommand
#[derive(Args, Debug)]
pub struct GuessArgs {
    /// Path to resolve
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Project id
    #[arg(long)]
    pub project: String,

    /// Path separator
    #[arg(long, default_value = "/")]
    pub sep: String,
}
