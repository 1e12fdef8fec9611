//! Path building subcommands: working-path, output-path, instance-path.

use crate::builder::PathParams;
use crate::types::{OutputType, Software};
use clap::Args;

/// Options shared by every path building subcommand
#[derive(Args, Debug, Clone)]
pub struct PathOptions {
    /// Tree mode (default: working for tasks, output otherwise)
    #[arg(long)]
    pub mode: Option<String>,

    /// Revision rendered for <Version>/<Revision>
    #[arg(long, default_value_t = 1)]
    pub revision: u32,

    /// Free name rendered for <Name>
    #[arg(long)]
    pub name: Option<String>,

    /// Representation rendered for <Representation>
    #[arg(long, default_value = "")]
    pub representation: String,

    /// Software name (default: configured default software)
    #[arg(long)]
    pub software: Option<String>,

    /// Output type name (default: configured default output type)
    #[arg(long)]
    pub output_type: Option<String>,

    /// Number of elements; more than one appends `_[1-N]` to the file name
    #[arg(long, default_value_t = 1)]
    pub nb_elements: u32,

    /// Path separator (default: platform separator)
    #[arg(long)]
    pub sep: Option<String>,
}

impl PathOptions {
    /// Apply these options on top of `base`.
    pub fn to_params(&self, base: PathParams) -> PathParams {
        let mut params = base;
        if let Some(ref mode) = self.mode {
            params.mode = mode.clone();
        }
        if let Some(ref name) = self.name {
            params.name = name.clone();
        }
        if let Some(ref sep) = self.sep {
            params.sep = sep.clone();
        }
        params.revision = self.revision;
        params.representation = self.representation.clone();
        params.nb_elements = self.nb_elements;
        params.software = self.software.as_ref().map(|name| Software {
            id: String::new(),
            name: name.clone(),
            short_name: None,
            file_extension: None,
        });
        params.output_type = self.output_type.as_ref().map(|name| OutputType {
            id: String::new(),
            name: name.clone(),
            short_name: None,
        });
        params
    }
}

/// Arguments for the working-path subcommand
#[derive(Args, Debug)]
pub struct WorkingPathArgs {
    /// Task id
    #[arg(value_name = "TASK")]
    pub task_id: String,

    #[command(flatten)]
    pub path: PathOptions,
}

/// Arguments for the output-path subcommand
#[derive(Args, Debug)]
pub struct OutputPathArgs {
    /// Entity id (shot, sequence, episode, scene or asset)
    #[arg(value_name = "ENTITY")]
    pub entity_id: String,

    /// Task type id rendered for <TaskType>/<Department>
    #[arg(long)]
    pub task_type: Option<String>,

    #[command(flatten)]
    pub path: PathOptions,
}

/// Arguments for the instance-path subcommand
#[derive(Args, Debug)]
pub struct InstancePathArgs {
    /// Asset instance id
    #[arg(value_name = "INSTANCE")]
    pub instance_id: String,

    /// Temporal entity (shot or scene) the instance output belongs to
    #[arg(value_name = "ENTITY")]
    pub temporal_entity_id: String,

    /// Task type id rendered for <TaskType>/<Department>
    #[arg(long)]
    pub task_type: Option<String>,

    #[command(flatten)]
    pub path: PathOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> PathOptions {
        PathOptions {
            mode: None,
            revision: 4,
            name: None,
            representation: String::new(),
            software: Some("blender".into()),
            output_type: None,
            nb_elements: 1,
            sep: Some("/".into()),
        }
    }

    #[test]
    fn test_to_params_keeps_base_defaults() {
        let params = options().to_params(PathParams::instance());
        assert_eq!(params.mode, "output");
        assert_eq!(params.name, "main");
        assert_eq!(params.revision, 4);
        assert_eq!(params.sep, "/");
        assert_eq!(params.software.map(|s| s.name).as_deref(), Some("blender"));
        assert!(params.output_type.is_none());
    }

    #[test]
    fn test_to_params_overrides_mode() {
        let mut opts = options();
        opts.mode = Some("output".into());
        assert_eq!(opts.to_params(PathParams::working()).mode, "output");
    }
}
