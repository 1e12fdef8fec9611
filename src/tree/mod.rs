//! Tree definitions: per-mode folder and file name templates.
//!
//! A tree document looks like:
//!
//! ```json
//! {
//!   "working": {
//!     "mountpoint": "/simple",
//!     "root": "productions",
//!     "folder_path": { "shot": "<Project>/shots/<Sequence>/<Shot>", "style": "lowercase" },
//!     "file_name": { "shot": "<Project>_<Shot>_<TaskType>", "style": "lowercase" }
//!   }
//! }
//! ```

mod store;

pub use store::{EMBEDDED_TREES, TreeSource, TreeStore};

use crate::error::{TreeError, TreeResult};
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Artist-in-progress files.
pub const WORKING_MODE: &str = "working";
/// Published files.
pub const OUTPUT_MODE: &str = "output";

/// Which folder/file name template applies to a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Shot,
    Asset,
    Sequence,
    Episode,
    Scene,
    Instance,
    InstanceAsset,
}

impl TemplateKind {
    pub fn key(&self) -> &'static str {
        match self {
            TemplateKind::Shot => "shot",
            TemplateKind::Asset => "asset",
            TemplateKind::Sequence => "sequence",
            TemplateKind::Episode => "episode",
            TemplateKind::Scene => "scene",
            TemplateKind::Instance => "instance",
            TemplateKind::InstanceAsset => "instance_asset",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "shot" => Some(TemplateKind::Shot),
            "asset" => Some(TemplateKind::Asset),
            "sequence" => Some(TemplateKind::Sequence),
            "episode" => Some(TemplateKind::Episode),
            "scene" => Some(TemplateKind::Scene),
            "instance" => Some(TemplateKind::Instance),
            "instance_asset" => Some(TemplateKind::InstanceAsset),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Templates keyed by entity kind, plus the style applied to their output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTemplates {
    #[serde(default)]
    pub style: Style,
    #[serde(flatten)]
    pub templates: BTreeMap<String, String>,
}

impl PathTemplates {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }
}

/// One rendering context (`working`, `output`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default)]
    pub folder_path: PathTemplates,
    #[serde(default)]
    pub file_name: PathTemplates,
}

/// A whole tree document: mode name to mode spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeDefinition {
    pub modes: BTreeMap<String, ModeSpec>,
}

impl TreeDefinition {
    /// Parse a tree document. `name` only labels the error.
    pub fn from_json_str(name: &str, content: &str) -> TreeResult<Self> {
        serde_json::from_str(content).map_err(|e| TreeError::invalid_tree_json(name, e))
    }

    pub fn mode(&self, mode: &str) -> TreeResult<&ModeSpec> {
        self.modes.get(mode).ok_or_else(|| {
            TreeError::malformed_tree(format!("Mode {} cannot be found on given tree.", mode))
        })
    }

    /// Check that every mode defines a mountpoint and a root.
    pub fn validate(&self) -> TreeResult<()> {
        for (name, spec) in &self.modes {
            if spec.mountpoint.is_none() || spec.root.is_none() {
                return Err(TreeError::malformed_tree(format!(
                    "Mode {} must define both mountpoint and root.",
                    name
                )));
            }
        }
        Ok(())
    }

    /// `mountpoint/root/`, or `mountpoint/` when root is empty, using `sep`.
    pub fn root_path(&self, mode: &str, sep: &str) -> TreeResult<String> {
        let spec = self.mode(mode)?;
        let (Some(mountpoint), Some(root)) = (&spec.mountpoint, &spec.root) else {
            return Err(TreeError::malformed_tree(format!(
                "Can't find given mode ({}) in given tree.",
                mode
            )));
        };
        if root.is_empty() {
            Ok(format!("{}{}", mountpoint, sep))
        } else {
            Ok(format!("{}{}{}{}", mountpoint, sep, root, sep))
        }
    }

    pub fn folder_template(&self, mode: &str, kind: TemplateKind) -> TreeResult<&str> {
        self.mode(mode)?.folder_path.get(kind.key()).ok_or_else(|| {
            TreeError::malformed_tree(format!(
                "No {} folder path template in mode {}.",
                kind, mode
            ))
        })
    }

    pub fn file_name_template(&self, mode: &str, kind: TemplateKind) -> TreeResult<&str> {
        self.mode(mode)?.file_name.get(kind.key()).ok_or_else(|| {
            TreeError::malformed_tree(format!(
                "No {} file name template in mode {}.",
                kind, mode
            ))
        })
    }

    pub fn folder_style(&self, mode: &str) -> TreeResult<Style> {
        Ok(self.mode(mode)?.folder_path.style)
    }

    pub fn file_name_style(&self, mode: &str) -> TreeResult<Style> {
        Ok(self.mode(mode)?.file_name.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> TreeDefinition {
        TreeDefinition::from_json_str(
            "test",
            r#"{
                "working": {
                    "mountpoint": "/simple",
                    "root": "productions",
                    "folder_path": {"shot": "<Project>/<Shot>", "style": "lowercase"},
                    "file_name": {"shot": "<Shot>_<TaskType>", "style": "uppercase"}
                },
                "output": {
                    "mountpoint": "/out",
                    "root": "",
                    "folder_path": {"asset": "<Asset>"},
                    "file_name": {"asset": "<Asset>"}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_root_path() {
        let tree = tree();
        assert_eq!(tree.root_path("working", "/").unwrap(), "/simple/productions/");
        assert_eq!(tree.root_path("output", "/").unwrap(), "/out/");
        assert_eq!(tree.root_path("working", "\\").unwrap(), "/simple\\productions\\");
    }

    #[test]
    fn test_missing_mode_is_malformed() {
        let err = tree().root_path("preview", "/").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::MalformedTree);
    }

    #[test]
    fn test_templates_and_styles() {
        let tree = tree();
        assert_eq!(
            tree.folder_template("working", TemplateKind::Shot).unwrap(),
            "<Project>/<Shot>"
        );
        assert_eq!(tree.folder_style("working").unwrap(), Style::Lowercase);
        assert_eq!(tree.file_name_style("working").unwrap(), Style::Uppercase);
        assert_eq!(tree.folder_style("output").unwrap(), Style::None);
        assert!(tree.folder_template("working", TemplateKind::Asset).is_err());
    }

    #[test]
    fn test_style_is_not_a_template() {
        let tree = tree();
        let working = tree.mode("working").unwrap();
        assert!(working.folder_path.get("style").is_none());
        assert_eq!(working.folder_path.templates.len(), 1);
    }

    #[test]
    fn test_validate_requires_mountpoint_and_root() {
        assert!(tree().validate().is_ok());
        let broken = TreeDefinition::from_json_str(
            "broken",
            r#"{"working": {"mountpoint": "/simple", "folder_path": {}, "file_name": {}}}"#,
        )
        .unwrap();
        assert!(broken.validate().is_err());
        assert!(broken.root_path("working", "/").is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = TreeDefinition::from_json_str("bad", "{ nope").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidTreeJson);
    }

    #[test]
    fn test_template_kind_keys() {
        for kind in [
            TemplateKind::Shot,
            TemplateKind::Asset,
            TemplateKind::Sequence,
            TemplateKind::Episode,
            TemplateKind::Scene,
            TemplateKind::Instance,
            TemplateKind::InstanceAsset,
        ] {
            assert_eq!(TemplateKind::from_key(kind.key()), Some(kind));
        }
    }
}
