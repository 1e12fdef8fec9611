//! Core records consumed by the file tree engine.
//!
//! These mirror what the host application stores; the engine only reads them.

use crate::token::Field;
use crate::tree::TreeDefinition;
use serde::{Deserialize, Serialize};

/// Entity type names that classify temporal entities. Anything else is an asset type.
pub const EPISODE_TYPE: &str = "Episode";
pub const SEQUENCE_TYPE: &str = "Sequence";
pub const SCENE_TYPE: &str = "Scene";
pub const SHOT_TYPE: &str = "Shot";

/// A production.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub file_tree: Option<TreeDefinition>,
}

/// Type of an entity: Shot, Sequence, Episode, Scene or an asset type such as Props.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
}

/// Shot, sequence, episode, scene or asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    pub project_id: String,
    pub entity_type_id: String,
    /// Shot -> sequence, sequence -> episode, scene -> sequence.
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub entity_id: String,
    pub task_type_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Software {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub file_extension: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputType {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
}

/// Placement of an asset inside a shot, scene or another asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetInstance {
    pub id: String,
    pub asset_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: u32,
    /// Set when the instance lives inside another asset.
    #[serde(default)]
    pub target_asset_id: Option<String>,
    /// Shot or scene the instance is placed in.
    #[serde(default)]
    pub scene_id: Option<String>,
}

impl AssetInstance {
    /// Zero-padded 4-digit number, e.g. `0002`.
    pub fn padded_number(&self) -> String {
        format!("{:04}", self.number)
    }
}

/// Shape of an entity as seen by the template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Episode,
    Sequence,
    Scene,
    Shot,
    Asset,
}

impl EntityKind {
    /// Classify an entity from the name of its entity type.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            EPISODE_TYPE => EntityKind::Episode,
            SEQUENCE_TYPE => EntityKind::Sequence,
            SCENE_TYPE => EntityKind::Scene,
            SHOT_TYPE => EntityKind::Shot,
            _ => EntityKind::Asset,
        }
    }

    /// Entity type name backing a temporal kind, `None` for assets.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            EntityKind::Episode => Some(EPISODE_TYPE),
            EntityKind::Sequence => Some(SEQUENCE_TYPE),
            EntityKind::Scene => Some(SCENE_TYPE),
            EntityKind::Shot => Some(SHOT_TYPE),
            EntityKind::Asset => None,
        }
    }
}

/// A record that can feed a `<Token.field>` placeholder.
pub trait NamedRecord {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    fn short_name(&self) -> Option<&str> {
        None
    }

    /// Value of the requested field, `None` when the record does not carry it.
    fn field_value(&self, field: Field) -> Option<String> {
        match field {
            Field::Id => Some(self.id().to_string()),
            Field::Name => Some(self.name().to_string()),
            Field::ShortName => self.short_name().map(str::to_string),
            Field::Number => None,
        }
    }
}

macro_rules! named_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NamedRecord for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }

                fn short_name(&self) -> Option<&str> {
                    self.short_name.as_deref().filter(|s| !s.is_empty())
                }
            }
        )*
    };
}

named_record!(Project, EntityType, Entity, Department, TaskType, Software, OutputType);

impl NamedRecord for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
