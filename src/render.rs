//! Token rendering: substitute `<Token.field>` placeholders from a context.

use crate::config::RenderConfig;
use crate::directory::EntityDirectory;
use crate::error::{TreeError, TreeResult};
use crate::style::{Style, slugify};
use crate::token::{Field, TokenType, placeholders};
use crate::types::{
    AssetInstance, Entity, EntityKind, NamedRecord, OutputType, Software, Task, TaskType,
};
use tracing::debug;

/// Zero-padded 3-digit revision folder, e.g. `003`.
pub fn get_folder_from_revision(revision: u32) -> String {
    format!("{:03}", revision)
}

/// Fallback records for `<Software>` and `<OutputType>` when the caller gives none.
pub trait DefaultsProvider {
    fn default_software(&self) -> Software;
    fn default_output_type(&self) -> OutputType;
}

/// Defaults fixed at construction, usually from `RenderConfig`.
#[derive(Debug, Clone)]
pub struct StaticDefaults {
    pub software: Software,
    pub output_type: OutputType,
}

impl StaticDefaults {
    pub fn from_config(config: &RenderConfig) -> Self {
        let software = &config.default_software;
        Self {
            software: Software {
                id: String::new(),
                name: software.name.clone(),
                short_name: Some(software.short_name.clone()),
                file_extension: Some(software.file_extension.clone()),
            },
            output_type: OutputType {
                id: String::new(),
                name: config.default_output_type.clone(),
                short_name: None,
            },
        }
    }
}

impl Default for StaticDefaults {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl DefaultsProvider for StaticDefaults {
    fn default_software(&self) -> Software {
        self.software.clone()
    }

    fn default_output_type(&self) -> OutputType {
        self.output_type.clone()
    }
}

/// Everything a template may draw from. Built per render call.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Shot, sequence, episode, scene or asset being named.
    pub entity: Option<Entity>,
    pub task: Option<Task>,
    pub task_type: Option<TaskType>,
    pub software: Option<Software>,
    pub output_type: Option<OutputType>,
    pub asset_instance: Option<AssetInstance>,
    /// Overrides `entity` for `<Asset>` and `<AssetType>` in instance paths.
    pub asset: Option<Entity>,
    pub name: String,
    pub representation: String,
    pub revision: u32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            entity: None,
            task: None,
            task_type: None,
            software: None,
            output_type: None,
            asset_instance: None,
            asset: None,
            name: String::new(),
            representation: String::new(),
            revision: 1,
        }
    }
}

impl RenderContext {
    pub fn for_entity(entity: Entity) -> Self {
        Self {
            entity: Some(entity),
            ..Self::default()
        }
    }
}

/// Rendering policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Fail with `UNRESOLVED_TOKEN` instead of leaving the placeholder in place.
    pub strict_tokens: bool,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            strict_tokens: config.strict_tokens,
        }
    }
}

/// Renders templates against a directory and a defaults provider.
pub struct Renderer<'a> {
    directory: &'a dyn EntityDirectory,
    defaults: &'a dyn DefaultsProvider,
    options: RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(
        directory: &'a dyn EntityDirectory,
        defaults: &'a dyn DefaultsProvider,
        options: RenderOptions,
    ) -> Self {
        Self {
            directory,
            defaults,
            options,
        }
    }

    pub fn directory(&self) -> &'a dyn EntityDirectory {
        self.directory
    }

    /// Substitute every placeholder of `template`.
    ///
    /// Values are slugified then styled, except `id` fields which are inserted
    /// verbatim. A placeholder whose value cannot be found is left as written
    /// unless strict tokens are enabled.
    pub fn render(&self, template: &str, ctx: &RenderContext, style: Style) -> TreeResult<String> {
        let mut rendered = template.to_string();

        for placeholder in placeholders(template) {
            let token_type = placeholder.token_type().ok_or_else(|| {
                TreeError::malformed_tree(format!("Unknown data type: {}.", placeholder.data_type))
            })?;

            match self.resolve(token_type, placeholder.field, ctx)? {
                Some(value) => {
                    let text = if placeholder.field == Field::Id {
                        value
                    } else {
                        style.apply(&slugify(&value))
                    };
                    rendered = rendered.replace(&placeholder.source(), &text);
                }
                None if self.options.strict_tokens => {
                    return Err(TreeError::unresolved_token(&placeholder.raw, template));
                }
                None => {
                    debug!(token = %placeholder.raw, template, "Leaving unresolved token in place");
                }
            }
        }

        Ok(rendered)
    }

    /// Value of one token, `None` when the context cannot supply it.
    pub fn resolve(
        &self,
        token_type: TokenType,
        field: Field,
        ctx: &RenderContext,
    ) -> TreeResult<Option<String>> {
        let value = match token_type {
            TokenType::Project => {
                let entity = required_entity(ctx.entity.as_ref().or(ctx.asset.as_ref()), token_type)?;
                self.directory.project_of(entity)?.field_value(field)
            }
            TokenType::Episode => self.hierarchy(ctx, EntityKind::Episode, field)?,
            TokenType::Sequence => self.hierarchy(ctx, EntityKind::Sequence, field)?,
            TokenType::Scene => self.hierarchy(ctx, EntityKind::Scene, field)?,
            TokenType::Shot => self.hierarchy(ctx, EntityKind::Shot, field)?,
            TokenType::AssetType => {
                let asset = required_entity(ctx.asset.as_ref().or(ctx.entity.as_ref()), token_type)?;
                self.directory.entity_type_of(asset)?.field_value(field)
            }
            TokenType::Asset => {
                let asset = required_entity(ctx.asset.as_ref().or(ctx.entity.as_ref()), token_type)?;
                asset.field_value(field)
            }
            TokenType::Department => match self.task_type(ctx)? {
                Some(task_type) => match task_type.department_id.as_deref() {
                    Some(department_id) => self
                        .directory
                        .department(department_id)?
                        .and_then(|d| d.field_value(field))
                        .or_else(|| Some(String::new())),
                    None => Some(String::new()),
                },
                None => Some(String::new()),
            },
            TokenType::TaskType => Some(
                self.task_type(ctx)?
                    .and_then(|t| t.field_value(field))
                    .unwrap_or_default(),
            ),
            TokenType::Task => ctx.task.as_ref().and_then(|t| t.field_value(field)),
            TokenType::Software => ctx
                .software
                .clone()
                .unwrap_or_else(|| self.defaults.default_software())
                .field_value(field),
            TokenType::OutputType => ctx
                .output_type
                .clone()
                .unwrap_or_else(|| self.defaults.default_output_type())
                .field_value(field),
            TokenType::Instance => ctx.asset_instance.as_ref().map(|instance| match field {
                Field::Name => instance
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| instance.padded_number()),
                _ => instance.padded_number(),
            }),
            TokenType::Representation => Some(ctx.representation.clone()),
            TokenType::Name | TokenType::OutputFile | TokenType::WorkingFile => {
                Some(ctx.name.clone())
            }
            TokenType::Version | TokenType::Revision => {
                Some(get_folder_from_revision(ctx.revision))
            }
            TokenType::TemporalEntity => {
                required_entity(ctx.entity.as_ref(), token_type)?.field_value(field)
            }
            TokenType::TemporalEntityType => {
                let entity = required_entity(ctx.entity.as_ref(), token_type)?;
                self.directory
                    .entity_type_of(entity)?
                    .field_value(field)
                    .map(|v| if field == Field::Id { v } else { v.to_lowercase() })
            }
        };
        Ok(value)
    }

    /// Explicit task type, else the task's own.
    fn task_type(&self, ctx: &RenderContext) -> TreeResult<Option<TaskType>> {
        if let Some(ref task_type) = ctx.task_type {
            return Ok(Some(task_type.clone()));
        }
        match ctx.task {
            Some(ref task) => self.directory.task_type(&task.task_type_id),
            None => Ok(None),
        }
    }

    /// Episode, sequence, scene or shot the contextual entity belongs to.
    fn hierarchy(
        &self,
        ctx: &RenderContext,
        kind: EntityKind,
        field: Field,
    ) -> TreeResult<Option<String>> {
        let token_type = match kind {
            EntityKind::Episode => TokenType::Episode,
            EntityKind::Sequence => TokenType::Sequence,
            EntityKind::Scene => TokenType::Scene,
            _ => TokenType::Shot,
        };
        let entity = required_entity(ctx.entity.as_ref(), token_type)?;
        let found = self.directory.ancestor_of_kind(entity, kind)?.ok_or_else(|| {
            TreeError::malformed_tree(format!(
                "Entity {} has no {} for <{}>.",
                entity.name,
                kind.type_name().unwrap_or("parent"),
                token_type
            ))
        })?;
        Ok(found.field_value(field))
    }
}

fn required_entity(entity: Option<&Entity>, token_type: TokenType) -> TreeResult<&Entity> {
    entity.ok_or_else(|| {
        TreeError::malformed_tree(format!("Given entity is null for <{}>.", token_type))
    })
}
