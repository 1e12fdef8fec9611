//! Folder paths and file names for working files, output files and asset
//! instance outputs.

use crate::directory::EntityDirectory;
use crate::error::{TreeError, TreeResult};
use crate::paths::{change_folder_path_separators, default_separator, join_path};
use crate::render::{RenderContext, Renderer};
use crate::style::{apply_style_preserving_uuids, slugify_preserving_uuids};
use crate::tree::{OUTPUT_MODE, TemplateKind, TreeDefinition, WORKING_MODE};
use crate::types::{
    AssetInstance, Entity, EntityKind, OutputType, Project, Software, Task, TaskType,
};
use serde::Serialize;
use tracing::debug;

/// What a path is built for.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// Working file of a task; the task's entity picks the template.
    Task(&'a Task),
    /// Output file of a shot, sequence, episode, scene or asset.
    Entity(&'a Entity),
    /// Output file of an asset instance placed in a temporal entity.
    Instance {
        instance: &'a AssetInstance,
        temporal_entity: &'a Entity,
    },
}

/// Optional references shared by every build operation.
#[derive(Debug, Clone)]
pub struct PathParams {
    pub mode: String,
    pub software: Option<Software>,
    pub output_type: Option<OutputType>,
    pub task_type: Option<TaskType>,
    pub name: String,
    pub representation: String,
    pub revision: u32,
    /// More than one element appends `_[1-N]` to file names.
    pub nb_elements: u32,
    pub sep: String,
}

impl Default for PathParams {
    fn default() -> Self {
        Self::working()
    }
}

impl PathParams {
    pub fn working() -> Self {
        Self {
            mode: WORKING_MODE.to_string(),
            software: None,
            output_type: None,
            task_type: None,
            name: String::new(),
            representation: String::new(),
            revision: 1,
            nb_elements: 1,
            sep: default_separator().to_string(),
        }
    }

    pub fn output() -> Self {
        Self {
            mode: OUTPUT_MODE.to_string(),
            ..Self::working()
        }
    }

    pub fn instance() -> Self {
        Self {
            name: "main".to_string(),
            ..Self::output()
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }

    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A folder path and file name built together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltPath {
    pub folder_path: String,
    pub file_name: String,
    pub path: String,
}

/// Subject resolved into a tree, a template kind and a render context.
struct Prepared {
    tree: TreeDefinition,
    kind: TemplateKind,
    ctx: RenderContext,
}

/// Template key for an entity of `kind`.
pub fn template_kind_for(kind: EntityKind) -> TemplateKind {
    match kind {
        EntityKind::Shot => TemplateKind::Shot,
        EntityKind::Sequence => TemplateKind::Sequence,
        EntityKind::Scene => TemplateKind::Scene,
        EntityKind::Episode => TemplateKind::Episode,
        EntityKind::Asset => TemplateKind::Asset,
    }
}

/// Template key for an asset instance.
pub fn template_kind_for_instance(instance: &AssetInstance) -> TemplateKind {
    if instance.target_asset_id.is_some() {
        TemplateKind::InstanceAsset
    } else {
        TemplateKind::Instance
    }
}

/// Builds paths from the tree stored on each subject's project.
pub struct PathBuilder<'a> {
    renderer: Renderer<'a>,
    fallback_tree: Option<&'a TreeDefinition>,
}

impl<'a> PathBuilder<'a> {
    pub fn new(renderer: Renderer<'a>) -> Self {
        Self {
            renderer,
            fallback_tree: None,
        }
    }

    /// Tree used for projects that carry none.
    pub fn with_fallback_tree(mut self, tree: &'a TreeDefinition) -> Self {
        self.fallback_tree = Some(tree);
        self
    }

    fn directory(&self) -> &'a dyn EntityDirectory {
        self.renderer.directory()
    }

    /// The project's tree, or the fallback.
    pub fn tree_for(&self, project: &Project) -> TreeResult<TreeDefinition> {
        project
            .file_tree
            .clone()
            .or_else(|| self.fallback_tree.cloned())
            .ok_or_else(|| TreeError::malformed_tree("No tree can be found for given project."))
    }

    fn prepare(&self, subject: Subject<'_>, params: &PathParams) -> TreeResult<Prepared> {
        let directory = self.directory();
        let mut ctx = RenderContext {
            software: params.software.clone(),
            output_type: params.output_type.clone(),
            task_type: params.task_type.clone(),
            name: params.name.clone(),
            representation: params.representation.clone(),
            revision: params.revision,
            ..RenderContext::default()
        };

        let (project, kind) = match subject {
            Subject::Task(task) => {
                let entity = directory
                    .entity(&task.entity_id)?
                    .ok_or_else(|| TreeError::entity_not_found(&task.entity_id))?;
                let kind = template_kind_for(directory.entity_kind(&entity)?);
                let project = directory.project_of(&entity)?;
                ctx.entity = Some(entity);
                ctx.task = Some(task.clone());
                (project, kind)
            }
            Subject::Entity(entity) => {
                let kind = template_kind_for(directory.entity_kind(entity)?);
                let project = directory.project_of(entity)?;
                ctx.entity = Some(entity.clone());
                (project, kind)
            }
            Subject::Instance {
                instance,
                temporal_entity,
            } => {
                let asset = directory
                    .entity(&instance.asset_id)?
                    .ok_or_else(|| TreeError::entity_not_found(&instance.asset_id))?;
                let project = directory.project_of(temporal_entity)?;
                ctx.entity = Some(temporal_entity.clone());
                ctx.asset_instance = Some(instance.clone());
                ctx.asset = Some(asset);
                (project, template_kind_for_instance(instance))
            }
        };

        debug!(project = %project.name, mode = %params.mode, template = %kind, "Selected template");
        Ok(Prepared {
            tree: self.tree_for(&project)?,
            kind,
            ctx,
        })
    }

    /// `root_path(mode)` followed by the styled, rendered folder template.
    pub fn build_folder_path(&self, subject: Subject<'_>, params: &PathParams) -> TreeResult<String> {
        let prepared = self.prepare(subject, params)?;
        let tree = &prepared.tree;
        let root_path = tree.root_path(&params.mode, &params.sep)?;
        let style = tree.folder_style(&params.mode)?;
        let template = tree.folder_template(&params.mode, prepared.kind)?;

        let rendered = self.renderer.render(template, &prepared.ctx, style)?;
        let folder_path = apply_style_preserving_uuids(&rendered, style);
        let folder_path = change_folder_path_separators(&folder_path, &params.sep);

        Ok(join_path(&root_path, &folder_path, ""))
    }

    /// Rendered file name template, slugified and styled as a whole.
    pub fn build_file_name(&self, subject: Subject<'_>, params: &PathParams) -> TreeResult<String> {
        let prepared = self.prepare(subject, params)?;
        let tree = &prepared.tree;
        let style = tree.file_name_style(&params.mode)?;
        let template = tree.file_name_template(&params.mode, prepared.kind)?;

        let rendered = self.renderer.render(template, &prepared.ctx, style)?;
        let mut file_name = slugify_preserving_uuids(&rendered, style);
        if params.nb_elements > 1 {
            file_name.push_str(&format!("_[1-{}]", params.nb_elements));
        }
        Ok(file_name)
    }

    pub fn build_file_path(&self, subject: Subject<'_>, params: &PathParams) -> TreeResult<BuiltPath> {
        let folder_path = self.build_folder_path(subject, params)?;
        let file_name = self.build_file_name(subject, params)?;
        let path = join_path(&folder_path, &file_name, &params.sep);
        Ok(BuiltPath {
            folder_path,
            file_name,
            path,
        })
    }

    // Working files

    pub fn working_folder_path(&self, task: &Task, params: &PathParams) -> TreeResult<String> {
        self.build_folder_path(Subject::Task(task), params)
    }

    pub fn working_file_name(&self, task: &Task, params: &PathParams) -> TreeResult<String> {
        self.build_file_name(Subject::Task(task), params)
    }

    pub fn working_file_path(&self, task: &Task, params: &PathParams) -> TreeResult<BuiltPath> {
        self.build_file_path(Subject::Task(task), params)
    }

    // Output files

    pub fn output_folder_path(&self, entity: &Entity, params: &PathParams) -> TreeResult<String> {
        self.build_folder_path(Subject::Entity(entity), params)
    }

    pub fn output_file_name(&self, entity: &Entity, params: &PathParams) -> TreeResult<String> {
        self.build_file_name(Subject::Entity(entity), params)
    }

    pub fn output_file_path(&self, entity: &Entity, params: &PathParams) -> TreeResult<BuiltPath> {
        self.build_file_path(Subject::Entity(entity), params)
    }

    // Asset instance outputs

    pub fn instance_folder_path(
        &self,
        instance: &AssetInstance,
        temporal_entity: &Entity,
        params: &PathParams,
    ) -> TreeResult<String> {
        self.build_folder_path(
            Subject::Instance {
                instance,
                temporal_entity,
            },
            params,
        )
    }

    pub fn instance_file_name(
        &self,
        instance: &AssetInstance,
        temporal_entity: &Entity,
        params: &PathParams,
    ) -> TreeResult<String> {
        self.build_file_name(
            Subject::Instance {
                instance,
                temporal_entity,
            },
            params,
        )
    }

    pub fn instance_file_path(
        &self,
        instance: &AssetInstance,
        temporal_entity: &Entity,
        params: &PathParams,
    ) -> TreeResult<BuiltPath> {
        self.build_file_path(
            Subject::Instance {
                instance,
                temporal_entity,
            },
            params,
        )
    }
}
