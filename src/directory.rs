//! Entity lookups the engine delegates to its host.
//!
//! The engine never owns entity storage. Rendering needs by-id reads (the
//! project of an entity, the sequence of a shot, the task type of a task) and
//! path guessing needs by-name finders. All name matching is case-insensitive
//! and exact.

use crate::error::{ErrorCode, TreeError, TreeResult};
use crate::types::{
    AssetInstance, Department, Entity, EntityKind, EntityType, Project, Task, TaskType,
};
use serde::{Deserialize, Serialize};

/// Guard against parent cycles in badly formed data.
const MAX_ANCESTRY_DEPTH: usize = 16;

/// How an entity lookup constrains `parent_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentScope<'a> {
    /// Parent is not checked.
    Any,
    /// Entity must have no parent.
    Root,
    /// Entity must be a direct child of this id.
    Of(&'a str),
}

impl<'a> ParentScope<'a> {
    /// `Of(id)` when an id is known, otherwise `Any`.
    pub fn of_or_any(id: Option<&'a str>) -> Self {
        id.map(ParentScope::Of).unwrap_or(ParentScope::Any)
    }

    pub fn matches(&self, parent_id: Option<&str>) -> bool {
        match self {
            ParentScope::Any => true,
            ParentScope::Root => parent_id.is_none(),
            ParentScope::Of(id) => parent_id == Some(*id),
        }
    }
}

/// Criteria for `EntityDirectory::find_entity`.
#[derive(Debug, Clone, Copy)]
pub struct EntityQuery<'a> {
    pub project_id: &'a str,
    pub entity_type_id: Option<&'a str>,
    pub parent: ParentScope<'a>,
    pub name: &'a str,
}

/// Case-insensitive exact name comparison used by every finder.
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Read-only entity lookups backing rendering and path guessing.
pub trait EntityDirectory {
    fn project(&self, id: &str) -> TreeResult<Option<Project>>;
    fn find_project(&self, name: &str) -> TreeResult<Option<Project>>;

    fn entity(&self, id: &str) -> TreeResult<Option<Entity>>;
    fn find_entity(&self, query: &EntityQuery<'_>) -> TreeResult<Option<Entity>>;

    fn entity_type(&self, id: &str) -> TreeResult<Option<EntityType>>;
    fn find_entity_type(&self, name: &str) -> TreeResult<Option<EntityType>>;

    fn department(&self, id: &str) -> TreeResult<Option<Department>>;
    fn find_department(&self, name: &str) -> TreeResult<Option<Department>>;

    fn task_type(&self, id: &str) -> TreeResult<Option<TaskType>>;
    /// Task type by name, restricted to a department when one is given.
    fn find_task_type(
        &self,
        name: &str,
        department_id: Option<&str>,
    ) -> TreeResult<Option<TaskType>>;

    /// Task of `entity_id` with `task_type_id`, optionally by name.
    fn find_task(
        &self,
        entity_id: &str,
        task_type_id: &str,
        name: Option<&str>,
    ) -> TreeResult<Option<Task>>;

    /// Asset instances whose name, or zero-padded number, equals `value`.
    fn find_asset_instances(&self, value: &str) -> TreeResult<Vec<AssetInstance>>;

    // Provided lookups

    fn entity_type_of(&self, entity: &Entity) -> TreeResult<EntityType> {
        self.entity_type(&entity.entity_type_id)?.ok_or_else(|| {
            TreeError::not_found(
                ErrorCode::EntityNotFound,
                "Entity type",
                &entity.entity_type_id,
            )
        })
    }

    /// Classify an entity as shot, sequence, scene, episode or asset.
    fn entity_kind(&self, entity: &Entity) -> TreeResult<EntityKind> {
        Ok(EntityKind::from_type_name(&self.entity_type_of(entity)?.name))
    }

    fn project_of(&self, entity: &Entity) -> TreeResult<Project> {
        self.project(&entity.project_id)?
            .ok_or_else(|| TreeError::project_not_found(&entity.project_id))
    }

    /// The entity itself or its closest ancestor of `kind`.
    fn ancestor_of_kind(&self, entity: &Entity, kind: EntityKind) -> TreeResult<Option<Entity>> {
        let mut current = entity.clone();
        for _ in 0..MAX_ANCESTRY_DEPTH {
            if self.entity_kind(&current)? == kind {
                return Ok(Some(current));
            }
            let Some(parent_id) = current.parent_id.as_deref() else {
                return Ok(None);
            };
            match self.entity(parent_id)? {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
        Ok(None)
    }

    /// Whether `ancestor_id` is `entity_id` or one of its ancestors.
    fn is_within(&self, entity_id: &str, ancestor_id: &str) -> TreeResult<bool> {
        let mut current = entity_id.to_string();
        for _ in 0..MAX_ANCESTRY_DEPTH {
            if current == ancestor_id {
                return Ok(true);
            }
            match self.entity(&current)?.and_then(|e| e.parent_id) {
                Some(parent_id) => current = parent_id,
                None => return Ok(false),
            }
        }
        Ok(false)
    }

    /// Temporal entity (episode, sequence, scene, shot) by name.
    fn find_temporal(
        &self,
        project_id: &str,
        kind: EntityKind,
        parent: ParentScope<'_>,
        name: &str,
    ) -> TreeResult<Option<Entity>> {
        let Some(type_name) = kind.type_name() else {
            return Ok(None);
        };
        let Some(entity_type) = self.find_entity_type(type_name)? else {
            return Ok(None);
        };
        self.find_entity(&EntityQuery {
            project_id,
            entity_type_id: Some(&entity_type.id),
            parent,
            name,
        })
    }

    fn find_episode(&self, project_id: &str, name: &str) -> TreeResult<Option<Entity>> {
        self.find_temporal(project_id, EntityKind::Episode, ParentScope::Any, name)
    }

    fn find_sequence(
        &self,
        project_id: &str,
        episode_id: Option<&str>,
        name: &str,
    ) -> TreeResult<Option<Entity>> {
        self.find_temporal(
            project_id,
            EntityKind::Sequence,
            ParentScope::of_or_any(episode_id),
            name,
        )
    }

    fn find_shot(
        &self,
        project_id: &str,
        sequence_id: Option<&str>,
        name: &str,
    ) -> TreeResult<Option<Entity>> {
        self.find_temporal(
            project_id,
            EntityKind::Shot,
            ParentScope::of_or_any(sequence_id),
            name,
        )
    }

    fn find_scene(
        &self,
        project_id: &str,
        parent_id: Option<&str>,
        name: &str,
    ) -> TreeResult<Option<Entity>> {
        self.find_temporal(
            project_id,
            EntityKind::Scene,
            ParentScope::of_or_any(parent_id),
            name,
        )
    }

    fn find_asset(
        &self,
        project_id: &str,
        asset_type_id: Option<&str>,
        name: &str,
    ) -> TreeResult<Option<Entity>> {
        self.find_entity(&EntityQuery {
            project_id,
            entity_type_id: asset_type_id,
            parent: ParentScope::Any,
            name,
        })
    }

    /// Asset instance named `value` placed somewhere under `scope_id`.
    fn find_asset_instance_within(
        &self,
        scope_id: &str,
        value: &str,
    ) -> TreeResult<Option<AssetInstance>> {
        for instance in self.find_asset_instances(value)? {
            if let Some(ref scene_id) = instance.scene_id
                && self.is_within(scene_id, scope_id)?
            {
                return Ok(Some(instance));
            }
        }
        Ok(None)
    }
}

/// Flat set of records, used to seed directories and databases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub entity_types: Vec<EntityType>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub task_types: Vec<TaskType>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub asset_instances: Vec<AssetInstance>,
}

/// Directory over in-memory records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    data: Fixture,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(data: Fixture) -> Self {
        Self { data }
    }

    pub fn fixture(&self) -> &Fixture {
        &self.data
    }

    pub fn add_project(&mut self, project: Project) -> &mut Self {
        self.data.projects.push(project);
        self
    }

    pub fn add_entity_type(&mut self, entity_type: EntityType) -> &mut Self {
        self.data.entity_types.push(entity_type);
        self
    }

    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.data.entities.push(entity);
        self
    }

    pub fn add_department(&mut self, department: Department) -> &mut Self {
        self.data.departments.push(department);
        self
    }

    pub fn add_task_type(&mut self, task_type: TaskType) -> &mut Self {
        self.data.task_types.push(task_type);
        self
    }

    pub fn add_task(&mut self, task: Task) -> &mut Self {
        self.data.tasks.push(task);
        self
    }

    pub fn add_asset_instance(&mut self, instance: AssetInstance) -> &mut Self {
        self.data.asset_instances.push(instance);
        self
    }

    /// Replace a project's tree.
    pub fn set_project_tree(
        &mut self,
        project_id: &str,
        tree: crate::tree::TreeDefinition,
    ) -> TreeResult<()> {
        let project = self
            .data
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| TreeError::project_not_found(project_id))?;
        project.file_tree = Some(tree);
        Ok(())
    }
}

impl EntityDirectory for InMemoryDirectory {
    fn project(&self, id: &str) -> TreeResult<Option<Project>> {
        Ok(self.data.projects.iter().find(|p| p.id == id).cloned())
    }

    fn find_project(&self, name: &str) -> TreeResult<Option<Project>> {
        Ok(self
            .data
            .projects
            .iter()
            .find(|p| same_name(&p.name, name))
            .cloned())
    }

    fn entity(&self, id: &str) -> TreeResult<Option<Entity>> {
        Ok(self.data.entities.iter().find(|e| e.id == id).cloned())
    }

    fn find_entity(&self, query: &EntityQuery<'_>) -> TreeResult<Option<Entity>> {
        Ok(self
            .data
            .entities
            .iter()
            .find(|e| {
                e.project_id == query.project_id
                    && query
                        .entity_type_id
                        .is_none_or(|type_id| e.entity_type_id == type_id)
                    && query.parent.matches(e.parent_id.as_deref())
                    && same_name(&e.name, query.name)
            })
            .cloned())
    }

    fn entity_type(&self, id: &str) -> TreeResult<Option<EntityType>> {
        Ok(self.data.entity_types.iter().find(|t| t.id == id).cloned())
    }

    fn find_entity_type(&self, name: &str) -> TreeResult<Option<EntityType>> {
        Ok(self
            .data
            .entity_types
            .iter()
            .find(|t| same_name(&t.name, name))
            .cloned())
    }

    fn department(&self, id: &str) -> TreeResult<Option<Department>> {
        Ok(self.data.departments.iter().find(|d| d.id == id).cloned())
    }

    fn find_department(&self, name: &str) -> TreeResult<Option<Department>> {
        Ok(self
            .data
            .departments
            .iter()
            .find(|d| same_name(&d.name, name))
            .cloned())
    }

    fn task_type(&self, id: &str) -> TreeResult<Option<TaskType>> {
        Ok(self.data.task_types.iter().find(|t| t.id == id).cloned())
    }

    fn find_task_type(
        &self,
        name: &str,
        department_id: Option<&str>,
    ) -> TreeResult<Option<TaskType>> {
        Ok(self
            .data
            .task_types
            .iter()
            .find(|t| {
                same_name(&t.name, name)
                    && department_id.is_none_or(|id| t.department_id.as_deref() == Some(id))
            })
            .cloned())
    }

    fn find_task(
        &self,
        entity_id: &str,
        task_type_id: &str,
        name: Option<&str>,
    ) -> TreeResult<Option<Task>> {
        Ok(self
            .data
            .tasks
            .iter()
            .find(|t| {
                t.entity_id == entity_id
                    && t.task_type_id == task_type_id
                    && name.is_none_or(|n| same_name(&t.name, n))
            })
            .cloned())
    }

    fn find_asset_instances(&self, value: &str) -> TreeResult<Vec<AssetInstance>> {
        Ok(self
            .data
            .asset_instances
            .iter()
            .filter(|i| {
                i.name.as_deref().is_some_and(|n| same_name(n, value))
                    || i.padded_number() == value
            })
            .cloned()
            .collect())
    }
}
