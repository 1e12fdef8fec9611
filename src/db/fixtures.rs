//! Seeding the entity store from JSON fixtures and assigning trees.
//!
//! Records are upserted by id, parents first. Foreign keys are checked at
//! commit so entities may reference parents listed after them.

use super::Database;
use crate::directory::Fixture;
use crate::error::TreeError;
use crate::tree::TreeDefinition;
use anyhow::{Context, Result};
use rusqlite::{Transaction, params};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Rows written per table by an import.
pub type ImportStats = BTreeMap<&'static str, usize>;

fn id_or_new(id: &str) -> String {
    if id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}

fn import_into(tx: &Transaction<'_>, fixture: &Fixture) -> Result<ImportStats> {
    let mut stats = ImportStats::new();

    for project in &fixture.projects {
        let file_tree = project
            .file_tree
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        tx.execute(
            "INSERT INTO projects (id, name, short_name, file_tree) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, short_name = excluded.short_name,
             file_tree = COALESCE(excluded.file_tree, projects.file_tree)",
            params![id_or_new(&project.id), project.name, project.short_name, file_tree],
        )?;
    }
    stats.insert("projects", fixture.projects.len());

    for entity_type in &fixture.entity_types {
        tx.execute(
            "INSERT INTO entity_types (id, name, short_name) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, short_name = excluded.short_name",
            params![id_or_new(&entity_type.id), entity_type.name, entity_type.short_name],
        )?;
    }
    stats.insert("entity_types", fixture.entity_types.len());

    for department in &fixture.departments {
        tx.execute(
            "INSERT INTO departments (id, name, short_name) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, short_name = excluded.short_name",
            params![id_or_new(&department.id), department.name, department.short_name],
        )?;
    }
    stats.insert("departments", fixture.departments.len());

    for task_type in &fixture.task_types {
        tx.execute(
            "INSERT INTO task_types (id, name, short_name, department_id) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, short_name = excluded.short_name,
             department_id = excluded.department_id",
            params![
                id_or_new(&task_type.id),
                task_type.name,
                task_type.short_name,
                task_type.department_id
            ],
        )?;
    }
    stats.insert("task_types", fixture.task_types.len());

    for entity in &fixture.entities {
        tx.execute(
            "INSERT INTO entities (id, name, short_name, project_id, entity_type_id, parent_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, short_name = excluded.short_name,
             project_id = excluded.project_id, entity_type_id = excluded.entity_type_id,
             parent_id = excluded.parent_id",
            params![
                id_or_new(&entity.id),
                entity.name,
                entity.short_name,
                entity.project_id,
                entity.entity_type_id,
                entity.parent_id
            ],
        )
        .with_context(|| format!("importing entity {}", entity.name))?;
    }
    stats.insert("entities", fixture.entities.len());

    for task in &fixture.tasks {
        tx.execute(
            "INSERT INTO tasks (id, name, entity_id, task_type_id) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, entity_id = excluded.entity_id,
             task_type_id = excluded.task_type_id",
            params![id_or_new(&task.id), task.name, task.entity_id, task.task_type_id],
        )?;
    }
    stats.insert("tasks", fixture.tasks.len());

    for instance in &fixture.asset_instances {
        tx.execute(
            "INSERT INTO asset_instances (id, asset_id, name, number, target_asset_id, scene_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET asset_id = excluded.asset_id, name = excluded.name,
             number = excluded.number, target_asset_id = excluded.target_asset_id,
             scene_id = excluded.scene_id",
            params![
                id_or_new(&instance.id),
                instance.asset_id,
                instance.name,
                instance.number,
                instance.target_asset_id,
                instance.scene_id
            ],
        )?;
    }
    stats.insert("asset_instances", fixture.asset_instances.len());

    Ok(stats)
}

impl Database {
    /// Upsert every record of `fixture` in one transaction.
    pub fn import_fixture(&self, fixture: &Fixture) -> Result<ImportStats> {
        let stats = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;
            let stats = import_into(&tx, fixture)?;
            tx.commit().context("committing fixture import")?;
            Ok(stats)
        })?;
        info!(?stats, "Imported fixture");
        Ok(stats)
    }

    /// Read a JSON fixture file and import it.
    pub fn import_fixture_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportStats> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&content)
            .with_context(|| format!("parsing fixture {}", path.display()))?;
        self.import_fixture(&fixture)
    }

    /// Store `tree` on the project, replacing any previous one.
    pub fn set_project_tree(&self, project_id: &str, tree: &TreeDefinition) -> Result<()> {
        let json = serde_json::to_string(tree)?;
        let updated = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE projects SET file_tree = ?1 WHERE id = ?2",
                params![json, project_id],
            )?)
        })?;
        if updated == 0 {
            return Err(TreeError::project_not_found(project_id).into());
        }
        info!(project_id, "Assigned file tree");
        Ok(())
    }

    /// Create a project with a fresh id.
    pub fn create_project(&self, name: &str, short_name: Option<&str>) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (id, name, short_name) VALUES (?1, ?2, ?3)",
                params![id, name, short_name],
            )?;
            Ok(())
        })?;
        Ok(id)
    }
}
