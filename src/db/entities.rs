//! Entity reads and the `EntityDirectory` implementation over SQLite.

use super::Database;
use crate::directory::{EntityDirectory, EntityQuery, ParentScope, same_name};
use crate::error::TreeResult;
use crate::tree::TreeDefinition;
use crate::types::{
    AssetInstance, Department, Entity, EntityType, Project, Task, TaskType,
};
use anyhow::Result;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Params, Row, params, params_from_iter};

const PROJECT_COLUMNS: &str = "id, name, short_name, file_tree";
const ENTITY_COLUMNS: &str = "id, name, short_name, project_id, entity_type_id, parent_id";
const TASK_TYPE_COLUMNS: &str = "id, name, short_name, department_id";
const TASK_COLUMNS: &str = "id, name, entity_id, task_type_id";
const INSTANCE_COLUMNS: &str = "id, asset_id, name, number, target_asset_id, scene_id";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let file_tree: Option<String> = row.get(3)?;
    let file_tree = file_tree
        .map(|json| serde_json::from_str::<TreeDefinition>(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
        file_tree,
    })
}

fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<Entity> {
    Ok(Entity {
        id: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
        project_id: row.get(3)?,
        entity_type_id: row.get(4)?,
        parent_id: row.get(5)?,
    })
}

fn entity_type_from_row(row: &Row<'_>) -> rusqlite::Result<EntityType> {
    Ok(EntityType {
        id: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
    })
}

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
    })
}

fn task_type_from_row(row: &Row<'_>) -> rusqlite::Result<TaskType> {
    Ok(TaskType {
        id: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
        department_id: row.get(3)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        entity_id: row.get(2)?,
        task_type_id: row.get(3)?,
    })
}

fn instance_from_row(row: &Row<'_>) -> rusqlite::Result<AssetInstance> {
    Ok(AssetInstance {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        name: row.get(2)?,
        number: row.get(3)?,
        target_asset_id: row.get(4)?,
        scene_id: row.get(5)?,
    })
}

fn query_one<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    Ok(conn.query_row(sql, params, map).optional()?)
}

fn query_all<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Database {
    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
                params![id],
                project_from_row,
            )
        })
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!("SELECT {} FROM projects ORDER BY name", PROJECT_COLUMNS),
                [],
                project_from_row,
            )
        })
    }

    pub fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                &format!("SELECT {} FROM entities WHERE id = ?1", ENTITY_COLUMNS),
                params![id],
                entity_from_row,
            )
        })
    }

    /// Entities of a project, optionally narrowed by type and parent.
    pub fn list_entities(
        &self,
        project_id: &str,
        entity_type_id: Option<&str>,
        parent: ParentScope<'_>,
    ) -> Result<Vec<Entity>> {
        let mut sql = format!("SELECT {} FROM entities WHERE project_id = ?", ENTITY_COLUMNS);
        let mut args: Vec<&str> = vec![project_id];
        if let Some(type_id) = entity_type_id {
            sql.push_str(" AND entity_type_id = ?");
            args.push(type_id);
        }
        match parent {
            ParentScope::Any => {}
            ParentScope::Root => sql.push_str(" AND parent_id IS NULL"),
            ParentScope::Of(parent_id) => {
                sql.push_str(" AND parent_id = ?");
                args.push(parent_id);
            }
        }
        sql.push_str(" ORDER BY name");

        self.with_conn(|conn| query_all(conn, &sql, params_from_iter(args), entity_from_row))
    }

    pub fn get_entity_type(&self, id: &str) -> Result<Option<EntityType>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                "SELECT id, name, short_name FROM entity_types WHERE id = ?1",
                params![id],
                entity_type_from_row,
            )
        })
    }

    pub fn list_entity_types(&self) -> Result<Vec<EntityType>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                "SELECT id, name, short_name FROM entity_types ORDER BY name",
                [],
                entity_type_from_row,
            )
        })
    }

    pub fn get_department(&self, id: &str) -> Result<Option<Department>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                "SELECT id, name, short_name FROM departments WHERE id = ?1",
                params![id],
                department_from_row,
            )
        })
    }

    pub fn list_departments(&self) -> Result<Vec<Department>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                "SELECT id, name, short_name FROM departments ORDER BY name",
                [],
                department_from_row,
            )
        })
    }

    pub fn get_task_type(&self, id: &str) -> Result<Option<TaskType>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                &format!("SELECT {} FROM task_types WHERE id = ?1", TASK_TYPE_COLUMNS),
                params![id],
                task_type_from_row,
            )
        })
    }

    pub fn list_task_types(&self) -> Result<Vec<TaskType>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!("SELECT {} FROM task_types ORDER BY name", TASK_TYPE_COLUMNS),
                [],
                task_type_from_row,
            )
        })
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id],
                task_from_row,
            )
        })
    }

    pub fn list_tasks(&self, entity_id: &str, task_type_id: &str) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!(
                    "SELECT {} FROM tasks WHERE entity_id = ?1 AND task_type_id = ?2 ORDER BY name",
                    TASK_COLUMNS
                ),
                params![entity_id, task_type_id],
                task_from_row,
            )
        })
    }

    pub fn get_asset_instance(&self, id: &str) -> Result<Option<AssetInstance>> {
        self.with_conn(|conn| {
            query_one(
                conn,
                &format!("SELECT {} FROM asset_instances WHERE id = ?1", INSTANCE_COLUMNS),
                params![id],
                instance_from_row,
            )
        })
    }

    pub fn list_asset_instances(&self) -> Result<Vec<AssetInstance>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!("SELECT {} FROM asset_instances ORDER BY number", INSTANCE_COLUMNS),
                [],
                instance_from_row,
            )
        })
    }
}

// Name matching happens in Rust: SQLite's lower() and NOCASE only fold ASCII.
impl EntityDirectory for Database {
    fn project(&self, id: &str) -> TreeResult<Option<Project>> {
        Ok(self.get_project(id)?)
    }

    fn find_project(&self, name: &str) -> TreeResult<Option<Project>> {
        Ok(self
            .list_projects()?
            .into_iter()
            .find(|p| same_name(&p.name, name)))
    }

    fn entity(&self, id: &str) -> TreeResult<Option<Entity>> {
        Ok(self.get_entity(id)?)
    }

    fn find_entity(&self, query: &EntityQuery<'_>) -> TreeResult<Option<Entity>> {
        Ok(self
            .list_entities(query.project_id, query.entity_type_id, query.parent)?
            .into_iter()
            .find(|e| same_name(&e.name, query.name)))
    }

    fn entity_type(&self, id: &str) -> TreeResult<Option<EntityType>> {
        Ok(self.get_entity_type(id)?)
    }

    fn find_entity_type(&self, name: &str) -> TreeResult<Option<EntityType>> {
        Ok(self
            .list_entity_types()?
            .into_iter()
            .find(|t| same_name(&t.name, name)))
    }

    fn department(&self, id: &str) -> TreeResult<Option<Department>> {
        Ok(self.get_department(id)?)
    }

    fn find_department(&self, name: &str) -> TreeResult<Option<Department>> {
        Ok(self
            .list_departments()?
            .into_iter()
            .find(|d| same_name(&d.name, name)))
    }

    fn task_type(&self, id: &str) -> TreeResult<Option<TaskType>> {
        Ok(self.get_task_type(id)?)
    }

    fn find_task_type(
        &self,
        name: &str,
        department_id: Option<&str>,
    ) -> TreeResult<Option<TaskType>> {
        Ok(self.list_task_types()?.into_iter().find(|t| {
            same_name(&t.name, name)
                && department_id.is_none_or(|id| t.department_id.as_deref() == Some(id))
        }))
    }

    fn find_task(
        &self,
        entity_id: &str,
        task_type_id: &str,
        name: Option<&str>,
    ) -> TreeResult<Option<Task>> {
        Ok(self
            .list_tasks(entity_id, task_type_id)?
            .into_iter()
            .find(|t| name.is_none_or(|n| same_name(&t.name, n))))
    }

    fn find_asset_instances(&self, value: &str) -> TreeResult<Vec<AssetInstance>> {
        Ok(self
            .list_asset_instances()?
            .into_iter()
            .filter(|i| {
                i.name.as_deref().is_some_and(|n| same_name(n, value))
                    || i.padded_number() == value
            })
            .collect())
    }
}
