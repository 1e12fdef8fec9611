//! Structured error types for the file tree engine.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Tree configuration errors
    TreeFileNotFound,
    InvalidTreeJson,
    MalformedTree,

    // Path errors
    WrongPathFormat,
    UnresolvedToken,

    // Not found errors
    ProjectNotFound,
    EntityNotFound,
    EpisodeNotFound,
    SequenceNotFound,
    ShotNotFound,
    AssetNotFound,
    AssetTypeNotFound,
    DepartmentNotFound,
    TaskTypeNotFound,
    TaskNotFound,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Structured error returned by every engine operation.
#[derive(Debug, Serialize)]
pub struct TreeError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TreeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn tree_file_not_found(path: &str) -> Self {
        Self::new(
            ErrorCode::TreeFileNotFound,
            format!("File Tree file not found: {}.", path),
        )
    }

    pub fn invalid_tree_json(name: &str, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidTreeJson,
            format!("File Tree {} is not valid JSON", name),
        )
        .with_details(err.to_string())
    }

    pub fn malformed_tree(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedTree, message)
    }

    pub fn wrong_path_format(path: &str, template: &str) -> Self {
        Self::new(
            ErrorCode::WrongPathFormat,
            format!("{} doesn't match {}", path, template),
        )
    }

    pub fn unresolved_token(token: &str, template: &str) -> Self {
        Self::new(
            ErrorCode::UnresolvedToken,
            format!("Token <{}> could not be resolved in {}", token, template),
        )
    }

    pub fn not_found(code: ErrorCode, what: &str, name: &str) -> Self {
        Self::new(code, format!("{} not found: {}", what, name))
    }

    pub fn project_not_found(project: &str) -> Self {
        Self::not_found(ErrorCode::ProjectNotFound, "Project", project)
    }

    pub fn entity_not_found(entity_id: &str) -> Self {
        Self::not_found(ErrorCode::EntityNotFound, "Entity", entity_id)
    }

    pub fn task_not_found(task: &str) -> Self {
        Self::not_found(ErrorCode::TaskNotFound, "Task", task)
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }

    /// Whether this error means "no record backs the given name".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ProjectNotFound
                | ErrorCode::EntityNotFound
                | ErrorCode::EpisodeNotFound
                | ErrorCode::SequenceNotFound
                | ErrorCode::ShotNotFound
                | ErrorCode::AssetNotFound
                | ErrorCode::AssetTypeNotFound
                | ErrorCode::DepartmentNotFound
                | ErrorCode::TaskTypeNotFound
                | ErrorCode::TaskNotFound
        )
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({})", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TreeError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for TreeError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<TreeError>() {
            Ok(tree_err) => return tree_err,
            Err(err) => err,
        };
        match err.downcast::<rusqlite::Error>() {
            Ok(sql_err) => TreeError::database(sql_err),
            Err(err) => TreeError::internal(err),
        }
    }
}

impl From<rusqlite::Error> for TreeError {
    fn from(err: rusqlite::Error) -> Self {
        TreeError::database(err)
    }
}

/// Result type for engine operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serializes_screaming_snake_case() {
        let err = TreeError::wrong_path_format("/a/b", "<Project>/<Shot>");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "WRONG_PATH_FORMAT");
        assert_eq!(json["message"], "/a/b doesn't match <Project>/<Shot>");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_code() {
        let err: anyhow::Error = TreeError::task_not_found("modeling").into();
        let back: TreeError = err.into();
        assert_eq!(back.code, ErrorCode::TaskNotFound);
        assert!(back.is_not_found());
    }

    #[test]
    fn test_anyhow_sqlite_error_becomes_database() {
        let err: anyhow::Error = rusqlite::Error::InvalidQuery.into();
        let back: TreeError = err.into();
        assert_eq!(back.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn test_plain_anyhow_becomes_internal() {
        let back: TreeError = anyhow::anyhow!("boom").into();
        assert_eq!(back.code, ErrorCode::InternalError);
        assert!(!back.is_not_found());
    }

    #[test]
    fn test_display_includes_details() {
        let err = TreeError::invalid_tree_json("default", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "File Tree default is not valid JSON (expected value at line 1)"
        );
    }
}
