//! File resolution across configuration tiers.
//!
//! Non-YAML files (tree documents) are not merged: the highest tier that has
//! the file wins.

use super::loader::ConfigLoader;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Source of a resolved file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    /// File was found in user config directory
    User,
    /// File was found in project config directory
    Project,
    /// File is embedded in the binary
    Embedded,
}

impl std::fmt::Display for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSource::User => write!(f, "user"),
            FileSource::Project => write!(f, "project"),
            FileSource::Embedded => write!(f, "embedded"),
        }
    }
}

/// A resolved file with its content and metadata.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub content: String,
    pub path: PathBuf,
    pub source: FileSource,
}

impl ConfigLoader {
    /// Tier directories from highest to lowest priority.
    fn tier_dirs(&self) -> Vec<(&Path, FileSource)> {
        let mut dirs = Vec::new();
        if let Some(user_dir) = self.user_dir() {
            dirs.push((user_dir, FileSource::User));
        }
        if let Some(project_dir) = self.project_dir() {
            dirs.push((project_dir, FileSource::Project));
        }
        dirs
    }

    /// Find a file by relative path, searching from highest tier to lowest.
    pub fn find_file(&self, relative_path: &str) -> Option<ResolvedFile> {
        self.tier_dirs().into_iter().find_map(|(dir, source)| {
            let path = dir.join(relative_path);
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| ResolvedFile {
                    content,
                    path,
                    source,
                })
        })
    }

    /// List files in a directory across all tiers, higher tiers shadowing lower ones.
    pub fn list_files(&self, relative_dir: &str) -> Vec<(String, FileSource)> {
        let mut files: BTreeMap<String, FileSource> = BTreeMap::new();

        // Lowest tier first so higher tiers overwrite
        for (dir, source) in self.tier_dirs().into_iter().rev() {
            let Ok(entries) = std::fs::read_dir(dir.join(relative_dir)) else {
                continue;
            };
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    files.insert(name.to_string(), source);
                }
            }
        }

        files.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigPaths;
    use tempfile::TempDir;

    fn loader_with_trees(temp: &TempDir) -> (ConfigLoader, PathBuf, PathBuf) {
        let project_trees = temp.path().join("file-tree").join("trees");
        let user_trees = temp.path().join("user").join("trees");
        std::fs::create_dir_all(&project_trees).unwrap();
        std::fs::create_dir_all(&user_trees).unwrap();

        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("file-tree")),
            Some(temp.path().join("user")),
        );
        (
            ConfigLoader::load_with_paths(paths).unwrap(),
            project_trees,
            user_trees,
        )
    }

    #[test]
    fn test_find_file_user_priority() {
        let temp = TempDir::new().unwrap();
        let (loader, project_trees, user_trees) = loader_with_trees(&temp);
        std::fs::write(project_trees.join("studio.json"), "project").unwrap();
        std::fs::write(user_trees.join("studio.json"), "user").unwrap();

        let file = loader.find_file("trees/studio.json").unwrap();
        assert_eq!(file.content, "user");
        assert_eq!(file.source, FileSource::User);
    }

    #[test]
    fn test_find_file_project_fallback() {
        let temp = TempDir::new().unwrap();
        let (loader, project_trees, _) = loader_with_trees(&temp);
        std::fs::write(project_trees.join("studio.json"), "project").unwrap();

        let file = loader.find_file("trees/studio.json").unwrap();
        assert_eq!(file.source, FileSource::Project);
        assert!(loader.find_file("trees/missing.json").is_none());
    }

    #[test]
    fn test_list_files_deduplication() {
        let temp = TempDir::new().unwrap();
        let (loader, project_trees, user_trees) = loader_with_trees(&temp);
        std::fs::write(project_trees.join("shared.json"), "{}").unwrap();
        std::fs::write(project_trees.join("project-only.json"), "{}").unwrap();
        std::fs::write(user_trees.join("shared.json"), "{}").unwrap();

        let files = loader.list_files("trees");
        assert_eq!(
            files,
            vec![
                ("project-only.json".to_string(), FileSource::Project),
                ("shared.json".to_string(), FileSource::User),
            ]
        );
    }
}
