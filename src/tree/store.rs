//! Named tree documents: configured folder, config tiers, then embedded defaults.

use super::TreeDefinition;
use crate::config::{ConfigLoader, FileSource};
use crate::error::{TreeError, TreeResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Trees shipped with the crate, available when no folder is configured.
pub const EMBEDDED_TREES: &[(&str, &str)] = &[
    ("default", include_str!("../../trees/default.json")),
    ("simple", include_str!("../../trees/simple.json")),
];

/// Where a tree document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSource {
    Folder,
    User,
    Project,
    Embedded,
}

impl std::fmt::Display for TreeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeSource::Folder => write!(f, "folder"),
            TreeSource::User => write!(f, "user"),
            TreeSource::Project => write!(f, "project"),
            TreeSource::Embedded => write!(f, "embedded"),
        }
    }
}

impl From<FileSource> for TreeSource {
    fn from(source: FileSource) -> Self {
        match source {
            FileSource::User => TreeSource::User,
            FileSource::Project => TreeSource::Project,
            FileSource::Embedded => TreeSource::Embedded,
        }
    }
}

/// Loads tree definitions by name.
///
/// With a configured folder only `<folder>/<name>.json` is consulted, mirroring a
/// studio that keeps its trees in one place. Without one, `trees/<name>.json` is
/// searched through the config tiers before falling back to the embedded trees.
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    folder: Option<PathBuf>,
    loader: Option<ConfigLoader>,
}

impl TreeStore {
    /// Store reading from `folder`, or from the embedded trees when `None`.
    pub fn new(folder: Option<PathBuf>) -> Self {
        Self {
            folder,
            loader: None,
        }
    }

    /// Store honoring `trees.folder` and the loader's config tiers.
    pub fn from_loader(loader: &ConfigLoader) -> Self {
        Self {
            folder: loader.config().trees.folder.clone(),
            loader: Some(loader.clone()),
        }
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    /// Load and validate the tree called `name`.
    pub fn load_tree(&self, name: &str) -> TreeResult<TreeDefinition> {
        let (content, source) = self.read_tree(name)?;
        debug!(tree = %name, source = %source, "Loaded file tree");
        let tree = TreeDefinition::from_json_str(name, &content)?;
        tree.validate()?;
        Ok(tree)
    }

    fn read_tree(&self, name: &str) -> TreeResult<(String, TreeSource)> {
        let file_name = format!("{}.json", name);

        if let Some(ref folder) = self.folder {
            let path = folder.join(&file_name);
            return std::fs::read_to_string(&path)
                .map(|content| (content, TreeSource::Folder))
                .map_err(|_| TreeError::tree_file_not_found(&path.to_string_lossy()));
        }

        let relative = format!("trees/{}", file_name);
        if let Some(ref loader) = self.loader
            && let Some(file) = loader.find_file(&relative)
        {
            return Ok((file.content, file.source.into()));
        }

        EMBEDDED_TREES
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .map(|(_, content)| (content.to_string(), TreeSource::Embedded))
            .ok_or_else(|| TreeError::tree_file_not_found(&relative))
    }

    /// Names of every tree this store can load, with the source that wins.
    pub fn list_trees(&self) -> Vec<(String, TreeSource)> {
        let mut trees: BTreeMap<String, TreeSource> = BTreeMap::new();

        if let Some(ref folder) = self.folder {
            if let Ok(entries) = std::fs::read_dir(folder) {
                for entry in entries.flatten() {
                    if let Some(name) = tree_name(&entry.file_name().to_string_lossy()) {
                        trees.insert(name, TreeSource::Folder);
                    }
                }
            }
            return trees.into_iter().collect();
        }

        for (name, _) in EMBEDDED_TREES {
            trees.insert(name.to_string(), TreeSource::Embedded);
        }
        if let Some(ref loader) = self.loader {
            for (file, source) in loader.list_files("trees") {
                if let Some(name) = tree_name(&file) {
                    trees.insert(name, source.into());
                }
            }
        }

        trees.into_iter().collect()
    }
}

fn tree_name(file_name: &str) -> Option<String> {
    file_name
        .strip_suffix(".json")
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}
