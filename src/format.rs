//! Output formatting utilities for markdown and JSON.

use crate::builder::BuiltPath;
use crate::parser::{GuessMatch, ResolvedToken};
use crate::tree::{TreeDefinition, TreeSource};
use crate::types::Task;
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

impl OutputFormat {
    /// Pretty JSON of `value`, or the markdown produced by `markdown`.
    pub fn render<T: Serialize>(&self, value: &T, markdown: impl FnOnce(&T) -> String) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Markdown => Ok(markdown(value)),
        }
    }
}

/// Format a built path as markdown.
pub fn format_built_path_markdown(built: &BuiltPath) -> String {
    let mut md = String::new();
    md.push_str(&format!("## Path: `{}`\n", built.path));
    md.push_str(&format!("- **folder**: `{}`\n", built.folder_path));
    md.push_str(&format!("- **file name**: `{}`\n", built.file_name));
    md
}

pub fn format_task_markdown(task: &Task) -> String {
    let mut md = String::new();
    md.push_str(&format!("## Task: {}\n", task.name));
    md.push_str(&format!("- **id**: `{}`\n", task.id));
    md.push_str(&format!("- **entity_id**: `{}`\n", task.entity_id));
    md.push_str(&format!("- **task_type_id**: `{}`\n", task.task_type_id));
    md
}

fn format_resolved(value: &ResolvedToken) -> String {
    match value {
        ResolvedToken::Id(id) => format!("`{}`", id),
        ResolvedToken::Value(value) => value.clone(),
        ResolvedToken::Version(version) => version.to_string(),
    }
}

/// Format best-effort guesses as markdown, one section per matching template.
#[allow(clippy::ptr_arg)]
pub fn format_guesses_markdown(guesses: &Vec<GuessMatch>) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Matches ({})\n\n", guesses.len()));

    for guess in guesses {
        let partial = if guess.complete { "" } else { " (partial)" };
        md.push_str(&format!("## {} / {}{}\n", guess.mode, guess.template, partial));
        for (token, value) in &guess.values {
            md.push_str(&format!("- **{}**: {}\n", token, format_resolved(value)));
        }
        md.push('\n');
    }

    md
}

/// Entry of the `trees` listing.
#[derive(Debug, Clone, Serialize)]
pub struct TreeListing {
    pub name: String,
    pub source: String,
}

impl TreeListing {
    pub fn new(name: String, source: TreeSource) -> Self {
        Self {
            name,
            source: source.to_string(),
        }
    }
}

#[allow(clippy::ptr_arg)]
pub fn format_trees_markdown(trees: &Vec<TreeListing>) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Trees ({})\n\n", trees.len()));
    for tree in trees {
        md.push_str(&format!("- {} _({})_\n", tree.name, tree.source));
    }
    md
}

/// Format a tree definition as markdown: one section per mode.
pub fn format_tree_markdown(tree: &TreeDefinition) -> String {
    let mut md = String::new();

    for (mode, spec) in &tree.modes {
        md.push_str(&format!("## {}\n", mode));
        md.push_str(&format!(
            "- **mountpoint**: `{}`\n",
            spec.mountpoint.as_deref().unwrap_or("")
        ));
        md.push_str(&format!("- **root**: `{}`\n", spec.root.as_deref().unwrap_or("")));

        md.push_str(&format!("\n### Folder paths ({})\n", spec.folder_path.style.as_str()));
        for (key, template) in &spec.folder_path.templates {
            md.push_str(&format!("- **{}**: `{}`\n", key, template));
        }

        md.push_str(&format!("\n### File names ({})\n", spec.file_name.style.as_str()));
        for (key, template) in &spec.file_name.templates {
            md.push_str(&format!("- **{}**: `{}`\n", key, template));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;
    use std::collections::BTreeMap;

    #[test]
    fn test_guesses_markdown_marks_partial() {
        let mut values = BTreeMap::new();
        values.insert(TokenType::Project, ResolvedToken::Id("p1".into()));
        let guesses = vec![GuessMatch {
            mode: "working".into(),
            template: "shot".into(),
            values,
            complete: false,
        }];
        let md = format_guesses_markdown(&guesses);
        assert!(md.contains("# Matches (1)"));
        assert!(md.contains("## working / shot (partial)"));
        assert!(md.contains("- **Project**: `p1`"));
    }

    #[test]
    fn test_render_json() {
        let built = BuiltPath {
            folder_path: "/p/bb".into(),
            file_name: "bb_v001".into(),
            path: "/p/bb/bb_v001".into(),
        };
        let json = OutputFormat::Json
            .render(&built, format_built_path_markdown)
            .unwrap();
        assert!(json.contains("\"file_name\": \"bb_v001\""));
        let md = OutputFormat::Markdown
            .render(&built, format_built_path_markdown)
            .unwrap();
        assert!(md.starts_with("## Path: `/p/bb/bb_v001`"));
    }
}
