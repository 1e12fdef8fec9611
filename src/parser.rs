//! Inverse of the builder: recover entities from a concrete path.
//!
//! Two flavours share one extraction primitive:
//! - strict task guessing matches one folder template exactly and fails with a
//!   typed error at the first mismatch or missing record;
//! - best-effort guessing tries every template of every mode and keeps the
//!   resolved prefix of each one that matches.

use crate::directory::{EntityDirectory, EntityQuery, ParentScope};
use crate::error::{ErrorCode, TreeError, TreeResult};
use crate::paths::{split_segments, strip_root, trim_trailing_separator};
use crate::style::Style;
use crate::token::{Piece, TokenType, pieces, restyle_literals, token_order};
use crate::tree::{TemplateKind, TreeDefinition};
use crate::types::{Entity, Project, Task, TaskType};
use regex_lite::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Raw token values read from a path, first occurrence per token type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTokens {
    entries: Vec<(TokenType, String)>,
}

impl ExtractedTokens {
    pub fn get(&self, token_type: TokenType) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| *t == token_type)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `token_type`, empty when the path does not carry it.
    pub fn get_or_empty(&self, token_type: TokenType) -> &str {
        self.get(token_type).unwrap_or_default()
    }

    /// Record a value unless the token type was already seen.
    fn insert_first(&mut self, token_type: TokenType, value: String) {
        if self.get(token_type).is_none() {
            self.entries.push((token_type, value));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenType, &str)> {
        self.entries.iter().map(|(t, v)| (*t, v.as_str()))
    }
}

/// Anchored pattern for one template segment: literals escaped, tokens lazy.
fn segment_pattern(segment: &[Piece]) -> String {
    let mut pattern = String::from("^");
    for piece in segment {
        match piece {
            Piece::Literal(text) => pattern.push_str(&regex_lite::escape(text)),
            Piece::Token(_) => pattern.push_str("(.+?)"),
        }
    }
    pattern.push('$');
    pattern
}

/// Align path segments with template segments and read token values.
///
/// Returns `None` when counts differ, a literal segment differs, or a segment
/// does not fit its `prefix<Token>suffix` shape. Underscores in values become
/// spaces.
pub fn extract_tokens(
    path_segments: &[&str],
    template_segments: &[&str],
) -> TreeResult<Option<ExtractedTokens>> {
    if path_segments.len() != template_segments.len() {
        return Ok(None);
    }

    let mut tokens = ExtractedTokens::default();
    for (path_segment, template_segment) in path_segments.iter().zip(template_segments) {
        let segment = pieces(template_segment);
        let has_token = segment.iter().any(|p| matches!(p, Piece::Token(_)));
        if !has_token {
            if path_segment != template_segment {
                return Ok(None);
            }
            continue;
        }

        let re = Regex::new(&segment_pattern(&segment)).map_err(TreeError::internal)?;
        let Some(caps) = re.captures(path_segment) else {
            return Ok(None);
        };

        let placeholders = segment.iter().filter_map(|p| match p {
            Piece::Token(placeholder) => Some(placeholder),
            Piece::Literal(_) => None,
        });
        for (index, placeholder) in placeholders.enumerate() {
            if let (Some(token_type), Some(value)) = (placeholder.token_type(), caps.get(index + 1)) {
                tokens.insert_first(token_type, value.as_str().replace('_', " "));
            }
        }
    }
    Ok(Some(tokens))
}

/// One resolved token of a best-effort guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolvedToken {
    /// Id of the record backing the name.
    Id(String),
    /// Free value carried as-is.
    Value(String),
    Version(u32),
}

impl ResolvedToken {
    pub fn as_id(&self) -> Option<&str> {
        match self {
            ResolvedToken::Id(id) => Some(id),
            _ => None,
        }
    }
}

/// A template that matched the path, with what could be resolved from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessMatch {
    pub mode: String,
    /// Folder template key, e.g. `shot`.
    pub template: String,
    pub values: BTreeMap<TokenType, ResolvedToken>,
    /// Every token of the template resolved.
    pub complete: bool,
}

impl GuessMatch {
    pub fn get(&self, token_type: TokenType) -> Option<&ResolvedToken> {
        self.values.get(&token_type)
    }

    fn id(&self, token_type: TokenType) -> Option<&str> {
        self.get(token_type).and_then(ResolvedToken::as_id)
    }
}

/// Why a best-effort fold stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    MissingValue,
    MissingPrerequisite,
    NotFound,
}

/// Resolves paths against the tree stored on a project.
pub struct PathParser<'a> {
    directory: &'a dyn EntityDirectory,
    fallback_tree: Option<&'a TreeDefinition>,
}

impl<'a> PathParser<'a> {
    pub fn new(directory: &'a dyn EntityDirectory) -> Self {
        Self {
            directory,
            fallback_tree: None,
        }
    }

    /// Tree used for projects that carry none.
    pub fn with_fallback_tree(mut self, tree: &'a TreeDefinition) -> Self {
        self.fallback_tree = Some(tree);
        self
    }

    fn tree_for(&self, project: &Project) -> TreeResult<TreeDefinition> {
        project
            .file_tree
            .clone()
            .or_else(|| self.fallback_tree.cloned())
            .ok_or_else(|| TreeError::malformed_tree("No tree can be found for given project."))
    }

    pub fn guess_shot_task_from_path(
        &self,
        file_path: &str,
        project: &Project,
        mode: &str,
        sep: &str,
    ) -> TreeResult<Task> {
        self.guess_task_from_path(file_path, project, mode, sep, TemplateKind::Shot)
    }

    pub fn guess_asset_task_from_path(
        &self,
        file_path: &str,
        project: &Project,
        mode: &str,
        sep: &str,
    ) -> TreeResult<Task> {
        self.guess_task_from_path(file_path, project, mode, sep, TemplateKind::Asset)
    }

    /// Find the task a working folder path belongs to.
    ///
    /// `file_path` is a folder built from the `kind` folder template of `mode`.
    /// Any mismatch with the template is `WRONG_PATH_FORMAT`; any name without
    /// a backing record raises the matching not-found error.
    pub fn guess_task_from_path(
        &self,
        file_path: &str,
        project: &Project,
        mode: &str,
        sep: &str,
        kind: TemplateKind,
    ) -> TreeResult<Task> {
        let tree = self.tree_for(project)?;
        let template = tree.folder_template(mode, kind)?;
        let style = tree.folder_style(mode)?;
        let root = tree.root_path(mode, sep)?;

        let path = trim_trailing_separator(file_path, sep);
        let relative =
            strip_root(path, &root).ok_or_else(|| TreeError::wrong_path_format(file_path, template))?;

        let styled_template = restyle_literals(template, style);
        let template_segments = split_segments(&styled_template, "/");
        let path_segments = split_segments(relative, sep);
        if path_segments.len() != template_segments.len() {
            return Err(TreeError::wrong_path_format(file_path, template));
        }

        let tokens = extract_tokens(&path_segments, &template_segments)?
            .ok_or_else(|| TreeError::wrong_path_format(file_path, template))?;

        let entity = self.guess_entity(project, &tokens, kind)?;
        let task_type = self.guess_task_type(
            tokens.get_or_empty(TokenType::Department),
            tokens.get_or_empty(TokenType::TaskType),
        )?;
        self.guess_task(&entity, &task_type, tokens.get_or_empty(TokenType::Task))
    }

    fn guess_entity(
        &self,
        project: &Project,
        tokens: &ExtractedTokens,
        kind: TemplateKind,
    ) -> TreeResult<Entity> {
        match kind {
            TemplateKind::Shot => {
                let episode = self.optional_episode(project, tokens)?;
                let sequence = self.optional_sequence(project, tokens, episode.as_ref())?;
                let name = required_name(tokens, TokenType::Shot)?;
                self.directory
                    .find_shot(&project.id, sequence.as_ref().map(|s| s.id.as_str()), name)?
                    .ok_or_else(|| TreeError::not_found(ErrorCode::ShotNotFound, "Shot", name))
            }
            TemplateKind::Sequence => {
                let episode = self.optional_episode(project, tokens)?;
                let name = required_name(tokens, TokenType::Sequence)?;
                self.directory
                    .find_sequence(&project.id, episode.as_ref().map(|e| e.id.as_str()), name)?
                    .ok_or_else(|| TreeError::not_found(ErrorCode::SequenceNotFound, "Sequence", name))
            }
            TemplateKind::Episode => {
                let name = required_name(tokens, TokenType::Episode)?;
                self.directory
                    .find_episode(&project.id, name)?
                    .ok_or_else(|| TreeError::not_found(ErrorCode::EpisodeNotFound, "Episode", name))
            }
            TemplateKind::Scene => {
                let episode = self.optional_episode(project, tokens)?;
                let sequence = self.optional_sequence(project, tokens, episode.as_ref())?;
                let name = required_name(tokens, TokenType::Scene)?;
                self.directory
                    .find_scene(&project.id, sequence.as_ref().map(|s| s.id.as_str()), name)?
                    .ok_or_else(|| TreeError::not_found(ErrorCode::EntityNotFound, "Scene", name))
            }
            TemplateKind::Asset => {
                let asset_type_name = tokens.get_or_empty(TokenType::AssetType);
                let asset_type_id = if asset_type_name.is_empty() {
                    None
                } else {
                    let asset_type = self
                        .directory
                        .find_entity_type(asset_type_name)?
                        .ok_or_else(|| {
                            TreeError::not_found(
                                ErrorCode::AssetTypeNotFound,
                                "Asset type",
                                asset_type_name,
                            )
                        })?;
                    Some(asset_type.id)
                };
                let name = required_name(tokens, TokenType::Asset)?;
                self.directory
                    .find_asset(&project.id, asset_type_id.as_deref(), name)?
                    .ok_or_else(|| TreeError::not_found(ErrorCode::AssetNotFound, "Asset", name))
            }
            TemplateKind::Instance | TemplateKind::InstanceAsset => Err(TreeError::malformed_tree(
                format!("Tasks cannot be guessed from {} templates.", kind),
            )),
        }
    }

    fn optional_episode(
        &self,
        project: &Project,
        tokens: &ExtractedTokens,
    ) -> TreeResult<Option<Entity>> {
        let name = tokens.get_or_empty(TokenType::Episode);
        if name.is_empty() {
            return Ok(None);
        }
        self.directory
            .find_episode(&project.id, name)?
            .map(Some)
            .ok_or_else(|| TreeError::not_found(ErrorCode::EpisodeNotFound, "Episode", name))
    }

    fn optional_sequence(
        &self,
        project: &Project,
        tokens: &ExtractedTokens,
        episode: Option<&Entity>,
    ) -> TreeResult<Option<Entity>> {
        let name = tokens.get_or_empty(TokenType::Sequence);
        if name.is_empty() {
            return Ok(None);
        }
        self.directory
            .find_sequence(&project.id, episode.map(|e| e.id.as_str()), name)?
            .map(Some)
            .ok_or_else(|| TreeError::not_found(ErrorCode::SequenceNotFound, "Sequence", name))
    }

    fn guess_task_type(&self, department_name: &str, task_type_name: &str) -> TreeResult<TaskType> {
        let department_id = if department_name.is_empty() {
            None
        } else {
            let department = self
                .directory
                .find_department(department_name)?
                .ok_or_else(|| {
                    TreeError::not_found(ErrorCode::DepartmentNotFound, "Department", department_name)
                })?;
            Some(department.id)
        };
        if task_type_name.is_empty() {
            return Err(TreeError::new(
                ErrorCode::WrongPathFormat,
                "Task type name was not found in given path.",
            ));
        }
        self.directory
            .find_task_type(task_type_name, department_id.as_deref())?
            .ok_or_else(|| TreeError::not_found(ErrorCode::TaskTypeNotFound, "Task type", task_type_name))
    }

    fn guess_task(&self, entity: &Entity, task_type: &TaskType, task_name: &str) -> TreeResult<Task> {
        let name = (!task_name.is_empty()).then_some(task_name);
        self.directory
            .find_task(&entity.id, &task_type.id, name)?
            .ok_or_else(|| {
                TreeError::task_not_found(&format!("{} / {}", entity.name, task_type.name))
            })
    }

    /// Every plausible reading of `file_path` across all modes and folder templates.
    ///
    /// Templates that do not fit the path are skipped. For each template that
    /// fits, tokens are resolved in template order and resolution stops at the
    /// first token whose prerequisites are missing or whose record is not
    /// found; the resolved prefix is kept. Identical template readings are reported
    /// once, even when several modes produce them.
    pub fn guess_from_path(
        &self,
        project_id: &str,
        file_path: &str,
        sep: &str,
    ) -> TreeResult<Vec<GuessMatch>> {
        let project = self
            .directory
            .project(project_id)?
            .ok_or_else(|| TreeError::project_not_found(project_id))?;
        let tree = self.tree_for(&project)?;
        let trimmed = trim_trailing_separator(file_path, sep);

        let mut matches: Vec<GuessMatch> = Vec::new();
        for (mode, spec) in &tree.modes {
            let root = match tree.root_path(mode, sep) {
                Ok(root) => root,
                Err(e) => {
                    debug!(mode = %mode, error = %e, "Skipping mode without root");
                    continue;
                }
            };
            let style = spec.folder_path.style;
            let styled_root = style.apply(&root);
            let styled_path = style.apply(trimmed);
            let Some(relative) = strip_root(&styled_path, &styled_root) else {
                debug!(mode = %mode, root = %styled_root, "Path is outside mode root");
                continue;
            };
            let path_segments = split_segments(relative, sep);

            for (key, template) in &spec.folder_path.templates {
                let Some(tokens) = self.extract_for(template, style, &path_segments)? else {
                    debug!(mode = %mode, template = %key, "Template does not match path");
                    continue;
                };
                if tokens.is_empty() {
                    continue;
                }

                let guess = self.resolve_tokens(mode, key, template, &tokens)?;
                if guess.values.is_empty() {
                    continue;
                }
                // The first mode to produce a reading keeps it.
                let seen = matches
                    .iter()
                    .any(|m| m.template == guess.template && m.values == guess.values);
                if !seen {
                    matches.push(guess);
                }
            }
        }
        Ok(matches)
    }

    fn extract_for(
        &self,
        template: &str,
        style: Style,
        path_segments: &[&str],
    ) -> TreeResult<Option<ExtractedTokens>> {
        let styled_template = restyle_literals(template, style);
        let template_segments = split_segments(&styled_template, "/");
        extract_tokens(path_segments, &template_segments)
    }

    /// Fold the template's tokens into resolved values, stopping at the first failure.
    fn resolve_tokens(
        &self,
        mode: &str,
        key: &str,
        template: &str,
        tokens: &ExtractedTokens,
    ) -> TreeResult<GuessMatch> {
        let mut guess = GuessMatch {
            mode: mode.to_string(),
            template: key.to_string(),
            values: BTreeMap::new(),
            complete: true,
        };

        for token_type in token_order(template) {
            let resolved = match tokens.get(token_type) {
                Some(raw) => self.resolve_token(token_type, raw, &guess)?,
                None => Err(Stop::MissingValue),
            };
            match resolved {
                Ok(value) => {
                    guess.values.insert(token_type, value);
                }
                Err(reason) => {
                    debug!(template = %key, token = %token_type, ?reason, "Stopped resolving template");
                    guess.complete = false;
                    break;
                }
            }
        }
        Ok(guess)
    }

    /// Resolve one raw value using what is already in `acc`.
    fn resolve_token(
        &self,
        token_type: TokenType,
        raw: &str,
        acc: &GuessMatch,
    ) -> TreeResult<Result<ResolvedToken, Stop>> {
        let dir = self.directory;
        let need = |t: TokenType| acc.id(t).ok_or(Stop::MissingPrerequisite);
        let found = |e: Option<String>| e.map(ResolvedToken::Id).ok_or(Stop::NotFound);

        let resolved = match token_type {
            TokenType::Project => found(dir.find_project(raw)?.map(|p| p.id)),
            TokenType::AssetType | TokenType::TemporalEntityType => {
                found(dir.find_entity_type(raw)?.map(|t| t.id))
            }
            TokenType::Department => found(dir.find_department(raw)?.map(|d| d.id)),
            TokenType::TaskType => found(dir.find_task_type(raw, None)?.map(|t| t.id)),
            TokenType::Episode => match need(TokenType::Project) {
                Ok(project_id) => found(dir.find_episode(project_id, raw)?.map(|e| e.id)),
                Err(stop) => Err(stop),
            },
            TokenType::Sequence => match (need(TokenType::Project), need(TokenType::Episode)) {
                (Ok(project_id), Ok(episode_id)) => {
                    found(dir.find_sequence(project_id, Some(episode_id), raw)?.map(|e| e.id))
                }
                _ => Err(Stop::MissingPrerequisite),
            },
            TokenType::Scene => match (need(TokenType::Project), need(TokenType::Sequence)) {
                (Ok(project_id), Ok(sequence_id)) => {
                    found(dir.find_scene(project_id, Some(sequence_id), raw)?.map(|e| e.id))
                }
                _ => Err(Stop::MissingPrerequisite),
            },
            TokenType::Shot => match (need(TokenType::Project), need(TokenType::Sequence)) {
                (Ok(project_id), Ok(sequence_id)) => {
                    found(dir.find_shot(project_id, Some(sequence_id), raw)?.map(|e| e.id))
                }
                _ => Err(Stop::MissingPrerequisite),
            },
            TokenType::Asset => match (need(TokenType::Project), need(TokenType::AssetType)) {
                (Ok(project_id), Ok(asset_type_id)) => {
                    found(dir.find_asset(project_id, Some(asset_type_id), raw)?.map(|e| e.id))
                }
                _ => Err(Stop::MissingPrerequisite),
            },
            TokenType::TemporalEntity => {
                match (need(TokenType::Project), need(TokenType::TemporalEntityType)) {
                    (Ok(project_id), Ok(type_id)) => found(
                        dir.find_entity(&EntityQuery {
                            project_id,
                            entity_type_id: Some(type_id),
                            parent: ParentScope::Any,
                            name: raw,
                        })?
                        .map(|e| e.id),
                    ),
                    _ => Err(Stop::MissingPrerequisite),
                }
            }
            TokenType::Task => {
                let owner = [TokenType::Scene, TokenType::Asset, TokenType::Shot]
                    .into_iter()
                    .find_map(|t| acc.id(t));
                match (need(TokenType::Project), need(TokenType::TaskType), owner) {
                    (Ok(_), Ok(task_type_id), Some(entity_id)) => {
                        found(dir.find_task(entity_id, task_type_id, Some(raw))?.map(|t| t.id))
                    }
                    _ => Err(Stop::MissingPrerequisite),
                }
            }
            TokenType::Instance => match need(TokenType::Episode) {
                Ok(episode_id) => {
                    found(dir.find_asset_instance_within(episode_id, raw)?.map(|i| i.id))
                }
                Err(stop) => Err(stop),
            },
            TokenType::Version | TokenType::Revision => raw
                .trim()
                .parse::<u32>()
                .map(ResolvedToken::Version)
                .map_err(|_| Stop::NotFound),
            TokenType::Name
            | TokenType::Representation
            | TokenType::WorkingFile
            | TokenType::OutputFile
            | TokenType::Software
            | TokenType::OutputType => Ok(ResolvedToken::Value(raw.to_string())),
        };
        Ok(resolved)
    }
}

/// Leaf name of a strict guess; absent means the path cannot name a task.
fn required_name(tokens: &ExtractedTokens, token_type: TokenType) -> TreeResult<&str> {
    let name = tokens.get_or_empty(token_type);
    if name.is_empty() {
        return Err(TreeError::new(
            ErrorCode::WrongPathFormat,
            format!("{} name was not found in given path.", token_type),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_segments() {
        let tokens = extract_tokens(
            &["big_buck", "shots", "s01", "sh010", "animation"],
            &["<Project>", "shots", "<Sequence>", "<Shot>", "<TaskType>"],
        )
        .unwrap()
        .unwrap();
        assert_eq!(tokens.get(TokenType::Project), Some("big buck"));
        assert_eq!(tokens.get(TokenType::Shot), Some("sh010"));
        assert_eq!(tokens.get(TokenType::TaskType), Some("animation"));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_extract_prefix_and_suffix() {
        let tokens = extract_tokens(&["v003_final"], &["v<Version>_final"])
            .unwrap()
            .unwrap();
        assert_eq!(tokens.get(TokenType::Version), Some("003"));
    }

    #[test]
    fn test_extract_several_tokens_in_segment() {
        let tokens = extract_tokens(&["s01-sh010"], &["<Sequence>-<Shot>"]).unwrap().unwrap();
        assert_eq!(tokens.get(TokenType::Sequence), Some("s01"));
        assert_eq!(tokens.get(TokenType::Shot), Some("sh010"));
    }

    #[test]
    fn test_extract_first_occurrence_wins() {
        let tokens = extract_tokens(&["first", "second"], &["<Shot>", "<Shot>"]).unwrap().unwrap();
        assert_eq!(tokens.get(TokenType::Shot), Some("first"));
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_extract_literal_mismatch() {
        let tokens = extract_tokens(&["bb", "assets"], &["<Project>", "shots"]).unwrap();
        assert!(tokens.is_none());
    }

    #[test]
    fn test_extract_prefix_mismatch() {
        let tokens = extract_tokens(&["003"], &["v<Version>"]).unwrap();
        assert!(tokens.is_none());
    }

    #[test]
    fn test_extract_count_mismatch() {
        let tokens = extract_tokens(&["bb"], &["<Project>", "shots"]).unwrap();
        assert!(tokens.is_none());
    }

    #[test]
    fn test_extract_escapes_regex_literals() {
        let tokens = extract_tokens(&["a.b(1)"], &["<Shot>.b(1)"]).unwrap().unwrap();
        assert_eq!(tokens.get(TokenType::Shot), Some("a"));
        assert!(extract_tokens(&["axb(1)"], &["<Shot>.b(1)"]).unwrap().is_none());
    }

    #[test]
    fn test_resolved_token_serializes_untagged() {
        let mut values = BTreeMap::new();
        values.insert(TokenType::Project, ResolvedToken::Id("p1".into()));
        values.insert(TokenType::Version, ResolvedToken::Version(3));
        let guess = GuessMatch {
            mode: "working".into(),
            template: "shot".into(),
            values,
            complete: false,
        };
        let json = serde_json::to_value(&guess).unwrap();
        assert_eq!(json["values"]["Project"], "p1");
        assert_eq!(json["values"]["Version"], 3);
    }
}
