//! Template tokens: `<TokenType>` and `<TokenType.field>` placeholders.

use crate::style::Style;
use regex_lite::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Any placeholder, including ones naming unknown token types.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([\w.]*)>").expect("valid placeholder pattern"));

/// Closed vocabulary of token types a tree template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenType {
    Project,
    Episode,
    Sequence,
    Shot,
    Scene,
    AssetType,
    Asset,
    Department,
    TaskType,
    Task,
    Software,
    OutputType,
    Name,
    Representation,
    Version,
    Revision,
    TemporalEntity,
    TemporalEntityType,
    Instance,
    WorkingFile,
    OutputFile,
}

impl TokenType {
    pub const ALL: [TokenType; 21] = [
        TokenType::Project,
        TokenType::Episode,
        TokenType::Sequence,
        TokenType::Shot,
        TokenType::Scene,
        TokenType::AssetType,
        TokenType::Asset,
        TokenType::Department,
        TokenType::TaskType,
        TokenType::Task,
        TokenType::Software,
        TokenType::OutputType,
        TokenType::Name,
        TokenType::Representation,
        TokenType::Version,
        TokenType::Revision,
        TokenType::TemporalEntity,
        TokenType::TemporalEntityType,
        TokenType::Instance,
        TokenType::WorkingFile,
        TokenType::OutputFile,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Project => "Project",
            TokenType::Episode => "Episode",
            TokenType::Sequence => "Sequence",
            TokenType::Shot => "Shot",
            TokenType::Scene => "Scene",
            TokenType::AssetType => "AssetType",
            TokenType::Asset => "Asset",
            TokenType::Department => "Department",
            TokenType::TaskType => "TaskType",
            TokenType::Task => "Task",
            TokenType::Software => "Software",
            TokenType::OutputType => "OutputType",
            TokenType::Name => "Name",
            TokenType::Representation => "Representation",
            TokenType::Version => "Version",
            TokenType::Revision => "Revision",
            TokenType::TemporalEntity => "TemporalEntity",
            TokenType::TemporalEntityType => "TemporalEntityType",
            TokenType::Instance => "Instance",
            TokenType::WorkingFile => "WorkingFile",
            TokenType::OutputFile => "OutputFile",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Record field a placeholder asks for. Anything else falls back to `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    ShortName,
    #[default]
    Name,
    Number,
    Id,
}

impl Field {
    pub fn from_name(name: &str) -> Self {
        match name {
            "short_name" => Field::ShortName,
            "number" => Field::Number,
            "id" => Field::Id,
            _ => Field::Name,
        }
    }
}

/// One `<...>` occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Text between the angle brackets, e.g. `TaskType.short_name`.
    pub raw: String,
    /// Data type part before the first dot.
    pub data_type: String,
    pub field: Field,
}

impl Placeholder {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('.');
        let data_type = parts.next().unwrap_or_default().to_string();
        let field = parts.next().map(Field::from_name).unwrap_or_default();
        Self {
            raw: raw.to_string(),
            data_type,
            field,
        }
    }

    pub fn token_type(&self) -> Option<TokenType> {
        TokenType::from_name(&self.data_type)
    }

    /// The placeholder as written in the template.
    pub fn source(&self) -> String {
        format!("<{}>", self.raw)
    }
}

/// Distinct placeholders of `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<Placeholder> {
    let mut found: Vec<Placeholder> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let raw = &caps[1];
        if !found.iter().any(|p| p.raw == raw) {
            found.push(Placeholder::parse(raw));
        }
    }
    found
}

/// Token types of `template` in template order, first occurrence only.
pub fn token_order(template: &str) -> Vec<TokenType> {
    let mut order = Vec::new();
    for placeholder in placeholders(template) {
        if let Some(token_type) = placeholder.token_type()
            && !order.contains(&token_type)
        {
            order.push(token_type);
        }
    }
    order
}

/// A template split into literal text and placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Literal(String),
    Token(Placeholder),
}

/// Split a template (or one segment of it) into pieces.
pub fn pieces(template: &str) -> Vec<Piece> {
    let mut result = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let whole = caps.get(0).expect("group 0 always matches");
        if whole.start() > last {
            result.push(Piece::Literal(template[last..whole.start()].to_string()));
        }
        result.push(Piece::Token(Placeholder::parse(&caps[1])));
        last = whole.end();
    }
    if last < template.len() {
        result.push(Piece::Literal(template[last..].to_string()));
    }
    result
}

/// Apply `style` to the literal text of a template, leaving placeholders intact.
pub fn restyle_literals(template: &str, style: Style) -> String {
    pieces(template)
        .into_iter()
        .map(|piece| match piece {
            Piece::Literal(text) => style.apply(&text),
            Piece::Token(placeholder) => placeholder.source(),
        })
        .collect()
}
