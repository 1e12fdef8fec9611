//! File tree engine
//!
//! Renders production file paths from per-project tree documents and guesses
//! entities, tasks and versions back from paths built that way.

pub mod builder;
pub mod cli;
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod format;
pub mod logging;
pub mod parser;
pub mod paths;
pub mod render;
pub mod style;
pub mod token;
pub mod tree;
pub mod types;

pub use builder::{BuiltPath, PathBuilder, PathParams, Subject};
pub use directory::{EntityDirectory, Fixture, InMemoryDirectory};
pub use error::{ErrorCode, TreeError, TreeResult};
pub use parser::{GuessMatch, PathParser, ResolvedToken, extract_tokens};
pub use render::{RenderContext, RenderOptions, Renderer, StaticDefaults};
pub use style::Style;
pub use token::{Field, TokenType};
pub use tree::{TemplateKind, TreeDefinition, TreeStore};
