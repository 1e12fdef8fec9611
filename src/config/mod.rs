//! Unified configuration system.
//!
//! Consolidates configuration from tiers with field-by-field YAML merging:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/file-tree/config.yaml`
//! 3. **User** - `~/.file-tree/config.yaml`
//! 4. **Environment** - variables below
//!
//! Tree documents are resolved separately: `trees/<name>.json` in the user or
//! project directory, first found wins.
//!
//! ## Environment Variables
//! - `FILE_TREE_CONFIG_PATH` - Explicit config file (replaces tier merging)
//! - `FILE_TREE_FOLDER` - Folder holding tree documents
//! - `DEFAULT_FILE_TREE` - Tree assigned to projects that have none
//! - `FILE_TREE_DB_PATH` - Entity database path
//! - `FILE_TREE_STRICT_TOKENS` - Fail on unresolved placeholders
//! - `FILE_TREE_USER_DIR` - User config dir (default: `~/.file-tree`)
//! - `FILE_TREE_PROJECT_DIR` - Project config dir (default: `./file-tree`)

mod files;
mod loader;
mod merge;
mod types;

pub use files::{FileSource, ResolvedFile};
pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
