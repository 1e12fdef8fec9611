//! Separator-aware path string helpers.
//!
//! Rendered paths are plain strings: templates always use `/` internally and
//! are converted to the caller's separator at the end. No filesystem I/O.

use std::path::MAIN_SEPARATOR_STR;

/// Separator used when the caller does not pick one.
pub fn default_separator() -> &'static str {
    MAIN_SEPARATOR_STR
}

/// Replace the template separator `/` with `sep`.
pub fn change_folder_path_separators(folder_path: &str, sep: &str) -> String {
    folder_path.replace('/', sep)
}

/// Join two path parts, eliding whichever side is empty.
pub fn join_path(left: &str, right: &str, sep: &str) -> String {
    if left.is_empty() {
        right.to_string()
    } else if right.is_empty() {
        left.to_string()
    } else {
        format!("{}{}{}", left, sep, right)
    }
}

/// Split on `sep`. An empty separator yields the whole path as one segment.
pub fn split_segments<'a>(path: &'a str, sep: &str) -> Vec<&'a str> {
    if sep.is_empty() {
        return vec![path];
    }
    path.split(sep).collect()
}

/// `path` without trailing separators.
pub fn trim_trailing_separator<'a>(path: &'a str, sep: &str) -> &'a str {
    if sep.is_empty() {
        return path;
    }
    let mut trimmed = path;
    while let Some(rest) = trimmed.strip_suffix(sep) {
        trimmed = rest;
    }
    trimmed
}

/// The part of `path` after `root`, if `path` starts with it.
pub fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    path.strip_prefix(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_separators() {
        assert_eq!(
            change_folder_path_separators("bb/shots/s01/sh01", "\\"),
            "bb\\shots\\s01\\sh01"
        );
        assert_eq!(change_folder_path_separators("bb/shots", "/"), "bb/shots");
    }

    #[test]
    fn test_join_path_elides_empty_side() {
        assert_eq!(join_path("", "file", "/"), "file");
        assert_eq!(join_path("/prod/", "", "/"), "/prod/");
        assert_eq!(join_path("/prod/bb", "file", "/"), "/prod/bb/file");
        assert_eq!(join_path("/prod/", "bb", ""), "/prod/bb");
    }

    #[test]
    fn test_split_and_trim() {
        assert_eq!(split_segments("a/b/c", "/"), vec!["a", "b", "c"]);
        assert_eq!(split_segments("a/b", ""), vec!["a/b"]);
        assert_eq!(trim_trailing_separator("a/b//", "/"), "a/b");
        assert_eq!(trim_trailing_separator("a/b", "/"), "a/b");
    }

    #[test]
    fn test_strip_root() {
        assert_eq!(strip_root("/simple/productions/bb", "/simple/productions/"), Some("bb"));
        assert_eq!(strip_root("/other/bb", "/simple/productions/"), None);
    }
}
