#![allow(dead_code)]

use std::path::{Path, PathBuf};

use jsonnet_analyzer::Location;
use tower_lsp::lsp_types::{Position, Url};

/// Temporary directory populated with `files`, kept alive by the caller.
pub fn fixture(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dirs");
        }
        std::fs::write(path, contents).expect("write fixture");
    }
    dir
}

pub fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).expect("fixture path exists")
}

pub fn file_uri(path: &Path) -> Url {
    Url::from_file_path(path).expect("fixture path is valid file:// URI")
}

pub fn position_of(
    source: &str,
    needle: &str,
) -> Position {
    position_of_nth(source, needle, 0)
}

/// LSP position of the first character of the `nth` occurrence of `needle`.
pub fn position_of_nth(
    source: &str,
    needle: &str,
    nth: usize,
) -> Position {
    assert!(!needle.is_empty(), "needle must not be empty");
    let Some((offset, _)) = source.match_indices(needle).nth(nth) else {
        panic!("needle not found: {needle} (occurrence {nth})");
    };
    let before = &source[..offset];
    let line = before.matches('\n').count() as u32;
    let character = before.rsplit('\n').next().unwrap_or("").encode_utf16().count() as u32;
    Position::new(line, character)
}

/// Tree location (1-based) of the first character of the `nth` occurrence.
pub fn location_of_nth(
    source: &str,
    needle: &str,
    nth: usize,
) -> Location {
    let Some((offset, _)) = source.match_indices(needle).nth(nth) else {
        panic!("needle not found: {needle} (occurrence {nth})");
    };
    let before = &source[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let column = before.rsplit('\n').next().unwrap_or("").chars().count() as u32 + 1;
    Location::new(line, column)
}

pub fn location_of(
    source: &str,
    needle: &str,
) -> Location {
    location_of_nth(source, needle, 0)
}
