use std::path::Path;

use tower_lsp::lsp_types::{Location as LspLocation, Position, Range, Url};

use crate::syntax::{Location, LocationRange};
use crate::text_pos::{location_from_position, position_from_location};

pub fn lsp_position_to_location(
    source: &str,
    position: Position,
) -> Location {
    location_from_position(source, position)
}

/// Convert a tree range to an LSP range. Without the file's text, columns are
/// taken as UTF-16 offsets directly.
pub fn range_to_lsp(
    range: &LocationRange,
    source: Option<&str>,
) -> Range {
    match source {
        Some(source) => Range::new(position_from_location(source, range.begin), position_from_location(source, range.end)),
        None => Range::new(approximate_position(range.begin), approximate_position(range.end)),
    }
}

fn approximate_position(location: Location) -> Position {
    Position::new(location.line.saturating_sub(1), location.column.saturating_sub(1))
}

/// URI for the file a range names: filesystem paths become `file://` URIs,
/// anything else must already be a URI.
pub fn file_uri(file: &str) -> Option<Url> {
    let path = Path::new(file);
    if path.is_absolute() {
        return Url::from_file_path(path).ok();
    }
    Url::parse(file).ok()
}

pub fn range_to_lsp_location(
    range: &LocationRange,
    source: Option<&str>,
) -> Option<LspLocation> {
    if !range.is_valid() {
        return None;
    }
    Some(LspLocation {
        uri: file_uri(&range.file)?,
        range: range_to_lsp(range, source),
    })
}

#[cfg(test)]
#[path = "../../tests/src/ide/lsp_tests.rs"]
mod tests;
