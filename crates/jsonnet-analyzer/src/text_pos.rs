use tower_lsp::lsp_types::Position;

use crate::syntax::ast::Location;

/// Byte offsets of every line start, used to map lexer spans onto the
/// 1-based line/column coordinates carried by the tree.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0usize];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
        }
    }

    /// Location of the character starting at `offset`. Columns count
    /// characters, not bytes.
    pub fn location(
        &self,
        source: &str,
        offset: usize,
    ) -> Location {
        let offset = offset.min(source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(ins) => ins.saturating_sub(1),
        };
        let start = self.line_starts[line];
        let column = source.get(start..offset).map(|s| s.chars().count()).unwrap_or(0);
        Location::new(line as u32 + 1, column as u32 + 1)
    }

    /// Byte offset of `location`, if it falls inside `source`.
    pub fn offset(
        &self,
        source: &str,
        location: Location,
    ) -> Option<usize> {
        if !location.is_set() {
            return None;
        }
        let start = *self.line_starts.get(location.line as usize - 1)?;
        let end = self.line_starts.get(location.line as usize).copied().unwrap_or(source.len());
        let line = &source[start..end];
        let wanted = location.column as usize - 1;
        let mut chars = 0usize;
        for (idx, _) in line.char_indices() {
            if chars == wanted {
                return Some(start + idx);
            }
            chars += 1;
        }
        (chars == wanted).then_some(end)
    }
}

/// Convert an LSP position (0-based line, UTF-16 code units) to a tree location.
pub fn location_from_position(
    source: &str,
    position: Position,
) -> Location {
    let line_text = source.split('\n').nth(position.line as usize).unwrap_or("");
    let mut utf16_offset = 0u32;
    let mut column = 0u32;
    for ch in line_text.chars() {
        if utf16_offset >= position.character {
            break;
        }
        utf16_offset += ch.len_utf16() as u32;
        column += 1;
    }
    Location::new(position.line + 1, column + 1)
}

/// Convert a tree location back to an LSP position.
pub fn position_from_location(
    source: &str,
    location: Location,
) -> Position {
    if !location.is_set() {
        return Position::new(0, 0);
    }
    let line_idx = location.line - 1;
    let line_text = source.split('\n').nth(line_idx as usize).unwrap_or("");
    let character =
        line_text.chars().take(location.column as usize - 1).map(|c| c.len_utf16() as u32).sum::<u32>();
    Position::new(line_idx, character)
}
