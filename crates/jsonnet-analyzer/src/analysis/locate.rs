//! Source ranges for nodes the parser synthesized.
//!
//! Fields, parameters, binds and bind identifiers come out of the parser
//! with the unset range. Their names still appear in the raw text, so we
//! rescan the text bounded by the parent's range, tracking line and column
//! one character at a time, and pick the first occurrence sitting in the
//! right syntactic slot.

use crate::analysis::error::LocateError;
use crate::syntax::kind::TokenKind;
use crate::syntax::parser::string_value;
use crate::syntax::{Ast, FieldName, Location, LocationRange, NodeId, NodeKind};
use crate::text_pos::LineIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme<'s> {
    Word(&'s str),
    /// Decoded value, comparable with parsed names.
    Str(String),
    Punct(char),
}

#[derive(Debug, Clone)]
struct Scanned<'s> {
    lexeme: Lexeme<'s>,
    begin: Location,
    end: Location,
    depth: i32,
}

/// Where a synthesized name may legally appear.
#[derive(Debug, Clone, Copy)]
enum Slot {
    /// `{ name: ...`, `, name+: ...`, `, name(...): ...`
    Field,
    /// `(name, ...` or `, name = ...)`
    Param,
    /// `local name = ...` or `, name(...) = ...`
    Bind { depth: i32 },
    /// Anywhere.
    Bare,
}

pub struct Locator<'a> {
    ast: &'a Ast,
    source: &'a str,
    index: &'a LineIndex,
}

impl<'a> Locator<'a> {
    pub fn new(
        ast: &'a Ast,
        source: &'a str,
        index: &'a LineIndex,
    ) -> Self {
        Self {
            ast,
            source,
            index,
        }
    }

    /// The source range of `id`. Nodes with native locations return them
    /// as-is; synthesized nodes are searched for inside `parent_range`.
    pub fn reconstruct(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        parent_range: &LocationRange,
    ) -> Result<LocationRange, LocateError> {
        let node = self.ast.node(id);
        let (name, quoted, slot) = match &node.kind {
            NodeKind::ObjectField {
                name,
                ..
            } => match name {
                FieldName::Id(name) => (name.as_str(), false, Slot::Field),
                FieldName::String(name) => (name.as_str(), true, Slot::Field),
                FieldName::Computed(expr) => return Ok(self.ast.node(*expr).loc.clone()),
            },
            NodeKind::Parameter {
                name,
            }
            | NodeKind::NamedParameter {
                name,
                ..
            } => (name.as_str(), false, Slot::Param),
            NodeKind::LocalBind {
                variable,
                ..
            } => {
                let NodeKind::Identifier {
                    name,
                } = self.ast.kind(*variable)
                else {
                    return Ok(node.loc.clone());
                };
                let depth = match parent.map(|parent| self.ast.kind(parent)) {
                    Some(NodeKind::Object { .. } | NodeKind::ObjectComp { .. }) => 1,
                    _ => 0,
                };
                (name.as_str(), false, Slot::Bind {
                    depth,
                })
            },
            NodeKind::Identifier {
                name,
            } => (name.as_str(), false, Slot::Bare),
            NodeKind::Apply { .. }
            | NodeKind::Array { .. }
            | NodeKind::ArrayComp { .. }
            | NodeKind::Assert { .. }
            | NodeKind::Binary { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::Dollar
            | NodeKind::Error { .. }
            | NodeKind::ForSpec { .. }
            | NodeKind::Function { .. }
            | NodeKind::IfSpec { .. }
            | NodeKind::Import { .. }
            | NodeKind::InSuper { .. }
            | NodeKind::Index { .. }
            | NodeKind::LiteralBoolean(_)
            | NodeKind::LiteralNull
            | NodeKind::LiteralNumber { .. }
            | NodeKind::LiteralString { .. }
            | NodeKind::Local { .. }
            | NodeKind::Object { .. }
            | NodeKind::ObjectAssert { .. }
            | NodeKind::ObjectComp { .. }
            | NodeKind::Partial
            | NodeKind::SelfRef
            | NodeKind::Slice { .. }
            | NodeKind::SuperIndex { .. }
            | NodeKind::Unary { .. }
            | NodeKind::Var { .. } => return Ok(node.loc.clone()),
        };

        let not_found = || LocateError {
            name: name.to_string(),
            range: parent_range.clone(),
        };
        let tokens = self.scan(parent_range).ok_or_else(not_found)?;
        let found = find_in_slot(&tokens, name, quoted, slot).ok_or_else(not_found)?;
        Ok(LocationRange::new(parent_range.file.clone(), found.begin, found.end))
    }

    /// Lex the text inside `range` into words, strings and punctuation,
    /// skipping comments. Depth counts open brackets since `range.begin`.
    fn scan(
        &self,
        range: &LocationRange,
    ) -> Option<Vec<Scanned<'a>>> {
        let start = self.index.offset(self.source, range.begin)?;
        let text = &self.source[start..];
        let mut chars = text.char_indices().peekable();
        let mut line = range.begin.line;
        let mut column = range.begin.column;
        let mut depth = 0i32;
        let mut out = Vec::new();

        // Advance one character, keeping line/column in step.
        macro_rules! advance {
            () => {{
                if let Some((_, c)) = chars.next() {
                    if c == '\n' {
                        line += 1;
                        column = 1;
                    } else {
                        column += 1;
                    }
                }
            }};
        }

        while let Some(&(offset, c)) = chars.peek() {
            let here = Location::new(line, column);
            if here >= range.end {
                break;
            }
            let rest = &text[offset..];

            if c.is_whitespace() {
                advance!();
            } else if rest.starts_with("//") || c == '#' {
                while chars.peek().is_some_and(|&(_, c)| c != '\n') {
                    advance!();
                }
            } else if rest.starts_with("/*") {
                let len = rest.find("*/").map(|end| end + 2).unwrap_or(rest.len());
                let stop = offset + len;
                while chars.peek().is_some_and(|&(at, _)| at < stop) {
                    advance!();
                }
            } else if rest.starts_with("|||") {
                advance!();
                advance!();
                advance!();
                let body = &text[offset + 3..];
                let len = text_block_len(body);
                let stop = offset + 3 + len;
                while chars.peek().is_some_and(|&(at, _)| at < stop) {
                    advance!();
                }
                out.push(Scanned {
                    lexeme: Lexeme::Str(string_value(TokenKind::TextBlock, &text[offset..stop])),
                    begin: here,
                    end: Location::new(line, column),
                    depth,
                });
            } else if c == '"' || c == '\'' || (c == '@' && (rest[1..].starts_with('"') || rest[1..].starts_with('\''))) {
                let verbatim = c == '@';
                if verbatim {
                    advance!();
                }
                let Some(&(_, quote)) = chars.peek() else {
                    break;
                };
                advance!();
                let mut close_at = None;
                while let Some(&(at, ch)) = chars.peek() {
                    if ch == quote {
                        let doubled = verbatim && text[at + 1..].starts_with(quote);
                        advance!();
                        if doubled {
                            advance!();
                            continue;
                        }
                        close_at = Some(at);
                        break;
                    }
                    if ch == '\\' && !verbatim {
                        advance!();
                    }
                    advance!();
                }
                let kind = match (verbatim, quote) {
                    (true, '"') => TokenKind::VerbatimDoubleString,
                    (true, _) => TokenKind::VerbatimSingleString,
                    (false, '"') => TokenKind::DoubleString,
                    (false, _) => TokenKind::SingleString,
                };
                // Unterminated strings never name anything.
                let value = match close_at {
                    Some(close_at) => string_value(kind, &text[offset..close_at + quote.len_utf8()]),
                    None => String::new(),
                };
                out.push(Scanned {
                    lexeme: Lexeme::Str(value),
                    begin: here,
                    end: Location::new(line, column),
                    depth,
                });
            } else if c.is_ascii_alphanumeric() || c == '_' {
                let mut stop = offset;
                while let Some(&(at, ch)) = chars.peek() {
                    if !(ch.is_ascii_alphanumeric() || ch == '_') {
                        break;
                    }
                    stop = at + ch.len_utf8();
                    advance!();
                }
                out.push(Scanned {
                    lexeme: Lexeme::Word(&text[offset..stop]),
                    begin: here,
                    end: Location::new(line, column),
                    depth,
                });
            } else {
                if matches!(c, ')' | ']' | '}') {
                    depth -= 1;
                }
                advance!();
                out.push(Scanned {
                    lexeme: Lexeme::Punct(c),
                    begin: here,
                    end: Location::new(line, column),
                    depth,
                });
                if matches!(c, '(' | '[' | '{') {
                    depth += 1;
                }
            }
        }

        Some(out)
    }
}

/// Byte length of a text block body up to and including its closing `|||`.
fn text_block_len(body: &str) -> usize {
    let mut offset = 0usize;
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if offset > 0 && trimmed.starts_with("|||") {
            return offset + (line.len() - trimmed.len()) + 3;
        }
        offset += line.len();
    }
    body.len()
}

fn find_in_slot<'t, 's>(
    tokens: &'t [Scanned<'s>],
    name: &str,
    quoted: bool,
    slot: Slot,
) -> Option<&'t Scanned<'s>> {
    let is_punct = |token: Option<&Scanned<'_>>, set: &[char]| {
        matches!(token, Some(Scanned { lexeme: Lexeme::Punct(c), .. }) if set.contains(c))
    };

    let bind_heads = match slot {
        Slot::Bind {
            depth,
        } => bind_name_positions(tokens, depth),
        Slot::Field | Slot::Param | Slot::Bare => Vec::new(),
    };

    tokens.iter().enumerate().find_map(|(i, token)| {
        let name_matches = match &token.lexeme {
            Lexeme::Word(word) => !quoted && *word == name,
            Lexeme::Str(value) => quoted && value == name,
            Lexeme::Punct(_) => false,
        };
        if !name_matches {
            return None;
        }
        let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
        let next = tokens.get(i + 1);
        let fits = match slot {
            Slot::Field => token.depth == 1 && is_punct(prev, &['{', ',']) && is_punct(next, &[':', '+', '(']),
            Slot::Param => token.depth == 1 && is_punct(prev, &['(', ',']) && is_punct(next, &[',', ')', '=']),
            Slot::Bind {
                ..
            } => bind_heads.get(i).copied().unwrap_or(false) && is_punct(next, &['=', '(']),
            Slot::Bare => true,
        };
        fits.then_some(token)
    })
}

/// Marks the tokens that may start a bind of the enclosing `local`.
///
/// At depth 0 the range opens with that `local`, so only its own bind list
/// counts: the token right after it, or after a `,` while no nested `local`
/// or `assert` is waiting for its `;`. At depth 1 every object local is
/// `local` directly after `{` or `,`.
fn bind_name_positions(
    tokens: &[Scanned<'_>],
    depth: i32,
) -> Vec<bool> {
    let mut heads = vec![false; tokens.len()];
    if depth != 0 {
        for i in 2..tokens.len() {
            let (before, prev) = (&tokens[i - 2], &tokens[i - 1]);
            heads[i] = tokens[i].depth == depth
                && prev.lexeme == Lexeme::Word("local")
                && matches!(before.lexeme, Lexeme::Punct('{' | ','));
        }
        return heads;
    }

    let mut open = 0usize;
    let mut after_separator = false;
    for (i, token) in tokens.iter().enumerate() {
        if token.depth != 0 {
            after_separator = false;
            continue;
        }
        if after_separator && open == 1 {
            heads[i] = true;
        }
        after_separator = false;
        match &token.lexeme {
            Lexeme::Word("local") if i == 0 => {
                open = 1;
                after_separator = true;
            },
            Lexeme::Word("local" | "assert") if open > 0 => open += 1,
            Lexeme::Punct(';') if open > 0 => {
                open -= 1;
                if open == 0 {
                    break;
                }
            },
            Lexeme::Punct(',') => after_separator = true,
            _ => {},
        }
    }
    heads
}

/// Whether `location` falls inside `range`, both ends inclusive.
pub fn in_range(
    location: Location,
    range: &LocationRange,
) -> bool {
    let (begin, end) = (range.begin, range.end);
    if begin.line == location.line && location.line == end.line {
        begin.column <= location.column && location.column <= end.column
    } else if begin.line < location.line && location.line == end.line {
        location.column <= end.column
    } else if begin.line == location.line && location.line < end.line {
        location.column >= begin.column
    } else {
        begin.line < location.line && location.line < end.line
    }
}

/// Whether `inner` is nested within (or equal to) `outer`.
pub fn is_range_smaller(
    inner: &LocationRange,
    outer: &LocationRange,
) -> bool {
    outer.begin <= inner.begin && inner.end <= outer.end
}

#[cfg(test)]
#[path = "../../tests/src/analysis/locate_tests.rs"]
mod tests;
