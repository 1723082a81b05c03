use std::path::Path;

use tower_lsp::lsp_types::{DocumentHighlight, GotoDefinitionResponse, Location as LspLocation};

use crate::analysis::Resolved;
use crate::cache::NodeCache;
use crate::ide::lsp::range_to_lsp_location;
use crate::syntax::LocationRange;

/// Finds the text behind a range's file: the open document itself, or an
/// imported file held by the node cache.
pub struct SourceLookup<'a> {
    pub current_file: &'a str,
    pub current_text: &'a str,
    pub cache: &'a NodeCache,
}

impl SourceLookup<'_> {
    pub fn text_of(
        &self,
        file: &str,
    ) -> Option<String> {
        if file == self.current_file {
            return Some(self.current_text.to_string());
        }
        self.cache.get(Path::new(file)).ok().map(|cached| cached.tree.source().to_string())
    }

    pub fn to_lsp(
        &self,
        range: &LocationRange,
    ) -> Option<LspLocation> {
        let text = self.text_of(&range.file);
        range_to_lsp_location(range, text.as_deref())
    }
}

pub fn definition_response(
    resolved: &Resolved,
    sources: &SourceLookup<'_>,
) -> Option<GotoDefinitionResponse> {
    sources.to_lsp(&resolved.location).map(GotoDefinitionResponse::Scalar)
}

pub fn reference_locations(
    ranges: &[LocationRange],
    sources: &SourceLookup<'_>,
) -> Vec<LspLocation> {
    ranges.iter().filter_map(|range| sources.to_lsp(range)).collect()
}

/// Highlights are limited to the document the request came from.
pub fn highlights(
    ranges: &[LocationRange],
    sources: &SourceLookup<'_>,
) -> Vec<DocumentHighlight> {
    ranges
        .iter()
        .filter(|range| &*range.file == sources.current_file)
        .filter_map(|range| sources.to_lsp(range))
        .map(|location| DocumentHighlight {
            range: location.range,
            kind: None,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src/ide/navigation_tests.rs"]
mod tests;
