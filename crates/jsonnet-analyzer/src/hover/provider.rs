use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::analysis::{Analysis, AnalysisError, Resolved};
use crate::ide::lsp::lsp_position_to_location;

/// Renders resolver descriptions as hover cards.
#[derive(Debug, Clone)]
pub struct HoverProvider {
    analysis: Analysis,
}

impl HoverProvider {
    pub fn new(analysis: Analysis) -> Self {
        Self {
            analysis,
        }
    }

    /// Hover for the node under `position` in `text`, or `None` when there is
    /// nothing to describe.
    pub fn provide(
        &self,
        file: &str,
        text: &str,
        position: Position,
    ) -> Result<Option<Hover>, AnalysisError> {
        let location = lsp_position_to_location(text, position);
        let resolved = self.analysis.resolve_at(file, text, location)?;
        Ok(resolved.as_ref().and_then(make_hover))
    }
}

pub fn make_hover(resolved: &Resolved) -> Option<Hover> {
    if resolved.description.is_empty() {
        return None;
    }
    tracing::debug!("Hover for `{}`", resolved.token);
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!("```jsonnet\n{}\n```", resolved.description),
        }),
        range: None,
    })
}

#[cfg(test)]
#[path = "../../tests/src/hover/provider_tests.rs"]
mod tests;
