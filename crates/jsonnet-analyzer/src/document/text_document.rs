use tower_lsp::lsp_types::Url;

/// Snapshot of a single open Jsonnet document.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    /// Full source text, replaced wholesale on every change.
    pub text: String,
    pub version: i32,
}

impl Document {
    pub fn new(
        uri: Url,
        text: String,
        version: i32,
    ) -> Self {
        Self {
            uri,
            text,
            version,
        }
    }

    pub fn set_content(
        &mut self,
        text: String,
        version: i32,
    ) {
        self.text = text;
        self.version = version;
    }

    /// Name used for ranges produced from this document: the filesystem path
    /// for `file://` URIs, the URI string otherwise.
    pub fn file_name(&self) -> String {
        file_name_for(&self.uri)
    }
}

pub fn file_name_for(uri: &Url) -> String {
    match uri.to_file_path() {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(()) => uri.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/text_document_tests.rs"]
mod tests;
