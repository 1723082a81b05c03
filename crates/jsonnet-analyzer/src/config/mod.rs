//! Settings received from the client.
//!
//! Each category lives in its own file with a `*Patch` counterpart.
//! [`ServerSettings`] merges patches from `initializationOptions` and
//! `workspace/didChangeConfiguration`, then normalizes the result.

pub(crate) mod imports;
pub(crate) mod logging;

use std::collections::HashMap;
use std::path::PathBuf;

use imports::ImportSettingsPatch;
pub use imports::ImportSettings;
use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
use serde::Deserialize;
use serde_json::Value;

pub const SETTINGS_SECTION_KEY: &str = "jsonnet-analyzer";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerSettings {
    pub imports: ImportSettings,
    pub logging: LoggingSettings,
}

impl ServerSettings {
    pub fn from_lsp_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    pub fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<ServerSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    /// Import search roots: configured `jpaths` first, then `extra` (the
    /// command line `--jpath` entries). The importing file's own directory is
    /// prepended per request by the resolver.
    pub fn search_paths(
        &self,
        extra: &[PathBuf],
    ) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.imports.jpaths.iter().map(PathBuf::from).collect();
        for path in extra {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }

    fn apply_patch(
        &mut self,
        patch: ServerSettingsPatch,
    ) {
        if let Some(p) = patch.imports {
            self.imports.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.imports.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    imports: Option<ImportSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    candidates.push(payload.clone());
    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }
    candidates
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
