use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportSettings {
    /// Library search roots, tried in order after the importing file's
    /// directory.
    pub jpaths: Vec<String>,
}

impl ImportSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: ImportSettingsPatch,
    ) {
        if let Some(v) = patch.jpaths {
            self.jpaths = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        let mut seen = Vec::with_capacity(self.jpaths.len());
        for path in self.jpaths.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            if !seen.iter().any(|s: &String| s == path) {
                seen.push(path.to_string());
            }
        }
        self.jpaths = seen;
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ImportSettingsPatch {
    pub(crate) jpaths: Option<Vec<String>>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
