//! What the server echoes into the editor's output panel.
//!
//! Tracing to stderr and the log file follows the command line. These
//! settings only filter `window/logMessage` notifications.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tower_lsp::lsp_types::MessageType;

/// Lowest severity forwarded to the client. `off` silences the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    /// Adds per-request failures such as unreadable imports.
    Verbose,
}

impl LogLevel {
    /// Whether a notification of `kind` reaches the client.
    pub fn admits(
        self,
        kind: MessageType,
    ) -> bool {
        let needed = if kind == MessageType::ERROR {
            LogLevel::Error
        } else if kind == MessageType::WARNING {
            LogLevel::Warn
        } else if kind == MessageType::INFO {
            LogLevel::Info
        } else {
            LogLevel::Verbose
        };
        self >= needed
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

impl LoggingSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        if let Some(level) = patch.level {
            self.level = level;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct LoggingSettingsPatch {
    level: Option<LogLevel>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}
