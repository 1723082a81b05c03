use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::{
    Client,
    jsonrpc,
    lsp_types::Url,
};
use tracing::{debug, warn};

use crate::{
    analysis::{Analysis, AnalysisError},
    cache::NodeCache,
    config::ServerSettings,
    document::{DocumentStore, text_document::file_name_for},
};

/// The jsonnet-analyzer backend that implements the Language Server Protocol.
pub struct JsonnetLanguageServer {
    /// The LSP client handle, used for log messages back to the editor.
    pub(crate) client: Client,

    /// Thread-safe store of all open documents.
    pub(crate) document_store: Arc<DocumentStore>,

    /// Parsed and annotated trees of imported files.
    pub(crate) cache: Arc<NodeCache>,

    /// Search roots passed with `--jpath`, appended after configured ones.
    pub(crate) cli_jpaths: Vec<PathBuf>,

    /// Runtime server settings updated from LSP configuration.
    pub(crate) settings: Arc<RwLock<ServerSettings>>,
}

/// Everything a blocking analysis task needs, detached from the server.
pub(crate) struct RequestContext {
    pub(crate) analysis: Analysis,
    pub(crate) file: String,
    pub(crate) text: String,
}

impl JsonnetLanguageServer {
    pub fn new(
        client: Client,
        cli_jpaths: Vec<PathBuf>,
    ) -> Self {
        Self {
            client,
            document_store: Arc::new(DocumentStore::new()),
            cache: Arc::new(NodeCache::new()),
            cli_jpaths,
            settings: Arc::new(RwLock::new(ServerSettings::default())),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        *self.settings.write().await = settings;
    }

    pub(crate) async fn analysis(&self) -> Analysis {
        let search_paths = self.settings.read().await.search_paths(&self.cli_jpaths);
        Analysis::new(Arc::clone(&self.cache), search_paths)
    }

    /// Drop any cached tree for the file behind `uri` so importers see the
    /// edited text on their next load.
    pub(crate) fn invalidate(
        &self,
        uri: &Url,
    ) {
        if let Ok(path) = uri.to_file_path() {
            self.cache.invalidate(&path);
        }
    }

    /// Run `op` for the open document `uri` on the blocking pool. Unknown
    /// documents yield `None`; expected analysis misses are folded into
    /// `None` as well, anything else fails the request.
    pub(crate) async fn with_document<T, F>(
        &self,
        uri: &Url,
        op: F,
    ) -> jsonrpc::Result<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(RequestContext) -> Result<Option<T>, AnalysisError> + Send + 'static,
    {
        let Some(text) = self.document_store.get_content(uri) else {
            debug!("Request for unknown document {uri}");
            return Ok(None);
        };
        let context = RequestContext {
            analysis: self.analysis().await,
            file: file_name_for(uri),
            text,
        };

        match tokio::task::spawn_blocking(move || op(context)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) if err.is_expected() => {
                debug!("No result for {uri}: {err}");
                Ok(None)
            },
            Ok(Err(err)) => {
                warn!("Analysis failed for {uri}: {err}");
                Err(internal_error(err.to_string()))
            },
            Err(join) => {
                warn!("Analysis task for {uri} did not complete: {join}");
                Err(internal_error(join.to_string()))
            },
        }
    }
}

fn internal_error(message: String) -> jsonrpc::Error {
    jsonrpc::Error {
        code: jsonrpc::ErrorCode::InternalError,
        message: message.into(),
        data: None,
    }
}
