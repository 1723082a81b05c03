use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info, warn};

use crate::{
    config::ServerSettings,
    hover::HoverProvider,
    ide::{
        lsp::lsp_position_to_location,
        navigation::{SourceLookup, definition_response, highlights, reference_locations},
    },
    server::state::JsonnetLanguageServer,
};

const CLIENT_NOTIFICATION_PREFIX: &str = "jsonnet-analyzer:";

#[tower_lsp::async_trait]
impl LanguageServer for JsonnetLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing jsonnet-analyzer...");

        let initial_settings = ServerSettings::from_lsp_payload(params.initialization_options.as_ref());
        self.apply_settings(initial_settings).await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                document_highlight_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "jsonnet-analyzer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        let settings = self.settings_snapshot().await;
        let search_paths = settings.search_paths(&self.cli_jpaths);
        info!("jsonnet-analyzer initialized with {} search path(s)", search_paths.len());
        self.log_to_client(MessageType::INFO, format!("Ready ({} search path(s))", search_paths.len())).await;
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }

        let imports_changed = merged.imports != current.imports;
        self.apply_settings(merged).await;
        if imports_changed {
            // Resolved import paths may differ under the new roots.
            self.cache.clear();
        }
        info!("Applied updated jsonnet-analyzer settings");
        self.log_to_client(MessageType::INFO, "Settings updated").await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down jsonnet-analyzer");
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;
        let filename = short_name(&uri);

        info!("Opened {filename} (v{version}, {} bytes)", text.len());
        self.document_store.open(uri.clone(), text, version);
        self.invalidate(&uri);
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        // Full sync: the last change carries the whole document.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        debug!("Changed {} (v{version})", short_name(&uri));
        self.document_store.update(uri.clone(), change.text, version);
        self.invalidate(&uri);
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        debug!("Closed {}", short_name(&uri));
        self.document_store.close(&uri);
        self.invalidate(&uri);
    }

    async fn hover(
        &self,
        params: HoverParams,
    ) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        self.with_document(&uri, move |ctx| HoverProvider::new(ctx.analysis).provide(&ctx.file, &ctx.text, position))
            .await
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let filename = short_name(&uri);

        let result = self
            .with_document(&uri, move |ctx| {
                let location = lsp_position_to_location(&ctx.text, position);
                let Some(resolved) = ctx.analysis.resolve_at(&ctx.file, &ctx.text, location)? else {
                    return Ok(None);
                };
                let sources = SourceLookup {
                    current_file: &ctx.file,
                    current_text: &ctx.text,
                    cache: ctx.analysis.cache(),
                };
                Ok(definition_response(&resolved, &sources))
            })
            .await;

        match &result {
            Ok(Some(_)) => debug!("goto-def {filename}:{}:{} resolved", position.line + 1, position.character + 1),
            Ok(None) => debug!("goto-def {filename}:{}:{} found nothing", position.line + 1, position.character + 1),
            Err(err) => {
                warn!("goto-def {filename} failed: {}", err.message);
                self.log_to_client(MessageType::LOG, format!("Go to definition failed in {filename}: {}", err.message))
                    .await;
            },
        }
        result
    }

    async fn references(
        &self,
        params: ReferenceParams,
    ) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let include_declaration = params.context.include_declaration;

        self.with_document(&uri, move |ctx| {
            let location = lsp_position_to_location(&ctx.text, position);
            let ranges = ctx.analysis.find_references(&ctx.file, &ctx.text, location, include_declaration)?;
            let sources = SourceLookup {
                current_file: &ctx.file,
                current_text: &ctx.text,
                cache: ctx.analysis.cache(),
            };
            Ok(Some(reference_locations(&ranges, &sources)))
        })
        .await
    }

    async fn document_highlight(
        &self,
        params: DocumentHighlightParams,
    ) -> Result<Option<Vec<DocumentHighlight>>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        self.with_document(&uri, move |ctx| {
            let location = lsp_position_to_location(&ctx.text, position);
            let ranges = ctx.analysis.find_references(&ctx.file, &ctx.text, location, true)?;
            let sources = SourceLookup {
                current_file: &ctx.file,
                current_text: &ctx.text,
                cache: ctx.analysis.cache(),
            };
            Ok(Some(highlights(&ranges, &sources)))
        })
        .await
    }
}

impl JsonnetLanguageServer {
    /// Forward a message to the client when `logging.level` admits its
    /// kind. Panics from a disconnected client are logged and swallowed.
    async fn log_to_client(
        &self,
        kind: MessageType,
        message: impl AsRef<str>,
    ) {
        if !self.settings_snapshot().await.logging.level.admits(kind) {
            return;
        }
        let result = AssertUnwindSafe(self.client.log_message(kind, prefixed_client_message(message)))
            .catch_unwind()
            .await;
        if result.is_err() {
            warn!("log_message panicked (client may have disconnected)");
        }
    }
}

fn short_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or(uri.path()).to_owned()
}

fn prefixed_client_message(message: impl AsRef<str>) -> String {
    format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref())
}
