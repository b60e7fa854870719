use std::sync::Arc;

use ergo_app::AppSession;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::document::DocumentStore;
use crate::providers::diagnostics;

#[derive(Debug)]
pub struct Backend {
    client: Client,
    session: Arc<AppSession>,
    documents: Arc<RwLock<DocumentStore>>,
}

impl Backend {
    pub fn new(client: Client, session: Arc<AppSession>) -> Self {
        Self {
            client,
            session,
            documents: Arc::new(RwLock::new(DocumentStore::default())),
        }
    }

    async fn analyze_and_publish(&self, uri: Url, version: i32, text: String) {
        let generation = self
            .documents
            .write()
            .await
            .schedule_analysis(uri.clone(), version, text.clone());

        let session = Arc::clone(&self.session);
        let task_uri = uri.clone();
        let task = tokio::task::spawn_blocking(move || {
            diagnostics::analyze_document(&session, &task_uri, &text)
        });

        let diagnostics = match tokio::time::timeout(self.session.analysis_timeout(), task).await {
            Ok(Ok(diagnostics)) => diagnostics,
            Ok(Err(err)) => {
                tracing::warn!(uri = %uri, error = %err, "analysis task failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    uri = %uri,
                    timeout_ms = self.session.analysis_timeout().as_millis() as u64,
                    "analysis timed out"
                );
                Vec::new()
            }
        };

        // Held until published so a newer event cannot publish first.
        let documents = self.documents.read().await;
        if !documents.is_current(&uri, generation) {
            tracing::debug!(uri = %uri, generation, "dropping stale diagnostics");
            return;
        }
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
        drop(documents);
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..TextDocumentSyncOptions::default()
                    },
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "easyergo".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let roots = self
            .session
            .repository()
            .roots()
            .iter()
            .map(|root| root.display().to_string())
            .collect::<Vec<_>>()
            .join(":");
        self.client
            .log_message(
                MessageType::INFO,
                format!("easyergo initialized (robot paths: {roots})"),
            )
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.analyze_and_publish(document.uri, document.version, document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.documents.write().await.update_text(
            &params.text_document.uri,
            params.text_document.version,
            change.text,
        );
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let stored = self
            .documents
            .read()
            .await
            .get_document(&uri)
            .map(|doc| (doc.version, doc.text.clone()));

        let (version, text) = match (params.text, stored) {
            (Some(text), stored) => (stored.map(|(version, _)| version).unwrap_or(0), text),
            (None, Some(stored)) => stored,
            (None, None) => {
                tracing::debug!(uri = %uri, "save for an unknown document without text");
                return;
            }
        };
        self.analyze_and_publish(uri, version, text).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.write().await.close_document(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}
