use std::sync::Arc;

use ergo_app::AppSession;
use ergo_lsp::Backend;
use tokio::net::TcpListener;
use tower_lsp::{LspService, Server};

pub(crate) fn execute(
    session: AppSession,
    port: Option<u16>,
    address: &str,
    persistent: bool,
) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("failed to start async runtime: {err}"))?;
    let session = Arc::new(session);

    runtime.block_on(async move {
        match port {
            None => {
                serve_stdio(session).await;
                Ok(())
            }
            Some(port) => serve_tcp(session, address, port, persistent).await,
        }
    })
}

async fn serve_stdio(session: Arc<AppSession>) {
    tracing::info!("serving on stdio");
    let (service, socket) = LspService::new(move |client| Backend::new(client, session));
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}

async fn serve_tcp(
    session: Arc<AppSession>,
    address: &str,
    port: u16,
    persistent: bool,
) -> Result<(), String> {
    let listener = TcpListener::bind((address, port))
        .await
        .map_err(|err| format!("failed to listen on {address}:{port}: {err}"))?;
    tracing::info!(address, port, persistent, "serving on tcp");

    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|err| format!("failed to accept a client: {err}"))?;
        tracing::info!(%peer, "client connected");

        let (read, write) = tokio::io::split(stream);
        let client_session = Arc::clone(&session);
        let (service, socket) =
            LspService::new(move |client| Backend::new(client, client_session));
        Server::new(read, write, socket).serve(service).await;
        tracing::info!(%peer, "client disconnected");

        if !persistent {
            return Ok(());
        }
    }
}
