use docsearch::{Config, DocSearchServer, logging};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::discover()?;
    logging::init(config.logging.format);

    tracing::info!("Starting docsearch MCP server");

    let server = DocSearchServer::new(config);

    // Load configured sources without holding up the MCP handshake.
    if !server.state().config().index.sources.is_empty() {
        let state = Arc::clone(server.state());
        tokio::spawn(async move {
            if let Err(e) = state.load_configured().await {
                tracing::error!("Failed to load configured index: {}", e);
            }
        });
    }

    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
