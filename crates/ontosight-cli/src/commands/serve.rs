//! Serve command implementation.
//!
//! Serves a source document over the REST API.
//!
//! ## Architecture
//!
//! - `/api/*` - REST endpoints (via ontosight-api)
//! - `/` - a static frontend bundle when `--static-dir` is given, otherwise
//!   a small page listing the endpoints

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::{response::Html, routing::get, Router};
use ontosight_api::{create_api_router, create_api_state};
use ontosight_core::DataService;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::Config;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>OntoSight</title>
    <style>
        body { font-family: system-ui, sans-serif; background: #111; color: #ddd; padding: 2rem; }
        a { color: #6ad; }
        code { color: #fc6; }
    </style>
</head>
<body>
    <h1>OntoSight API</h1>
    <ul>
        <li><a href="/api/health">/api/health</a></li>
        <li><a href="/api/meta">/api/meta</a></li>
        <li><a href="/api/data">/api/data</a> <code>?ids=a,b</code></li>
        <li><code>/api/details/{id}</code></li>
        <li><code>POST /api/search</code>, <code>POST /api/chat</code> <code>{"query": "..."}</code></li>
        <li><code>/api/{nodes,edges,hyperedges,items}_paginated?page=&amp;page_size=</code></li>
    </ul>
</body>
</html>"#;

/// Options of the serve command not covered by [`Config`].
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
}

/// Build the full application router.
pub fn build_router(service: DataService, static_dir: Option<PathBuf>) -> Router {
    let api_router = create_api_router(create_api_state(service));
    let app = Router::new().nest("/api", api_router);
    match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.route("/", get(index_handler)),
    }
}

/// Execute the serve command.
pub async fn execute(config: &Config, service: DataService, options: ServeOptions) -> Result<()> {
    let host = options.host.unwrap_or_else(|| config.host.clone());
    let port = options.port.unwrap_or(config.port);
    let kind = service.kind();

    if let Some(dir) = &options.static_dir {
        if !dir.is_dir() {
            anyhow::bail!("Static directory not found: {}", dir.display());
        }
    }

    let app = build_router(service, options.static_dir);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!();
    println!("🚀 OntoSight Server ({kind})");
    println!("   URL: http://{addr}");
    println!("   API: http://{addr}/api/health");
    println!();
    println!("   Press Ctrl+C to stop");
    println!();
    info!(%addr, %kind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Handler for the index page.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
