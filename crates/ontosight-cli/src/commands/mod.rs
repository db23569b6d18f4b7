//! CLI command implementations.

pub mod config;
pub mod inspect;
pub mod serve;
#[cfg(feature = "native")]
pub mod view;

use std::path::Path;

use anyhow::{Context, Result};
use ontosight_core::{DataService, Document, QueryHandlers};
use tracing::info;

use crate::config::Config;

/// Read a source document from disk.
pub fn load_document(path: &Path) -> Result<Document> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    Document::from_json(&contents)
        .with_context(|| format!("Failed to parse document {}", path.display()))
}

/// Build a data service over a document, configured from `config`.
pub fn build_service(config: &Config, document: Document, handlers: bool) -> Result<DataService> {
    let kind = document.kind;
    let service = DataService::from_document(document)
        .with_context(|| format!("Failed to build {kind} storage"))?
        .with_hops(config.sample_hops)
        .with_page_size(config.page_size);
    let service = if handlers {
        service.with_handlers(QueryHandlers::builtin())
    } else {
        service
    };
    info!(%kind, hops = config.sample_hops, page_size = config.page_size, "Data service ready");
    Ok(service)
}

/// Load `path` and build a data service over it.
pub fn load_service(config: &Config, path: &Path, handlers: bool) -> Result<DataService> {
    let document = load_document(path)?;
    build_service(config, document, handlers)
}
