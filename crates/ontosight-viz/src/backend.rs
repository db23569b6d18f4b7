//! Backend seam used by the view session.

use ontosight_core::{
    ChatResponse, CoreError, DataService, Dataset, Element, ElementId, ElementKind, ListEntry,
    Paginated, ServiceError,
};
use serde_json::Value;
use thiserror::Error;

use crate::details::{DetailFetch, DetailSource};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Requests the visualization makes of its data collaborator.
pub trait Backend {
    /// Raw meta payload; validated by the session.
    fn meta(&self) -> BackendResult<Value>;

    /// Main dataset, or `None` when nothing is available.
    fn data(
        &self,
        ids: &[ElementId],
        page: Option<usize>,
        page_size: Option<usize>,
    ) -> BackendResult<Option<Dataset>>;

    fn search(&self, query: &str) -> BackendResult<Dataset>;

    fn chat(&self, query: &str) -> BackendResult<ChatResponse>;

    fn paginated(
        &self,
        entity: ElementKind,
        page: usize,
        page_size: usize,
    ) -> BackendResult<Paginated<ListEntry>>;

    fn details(&self, id: &ElementId) -> BackendResult<Element>;
}

/// In-process backend over a [`DataService`].
pub struct LocalBackend {
    service: DataService,
}

impl LocalBackend {
    pub fn new(service: DataService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &DataService {
        &self.service
    }
}

impl Backend for LocalBackend {
    fn meta(&self) -> BackendResult<Value> {
        Ok(serde_json::to_value(self.service.meta()).map_err(CoreError::from)?)
    }

    fn data(
        &self,
        ids: &[ElementId],
        page: Option<usize>,
        page_size: Option<usize>,
    ) -> BackendResult<Option<Dataset>> {
        let dataset = self.service.data(ids, page, page_size);
        Ok((!dataset.is_empty()).then_some(dataset))
    }

    fn search(&self, query: &str) -> BackendResult<Dataset> {
        Ok(self.service.search(query)?)
    }

    fn chat(&self, query: &str) -> BackendResult<ChatResponse> {
        Ok(self.service.chat(query)?)
    }

    fn paginated(
        &self,
        entity: ElementKind,
        page: usize,
        page_size: usize,
    ) -> BackendResult<Paginated<ListEntry>> {
        Ok(self
            .service
            .paginated(entity.plural(), page, Some(page_size))?)
    }

    fn details(&self, id: &ElementId) -> BackendResult<Element> {
        Ok(self.service.details(id.as_str())?)
    }
}

impl DetailSource for LocalBackend {
    fn request_details(&self, id: &ElementId) -> DetailFetch {
        DetailFetch::Ready(self.details(id).map_err(|e| e.to_string()))
    }
}
