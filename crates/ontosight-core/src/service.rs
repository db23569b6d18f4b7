//! Data service answering the visualization's backend requests.
//!
//! Binds one storage engine to the registered query handlers and turns
//! requests (`meta`, `data`, `details`, `search`, `chat`, paginated
//! listings) into wire payloads.

use serde_json::Value;
use tracing::{info, warn};

use crate::document::Document;
use crate::error::{CoreResult, ServiceError, ServiceResult};
use crate::model::{
    ChatResponse, Dataset, Element, ElementId, ElementKind, ListData, ListEntry, Meta, Paginated,
    VizKind,
};
use crate::query::QueryHandlers;
use crate::storage::Storage;

pub const DEFAULT_HOPS: usize = 2;
pub const DEFAULT_PAGE_SIZE: usize = 30;

pub struct DataService {
    storage: Box<dyn Storage>,
    handlers: QueryHandlers,
    schemas: Value,
    hops: usize,
    page_size: usize,
}

impl DataService {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            handlers: QueryHandlers::default(),
            schemas: Value::Null,
            hops: DEFAULT_HOPS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build a service over a document's storage, keeping its schemas.
    pub fn from_document(document: Document) -> CoreResult<Self> {
        let schemas = document.schemas.clone();
        let storage = document.into_storage()?;
        Ok(Self::new(storage).with_schemas(schemas))
    }

    pub fn with_handlers(mut self, handlers: QueryHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn with_schemas(mut self, schemas: Value) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn with_hops(mut self, hops: usize) -> Self {
        self.hops = hops;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn kind(&self) -> VizKind {
        self.storage.kind()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn meta(&self) -> Meta {
        Meta {
            kind: self.storage.kind(),
            schemas: self.schemas.clone(),
            stats: self.storage.stats(),
            features: self.handlers.features(),
        }
    }

    /// Dataset for the main view.
    ///
    /// Lists without ids return a page of items. Otherwise the storage is
    /// sampled around `ids` (or its default center), and explicitly
    /// requested ids come back highlighted.
    pub fn data(&self, ids: &[ElementId], page: Option<usize>, page_size: Option<usize>) -> Dataset {
        if self.kind() == VizKind::List && ids.is_empty() {
            let items: Vec<_> = self
                .storage
                .elements()
                .into_iter()
                .filter_map(|e| match e {
                    Element::Item(item) => Some(item),
                    _ => None,
                })
                .collect();
            let page = Paginated::from_slice(
                &items,
                page.unwrap_or(0),
                page_size.unwrap_or(self.page_size).max(1),
            );
            return Dataset::List(ListData { items: page.items });
        }
        self.storage.sample(ids, self.hops, !ids.is_empty())
    }

    pub fn details(&self, id: &str) -> ServiceResult<Element> {
        self.storage
            .details(id)
            .ok_or_else(|| ServiceError::NotFound { id: id.to_string() })
    }

    /// Run the search handler and sample around its matches.
    pub fn search(&self, query: &str) -> ServiceResult<Dataset> {
        if query.trim().is_empty() {
            return Err(ServiceError::EmptyQuery);
        }
        let handler = self
            .handlers
            .search
            .as_ref()
            .ok_or(ServiceError::CallbackNotRegistered {
                capability: "search",
            })?;

        let matches = handler
            .search(query, &self.storage.elements())
            .map_err(|source| {
                warn!(error = %source, "Search handler failed");
                ServiceError::CallbackFailed {
                    capability: "search",
                    source,
                }
            })?;

        info!(query, matches = matches.len(), "Search");
        if matches.is_empty() {
            return Ok(Dataset::empty(self.kind()));
        }
        Ok(self.storage.sample(&matches, self.hops, true))
    }

    pub fn chat(&self, query: &str) -> ServiceResult<ChatResponse> {
        if query.trim().is_empty() {
            return Err(ServiceError::EmptyQuery);
        }
        let handler = self
            .handlers
            .chat
            .as_ref()
            .ok_or(ServiceError::CallbackNotRegistered { capability: "chat" })?;

        let answer = handler
            .chat(query, &self.storage.elements())
            .map_err(|source| {
                warn!(error = %source, "Chat handler failed");
                ServiceError::CallbackFailed {
                    capability: "chat",
                    source,
                }
            })?;

        let data = if answer.matches.is_empty() {
            None
        } else {
            Some(self.storage.sample(&answer.matches, self.hops, true))
        };
        Ok(ChatResponse {
            response: answer.response,
            data,
        })
    }

    /// Page through one entity kind, named in plural (`nodes`, `edges`, ...).
    pub fn paginated(
        &self,
        entity: &str,
        page: usize,
        page_size: Option<usize>,
    ) -> ServiceResult<Paginated<ListEntry>> {
        let unsupported = || ServiceError::UnsupportedEntity {
            entity: entity.to_string(),
            kind: self.kind(),
        };
        let kind = ElementKind::from_plural(entity).ok_or_else(unsupported)?;
        self.storage
            .paginate(kind, page, page_size.unwrap_or(self.page_size).max(1))
            .ok_or_else(unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Item, Node};
    use crate::query::{LabelSearch, SearchHandler};
    use crate::storage::{GraphStore, ListStore};
    use crate::error::HandlerError;
    use std::sync::Arc;

    fn graph_service() -> DataService {
        let store = GraphStore::new(
            vec![
                Node::new("a", "Alpha"),
                Node::new("b", "Beta"),
                Node::new("c", "Gamma"),
            ],
            vec![Edge::new("ab", "a", "b"), Edge::new("bc", "b", "c")],
        )
        .unwrap();
        DataService::new(Box::new(store)).with_handlers(QueryHandlers::builtin())
    }

    struct Failing;

    impl SearchHandler for Failing {
        fn search(&self, _: &str, _: &[Element]) -> Result<Vec<ElementId>, HandlerError> {
            Err(HandlerError("index offline".into()))
        }
    }

    #[test]
    fn test_meta_reports_features() {
        let meta = graph_service().meta();
        assert_eq!(meta.kind, VizKind::Graph);
        assert!(meta.features.search);
        assert_eq!(meta.stats["total_nodes"], serde_json::json!(3));

        let bare = DataService::new(Box::new(ListStore::new(vec![]).unwrap()));
        assert!(!bare.meta().features.chat);
    }

    #[test]
    fn test_data_highlights_requested_ids() {
        let ds = graph_service().data(&["c".into()], None, None);
        assert_eq!(ds.highlighted_ids(), vec![ElementId::from("c")]);
        assert!(ds.contains("a"));
    }

    #[test]
    fn test_list_data_is_paged() {
        let items = (0..40).map(|i| Item::new(format!("i{i}"), "x")).collect();
        let service = DataService::new(Box::new(ListStore::new(items).unwrap()));
        let ds = service.data(&[], Some(1), Some(15));
        assert_eq!(ds.items().len(), 15);
        assert_eq!(ds.items()[0].id.as_str(), "i15");
    }

    #[test]
    fn test_search_errors() {
        let service = graph_service();
        assert!(matches!(service.search("  "), Err(ServiceError::EmptyQuery)));

        let none = DataService::new(Box::new(ListStore::new(vec![]).unwrap()));
        assert!(matches!(
            none.search("x"),
            Err(ServiceError::CallbackNotRegistered { .. })
        ));

        let failing = graph_service().with_handlers(QueryHandlers {
            search: Some(Arc::new(Failing)),
            chat: None,
        });
        assert!(matches!(
            failing.search("x"),
            Err(ServiceError::CallbackFailed { .. })
        ));
    }

    #[test]
    fn test_search_highlights_matches() {
        let service = graph_service().with_handlers(QueryHandlers {
            search: Some(Arc::new(LabelSearch::default())),
            chat: None,
        });
        let ds = service.search("gam").unwrap();
        assert_eq!(ds.highlighted_ids(), vec![ElementId::from("c")]);

        let empty = service.search("zzz").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_chat_omits_data_without_matches() {
        let service = graph_service();
        let answer = service.chat("tell me about delta").unwrap();
        assert!(answer.data.is_none());

        let answer = service.chat("what links alpha?").unwrap();
        let data = answer.data.unwrap();
        assert_eq!(data.highlighted_ids(), vec![ElementId::from("a")]);
    }

    #[test]
    fn test_paginated_entities() {
        let service = graph_service();
        let page = service.paginated("edges", 0, Some(1)).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.has_next);
        assert!(matches!(
            service.paginated("hyperedges", 0, None),
            Err(ServiceError::UnsupportedEntity { .. })
        ));
        assert!(matches!(
            service.paginated("widgets", 0, None),
            Err(ServiceError::UnsupportedEntity { .. })
        ));
    }

    #[test]
    fn test_details_not_found() {
        let service = graph_service();
        assert_eq!(service.details("ab").unwrap().kind(), ElementKind::Edge);
        assert!(matches!(
            service.details("zz"),
            Err(ServiceError::NotFound { .. })
        ));
    }
}
