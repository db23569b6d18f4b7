//! Per-id cache of element details shown in the selection history.
//!
//! Fetches are fire-and-forget: a source either answers immediately or
//! reports the fetch as pending and the answer arrives later through
//! [`DetailCache::complete`]. Answers for ids that are no longer tracked are
//! dropped, and for a tracked id the last answer to arrive wins.

use std::collections::{HashMap, HashSet};

use ontosight_core::{Element, ElementId};
use tracing::{debug, warn};

/// Outcome of asking a source for an element's details.
#[derive(Debug, Clone)]
pub enum DetailFetch {
    Ready(Result<Element, String>),
    /// The answer will be delivered through [`DetailCache::complete`].
    Pending,
}

/// Something that can look up element details.
pub trait DetailSource {
    fn request_details(&self, id: &ElementId) -> DetailFetch;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailStatus<'a> {
    Loading,
    Ready(&'a Element),
}

#[derive(Debug, Default)]
pub struct DetailCache {
    entries: HashMap<ElementId, Element>,
    in_flight: HashSet<ElementId>,
    /// Ids whose last fetch failed; not re-requested until retried or untracked.
    failed: HashSet<ElementId>,
    tracked: HashSet<ElementId>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Details of `id`, requesting them from `source` on first use.
    pub fn fetch_details(&mut self, id: &ElementId, source: &dyn DetailSource) -> DetailStatus<'_> {
        self.tracked.insert(id.clone());
        if !self.entries.contains_key(id)
            && !self.in_flight.contains(id)
            && !self.failed.contains(id)
        {
            self.in_flight.insert(id.clone());
            match source.request_details(id) {
                DetailFetch::Ready(result) => self.complete(id, result),
                DetailFetch::Pending => {}
            }
        }
        self.status(id)
    }

    pub fn status(&self, id: &ElementId) -> DetailStatus<'_> {
        match self.entries.get(id) {
            Some(element) => DetailStatus::Ready(element),
            None => DetailStatus::Loading,
        }
    }

    /// Deliver the answer of a fetch.
    pub fn complete(&mut self, id: &ElementId, result: Result<Element, String>) {
        self.in_flight.remove(id);
        if !self.tracked.contains(id) {
            debug!(%id, "Ignoring details for an id no longer shown");
            return;
        }
        match result {
            Ok(element) => {
                self.failed.remove(id);
                self.entries.insert(id.clone(), element);
            }
            Err(message) => {
                warn!(%id, error = %message, "Failed to fetch element details");
                self.failed.insert(id.clone());
            }
        }
    }

    /// Allow a failed id to be requested again.
    pub fn retry(&mut self, id: &ElementId) {
        self.failed.remove(id);
    }

    /// Keep only the ids in `ids`; everything else is forgotten.
    pub fn retain<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a ElementId>,
    {
        self.tracked = ids.into_iter().cloned().collect();
        let tracked = &self.tracked;
        self.entries.retain(|id, _| tracked.contains(id));
        self.in_flight.retain(|id| tracked.contains(id));
        self.failed.retain(|id| tracked.contains(id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
        self.failed.clear();
        self.tracked.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontosight_core::Node;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
        answer: Option<Result<Element, String>>,
    }

    impl Counting {
        fn ready(label: &str) -> Self {
            Self {
                calls: Cell::new(0),
                answer: Some(Ok(Element::Node(Node::new("n1", label)))),
            }
        }

        fn pending() -> Self {
            Self {
                calls: Cell::new(0),
                answer: None,
            }
        }
    }

    impl DetailSource for Counting {
        fn request_details(&self, _id: &ElementId) -> DetailFetch {
            self.calls.set(self.calls.get() + 1);
            match &self.answer {
                Some(answer) => DetailFetch::Ready(answer.clone()),
                None => DetailFetch::Pending,
            }
        }
    }

    fn node(label: &str) -> Element {
        Element::Node(Node::new("n1", label))
    }

    #[test]
    fn test_cached_ids_are_not_refetched() {
        let mut cache = DetailCache::new();
        let source = Counting::ready("first");
        let id = ElementId::from("n1");
        assert!(matches!(
            cache.fetch_details(&id, &source),
            DetailStatus::Ready(_)
        ));
        cache.fetch_details(&id, &source);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_pending_then_last_write_wins() {
        let mut cache = DetailCache::new();
        let source = Counting::pending();
        let id = ElementId::from("n1");
        assert_eq!(cache.fetch_details(&id, &source), DetailStatus::Loading);
        cache.fetch_details(&id, &source);
        assert_eq!(source.calls.get(), 1);

        cache.complete(&id, Ok(node("old")));
        cache.complete(&id, Ok(node("new")));
        assert_eq!(cache.status(&id), DetailStatus::Ready(&node("new")));
    }

    #[test]
    fn test_answers_for_removed_ids_are_ignored() {
        let mut cache = DetailCache::new();
        let id = ElementId::from("n1");
        cache.fetch_details(&id, &Counting::pending());
        cache.retain(std::iter::empty());
        cache.complete(&id, Ok(node("late")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failure_leaves_entry_unset() {
        let mut cache = DetailCache::new();
        let source = Counting {
            calls: Cell::new(0),
            answer: Some(Err("backend down".into())),
        };
        let id = ElementId::from("n1");
        assert_eq!(cache.fetch_details(&id, &source), DetailStatus::Loading);
        assert_eq!(cache.fetch_details(&id, &source), DetailStatus::Loading);
        assert_eq!(source.calls.get(), 1);

        cache.retry(&id);
        cache.fetch_details(&id, &source);
        assert_eq!(source.calls.get(), 2);
    }
}
