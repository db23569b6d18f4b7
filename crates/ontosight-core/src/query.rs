//! Pluggable search and chat handlers.

use std::sync::Arc;

use crate::error::HandlerError;
use crate::model::{Element, ElementId, Features};

/// Finds elements matching a free-text query.
pub trait SearchHandler: Send + Sync {
    fn search(&self, query: &str, elements: &[Element]) -> Result<Vec<ElementId>, HandlerError>;
}

/// Answer produced by a chat handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    pub response: String,
    /// Elements the answer refers to; they come back highlighted.
    pub matches: Vec<ElementId>,
}

/// Answers a free-text question about the dataset.
pub trait ChatHandler: Send + Sync {
    fn chat(&self, query: &str, elements: &[Element]) -> Result<ChatAnswer, HandlerError>;
}

/// Case-insensitive substring match over element labels.
#[derive(Debug, Clone)]
pub struct LabelSearch {
    pub max_results: usize,
}

impl Default for LabelSearch {
    fn default() -> Self {
        Self { max_results: 50 }
    }
}

impl LabelSearch {
    fn matches<'a>(
        &self,
        needle: &'a str,
        elements: &'a [Element],
    ) -> impl Iterator<Item = &'a Element> + 'a {
        elements
            .iter()
            .filter(move |e| e.display_label().to_lowercase().contains(needle))
    }
}

impl SearchHandler for LabelSearch {
    fn search(&self, query: &str, elements: &[Element]) -> Result<Vec<ElementId>, HandlerError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .matches(&needle, elements)
            .take(self.max_results)
            .map(|e| e.id().clone())
            .collect())
    }
}

/// Chat handler that reports which elements the question mentions.
///
/// Every word of three or more characters is matched against labels.
#[derive(Debug, Clone, Default)]
pub struct SummaryChat {
    search: LabelSearch,
}

impl ChatHandler for SummaryChat {
    fn chat(&self, query: &str, elements: &[Element]) -> Result<ChatAnswer, HandlerError> {
        let words: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 3)
            .map(str::to_lowercase)
            .collect();

        let mut found: Vec<&Element> = Vec::new();
        for word in &words {
            for element in self.search.matches(word, elements) {
                if !found.iter().any(|f| f.id() == element.id()) {
                    found.push(element);
                }
            }
        }
        found.truncate(self.search.max_results);

        let response = match found.len() {
            0 => format!("Nothing in this dataset matches \"{}\".", query.trim()),
            1 => format!("Found 1 matching element: {}.", found[0].display_label()),
            n => {
                let names: Vec<&str> = found.iter().take(5).map(|e| e.display_label()).collect();
                let more = if n > 5 { ", ..." } else { "" };
                format!("Found {n} matching elements: {}{more}.", names.join(", "))
            }
        };

        Ok(ChatAnswer {
            response,
            matches: found.iter().map(|e| e.id().clone()).collect(),
        })
    }
}

/// The handlers registered with a data service.
#[derive(Clone, Default)]
pub struct QueryHandlers {
    pub search: Option<Arc<dyn SearchHandler>>,
    pub chat: Option<Arc<dyn ChatHandler>>,
}

impl QueryHandlers {
    /// Label search and summary chat.
    pub fn builtin() -> Self {
        Self {
            search: Some(Arc::new(LabelSearch::default())),
            chat: Some(Arc::new(SummaryChat::default())),
        }
    }

    pub fn features(&self) -> Features {
        Features {
            search: self.search.is_some(),
            chat: self.chat.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, Node};

    fn elements() -> Vec<Element> {
        vec![
            Element::Node(Node::new("n1", "Insulin")),
            Element::Node(Node::new("n2", "Glucose")),
            Element::Item(Item::new("i1", "glucose meter")),
        ]
    }

    #[test]
    fn test_label_search_is_case_insensitive() {
        let ids = LabelSearch::default()
            .search("GLUCO", &elements())
            .unwrap();
        assert_eq!(ids, vec![ElementId::from("n2"), ElementId::from("i1")]);
    }

    #[test]
    fn test_summary_chat_collects_matches_once() {
        let answer = SummaryChat::default()
            .chat("how does insulin affect glucose?", &elements())
            .unwrap();
        assert_eq!(answer.matches.len(), 3);
        assert!(answer.response.starts_with("Found 3"));
    }

    #[test]
    fn test_summary_chat_without_matches() {
        let answer = SummaryChat::default().chat("xyz", &elements()).unwrap();
        assert!(answer.matches.is_empty());
    }

    #[test]
    fn test_features_follow_registration() {
        assert_eq!(QueryHandlers::default().features(), Features::default());
        let builtin = QueryHandlers::builtin().features();
        assert!(builtin.search && builtin.chat);
    }
}
