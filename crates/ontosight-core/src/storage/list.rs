use std::collections::HashMap;

use serde_json::{json, Map, Value};
use tracing::info;

use super::{ensure_unique, page_of, to_stats, Storage};
use crate::error::CoreResult;
use crate::model::{
    Dataset, Element, ElementId, ElementKind, Item, ListData, ListEntry, Paginated, VizKind,
};

/// Number of items returned by a sample without centers.
pub const DEFAULT_LIST_SAMPLE: usize = 10;

/// Storage for flat item lists. `hops` has no meaning here.
#[derive(Default)]
pub struct ListStore {
    items: Vec<Item>,
    item_pos: HashMap<ElementId, usize>,
}

impl ListStore {
    pub fn new(items: Vec<Item>) -> CoreResult<Self> {
        ensure_unique(items.iter().map(|i| &i.id))?;
        let item_pos = items
            .iter()
            .enumerate()
            .map(|(pos, i)| (i.id.clone(), pos))
            .collect();
        info!(items = items.len(), "List store initialized");
        Ok(Self { items, item_pos })
    }
}

impl Storage for ListStore {
    fn kind(&self) -> VizKind {
        VizKind::List
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.item_pos
            .get(id)
            .map(|&pos| Element::Item(self.items[pos].clone()))
    }

    fn stats(&self) -> Map<String, Value> {
        let fields = self.items.first().map_or(0, |i| i.data.len());
        to_stats(json!({
            "total_items": self.items.len(),
            "fields": fields,
        }))
    }

    fn sample(&self, center_ids: &[ElementId], _hops: usize, highlight_center: bool) -> Dataset {
        let items = if center_ids.is_empty() {
            self.items
                .iter()
                .take(DEFAULT_LIST_SAMPLE)
                .cloned()
                .map(|mut item| {
                    item.highlighted = false;
                    item
                })
                .collect()
        } else {
            center_ids
                .iter()
                .filter_map(|id| self.item_pos.get(id))
                .map(|&pos| {
                    let mut item = self.items[pos].clone();
                    item.highlighted = highlight_center;
                    item
                })
                .collect()
        };
        Dataset::List(ListData { items })
    }

    fn paginate(
        &self,
        entity: ElementKind,
        page: usize,
        page_size: usize,
    ) -> Option<Paginated<ListEntry>> {
        match entity {
            ElementKind::Item => Some(page_of(
                self.items.iter().cloned().map(Element::Item),
                page,
                page_size,
            )),
            _ => None,
        }
    }

    fn elements(&self) -> Vec<Element> {
        self.items.iter().cloned().map(Element::Item).collect()
    }
}
