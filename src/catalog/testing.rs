//! In-memory catalog used by unit tests.

use super::{Catalog, Item, ItemSummary, Sprites, StatEntry, SummaryPage, TypeSlot};
use crate::api::ApiError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Build a plausible item with a predictable name (`mon-<id>`).
pub(crate) fn sample_item(id: u32) -> Item {
    named_item(id, &format!("mon-{id}"))
}

pub(crate) fn named_item(id: u32, name: &str) -> Item {
    Item {
        id,
        name: name.to_string(),
        height: 4,
        weight: 60,
        sprites: Sprites {
            front_default: Some(format!("https://img.example/{id}.png")),
            official_artwork: None,
        },
        types: vec![TypeSlot {
            slot: 1,
            name: "normal".to_string(),
        }],
        stats: vec![StatEntry {
            name: "hp".to_string(),
            base_stat: 50,
            effort: 0,
        }],
    }
}

/// Pages over `sample_item(1..=total)`; extra named items are reachable only
/// through `fetch_detail`.
pub(crate) struct FakeCatalog {
    paged: Vec<Item>,
    extra: Vec<Item>,
    advertise_more: bool,
    failing_details: HashSet<String>,
    page_failure: Mutex<Option<u16>>,
    detail_failure: Mutex<Option<u16>>,
    pub page_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(total: u32) -> Self {
        Self {
            paged: (1..=total).map(sample_item).collect(),
            extra: Vec::new(),
            advertise_more: false,
            failing_details: HashSet::new(),
            page_failure: Mutex::new(None),
            detail_failure: Mutex::new(None),
            page_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    /// Report a continuation on every non-empty page, even the last one.
    pub fn advertising_more(mut self) -> Self {
        self.advertise_more = true;
        self
    }

    pub fn with_extra(mut self, item: Item) -> Self {
        self.extra.push(item);
        self
    }

    pub fn with_failing_detail(mut self, name: &str) -> Self {
        self.failing_details.insert(name.to_string());
        self
    }

    /// Make every following page call fail with the given status (None heals).
    pub fn fail_pages(&self, status: Option<u16>) {
        if let Ok(mut slot) = self.page_failure.lock() {
            *slot = status;
        }
    }

    /// Make every following detail call fail with the given status (None heals).
    pub fn fail_details(&self, status: Option<u16>) {
        if let Ok(mut slot) = self.detail_failure.lock() {
            *slot = status;
        }
    }

    pub fn pages_requested(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn fetch_page(&self, limit: usize, offset: usize) -> Result<SummaryPage, ApiError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let failure = *self.page_failure.lock().unwrap();
        if let Some(status) = failure {
            return Err(ApiError::HttpStatus(status));
        }

        let results: Vec<ItemSummary> = self
            .paged
            .iter()
            .skip(offset)
            .take(limit)
            .map(|item| ItemSummary {
                name: item.name.clone(),
                url: format!("https://fake/pokemon/{}/", item.id),
            })
            .collect();
        let has_more =
            offset + limit < self.paged.len() || (self.advertise_more && !results.is_empty());

        Ok(SummaryPage { results, has_more })
    }

    async fn fetch_detail(&self, name_or_id: &str) -> Result<Item, ApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let failure = *self.detail_failure.lock().unwrap();
        if let Some(status) = failure {
            return Err(ApiError::HttpStatus(status));
        }
        if self.failing_details.contains(name_or_id) {
            return Err(ApiError::HttpStatus(500));
        }

        self.paged
            .iter()
            .chain(self.extra.iter())
            .find(|item| item.name == name_or_id || item.id.to_string() == name_or_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(name_or_id.to_string()))
    }
}
