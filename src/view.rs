use crate::models::{FilterState, Tab};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Text,
    Html,
}

const LOADING_ROW: &str = r#"<tr><td colspan="4" class="empty-state">Carregando...</td></tr>"#;

pub const SLOTS: &[(&str, SlotKind, &str)] = &[
    ("presell-entries", SlotKind::Text, "0"),
    ("bot-starts", SlotKind::Text, "0"),
    ("pix-generated", SlotKind::Text, "0"),
    ("pix-paid", SlotKind::Text, "0"),
    ("step-1", SlotKind::Text, "0"),
    ("step-2", SlotKind::Text, "0"),
    ("step-3", SlotKind::Text, "0"),
    ("step-4", SlotKind::Text, "0"),
    ("step-5", SlotKind::Text, "0"),
    ("blocked-users", SlotKind::Text, "0"),
    ("joined-group", SlotKind::Text, "0"),
    ("left-group", SlotKind::Text, "0"),
    ("conversions", SlotKind::Text, "0"),
    ("quick-conversion", SlotKind::Text, "0%"),
    ("quick-users", SlotKind::Text, "0"),
    ("quick-revenue", SlotKind::Text, "R$\u{a0}0,00"),
    ("total-revenue", SlotKind::Text, "R$\u{a0}0,00"),
    ("total-transactions", SlotKind::Text, "0"),
    ("conversion-rate", SlotKind::Text, "0.0%"),
    ("average-ticket", SlotKind::Text, "R$\u{a0}0,00"),
    ("last-update", SlotKind::Text, "-"),
    ("sales-chart-data", SlotKind::Html, r#"<p class="empty-state">Carregando...</p>"#),
    ("sales-by-plan", SlotKind::Html, LOADING_ROW),
    ("logs-data", SlotKind::Html, LOADING_ROW),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SlotValue {
    Text(String),
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub active_tab: Tab,
    pub loading: bool,
    pub filters: FilterState,
    pub slots: BTreeMap<String, SlotValue>,
    pub banners: Vec<Banner>,
}

impl ViewSnapshot {
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.slots.get(id)? {
            SlotValue::Text(text) => Some(text),
            SlotValue::Html(_) => None,
        }
    }

    pub fn html(&self, id: &str) -> Option<&str> {
        match self.slots.get(id)? {
            SlotValue::Html(html) => Some(html),
            SlotValue::Text(_) => None,
        }
    }
}

/// Marks one load as in flight until dropped, including when the owning
/// future is cancelled.
#[derive(Debug)]
pub struct LoadGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct View {
    slots: BTreeMap<String, SlotValue>,
    banners: Vec<Banner>,
    next_banner_id: u64,
    in_flight: Arc<AtomicUsize>,
    pub active_tab: Tab,
    pub filters: FilterState,
}

impl Default for View {
    fn default() -> Self {
        let slots = SLOTS
            .iter()
            .map(|(id, kind, initial)| {
                let value = match kind {
                    SlotKind::Text => SlotValue::Text((*initial).to_string()),
                    SlotKind::Html => SlotValue::Html((*initial).to_string()),
                };
                ((*id).to_string(), value)
            })
            .collect();
        Self {
            slots,
            banners: Vec::new(),
            next_banner_id: 1,
            in_flight: Arc::default(),
            active_tab: Tab::default(),
            filters: FilterState::default(),
        }
    }
}

impl View {
    pub fn set_text(&mut self, id: &str, value: impl Into<String>) -> bool {
        self.set(id, SlotKind::Text, value.into())
    }

    pub fn set_html(&mut self, id: &str, fragment: impl Into<String>) -> bool {
        self.set(id, SlotKind::Html, fragment.into())
    }

    fn set(&mut self, id: &str, kind: SlotKind, value: String) -> bool {
        let Some((_, expected, _)) = SLOTS.iter().find(|(slot, _, _)| *slot == id) else {
            warn!(slot = id, "output element not found");
            return false;
        };
        if *expected != kind {
            warn!(slot = id, "output element bound with the wrong kind");
            return false;
        }
        let value = match kind {
            SlotKind::Text => SlotValue::Text(value),
            SlotKind::Html => SlotValue::Html(value),
        };
        self.slots.insert(id.to_string(), value);
        true
    }

    pub fn slot(&self, id: &str) -> Option<&SlotValue> {
        self.slots.get(id)
    }

    pub fn push_banner(&mut self, message: impl Into<String>) -> u64 {
        let id = self.next_banner_id;
        self.next_banner_id += 1;
        self.banners.insert(
            0,
            Banner {
                id,
                message: message.into(),
            },
        );
        id
    }

    pub fn remove_banner(&mut self, id: u64) -> bool {
        let before = self.banners.len();
        self.banners.retain(|banner| banner.id != id);
        self.banners.len() != before
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    pub fn begin_load(&self) -> LoadGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LoadGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            active_tab: self.active_tab,
            loading: self.is_loading(),
            filters: self.filters.clone(),
            slots: self.slots.clone(),
            banners: self.banners.clone(),
        }
    }
}
