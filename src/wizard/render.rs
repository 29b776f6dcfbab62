//! Outbound render instructions.
//!
//! Every state transition produces one instruction: message text, an ordered
//! list of (label, action-token) items, and pagination affordances. The
//! transport presents it and is otherwise opaque to the core.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    pub label: String,
    pub action_token: String,
}

impl RenderItem {
    pub fn new(label: impl Into<String>, action_token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action_token: action_token.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderInstruction {
    pub text: String,
    pub items: Vec<RenderItem>,
    pub pagination: Pagination,
    /// The transport must tear down the anchor message.
    pub close_menu: bool,
}

impl RenderInstruction {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            items: Vec::new(),
            pagination: Pagination::default(),
            close_menu: false,
        }
    }

    pub fn closed() -> Self {
        Self {
            text: String::new(),
            items: Vec::new(),
            pagination: Pagination::default(),
            close_menu: true,
        }
    }

    pub fn with_item(mut self, label: impl Into<String>, token: impl Into<String>) -> Self {
        self.items.push(RenderItem::new(label, token));
        self
    }

    pub fn with_pagination(mut self, has_prev: bool, has_next: bool) -> Self {
        self.pagination = Pagination { has_prev, has_next };
        self
    }
}

/// Slice `items` to the requested 1-based page and report whether neighbors
/// exist. A page past the end yields an empty slice with `has_prev` set.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> (&[T], Pagination) {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(items.len());
    let slice = if start < items.len() {
        &items[start..end]
    } else {
        &[]
    };
    let pagination = Pagination {
        has_prev: page > 1,
        has_next: items.len() > page.saturating_mul(page_size),
    };
    (slice, pagination)
}
