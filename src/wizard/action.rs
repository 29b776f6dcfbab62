//! Inbound action-token parsing.
//!
//! Transport tokens are structured strings: a flow prefix followed by a
//! command suffix (`direction_add_kw_page_2`, `direction_edit_select_all`,
//! `promo_yes`, `close`). One parser turns them into a closed set of tagged
//! commands at the boundary; downstream handlers match on variants, never on
//! string shape.

use crate::error::{CoreError, Result};
use crate::session::FlowKind;

/// An inbound user action from the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInput {
    pub chat_user_id: i64,
    pub action_token: String,
    /// Free text accompanying the action (promo-code entry).
    pub free_text: Option<String>,
}

impl ActionInput {
    pub fn new(chat_user_id: i64, action_token: impl Into<String>) -> Self {
        Self {
            chat_user_id,
            action_token: action_token.into(),
            free_text: None,
        }
    }

    pub fn with_text(chat_user_id: i64, action_token: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_user_id,
            action_token: action_token.into(),
            free_text: Some(text.into()),
        }
    }
}

/// The closed command set every handler dispatches on.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Trailing entity id: pick a catalog direction, owned direction, or plan.
    ChooseTarget(i64),
    /// Explicit `..._page_N` suffix; bare `..._page` means the first page.
    TogglePage(usize),
    /// `..._keyword_<label>`: symmetric-difference toggle of one item.
    ToggleItem(String),
    SelectAll,
    DeselectAll,
    /// `..._begin`: enter a flow that starts with a prompt instead of a list.
    Begin,
    /// Continue/accept: advances to confirmation, or commits from it.
    Confirm,
    /// Explicit decline from the confirmation prompt.
    Reject,
    Back,
    /// Global interrupt: tear down the session and anchor message.
    Close,
    /// Free-text entry routed to a text-awaiting state.
    EnterText(String),
}

impl Action {
    /// Parse a transport token by inspecting its trailing segment(s).
    pub fn parse(token: &str) -> Result<Self> {
        let segments: Vec<&str> = token.split('_').collect();

        // Item labels may contain underscores and even command words like
        // "back"; everything after the `keyword` marker belongs to the label,
        // so this check runs before any suffix matching.
        if let Some(pos) = segments.iter().position(|s| *s == "keyword") {
            let label = segments[pos + 1..].join("_");
            if label.is_empty() {
                return Err(CoreError::InvalidAction(token.to_string()));
            }
            return Ok(Self::ToggleItem(label));
        }

        let last = *segments
            .last()
            .ok_or_else(|| CoreError::InvalidAction(token.to_string()))?;
        let second_last = segments.len().checked_sub(2).map(|i| segments[i]);

        match (second_last, last) {
            (_, "close") => Ok(Self::Close),
            (_, "back") => Ok(Self::Back),
            (Some("select"), "all") => Ok(Self::SelectAll),
            (Some("cancel"), "all") => Ok(Self::DeselectAll),
            (_, "confirm") | (_, "yes") => Ok(Self::Confirm),
            (_, "no") => Ok(Self::Reject),
            (_, "begin") => Ok(Self::Begin),
            (_, "page") => Ok(Self::TogglePage(1)),
            _ => {
                if let Ok(number) = last.parse::<i64>() {
                    return if second_last == Some("page") {
                        usize::try_from(number)
                            .map(Self::TogglePage)
                            .map_err(|_| CoreError::InvalidAction(token.to_string()))
                    } else {
                        Ok(Self::ChooseTarget(number))
                    };
                }
                Err(CoreError::InvalidAction(token.to_string()))
            }
        }
    }
}

/// Derive the flow a token belongs to from its prefix. The add/edit
/// discriminant downstream comes from this structural derivation, never from
/// stored session flags.
pub fn parse_flow(token: &str) -> Option<FlowKind> {
    if token.starts_with("direction_add") {
        Some(FlowKind::AddDirection)
    } else if token.starts_with("direction_edit") {
        Some(FlowKind::EditDirection)
    } else if token.starts_with("direction_delete") {
        Some(FlowKind::DeleteDirection)
    } else if token.starts_with("promo") {
        Some(FlowKind::RedeemPromoCode)
    } else if token.starts_with("plan") {
        Some(FlowKind::ChoosePlan)
    } else {
        None
    }
}
