//! # Wizard Session Management
//!
//! Ephemeral per-flow session state, held in an externally-addressable table
//! keyed by (user id, flow kind) and passed by value into action handlers.
//! Sessions never touch durable storage: a process restart drops in-flight
//! wizards by design.

pub mod states;

pub use states::{FlowKind, WizardState};

use dashmap::DashMap;
use std::collections::BTreeSet;

/// One in-progress wizard interaction.
///
/// Owned exclusively by the session table; handlers take a clone, mutate it
/// locally (race-free within one action's processing), and save it back.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSession {
    pub chat_user_id: i64,
    pub flow: FlowKind,
    pub state: WizardState,
    /// The entity being worked on: a catalog direction id for the add flow, a
    /// UserJobDirection id for edit/delete, a promo-code or plan id otherwise.
    pub target_id: Option<i64>,
    /// Catalog direction id backing the edit flow's candidate keyword list.
    pub direction_id: Option<i64>,
    /// In-progress selected-item set; membership matters, order does not.
    pub selected: BTreeSet<String>,
    /// Remembered pagination position (1-based).
    pub page: usize,
    /// The anchor message this session edits in place.
    pub anchor_message_id: Option<i64>,
    /// Failed promo-code entry attempts in this session.
    pub retry_count: u32,
}

impl WizardSession {
    pub fn new(chat_user_id: i64, flow: FlowKind) -> Self {
        Self {
            chat_user_id,
            flow,
            state: WizardState::ChoosingTarget,
            target_id: None,
            direction_id: None,
            selected: BTreeSet::new(),
            page: 1,
            anchor_message_id: None,
            retry_count: 0,
        }
    }

    /// Toggle one item: pure set symmetric difference. Returns whether the
    /// item is selected afterwards.
    pub fn toggle(&mut self, item: &str) -> bool {
        if self.selected.remove(item) {
            false
        } else {
            self.selected.insert(item.to_string());
            true
        }
    }

    /// Replace the selection with the full candidate set.
    pub fn select_all<I, S>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selected = candidates
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Drop selected items no longer present in the candidate set. An edit
    /// flow re-entered after the catalog shrank must not keep stale picks.
    pub fn retain_valid(&mut self, candidates: &[String]) {
        self.selected.retain(|item| candidates.contains(item));
    }
}

/// Session table keyed by (user id, flow kind).
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<(i64, FlowKind), WizardSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session for (user, flow). Any prior session for the same
    /// user is finished first: a new flow entry supersedes whatever the user
    /// abandoned.
    pub fn enter(&self, chat_user_id: i64, flow: FlowKind) -> WizardSession {
        self.end_all(chat_user_id);
        let session = WizardSession::new(chat_user_id, flow);
        self.sessions
            .insert((chat_user_id, flow), session.clone());
        session
    }

    pub fn get(&self, chat_user_id: i64, flow: FlowKind) -> Option<WizardSession> {
        self.sessions
            .get(&(chat_user_id, flow))
            .map(|entry| entry.clone())
    }

    /// Write a handler's mutated copy back.
    pub fn save(&self, session: WizardSession) {
        self.sessions
            .insert((session.chat_user_id, session.flow), session);
    }

    /// Terminal transition: destroy the session.
    pub fn end(&self, chat_user_id: i64, flow: FlowKind) {
        self.sessions.remove(&(chat_user_id, flow));
    }

    /// Global close interrupt: destroy every session the user owns.
    pub fn end_all(&self, chat_user_id: i64) {
        self.sessions
            .retain(|(user, _), _| *user != chat_user_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_toggle_is_idempotent() {
        let mut session = WizardSession::new(1, FlowKind::AddDirection);
        session.toggle("rust");
        let before = session.selected.clone();

        session.toggle("go");
        session.toggle("go");
        assert_eq!(session.selected, before);
    }

    #[test]
    fn test_select_all_then_deselect_all_is_empty() {
        let mut session = WizardSession::new(1, FlowKind::AddDirection);
        let candidates = vec!["python".to_string(), "go".to_string()];
        session.select_all(&candidates);
        assert_eq!(session.selected.len(), 2);
        session.deselect_all();
        assert!(session.selected.is_empty());
    }

    #[test]
    fn test_retain_valid_drops_stale_picks() {
        let mut session = WizardSession::new(1, FlowKind::EditDirection);
        session.select_all(["python", "perl"]);
        session.retain_valid(&["python".to_string(), "go".to_string()]);
        assert!(session.selected.contains("python"));
        assert!(!session.selected.contains("perl"));
    }

    #[test]
    fn test_enter_supersedes_prior_flows() {
        let store = SessionStore::new();
        store.enter(1, FlowKind::AddDirection);
        store.enter(1, FlowKind::EditDirection);

        assert!(store.get(1, FlowKind::AddDirection).is_none());
        assert!(store.get(1, FlowKind::EditDirection).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sessions_are_per_user() {
        let store = SessionStore::new();
        store.enter(1, FlowKind::AddDirection);
        store.enter(2, FlowKind::AddDirection);
        store.end_all(1);

        assert!(store.get(1, FlowKind::AddDirection).is_none());
        assert!(store.get(2, FlowKind::AddDirection).is_some());
    }

    #[test]
    fn test_save_round_trip() {
        let store = SessionStore::new();
        let mut session = store.enter(1, FlowKind::AddDirection);
        session.target_id = Some(5);
        session.page = 3;
        store.save(session.clone());

        assert_eq!(store.get(1, FlowKind::AddDirection), Some(session));
    }
}
