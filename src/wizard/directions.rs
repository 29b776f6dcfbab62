//! Direction flows: add a direction with keywords, edit a direction's
//! keyword set, delete a direction.
//!
//! Add and edit share the paginated keyword multi-select; delete jumps
//! straight from target choice to confirmation. The edit flow pre-populates
//! the selection from the stored row and drops any keyword the catalog no
//! longer recommends.

use super::action::Action;
use super::engine::WizardEngine;
use super::render::{paginate, RenderInstruction};
use super::token_prefix;
use crate::error::{CoreError, Result};
use crate::models::{join_keywords, split_keywords, NewUserJobDirection, User, UserDirectionView};
use crate::session::{FlowKind, WizardSession, WizardState};
use tracing::{info, warn};

impl WizardEngine {
    pub(crate) async fn handle_direction_flow(
        &self,
        chat_user_id: i64,
        flow: FlowKind,
        action: Action,
    ) -> Result<RenderInstruction> {
        let session = match self.sessions.get(chat_user_id, flow) {
            Some(session) => session,
            // Only pagination opens a fresh flow; any other action without a
            // live session is out of protocol and must not leave one behind.
            None if matches!(action, Action::TogglePage(_)) => {
                self.sessions.enter(chat_user_id, flow)
            }
            None => return Err(self.invalid_transition(WizardState::Idle, &action)),
        };

        match (session.state, action) {
            (WizardState::ChoosingTarget, Action::TogglePage(page)) => {
                let mut session = session;
                session.page = page;
                self.render_target_list(session).await
            }
            (WizardState::ChoosingTarget, Action::ChooseTarget(id)) => {
                self.choose_target(session, id).await
            }
            (WizardState::SelectingItems, Action::TogglePage(page)) => {
                let mut session = session;
                session.page = page;
                self.render_keyword_page(session).await
            }
            (WizardState::SelectingItems, Action::ToggleItem(label)) => {
                self.toggle_keyword(session, &label).await
            }
            (WizardState::SelectingItems, Action::SelectAll) => {
                let mut session = session;
                let candidates = self.candidates_for(&session).await?;
                session.select_all(&candidates);
                self.render_keyword_page(session).await
            }
            (WizardState::SelectingItems, Action::DeselectAll) => {
                let mut session = session;
                session.deselect_all();
                self.render_keyword_page(session).await
            }
            (WizardState::SelectingItems, Action::Confirm) => {
                self.advance_to_confirmation(session).await
            }
            (WizardState::SelectingItems, Action::Back) => {
                let mut session = session;
                session.state = WizardState::ChoosingTarget;
                session.target_id = None;
                session.direction_id = None;
                session.deselect_all();
                session.page = 1;
                self.render_target_list(session).await
            }
            (WizardState::AwaitingConfirmation, Action::Confirm) => {
                self.commit_direction(session).await
            }
            (WizardState::AwaitingConfirmation, Action::Reject) => {
                self.sessions.end(chat_user_id, flow);
                Ok(RenderInstruction::message("Cancelled, nothing was changed."))
            }
            (WizardState::AwaitingConfirmation, Action::Back) => {
                let mut session = session;
                if session.flow.skips_item_selection() {
                    session.state = WizardState::ChoosingTarget;
                    session.target_id = None;
                    session.direction_id = None;
                    self.render_target_list(session).await
                } else {
                    session.state = WizardState::SelectingItems;
                    self.render_keyword_page(session).await
                }
            }
            (state, action) => Err(self.invalid_transition(state, &action)),
        }
    }

    /// Candidate keyword list for the session's direction, in catalog order.
    async fn candidates_for(&self, session: &WizardSession) -> Result<Vec<String>> {
        let direction_id = session
            .direction_id
            .ok_or_else(|| CoreError::InvalidAction("no direction selected".to_string()))?;
        self.accessor.direction_keywords(direction_id).await
    }

    async fn require_user(&self, chat_user_id: i64) -> Result<User> {
        self.accessor
            .store()
            .find_user_by_chat_id(chat_user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("user {chat_user_id}")))
    }

    /// The user's owned direction row addressed by the target token's id.
    async fn owned_view(
        &self,
        chat_user_id: i64,
        row_id: i64,
    ) -> Result<Option<UserDirectionView>> {
        let views = self.accessor.user_directions(chat_user_id).await?;
        Ok(views.into_iter().find(|view| view.id == row_id))
    }

    async fn choose_target(
        &self,
        mut session: WizardSession,
        id: i64,
    ) -> Result<RenderInstruction> {
        match session.flow {
            FlowKind::AddDirection => {
                let catalog = self.accessor.job_directions().await?;
                if !catalog.iter().any(|direction| direction.id == id) {
                    warn!(chat_user_id = session.chat_user_id, direction_id = id,
                        "chosen direction not in catalog");
                    session.page = 1;
                    return self.render_target_list(session).await;
                }
                session.target_id = Some(id);
                session.direction_id = Some(id);
                session.state = WizardState::SelectingItems;
                session.page = 1;
                self.render_keyword_page(session).await
            }
            FlowKind::EditDirection | FlowKind::DeleteDirection => {
                let Some(view) = self.owned_view(session.chat_user_id, id).await? else {
                    session.page = 1;
                    return self.render_target_list(session).await;
                };
                session.target_id = Some(view.id);
                session.direction_id = Some(view.direction_id);
                if session.flow == FlowKind::DeleteDirection {
                    session.state = WizardState::AwaitingConfirmation;
                    let prefix = token_prefix(session.flow);
                    let text = format!(
                        "Delete \"{}\" and stop notifications for it?",
                        view.direction_name
                    );
                    self.sessions.save(session);
                    return Ok(RenderInstruction::message(text)
                        .with_item("Yes, delete", format!("{prefix}_yes"))
                        .with_item("No, keep it", format!("{prefix}_no")));
                }
                // Edit pre-populates from the stored row, then drops keywords
                // the catalog no longer recommends.
                session.selected = split_keywords(&view.selected_keywords)
                    .into_iter()
                    .collect();
                let candidates = self.candidates_for(&session).await?;
                session.retain_valid(&candidates);
                session.state = WizardState::SelectingItems;
                session.page = 1;
                self.render_keyword_page(session).await
            }
            _ => Err(self.invalid_transition(session.state, &Action::ChooseTarget(id))),
        }
    }

    async fn toggle_keyword(
        &self,
        mut session: WizardSession,
        label: &str,
    ) -> Result<RenderInstruction> {
        let candidates = self.candidates_for(&session).await?;
        if !candidates.iter().any(|candidate| candidate == label) {
            return Err(CoreError::InvalidAction(format!("unknown keyword {label}")));
        }
        session.toggle(label);
        self.render_keyword_page(session).await
    }

    async fn advance_to_confirmation(
        &self,
        mut session: WizardSession,
    ) -> Result<RenderInstruction> {
        if session.selected.is_empty() {
            // Confirmation requires at least one keyword; stay on the page.
            let mut render = self.render_keyword_page(session).await?;
            render.text = format!("Pick at least one keyword first.\n\n{}", render.text);
            return Ok(render);
        }

        let candidates = self.candidates_for(&session).await?;
        let chosen = ordered_selection(&candidates, &session);
        let prefix = token_prefix(session.flow);
        let verb = if session.flow.is_editing() {
            "Save these keywords"
        } else {
            "Track this direction"
        };
        let text = format!("{verb}?\n\n{}", chosen.join(", "));
        session.state = WizardState::AwaitingConfirmation;
        self.sessions.save(session);
        Ok(RenderInstruction::message(text)
            .with_item("Confirm", format!("{prefix}_yes"))
            .with_item("Back", format!("{prefix}_back")))
    }

    async fn commit_direction(&self, session: WizardSession) -> Result<RenderInstruction> {
        let chat_user_id = session.chat_user_id;
        let flow = session.flow;
        let render = match flow {
            FlowKind::AddDirection => self.commit_add(&session).await?,
            FlowKind::EditDirection => self.commit_edit(&session).await?,
            FlowKind::DeleteDirection => self.commit_delete(&session).await?,
            _ => return Err(self.invalid_transition(session.state, &Action::Confirm)),
        };
        // A failed commit propagates above and keeps the session, so the
        // confirmation can be retried after a transient store outage.
        self.sessions.end(chat_user_id, flow);
        Ok(render)
    }

    async fn commit_add(&self, session: &WizardSession) -> Result<RenderInstruction> {
        let user = self.require_user(session.chat_user_id).await?;
        let direction_id = session
            .direction_id
            .ok_or_else(|| CoreError::InvalidAction("no direction selected".to_string()))?;

        if self
            .accessor
            .store()
            .find_user_direction(user.id, direction_id)
            .await?
            .is_some()
        {
            warn!(
                chat_user_id = session.chat_user_id,
                direction_id, "duplicate direction add rejected"
            );
            return Ok(RenderInstruction::message(
                "You already track this direction. Edit it instead.",
            ));
        }

        let candidates = self.candidates_for(session).await?;
        let chosen = ordered_selection(&candidates, session);
        self.accessor
            .store()
            .insert_user_direction(NewUserJobDirection {
                user_id: user.id,
                direction_id,
                selected_keywords: join_keywords(&chosen),
            })
            .await?;
        self.accessor
            .invalidate_user_directions(session.chat_user_id)
            .await;

        info!(
            chat_user_id = session.chat_user_id,
            direction_id,
            keywords = chosen.len(),
            "direction added"
        );
        Ok(RenderInstruction::message(format!(
            "Direction added with {} keyword(s). You will be notified about matching jobs.",
            chosen.len()
        )))
    }

    async fn commit_edit(&self, session: &WizardSession) -> Result<RenderInstruction> {
        let row_id = session
            .target_id
            .ok_or_else(|| CoreError::InvalidAction("no direction selected".to_string()))?;
        let candidates = self.candidates_for(session).await?;
        let chosen = ordered_selection(&candidates, session);

        let updated = self
            .accessor
            .store()
            .update_user_direction_keywords(row_id, &join_keywords(&chosen))
            .await?;
        if !updated {
            return Ok(RenderInstruction::message(
                "That direction no longer exists.",
            ));
        }
        self.accessor
            .invalidate_user_directions(session.chat_user_id)
            .await;

        info!(
            chat_user_id = session.chat_user_id,
            user_direction_id = row_id,
            keywords = chosen.len(),
            "direction keywords updated"
        );
        Ok(RenderInstruction::message(format!(
            "Keywords updated, {} selected.",
            chosen.len()
        )))
    }

    async fn commit_delete(&self, session: &WizardSession) -> Result<RenderInstruction> {
        let row_id = session
            .target_id
            .ok_or_else(|| CoreError::InvalidAction("no direction selected".to_string()))?;

        let deleted = self.accessor.store().delete_user_direction(row_id).await?;
        if !deleted {
            return Ok(RenderInstruction::message(
                "That direction was already removed.",
            ));
        }
        self.accessor
            .invalidate_user_directions(session.chat_user_id)
            .await;
        if let Some(direction_id) = session.direction_id {
            self.accessor
                .invalidate_direction_keywords(direction_id)
                .await;
        }

        info!(
            chat_user_id = session.chat_user_id,
            user_direction_id = row_id,
            "direction deleted"
        );
        Ok(RenderInstruction::message(
            "Direction removed. You will no longer receive its notifications.",
        ))
    }

    /// Target-choice page: the catalog for the add flow, the user's own
    /// directions for edit/delete.
    async fn render_target_list(&self, session: WizardSession) -> Result<RenderInstruction> {
        let prefix = token_prefix(session.flow);
        let (labels, empty_text, header): (Vec<(String, i64)>, &str, &str) = match session.flow {
            FlowKind::AddDirection => {
                let catalog = self.accessor.job_directions().await?;
                let owned: Vec<i64> = self
                    .accessor
                    .user_directions(session.chat_user_id)
                    .await?
                    .into_iter()
                    .map(|view| view.direction_id)
                    .collect();
                (
                    catalog
                        .into_iter()
                        .filter(|direction| !owned.contains(&direction.id))
                        .map(|direction| (direction.direction_name, direction.id))
                        .collect(),
                    "No directions are available to add right now.",
                    "Choose a direction to track:",
                )
            }
            FlowKind::EditDirection => (
                self.accessor
                    .user_directions(session.chat_user_id)
                    .await?
                    .into_iter()
                    .map(|view| (view.direction_name, view.id))
                    .collect(),
                "You have no directions yet. Add one first.",
                "Choose a direction to edit:",
            ),
            FlowKind::DeleteDirection => (
                self.accessor
                    .user_directions(session.chat_user_id)
                    .await?
                    .into_iter()
                    .map(|view| (view.direction_name, view.id))
                    .collect(),
                "You have no directions yet, nothing to delete.",
                "Choose a direction to delete:",
            ),
            _ => {
                return Err(self.invalid_transition(session.state, &Action::TogglePage(session.page)))
            }
        };

        if labels.is_empty() {
            self.sessions.end(session.chat_user_id, session.flow);
            return Ok(RenderInstruction::message(empty_text));
        }

        let (page_items, pagination) = paginate(&labels, session.page, self.page_size);
        let mut render = RenderInstruction::message(header);
        for (label, id) in page_items {
            render = render.with_item(label.clone(), format!("{prefix}_target_{id}"));
        }
        if pagination.has_prev {
            render = render.with_item("‹ Prev", format!("{prefix}_page_{}", session.page - 1));
        }
        if pagination.has_next {
            render = render.with_item("Next ›", format!("{prefix}_page_{}", session.page + 1));
        }
        render = render
            .with_pagination(pagination.has_prev, pagination.has_next)
            .with_item("Close", "close");
        self.sessions.save(session);
        Ok(render)
    }

    /// Keyword multi-select page with per-item selected markers.
    async fn render_keyword_page(&self, session: WizardSession) -> Result<RenderInstruction> {
        let prefix = token_prefix(session.flow);
        let candidates = self.candidates_for(&session).await?;

        if candidates.is_empty() {
            self.sessions.end(session.chat_user_id, session.flow);
            return Ok(RenderInstruction::message(
                "This direction has no recommended keywords yet.",
            ));
        }

        let (page_items, pagination) = paginate(&candidates, session.page, self.page_size);
        let text = format!(
            "Pick the keywords you care about ({} selected):",
            session.selected.len()
        );
        let mut render = RenderInstruction::message(text);
        for keyword in page_items {
            let label = if session.selected.contains(keyword) {
                format!("✓ {keyword}")
            } else {
                keyword.clone()
            };
            render = render.with_item(label, format!("{prefix}_keyword_{keyword}"));
        }
        if pagination.has_prev {
            render = render.with_item("‹ Prev", format!("{prefix}_page_{}", session.page - 1));
        }
        if pagination.has_next {
            render = render.with_item("Next ›", format!("{prefix}_page_{}", session.page + 1));
        }
        render = render
            .with_pagination(pagination.has_prev, pagination.has_next)
            .with_item("Select all", format!("{prefix}_select_all"))
            .with_item("Clear all", format!("{prefix}_cancel_all"));
        if !session.selected.is_empty() {
            render = render.with_item("Continue", format!("{prefix}_confirm"));
        }
        render = render
            .with_item("Back", format!("{prefix}_back"))
            .with_item("Close", "close");
        self.sessions.save(session);
        Ok(render)
    }
}

/// The selected keywords in candidate (catalog) order, not set order. The
/// committed row preserves the order the catalog presents.
fn ordered_selection(candidates: &[String], session: &WizardSession) -> Vec<String> {
    candidates
        .iter()
        .filter(|candidate| session.selected.contains(*candidate))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::CacheAside;
    use crate::cache::MemoryCache;
    use crate::config::CacheConfig;
    use crate::store::MemoryStore;
    use crate::wizard::ActionInput;
    use std::sync::Arc;

    fn engine_with(store: Arc<MemoryStore>) -> WizardEngine {
        let accessor = CacheAside::new(
            Arc::new(MemoryCache::new()),
            store,
            CacheConfig::default(),
        );
        WizardEngine::new(accessor, 6)
    }

    #[tokio::test]
    async fn test_add_flow_happy_path_commits_in_catalog_order() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["go", "rust", "python"]);
        let engine = engine_with(store.clone());

        engine
            .handle(ActionInput::new(100, "direction_add_page"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(
                100,
                format!("direction_add_target_{}", direction.id),
            ))
            .await
            .unwrap();
        // Toggle out of catalog order; the commit re-orders.
        engine
            .handle(ActionInput::new(100, "direction_add_keyword_rust"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(100, "direction_add_keyword_go"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(100, "direction_add_confirm"))
            .await
            .unwrap();
        let render = engine
            .handle(ActionInput::new(100, "direction_add_yes"))
            .await
            .unwrap();

        assert!(render.text.contains("2 keyword"));
        let rows = store.user_direction_rows(user.id);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].selected_keywords, "go\nrust");
        assert!(engine.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_commit_survives_transient_store_failure() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["go"]);
        let engine = engine_with(store.clone());

        engine
            .handle(ActionInput::new(100, "direction_add_page"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(
                100,
                format!("direction_add_target_{}", direction.id),
            ))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(100, "direction_add_keyword_go"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(100, "direction_add_confirm"))
            .await
            .unwrap();

        store.set_fail_writes(true);
        let result = engine
            .handle(ActionInput::new(100, "direction_add_yes"))
            .await;
        assert!(matches!(result, Err(CoreError::Database(_))));
        // The session survives the outage so the confirmation can be retried.
        let session = engine.sessions().get(100, FlowKind::AddDirection).unwrap();
        assert_eq!(session.state, WizardState::AwaitingConfirmation);

        store.set_fail_writes(false);
        let render = engine
            .handle(ActionInput::new(100, "direction_add_yes"))
            .await
            .unwrap();
        assert!(render.text.contains("1 keyword"));
        assert_eq!(store.user_direction_rows(user.id).len(), 1);
        assert!(engine.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_protocol_first_action_leaves_no_session() {
        let store = Arc::new(MemoryStore::new());
        store.seed_user(100, None);
        let engine = engine_with(store);

        let result = engine
            .handle(ActionInput::new(100, "direction_add_yes"))
            .await;
        assert!(matches!(result, Err(CoreError::InvalidTransition { .. })));
        assert!(engine.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_with_empty_selection_stays_on_page() {
        let store = Arc::new(MemoryStore::new());
        store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["go"]);
        let engine = engine_with(store);

        engine
            .handle(ActionInput::new(100, "direction_add_page"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(
                100,
                format!("direction_add_target_{}", direction.id),
            ))
            .await
            .unwrap();
        let render = engine
            .handle(ActionInput::new(100, "direction_add_confirm"))
            .await
            .unwrap();

        assert!(render.text.contains("at least one keyword"));
        // Still in the selection state, keyword items rendered.
        assert!(render
            .items
            .iter()
            .any(|item| item.action_token == "direction_add_keyword_go"));
    }

    #[tokio::test]
    async fn test_duplicate_add_is_rejected_at_commit() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["go"]);
        store.seed_user_direction(user.id, direction.id, "go");
        let engine = engine_with(store.clone());

        // Drive the add flow directly to confirmation at the chosen direction.
        engine
            .handle(ActionInput::new(100, "direction_add_page"))
            .await
            .unwrap();
        let mut session = engine.sessions().get(100, FlowKind::AddDirection).unwrap();
        session.state = WizardState::AwaitingConfirmation;
        session.target_id = Some(direction.id);
        session.direction_id = Some(direction.id);
        session.selected.insert("go".to_string());
        engine.sessions().save(session);

        let render = engine
            .handle(ActionInput::new(100, "direction_add_yes"))
            .await
            .unwrap();
        assert!(render.text.contains("already track"));
        assert_eq!(store.user_direction_rows(user.id).len(), 1);
    }

    #[tokio::test]
    async fn test_add_list_hides_already_tracked_directions() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user(100, None);
        let owned = store.seed_direction("Backend", &["go"]);
        let free = store.seed_direction("Frontend", &["react"]);
        store.seed_user_direction(user.id, owned.id, "go");
        let engine = engine_with(store);

        let render = engine
            .handle(ActionInput::new(100, "direction_add_page"))
            .await
            .unwrap();
        let tokens: Vec<&str> = render
            .items
            .iter()
            .map(|item| item.action_token.as_str())
            .collect();
        assert!(tokens.contains(&format!("direction_add_target_{}", free.id).as_str()));
        assert!(!tokens.contains(&format!("direction_add_target_{}", owned.id).as_str()));
    }

    #[tokio::test]
    async fn test_edit_prepopulates_and_filters_stale_keywords() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["go", "rust"]);
        // Row holds a keyword the catalog no longer recommends.
        let row = store.seed_user_direction(user.id, direction.id, "go\nperl");
        let engine = engine_with(store);

        engine
            .handle(ActionInput::new(100, "direction_edit_page"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(
                100,
                format!("direction_edit_target_{}", row.id),
            ))
            .await
            .unwrap();

        let session = engine.sessions().get(100, FlowKind::EditDirection).unwrap();
        assert!(session.selected.contains("go"));
        assert!(!session.selected.contains("perl"));
    }

    #[tokio::test]
    async fn test_delete_skips_selection_and_removes_row() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["go"]);
        let row = store.seed_user_direction(user.id, direction.id, "go");
        let engine = engine_with(store.clone());

        engine
            .handle(ActionInput::new(100, "direction_delete_page"))
            .await
            .unwrap();
        let confirm = engine
            .handle(ActionInput::new(
                100,
                format!("direction_delete_target_{}", row.id),
            ))
            .await
            .unwrap();
        assert!(confirm.text.contains("Backend"));

        let render = engine
            .handle(ActionInput::new(100, "direction_delete_yes"))
            .await
            .unwrap();
        assert!(render.text.contains("removed"));
        assert!(store.user_direction_rows(user.id).is_empty());
        assert!(engine.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_reject_at_confirmation_changes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["go"]);
        let row = store.seed_user_direction(user.id, direction.id, "go");
        let engine = engine_with(store.clone());

        engine
            .handle(ActionInput::new(100, "direction_delete_page"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(
                100,
                format!("direction_delete_target_{}", row.id),
            ))
            .await
            .unwrap();
        let render = engine
            .handle(ActionInput::new(100, "direction_delete_no"))
            .await
            .unwrap();

        assert!(render.text.contains("Cancelled"));
        assert_eq!(store.user_direction_rows(user.id).len(), 1);
    }

    #[tokio::test]
    async fn test_select_all_marks_every_candidate() {
        let store = Arc::new(MemoryStore::new());
        store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["go", "rust", "python"]);
        let engine = engine_with(store);

        engine
            .handle(ActionInput::new(100, "direction_add_page"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(
                100,
                format!("direction_add_target_{}", direction.id),
            ))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(100, "direction_add_select_all"))
            .await
            .unwrap();

        let session = engine.sessions().get(100, FlowKind::AddDirection).unwrap();
        assert_eq!(session.selected.len(), 3);

        engine
            .handle(ActionInput::new(100, "direction_add_cancel_all"))
            .await
            .unwrap();
        let session = engine.sessions().get(100, FlowKind::AddDirection).unwrap();
        assert!(session.selected.is_empty());
    }

    #[tokio::test]
    async fn test_pagination_remembers_position() {
        let store = Arc::new(MemoryStore::new());
        store.seed_user(100, None);
        let keywords: Vec<String> = (1..=14).map(|i| format!("kw{i}")).collect();
        let refs: Vec<&str> = keywords.iter().map(String::as_str).collect();
        let direction = store.seed_direction("Backend", &refs);
        let engine = engine_with(store);

        engine
            .handle(ActionInput::new(100, "direction_add_page"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::new(
                100,
                format!("direction_add_target_{}", direction.id),
            ))
            .await
            .unwrap();
        let render = engine
            .handle(ActionInput::new(100, "direction_add_page_3"))
            .await
            .unwrap();

        assert!(render.pagination.has_prev);
        assert!(!render.pagination.has_next);
        assert_eq!(
            engine
                .sessions()
                .get(100, FlowKind::AddDirection)
                .unwrap()
                .page,
            3
        );
    }
}
