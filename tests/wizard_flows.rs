//! End-to-end wizard flows against the in-memory cache and store.

use jobwatch_core::accessor::CacheAside;
use jobwatch_core::cache::MemoryCache;
use jobwatch_core::config::CacheConfig;
use jobwatch_core::session::{FlowKind, WizardSession};
use jobwatch_core::store::MemoryStore;
use jobwatch_core::wizard::{ActionInput, WizardEngine};
use proptest::prelude::*;
use std::sync::Arc;

fn engine_with(store: Arc<MemoryStore>) -> WizardEngine {
    let accessor = CacheAside::new(Arc::new(MemoryCache::new()), store, CacheConfig::default());
    WizardEngine::new(accessor, 6)
}

#[tokio::test]
async fn add_flow_commits_keywords_in_catalog_order_and_refreshes_reads() {
    let store = Arc::new(MemoryStore::new());
    store.seed_user(100, None);
    let direction = store.seed_direction("Backend", &["go", "python", "rust"]);
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
    // Toggle in reverse catalog order.
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
    engine
        .handle(ActionInput::new(100, "direction_add_yes"))
        .await
        .unwrap();

    let rows = store.user_direction_rows(1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].selected_keywords, "go\nrust");

    // The commit invalidated the user-directions projection, so the edit
    // listing sees the fresh row immediately.
    let listing = engine
        .handle(ActionInput::new(100, "direction_edit_page"))
        .await
        .unwrap();
    assert!(listing
        .items
        .iter()
        .any(|item| item.label == "Backend"));
}

#[tokio::test]
async fn edit_flow_survives_catalog_shrink() {
    let store = Arc::new(MemoryStore::new());
    let user = store.seed_user(100, None);
    let direction = store.seed_direction("Backend", &["go", "rust", "perl"]);
    let row = store.seed_user_direction(user.id, direction.id, "go\nperl");
    let engine = engine_with(store.clone());

    // Catalog drops perl between sessions.
    store.set_direction_keywords(direction.id, &["go", "rust"]);

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
    engine
        .handle(ActionInput::new(100, "direction_edit_keyword_rust"))
        .await
        .unwrap();
    engine
        .handle(ActionInput::new(100, "direction_edit_confirm"))
        .await
        .unwrap();
    engine
        .handle(ActionInput::new(100, "direction_edit_yes"))
        .await
        .unwrap();

    let rows = store.user_direction_rows(user.id);
    assert_eq!(rows[0].selected_keywords, "go\nrust");
}

#[tokio::test]
async fn close_interrupt_works_from_any_state() {
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

    let render = engine.handle(ActionInput::new(100, "close")).await.unwrap();
    assert!(render.close_menu);
    assert!(engine.sessions().is_empty());
}

#[tokio::test]
async fn new_flow_entry_supersedes_pending_session() {
    let store = Arc::new(MemoryStore::new());
    let user = store.seed_user(100, None);
    let direction = store.seed_direction("Backend", &["go"]);
    store.seed_user_direction(user.id, direction.id, "go");
    let engine = engine_with(store);

    engine
        .handle(ActionInput::new(100, "direction_add_page"))
        .await
        .unwrap();
    assert!(engine.sessions().get(100, FlowKind::AddDirection).is_some());

    engine
        .handle(ActionInput::new(100, "direction_edit_page"))
        .await
        .unwrap();
    assert!(engine.sessions().get(100, FlowKind::AddDirection).is_none());
    assert!(engine.sessions().get(100, FlowKind::EditDirection).is_some());
}

#[tokio::test]
async fn target_list_paginates_past_page_size() {
    let store = Arc::new(MemoryStore::new());
    store.seed_user(100, None);
    for i in 1..=8 {
        store.seed_direction(&format!("Direction {i}"), &["kw"]);
    }
    let engine = engine_with(store);

    let first = engine
        .handle(ActionInput::new(100, "direction_add_page"))
        .await
        .unwrap();
    assert!(!first.pagination.has_prev);
    assert!(first.pagination.has_next);
    let first_targets = first
        .items
        .iter()
        .filter(|item| item.action_token.starts_with("direction_add_target_"))
        .count();
    assert_eq!(first_targets, 6);

    let second = engine
        .handle(ActionInput::new(100, "direction_add_page_2"))
        .await
        .unwrap();
    assert!(second.pagination.has_prev);
    assert!(!second.pagination.has_next);
    let second_targets = second
        .items
        .iter()
        .filter(|item| item.action_token.starts_with("direction_add_target_"))
        .count();
    assert_eq!(second_targets, 2);
}

#[tokio::test]
async fn promo_flow_end_to_end_with_counter_exhaustion() {
    let store = Arc::new(MemoryStore::new());
    store.seed_user(100, None);
    store.seed_user(200, None);
    store.seed_user(300, None);
    store.seed_promo_code("TWICE", 86_400, 2);
    let engine = engine_with(store.clone());

    for chat_user_id in [100, 200] {
        engine
            .handle(ActionInput::new(chat_user_id, "promo_begin"))
            .await
            .unwrap();
        engine
            .handle(ActionInput::with_text(chat_user_id, "promo_enter", "TWICE"))
            .await
            .unwrap();
        let done = engine
            .handle(ActionInput::new(chat_user_id, "promo_yes"))
            .await
            .unwrap();
        assert!(done.text.contains("applied"));
        assert!(store.user_subscription_end(chat_user_id).is_some());
    }

    engine
        .handle(ActionInput::new(300, "promo_begin"))
        .await
        .unwrap();
    let render = engine
        .handle(ActionInput::with_text(300, "promo_enter", "TWICE"))
        .await
        .unwrap();
    assert!(render.text.contains("fully redeemed"));
    assert!(store.user_subscription_end(300).is_none());
}

#[tokio::test]
async fn delete_flow_confirmation_gates_the_commit() {
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
    engine
        .handle(ActionInput::new(100, "direction_delete_no"))
        .await
        .unwrap();
    assert_eq!(store.user_direction_rows(user.id).len(), 1);

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
    engine
        .handle(ActionInput::new(100, "direction_delete_yes"))
        .await
        .unwrap();
    assert!(store.user_direction_rows(user.id).is_empty());
}

#[derive(Debug, Clone)]
enum SelectionOp {
    Toggle(usize),
    SelectAll,
    DeselectAll,
}

fn selection_op() -> impl Strategy<Value = SelectionOp> {
    prop_oneof![
        (0usize..8).prop_map(SelectionOp::Toggle),
        Just(SelectionOp::SelectAll),
        Just(SelectionOp::DeselectAll),
    ]
}

proptest! {
    // Any sequence of toggles and bulk operations keeps the selection a
    // subset of the candidate set, and membership equals an odd toggle
    // count since the last bulk operation.
    #[test]
    fn selection_stays_a_subset_of_candidates(ops in prop::collection::vec(selection_op(), 0..40)) {
        let candidates: Vec<String> = (0..8).map(|i| format!("kw{i}")).collect();
        let mut session = WizardSession::new(1, FlowKind::AddDirection);
        let mut expected: std::collections::BTreeSet<String> = Default::default();

        for op in ops {
            match op {
                SelectionOp::Toggle(i) => {
                    let item = &candidates[i];
                    session.toggle(item);
                    if !expected.remove(item) {
                        expected.insert(item.clone());
                    }
                }
                SelectionOp::SelectAll => {
                    session.select_all(&candidates);
                    expected = candidates.iter().cloned().collect();
                }
                SelectionOp::DeselectAll => {
                    session.deselect_all();
                    expected.clear();
                }
            }
        }

        prop_assert_eq!(&session.selected, &expected);
        prop_assert!(session.selected.iter().all(|item| candidates.contains(item)));
    }

    // retain_valid never keeps an item outside the surviving candidate set.
    #[test]
    fn retain_valid_is_an_intersection(
        picked in prop::collection::btree_set(0usize..10, 0..10),
        surviving in prop::collection::vec(0usize..10, 0..10),
    ) {
        let mut session = WizardSession::new(1, FlowKind::EditDirection);
        session.select_all(picked.iter().map(|i| format!("kw{i}")));

        let candidates: Vec<String> = surviving.iter().map(|i| format!("kw{i}")).collect();
        session.retain_valid(&candidates);

        for item in &session.selected {
            prop_assert!(candidates.contains(item));
        }
    }
}
