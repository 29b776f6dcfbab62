//! Engine entry point: flow derivation, session lookup, and dispatch.

use super::action::{parse_flow, Action, ActionInput};
use super::render::RenderInstruction;
use crate::accessor::CacheAside;
use crate::error::{CoreError, Result};
use crate::redemption::RedemptionGuard;
use crate::session::{FlowKind, SessionStore};
use tracing::{debug, error};

pub struct WizardEngine {
    pub(crate) accessor: CacheAside,
    pub(crate) guard: RedemptionGuard,
    pub(crate) sessions: SessionStore,
    pub(crate) page_size: usize,
}

impl WizardEngine {
    pub fn new(accessor: CacheAside, page_size: usize) -> Self {
        let guard = RedemptionGuard::new(accessor.clone());
        Self {
            accessor,
            guard,
            sessions: SessionStore::new(),
            page_size,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one inbound action and produce the render instruction for the
    /// resulting state. Domain rejections come back as rendered warnings;
    /// store failures propagate after being logged with reproduction context.
    pub async fn handle(&self, input: ActionInput) -> Result<RenderInstruction> {
        let result = self.dispatch(&input).await;
        if let Err(e) = &result {
            error!(
                chat_user_id = input.chat_user_id,
                action_token = %input.action_token,
                error = %e,
                "wizard action failed"
            );
        }
        result
    }

    async fn dispatch(&self, input: &ActionInput) -> Result<RenderInstruction> {
        let chat_user_id = input.chat_user_id;
        let token = input.action_token.as_str();

        // Free text bypasses token parsing; it can only mean text entry.
        let action = match &input.free_text {
            Some(text) => Action::EnterText(text.trim().to_string()),
            None => Action::parse(token)?,
        };

        // Close is a global interrupt accepted from every state: tear down the
        // user's sessions and the anchor message, regardless of flow.
        if action == Action::Close {
            debug!(chat_user_id, "close interrupt, tearing down sessions");
            self.sessions.end_all(chat_user_id);
            return Ok(RenderInstruction::closed());
        }

        let flow = parse_flow(token)
            .ok_or_else(|| CoreError::InvalidAction(token.to_string()))?;
        debug!(chat_user_id, %flow, ?action, "dispatching wizard action");

        match flow {
            FlowKind::AddDirection | FlowKind::EditDirection | FlowKind::DeleteDirection => {
                self.handle_direction_flow(chat_user_id, flow, action).await
            }
            FlowKind::RedeemPromoCode => self.handle_promo_flow(chat_user_id, action).await,
            FlowKind::ChoosePlan => self.handle_plan_flow(chat_user_id, action).await,
        }
    }

    pub(crate) fn invalid_transition(
        &self,
        state: impl std::fmt::Display,
        action: &Action,
    ) -> CoreError {
        CoreError::InvalidTransition {
            from: state.to_string(),
            action: format!("{action:?}"),
        }
    }
}
