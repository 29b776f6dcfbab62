//! Subscription plan choice flow: a paginated plan list and a single pick
//! that yields a payment instruction. No multi-select, no confirmation step
//! beyond the pick itself.

use super::action::Action;
use super::engine::WizardEngine;
use super::render::{paginate, RenderInstruction};
use crate::error::Result;
use crate::session::{FlowKind, WizardState};
use tracing::info;

const FLOW: FlowKind = FlowKind::ChoosePlan;

impl WizardEngine {
    pub(crate) async fn handle_plan_flow(
        &self,
        chat_user_id: i64,
        action: Action,
    ) -> Result<RenderInstruction> {
        let session = match self.sessions.get(chat_user_id, FLOW) {
            Some(session) => session,
            // Only pagination opens a fresh flow; a pick without a live
            // session is out of protocol and must not leave one behind.
            None if matches!(action, Action::TogglePage(_)) => {
                self.sessions.enter(chat_user_id, FLOW)
            }
            None => return Err(self.invalid_transition(WizardState::Idle, &action)),
        };

        match (session.state, action) {
            (WizardState::ChoosingTarget, Action::TogglePage(page)) => {
                let mut session = session;
                session.page = page;

                let plans = self.accessor.subscription_plans().await?;
                if plans.is_empty() {
                    self.sessions.end(chat_user_id, FLOW);
                    return Ok(RenderInstruction::message(
                        "No subscription plans are available right now.",
                    ));
                }

                let (page_items, pagination) = paginate(&plans, session.page, self.page_size);
                let mut render = RenderInstruction::message("Choose a subscription plan:");
                for plan in page_items {
                    render = render.with_item(plan.label(), format!("plan_target_{}", plan.id));
                }
                if pagination.has_prev {
                    render = render.with_item("‹ Prev", format!("plan_page_{}", session.page - 1));
                }
                if pagination.has_next {
                    render = render.with_item("Next ›", format!("plan_page_{}", session.page + 1));
                }
                render = render
                    .with_pagination(pagination.has_prev, pagination.has_next)
                    .with_item("Close", "close");
                self.sessions.save(session);
                Ok(render)
            }
            (WizardState::ChoosingTarget, Action::ChooseTarget(plan_id)) => {
                self.sessions.end(chat_user_id, FLOW);
                let Some(plan) = self.accessor.store().find_subscription_plan(plan_id).await?
                else {
                    return Ok(RenderInstruction::message(
                        "That plan is no longer offered, pick another.",
                    ));
                };

                info!(chat_user_id, plan_id, "subscription plan chosen");
                let mut text = format!(
                    "{}: {} days of notifications for {} RUB.",
                    plan.name, plan.duration_days, plan.price
                );
                if let Some(settings) = self.accessor.bot_settings().await? {
                    if let Some(support) = settings.support_message {
                        text.push_str(&format!("\n\n{support}"));
                    }
                }
                Ok(RenderInstruction::message(text))
            }
            (state, action) => Err(self.invalid_transition(state, &action)),
        }
    }
}
