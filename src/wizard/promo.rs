//! Promo-code redemption flow.
//!
//! Unlike the direction flows this one starts with a free-text prompt: the
//! user types the code, the guard resolves it, and an explicit confirmation
//! gates the commit. Failed lookups keep the session alive and re-prompt.

use super::action::Action;
use super::engine::WizardEngine;
use super::render::RenderInstruction;
use crate::error::Result;
use crate::models::PromoCode;
use crate::redemption::{CodeLookup, RedemptionOutcome};
use crate::session::{FlowKind, WizardSession, WizardState};
use chrono::Utc;
use tracing::debug;

const FLOW: FlowKind = FlowKind::RedeemPromoCode;

impl WizardEngine {
    pub(crate) async fn handle_promo_flow(
        &self,
        chat_user_id: i64,
        action: Action,
    ) -> Result<RenderInstruction> {
        let session = match (&action, self.sessions.get(chat_user_id, FLOW)) {
            (Action::Begin, _) => self.sessions.enter(chat_user_id, FLOW),
            (_, Some(session)) => session,
            (Action::TogglePage(_), None) => self.sessions.enter(chat_user_id, FLOW),
            // Confirmation or text without a live session is out of protocol.
            (_, None) => return Err(self.invalid_transition(WizardState::Idle, &action)),
        };

        match (session.state, action) {
            (_, Action::Begin) | (WizardState::ChoosingTarget, Action::TogglePage(_)) => {
                self.sessions.save(session);
                Ok(prompt_for_code(0))
            }
            (WizardState::ChoosingTarget, Action::EnterText(code_text)) => {
                self.resolve_code(session, &code_text).await
            }
            (WizardState::AwaitingConfirmation, Action::Confirm) => {
                let render = self.commit_redemption(&session).await?;
                // A failed commit propagates above and keeps the session, so
                // the confirmation can be retried after a transient outage.
                self.sessions.end(chat_user_id, FLOW);
                Ok(render)
            }
            (WizardState::AwaitingConfirmation, Action::Reject) => {
                self.sessions.end(chat_user_id, FLOW);
                Ok(RenderInstruction::message("Cancelled, the code was not used."))
            }
            (WizardState::AwaitingConfirmation, Action::Back) => {
                let mut session = session;
                session.state = WizardState::ChoosingTarget;
                session.target_id = None;
                let attempts = session.retry_count;
                self.sessions.save(session);
                Ok(prompt_for_code(attempts))
            }
            (state, action) => Err(self.invalid_transition(state, &action)),
        }
    }

    async fn resolve_code(
        &self,
        mut session: WizardSession,
        code_text: &str,
    ) -> Result<RenderInstruction> {
        match self.guard.lookup(code_text).await? {
            CodeLookup::NotFound => {
                session.retry_count += 1;
                debug!(
                    chat_user_id = session.chat_user_id,
                    attempts = session.retry_count,
                    "promo code entry did not resolve"
                );
                let attempts = session.retry_count;
                self.sessions.save(session);
                Ok(prompt_for_code(attempts))
            }
            CodeLookup::UsesExhausted(promo) => {
                self.sessions.end(session.chat_user_id, FLOW);
                Ok(RenderInstruction::message(format!(
                    "\"{}\" has already been fully redeemed.",
                    promo.display_name()
                )))
            }
            CodeLookup::Found(promo) => {
                session.target_id = Some(promo.id);
                session.state = WizardState::AwaitingConfirmation;
                self.sessions.save(session);
                Ok(confirm_code(&promo))
            }
        }
    }

    async fn commit_redemption(&self, session: &WizardSession) -> Result<RenderInstruction> {
        let chat_user_id = session.chat_user_id;

        let Some(promo_code_id) = session.target_id else {
            return Ok(RenderInstruction::message(
                "This code entry expired, start over.",
            ));
        };
        let Some(promo) = self.accessor.store().find_promo_code(promo_code_id).await? else {
            return Ok(RenderInstruction::message(
                "That promo code no longer exists.",
            ));
        };

        let now = Utc::now().naive_utc();
        match self.guard.apply(chat_user_id, &promo, now).await? {
            RedemptionOutcome::Applied {
                new_subscription_end: Some(end),
            } => Ok(RenderInstruction::message(format!(
                "Code applied. Your subscription now runs until {}.",
                end.format("%Y-%m-%d %H:%M")
            ))),
            RedemptionOutcome::Applied {
                new_subscription_end: None,
            } => Ok(RenderInstruction::message("Code applied.")),
            RedemptionOutcome::AlreadyUsed => Ok(RenderInstruction::message(
                "You already used this code.",
            )),
            RedemptionOutcome::UsesExhausted => Ok(RenderInstruction::message(format!(
                "\"{}\" has already been fully redeemed.",
                promo.display_name()
            ))),
            RedemptionOutcome::NotFound => Ok(RenderInstruction::message(
                "We could not find your account, send /start first.",
            )),
        }
    }
}

fn prompt_for_code(attempts: u32) -> RenderInstruction {
    let text = if attempts == 0 {
        "Send your promo code as a message.".to_string()
    } else {
        format!("Code not found (attempt {attempts}). Check the spelling and send it again.")
    };
    RenderInstruction::message(text).with_item("Close", "close")
}

fn confirm_code(promo: &PromoCode) -> RenderInstruction {
    RenderInstruction::message(format!("Apply \"{}\"?", promo.display_name()))
        .with_item("Apply", "promo_yes")
        .with_item("No", "promo_no")
}
