//! # Redemption/Usage Guard
//!
//! Enforces at-most-once-per-user and max-uses invariants for promo codes.
//! The cache serves as the fast-path counter and flag store; the Record Store
//! is the source of truth on every miss.
//!
//! The existence, exhaustion, and already-used checks are advisory fast paths
//! backed by a TTL cache and are not linearizable with concurrent redemptions
//! from other processes: two redemptions racing for the last slot can both
//! pass the exhausted check. That narrow over-admission window is accepted as
//! bounded risk; strict enforcement would need a store-level conditional
//! increment.

use crate::accessor::CacheAside;
use crate::error::Result;
use crate::models::{NewPromoCodeUsage, PromoCode};
use chrono::NaiveDateTime;
use tracing::{debug, info};

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RedemptionOutcome {
    /// Code applied; carries the user's new subscription end when the code
    /// granted an extension.
    Applied {
        new_subscription_end: Option<NaiveDateTime>,
    },
    /// This user already redeemed this code.
    AlreadyUsed,
    /// No such code.
    NotFound,
    /// The code reached its max-uses ceiling.
    UsesExhausted,
}

/// Result of resolving a code string before confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeLookup {
    Found(PromoCode),
    NotFound,
    UsesExhausted(PromoCode),
}

#[derive(Clone)]
pub struct RedemptionGuard {
    accessor: CacheAside,
}

impl RedemptionGuard {
    pub fn new(accessor: CacheAside) -> Self {
        Self { accessor }
    }

    /// Resolve a code string and check the max-uses ceiling. Per-user usage is
    /// not consulted here; an exhausted code is rejected before that.
    pub async fn lookup(&self, code_text: &str) -> Result<CodeLookup> {
        let Some(promo) = self.accessor.promo_code(code_text).await? else {
            debug!(code = code_text, "promo code not found");
            return Ok(CodeLookup::NotFound);
        };

        let usage_count = self.accessor.promo_usage_count(promo.id).await?;
        if usage_count >= promo.max_uses {
            debug!(
                promo_code_id = promo.id,
                usage_count, max_uses = promo.max_uses, "promo code exhausted"
            );
            return Ok(CodeLookup::UsesExhausted(promo));
        }

        Ok(CodeLookup::Found(promo))
    }

    /// Apply a resolved code for a user after explicit confirmation: extend
    /// the subscription window, record the usage row, bump the cached counter,
    /// mark the per-user flag, and invalidate the cached subscription end so
    /// the next read recomputes from the just-updated value.
    pub async fn apply(
        &self,
        chat_user_id: i64,
        promo: &PromoCode,
        now: NaiveDateTime,
    ) -> Result<RedemptionOutcome> {
        let Some(user) = self
            .accessor
            .store()
            .find_user_by_chat_id(chat_user_id)
            .await?
        else {
            return Ok(RedemptionOutcome::NotFound);
        };

        if self
            .accessor
            .user_promo_used(chat_user_id, user.id, promo.id)
            .await?
        {
            debug!(chat_user_id, promo_code_id = promo.id, "promo already used");
            return Ok(RedemptionOutcome::AlreadyUsed);
        }

        let new_subscription_end = promo
            .subscription_extension()
            .map(|extension| user.subscription_window().extended_by(extension, now));

        self.accessor
            .store()
            .apply_promo_redemption(
                NewPromoCodeUsage {
                    user_id: user.id,
                    promo_code_id: promo.id,
                },
                new_subscription_end,
            )
            .await?;

        // Fast-path bookkeeping, then invalidate the stale projection.
        self.accessor.increment_promo_usage(promo.id).await;
        self.accessor.mark_user_promo_used(chat_user_id, promo.id).await;
        self.accessor.invalidate_subscription_end(chat_user_id).await;

        info!(
            chat_user_id,
            promo_code_id = promo.id,
            ?new_subscription_end,
            "promo code applied"
        );
        Ok(RedemptionOutcome::Applied {
            new_subscription_end,
        })
    }

    /// Full redemption path: resolve, check ceilings, apply.
    pub async fn redeem(
        &self,
        chat_user_id: i64,
        code_text: &str,
        now: NaiveDateTime,
    ) -> Result<RedemptionOutcome> {
        match self.lookup(code_text).await? {
            CodeLookup::NotFound => Ok(RedemptionOutcome::NotFound),
            CodeLookup::UsesExhausted(_) => Ok(RedemptionOutcome::UsesExhausted),
            CodeLookup::Found(promo) => self.apply(chat_user_id, &promo, now).await,
        }
    }
}
