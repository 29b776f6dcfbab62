//! # Selection Wizard Engine
//!
//! A finite-state-machine session manager driving the paginated multi-select
//! interactions shared by four flows: add direction + keywords, edit a
//! direction's keywords, delete a direction, and redeem a promo code / choose
//! a plan.
//!
//! ## Control flow
//!
//! An inbound action arrives as `(action token, user id, optional free text)`.
//! The engine derives the flow from the token prefix, looks up or creates the
//! session keyed by (user id, flow kind), parses the token into a tagged
//! command, and dispatches on (state, command). Handlers read through the
//! cache-aside accessor, mutate session-local selection state, call the
//! redemption guard, or commit through the Record Store followed by targeted
//! cache invalidation. Every transition emits one render instruction.

pub mod action;
pub mod directions;
pub mod engine;
pub mod plans;
pub mod promo;
pub mod render;

pub use action::{Action, ActionInput};
pub use engine::WizardEngine;
pub use render::{Pagination, RenderInstruction, RenderItem};

use crate::session::FlowKind;

/// The action-token prefix each flow emits and is recognized by.
pub(crate) fn token_prefix(flow: FlowKind) -> &'static str {
    match flow {
        FlowKind::AddDirection => "direction_add",
        FlowKind::EditDirection => "direction_edit",
        FlowKind::DeleteDirection => "direction_delete",
        FlowKind::RedeemPromoCode => "promo",
        FlowKind::ChoosePlan => "plan",
    }
}
