use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard state definitions shared by every flow.
///
/// The shape is `Idle -> ChoosingTarget -> SelectingItems ->
/// AwaitingConfirmation -> Idle`; the delete flow skips `SelectingItems`.
/// `close` is a global interrupt, not a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardState {
    /// No flow in progress.
    Idle,
    /// Listing catalog or owned entities, waiting for a target pick.
    ChoosingTarget,
    /// Paginated multi-select over the target's candidate items.
    SelectingItems,
    /// Binary accept/reject before committing.
    AwaitingConfirmation,
}

impl WizardState {
    /// Check if a session in this state holds uncommitted selection work.
    pub fn has_pending_selection(&self) -> bool {
        matches!(self, Self::SelectingItems | Self::AwaitingConfirmation)
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::ChoosingTarget => write!(f, "choosing_target"),
            Self::SelectingItems => write!(f, "selecting_items"),
            Self::AwaitingConfirmation => write!(f, "awaiting_confirmation"),
        }
    }
}

impl std::str::FromStr for WizardState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "choosing_target" => Ok(Self::ChoosingTarget),
            "selecting_items" => Ok(Self::SelectingItems),
            "awaiting_confirmation" => Ok(Self::AwaitingConfirmation),
            _ => Err(format!("Invalid wizard state: {s}")),
        }
    }
}

/// The wizard use-cases sharing the state shape. Flow-specific behavior
/// (candidate source, commit strategy) is keyed off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    AddDirection,
    EditDirection,
    DeleteDirection,
    RedeemPromoCode,
    ChoosePlan,
}

impl FlowKind {
    /// Whether this flow runs the keyword multi-select in editing mode. The
    /// discriminant is structural (derived from the action-token prefix that
    /// selected the flow), never stored redundantly.
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::EditDirection)
    }

    /// The delete flow goes straight from target choice to confirmation.
    pub fn skips_item_selection(&self) -> bool {
        matches!(
            self,
            Self::DeleteDirection | Self::RedeemPromoCode | Self::ChoosePlan
        )
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddDirection => write!(f, "add_direction"),
            Self::EditDirection => write!(f, "edit_direction"),
            Self::DeleteDirection => write!(f, "delete_direction"),
            Self::RedeemPromoCode => write!(f, "redeem_promo_code"),
            Self::ChoosePlan => write!(f, "choose_plan"),
        }
    }
}

impl std::str::FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add_direction" => Ok(Self::AddDirection),
            "edit_direction" => Ok(Self::EditDirection),
            "delete_direction" => Ok(Self::DeleteDirection),
            "redeem_promo_code" => Ok(Self::RedeemPromoCode),
            "choose_plan" => Ok(Self::ChoosePlan),
            _ => Err(format!("Invalid flow kind: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(WizardState::SelectingItems.to_string(), "selecting_items");
        assert_eq!(
            "awaiting_confirmation".parse::<WizardState>().unwrap(),
            WizardState::AwaitingConfirmation
        );
        assert!("limbo".parse::<WizardState>().is_err());
    }

    #[test]
    fn test_flow_kind_string_conversion() {
        assert_eq!(FlowKind::EditDirection.to_string(), "edit_direction");
        assert_eq!(
            "redeem_promo_code".parse::<FlowKind>().unwrap(),
            FlowKind::RedeemPromoCode
        );
    }

    #[test]
    fn test_editing_discriminant() {
        assert!(FlowKind::EditDirection.is_editing());
        assert!(!FlowKind::AddDirection.is_editing());
    }

    #[test]
    fn test_item_selection_skipping() {
        assert!(FlowKind::DeleteDirection.skips_item_selection());
        assert!(!FlowKind::AddDirection.skips_item_selection());
        assert!(!FlowKind::EditDirection.skips_item_selection());
    }

    #[test]
    fn test_pending_selection() {
        assert!(WizardState::SelectingItems.has_pending_selection());
        assert!(WizardState::AwaitingConfirmation.has_pending_selection());
        assert!(!WizardState::ChoosingTarget.has_pending_selection());
        assert!(!WizardState::Idle.has_pending_selection());
    }
}
