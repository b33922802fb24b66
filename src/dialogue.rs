//! Conversation state machine for the search, request and calculator flows.
//!
//! Collected answers ride inside the enum variants, so a handler for a later
//! step can only run once every earlier answer exists. The only backward
//! transition is an explicit cancel, which resets to [`ConversationState::Idle`]
//! and drops all collected data.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::cursor::ViewCursor;
use crate::filter::FilterCriteria;
use crate::listing_model::{Listing, RequestRecord};

/// Per-chat conversation state
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ConversationState {
    /// Main menu; nothing collected
    #[default]
    Idle,

    // Search flow: one filter answer per step
    AwaitingPropertyType,
    AwaitingDealType {
        property_type: String,
    },
    AwaitingDistrict {
        property_type: String,
        deal_type: String,
    },
    AwaitingBudget {
        property_type: String,
        deal_type: String,
        district: String,
    },
    AwaitingRooms {
        property_type: String,
        deal_type: String,
        district: String,
        budget_max: f64,
    },
    /// Paginating through search results
    Viewing {
        criteria: FilterCriteria,
        listings: Vec<Listing>,
        cursor: ViewCursor,
    },

    // Viewing-request flow, entered from a displayed listing
    AwaitingName {
        listing: Listing,
    },
    AwaitingPhone {
        listing: Listing,
        name: String,
    },
    AwaitingComments {
        listing: Listing,
        name: String,
        phone: String,
    },
    /// Summary shown; waiting for the confirm button
    ConfirmingRequest {
        listing: Listing,
        record: RequestRecord,
    },

    // Calculator flow
    ChoosingCalculator,
    MortgageAmount,
    MortgageRate {
        amount: f64,
    },
    MortgageTerm {
        amount: f64,
        annual_rate: f64,
    },
    InvestmentCost,
    InvestmentRent {
        cost: f64,
    },
    InvestmentExpenses {
        cost: f64,
        rent: f64,
    },
}

impl ConversationState {
    /// Whether the state belongs to the filter-collection phase, where the
    /// bot expects a button press rather than free text
    pub fn expects_button(&self) -> bool {
        matches!(
            self,
            ConversationState::AwaitingPropertyType
                | ConversationState::AwaitingDealType { .. }
                | ConversationState::AwaitingDistrict { .. }
                | ConversationState::AwaitingBudget { .. }
                | ConversationState::AwaitingRooms { .. }
                | ConversationState::ConfirmingRequest { .. }
                | ConversationState::ChoosingCalculator
        )
    }
}

/// Type alias for the bot dialogue
pub type BotDialogue = Dialogue<ConversationState, InMemStorage<ConversationState>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        assert!(matches!(
            ConversationState::default(),
            ConversationState::Idle
        ));
    }

    #[test]
    fn test_filter_states_expect_buttons() {
        assert!(ConversationState::AwaitingPropertyType.expects_button());
        assert!(ConversationState::AwaitingRooms {
            property_type: "Apartment".to_string(),
            deal_type: "Rent".to_string(),
            district: "Central".to_string(),
            budget_max: 50000.0,
        }
        .expects_button());

        assert!(!ConversationState::Idle.expects_button());
        assert!(!ConversationState::MortgageAmount.expects_button());
    }

    #[test]
    fn test_state_round_trips_through_serde() {
        let state = ConversationState::AwaitingBudget {
            property_type: "Apartment".to_string(),
            deal_type: "Rent".to_string(),
            district: "Central".to_string(),
        };
        let encoded = serde_json::to_string(&state).unwrap();
        let decoded: ConversationState = serde_json::from_str(&encoded).unwrap();
        match decoded {
            ConversationState::AwaitingBudget { district, .. } => {
                assert_eq!(district, "Central");
            }
            other => panic!("Unexpected state after round trip: {other:?}"),
        }
    }
}
