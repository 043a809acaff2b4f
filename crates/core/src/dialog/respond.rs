//! Response envelope builders.
//!
//! All three builders are pure: they assemble a `DialogResponse` and return
//! it, nothing else. Failure detail that operators need goes through tracing
//! at the call site; `fail` only ever carries a user-safe message.

use crate::dialog::types::{
    DialogAction, DialogActionType, DialogResponse, FulfillmentState, Message, ResponseIntent,
    ResponseSessionState, SlotMap,
};

/// Ask the user for one specific slot. The full slot map is echoed unchanged
/// so the next turn resumes from the same partially-filled state.
pub fn elicit(
    intent_name: &str,
    slots: &SlotMap,
    slot_to_elicit: &str,
    message: Option<&str>,
) -> DialogResponse {
    DialogResponse {
        session_state: ResponseSessionState {
            dialog_action: DialogAction {
                action_type: DialogActionType::ElicitSlot,
                slot_to_elicit: Some(slot_to_elicit.to_string()),
            },
            intent: ResponseIntent {
                name: intent_name.to_string(),
                state: FulfillmentState::InProgress,
                slots: Some(slots.clone()),
            },
        },
        messages: message.map(Message::plain).into_iter().collect(),
    }
}

/// Close the dialog with a completed result.
pub fn fulfill(intent_name: &str, text: &str) -> DialogResponse {
    close(intent_name, FulfillmentState::Fulfilled, text)
}

/// Close the dialog after an unrecoverable failure. `reason` must already be
/// user-safe; internal causes never pass through here.
pub fn fail(intent_name: &str, reason: &str) -> DialogResponse {
    close(intent_name, FulfillmentState::Failed, reason)
}

fn close(intent_name: &str, state: FulfillmentState, text: &str) -> DialogResponse {
    DialogResponse {
        session_state: ResponseSessionState {
            dialog_action: DialogAction {
                action_type: DialogActionType::Close,
                slot_to_elicit: None,
            },
            intent: ResponseIntent { name: intent_name.to_string(), state, slots: None },
        },
        messages: vec![Message::plain(text)],
    }
}

#[cfg(test)]
mod tests {
    use crate::dialog::types::{
        DialogActionType, FulfillmentState, Slot, SlotMap, SlotValue,
    };

    use super::{elicit, fail, fulfill};

    fn sample_slots() -> SlotMap {
        let mut slots = SlotMap::new();
        slots.insert(
            "ProductOrService".to_string(),
            Some(Slot {
                value: Some(SlotValue {
                    interpreted_value: Some("crm software".to_string()),
                    original_value: None,
                }),
            }),
        );
        slots.insert("BudgetRange".to_string(), None);
        slots
    }

    #[test]
    fn elicit_echoes_slots_and_targets_one_slot() {
        let slots = sample_slots();
        let response = elicit("CreateMarketingPlanIntent", &slots, "BudgetRange", None);

        assert_eq!(response.action_type(), DialogActionType::ElicitSlot);
        assert_eq!(response.fulfillment_state(), FulfillmentState::InProgress);
        assert_eq!(response.slot_to_elicit(), Some("BudgetRange"));
        assert_eq!(response.session_state.intent.slots.as_ref(), Some(&slots));
        assert!(response.messages.is_empty());
    }

    #[test]
    fn elicit_with_message_carries_single_plain_text() {
        let response = elicit(
            "CreateMarketingPlanIntent",
            &sample_slots(),
            "CustomBudgetRange",
            Some("Please specify your Custom Budget amount."),
        );

        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].content_type, "PlainText");
        assert_eq!(response.messages[0].content, "Please specify your Custom Budget amount.");
    }

    #[test]
    fn fulfill_closes_with_fulfilled_state() {
        let response = fulfill("GenerateReportIntent", "Here is the generated report: done");

        assert_eq!(response.action_type(), DialogActionType::Close);
        assert_eq!(response.fulfillment_state(), FulfillmentState::Fulfilled);
        assert_eq!(response.slot_to_elicit(), None);
        assert!(response.session_state.intent.slots.is_none());
        assert_eq!(response.messages[0].content, "Here is the generated report: done");
    }

    #[test]
    fn fail_closes_with_failed_state() {
        let response = fail("AnalyzeSalesIntent", "Something went wrong. Please try again.");

        assert_eq!(response.action_type(), DialogActionType::Close);
        assert_eq!(response.fulfillment_state(), FulfillmentState::Failed);
        assert_eq!(response.messages[0].content, "Something went wrong. Please try again.");
    }
}
