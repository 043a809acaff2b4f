//! Wire types exchanged with the owning dialog platform.
//!
//! The field names and nesting mirror the platform's JSON envelopes exactly;
//! everything here is serde-renamed to camelCase so handlers never touch raw
//! `serde_json::Value` trees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Slot map as the platform sends it: a slot entry may be present-but-null.
pub type SlotMap = BTreeMap<String, Option<Slot>>;

/// One incoming user turn. Immutable for the duration of a handler
/// invocation; continuity across turns comes from echoing `slots` back in
/// elicitation responses, never from state held here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogEvent {
    pub session_state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub intent: IntentState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentState {
    pub name: String,
    #[serde(default)]
    pub slots: SlotMap,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SlotValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreted_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
}

impl SlotValue {
    /// Preferred reading of a slot value: the platform's interpretation when
    /// it produced one, otherwise the raw utterance. Blank strings count as
    /// absent.
    pub fn resolved(&self) -> Option<&str> {
        non_blank(self.interpreted_value.as_deref())
            .or_else(|| non_blank(self.original_value.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

impl DialogEvent {
    pub fn intent_name(&self) -> &str {
        &self.session_state.intent.name
    }

    pub fn slots(&self) -> &SlotMap {
        &self.session_state.intent.slots
    }
}

/// A slot is filled iff its entry is non-null and at least one value field
/// carries a non-blank string.
pub fn slot_filled(slots: &SlotMap, name: &str) -> bool {
    resolved_slot(slots, name).is_some()
}

/// The resolved, trimmed value of a filled slot, or `None` when the slot is
/// absent, null, or blank.
pub fn resolved_slot<'a>(slots: &'a SlotMap, name: &str) -> Option<&'a str> {
    slots
        .get(name)
        .and_then(|entry| entry.as_ref())
        .and_then(|slot| slot.value.as_ref())
        .and_then(SlotValue::resolved)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogActionType {
    ElicitSlot,
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentState {
    InProgress,
    Fulfilled,
    Failed,
}

/// The outgoing envelope. Constructed once by the response builders in
/// `dialog::respond` and returned as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogResponse {
    pub session_state: ResponseSessionState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSessionState {
    pub dialog_action: DialogAction,
    pub intent: ResponseIntent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogAction {
    #[serde(rename = "type")]
    pub action_type: DialogActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_to_elicit: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseIntent {
    pub name: String,
    pub state: FulfillmentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<SlotMap>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content_type: String,
    pub content: String,
}

impl Message {
    pub fn plain(content: impl Into<String>) -> Self {
        Self { content_type: "PlainText".to_string(), content: content.into() }
    }
}

impl DialogResponse {
    pub fn action_type(&self) -> DialogActionType {
        self.session_state.dialog_action.action_type
    }

    pub fn fulfillment_state(&self) -> FulfillmentState {
        self.session_state.intent.state
    }

    pub fn slot_to_elicit(&self) -> Option<&str> {
        self.session_state.dialog_action.slot_to_elicit.as_deref()
    }
}
