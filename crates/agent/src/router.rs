//! Intent Router: one dialog event in, one dialog response out.
//!
//! The router owns the turn pipeline: catalog lookup, required-slot
//! validation, extraction, invocation, response. It is the only place where
//! invocation failures are translated into user-facing text; the full error
//! detail goes to the log and never into the response envelope.

use salesdesk_core::dialog::extract::Extraction;
use salesdesk_core::dialog::respond::{elicit, fail, fulfill};
use salesdesk_core::dialog::types::{DialogEvent, DialogResponse};
use salesdesk_core::dialog::validate::validate;
use salesdesk_core::extract;
use salesdesk_core::intents::{classify_task, IntentKind, FALLBACK_MESSAGE};
use salesdesk_core::sections::carve_sections;

use crate::actions::{ActionInvoker, ActionRequest, ExternalFailure};

/// Intent name reported on fallback closes. Not a catalog entry; it exists
/// so fallback turns are distinguishable in the conversation log.
pub const FALLBACK_INTENT_NAME: &str = "FallbackIntent";

const FILE_NOT_FOUND_MESSAGE: &str =
    "The file name you provided does not exist in the storage. Please provide a valid file name.";
const REPORT_FAILURE_MESSAGE: &str = "Something went wrong while generating the report.";
const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while handling your request. Please try again later.";

/// Outline the marketing-plan prompt asks for. Used only to observe whether
/// the model followed it; the response carries the full text either way.
const PLAN_MARKERS: &[&str] = &[
    "1. Executive Summary",
    "2. Target Market Analysis",
    "3. Marketing Strategy",
    "4. Budget Breakdown",
    "5. Timeline",
    "6. Success Metrics",
];

pub struct IntentRouter {
    invoker: ActionInvoker,
}

impl IntentRouter {
    pub fn new(invoker: ActionInvoker) -> Self {
        Self { invoker }
    }

    /// Handles one turn. Never returns an error: every internal failure is
    /// folded into a `Failed` close with a user-safe message.
    pub async fn route(&self, event: &DialogEvent) -> DialogResponse {
        let intent_name = event.intent_name();
        let slots = event.slots();

        let Some(kind) = IntentKind::from_intent_name(intent_name) else {
            tracing::info!(
                event_name = "intent_fallback",
                intent = intent_name,
                "unrecognized intent, answering with the fallback close"
            );
            return fulfill(FALLBACK_INTENT_NAME, FALLBACK_MESSAGE);
        };

        let validation = validate(slots, kind.required_slots());
        if let Some(violated_slot) = validation.violated_slot {
            tracing::debug!(
                event_name = "slot_elicitation",
                intent = %kind,
                slot = violated_slot.as_str(),
                "required slot missing, eliciting"
            );
            return elicit(kind.intent_name(), slots, &violated_slot, None);
        }

        let values = match extract(slots, &kind.schema()) {
            Extraction::Resolved(values) => values,
            Extraction::Elicit { slot_to_elicit, message } => {
                tracing::debug!(
                    event_name = "slot_elicitation",
                    intent = %kind,
                    slot = slot_to_elicit.as_str(),
                    "companion slot missing, eliciting"
                );
                return elicit(kind.intent_name(), slots, &slot_to_elicit, Some(&message));
            }
        };

        let request = match build_request(kind, &values) {
            Routing::Request(request) => request,
            Routing::Fallback => {
                tracing::info!(
                    event_name = "intent_fallback",
                    intent = %kind,
                    "task description matched no category, answering with the fallback close"
                );
                return fulfill(FALLBACK_INTENT_NAME, FALLBACK_MESSAGE);
            }
        };

        match self.invoker.invoke(&request).await {
            Ok(text) => {
                if kind == IntentKind::CreateMarketingPlan {
                    let carved = carve_sections(&text, PLAN_MARKERS);
                    tracing::debug!(
                        event_name = "plan_outline_observed",
                        structured = carved.is_structured(),
                        section_count = carved.sections.len(),
                        "marketing plan outline adherence"
                    );
                }
                tracing::info!(
                    event_name = "intent_fulfilled",
                    intent = %kind,
                    action = request.kind_label(),
                    "intent fulfilled"
                );
                let message = match kind.fulfillment_prefix() {
                    Some(prefix) => format!("{prefix}{text}"),
                    None => text,
                };
                fulfill(kind.intent_name(), &message)
            }
            Err(failure) => {
                tracing::error!(
                    event_name = "action_invocation_failed",
                    intent = %kind,
                    action = request.kind_label(),
                    error = %failure,
                    "action invocation failed"
                );
                fail(kind.intent_name(), failure_message(kind, &failure))
            }
        }
    }
}

enum Routing {
    Request(ActionRequest),
    Fallback,
}

fn build_request(kind: IntentKind, values: &std::collections::BTreeMap<String, String>) -> Routing {
    // Validation and extraction have both passed, so every required value is
    // present; a hole is treated as an unclassifiable turn rather than a
    // panic.
    let value = |name: &str| values.get(name).cloned();

    let request = match kind {
        IntentKind::AnalyzeSales => value("FileName")
            .map(|file_name| ActionRequest::AnalyzeSales { file_name }),
        IntentKind::CreateMarketingPlan => match (
            value("ProductOrService"),
            value("MarketingChannel"),
            value("TargetCustomers"),
            value("BudgetRange"),
        ) {
            (
                Some(product_or_service),
                Some(marketing_channel),
                Some(target_customers),
                Some(budget),
            ) => Some(ActionRequest::MarketingPlan {
                product_or_service,
                marketing_channel,
                target_customers,
                budget,
            }),
            _ => None,
        },
        IntentKind::GenerateReport => value("CustomReportType")
            .map(|report_type| ActionRequest::GenerateReport { report_type }),
        IntentKind::ProcessTask => value("TaskDescription").and_then(|description| {
            classify_task(&description)
                .map(|category| ActionRequest::ProcessTask { category, description })
        }),
    };

    match request {
        Some(request) => Routing::Request(request),
        None => Routing::Fallback,
    }
}

/// User-safe text for a failed invocation. The wording for storage misses and
/// report failures is fixed product copy; everything else collapses into one
/// generic apology.
fn failure_message(kind: IntentKind, failure: &ExternalFailure) -> &'static str {
    match failure {
        ExternalFailure::ObjectNotFound(_) => FILE_NOT_FOUND_MESSAGE,
        _ if kind == IntentKind::GenerateReport => REPORT_FAILURE_MESSAGE,
        _ => GENERIC_FAILURE_MESSAGE,
    }
}
