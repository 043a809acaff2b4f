//! Supported intent catalog: dispatch names, required slots, and slot
//! schemas.
//!
//! The catalog is fixed. Unknown intent names are not an error anywhere in
//! the pipeline; the router answers them with [`FALLBACK_MESSAGE`] as a
//! benign `Fulfilled` close, which matches the product's chosen UX.

use std::fmt;

use crate::dialog::extract::{OverrideRule, SlotSchema, SlotSpec};

/// Fallback shown for unrecognized intents and unclassifiable tasks.
pub const FALLBACK_MESSAGE: &str = "I'm not sure how to handle that request.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntentKind {
    AnalyzeSales,
    CreateMarketingPlan,
    GenerateReport,
    ProcessTask,
}

impl IntentKind {
    /// Maps the platform's intent name onto the catalog. `None` means the
    /// fallback path, not a failure.
    pub fn from_intent_name(name: &str) -> Option<Self> {
        match name {
            "AnalyzeSalesIntent" => Some(Self::AnalyzeSales),
            "CreateMarketingPlanIntent" => Some(Self::CreateMarketingPlan),
            "GenerateReportIntent" => Some(Self::GenerateReport),
            "ProcessTaskIntent" => Some(Self::ProcessTask),
            _ => None,
        }
    }

    pub fn intent_name(&self) -> &'static str {
        match self {
            Self::AnalyzeSales => "AnalyzeSalesIntent",
            Self::CreateMarketingPlan => "CreateMarketingPlanIntent",
            Self::GenerateReport => "GenerateReportIntent",
            Self::ProcessTask => "ProcessTaskIntent",
        }
    }

    /// Required slots in elicitation order. The order decides which slot a
    /// partially-filled turn is asked for first.
    pub fn required_slots(&self) -> &'static [&'static str] {
        match self {
            Self::AnalyzeSales => &["FileName"],
            Self::CreateMarketingPlan => {
                &["ProductOrService", "MarketingChannel", "TargetCustomers", "BudgetRange"]
            }
            Self::GenerateReport => &["CustomReportType"],
            Self::ProcessTask => &["TaskDescription"],
        }
    }

    /// Extraction schema. `CustomBudgetRange` is deliberately absent from
    /// `required_slots`: it is only required once the budget sentinel is
    /// chosen, and the extractor elicits it reactively.
    pub fn schema(&self) -> SlotSchema {
        let slots = match self {
            Self::AnalyzeSales => vec![SlotSpec::plain("FileName")],
            Self::CreateMarketingPlan => vec![
                SlotSpec::plain("ProductOrService"),
                SlotSpec::plain("MarketingChannel"),
                SlotSpec::plain("TargetCustomers"),
                SlotSpec::with_override(
                    "BudgetRange",
                    OverrideRule {
                        sentinel: "other",
                        companion: "CustomBudgetRange",
                        elicit_message: "Please specify your Custom Budget amount.",
                    },
                ),
            ],
            Self::GenerateReport => vec![SlotSpec::plain("CustomReportType")],
            Self::ProcessTask => vec![SlotSpec::plain("TaskDescription")],
        };
        SlotSchema { slots }
    }

    /// Prefix applied to the completion text in the fulfillment message.
    pub fn fulfillment_prefix(&self) -> Option<&'static str> {
        match self {
            Self::AnalyzeSales => Some("Here is the analysis: "),
            Self::GenerateReport => Some("Here is the generated report: "),
            Self::CreateMarketingPlan | Self::ProcessTask => None,
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.intent_name())
    }
}

/// Sub-type of a free-text task, decided by keyword. The generic task intent
/// routes through the same three actions as the named intents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskCategory {
    SalesAnalysis,
    MarketingPlan,
    Report,
}

/// Keyword classification of a task description. First match wins in the
/// order report -> marketing -> sales; `None` falls back like an unknown
/// intent.
pub fn classify_task(description: &str) -> Option<TaskCategory> {
    let normalized = description.to_ascii_lowercase();

    if normalized.contains("report") {
        return Some(TaskCategory::Report);
    }
    if normalized.contains("marketing") || normalized.contains("campaign") {
        return Some(TaskCategory::MarketingPlan);
    }
    if normalized.contains("sales") || normalized.contains("analyz") {
        return Some(TaskCategory::SalesAnalysis);
    }
    None
}
