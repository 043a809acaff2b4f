//! Schema-driven slot extraction with the sentinel-override escape hatch.
//!
//! Extraction runs after the flat required-slot check has passed, so every
//! schema slot is expected to be filled. The one remaining branch is the
//! sentinel override: an enumerated slot whose resolved value equals a
//! reserved sentinel (case-insensitively) redirects to a free-text companion
//! slot. The companion is only conditionally required, so its absence is a
//! second-order elicitation the flat check cannot catch.

use std::collections::BTreeMap;

use crate::dialog::types::{resolved_slot, SlotMap};

/// Redirect rule for one schema slot: when the resolved value matches
/// `sentinel`, read `companion` instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideRule {
    pub sentinel: &'static str,
    pub companion: &'static str,
    /// Prompt shown when the companion slot still needs to be elicited.
    pub elicit_message: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSpec {
    pub name: &'static str,
    pub override_rule: Option<OverrideRule>,
}

impl SlotSpec {
    pub fn plain(name: &'static str) -> Self {
        Self { name, override_rule: None }
    }

    pub fn with_override(name: &'static str, rule: OverrideRule) -> Self {
        Self { name, override_rule: Some(rule) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSchema {
    pub slots: Vec<SlotSpec>,
}

/// Outcome of an extraction pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    /// Every schema slot resolved to a trimmed, non-empty value.
    Resolved(BTreeMap<String, String>),
    /// A conditionally-required slot is unfilled; ask for it next.
    Elicit { slot_to_elicit: String, message: String },
}

/// Resolves each schema slot to its final string value, applying override
/// rules. Returns an elicitation outcome when a sentinel was chosen but its
/// companion slot is absent or blank.
pub fn extract(slots: &SlotMap, schema: &SlotSchema) -> Extraction {
    let mut resolved = BTreeMap::new();

    for spec in &schema.slots {
        let Some(value) = resolved_slot(slots, spec.name) else {
            // The flat required-slot check runs first, so a hole here means
            // the schema listed an optional slot; skip it.
            continue;
        };

        let final_value = match &spec.override_rule {
            Some(rule) if value.eq_ignore_ascii_case(rule.sentinel) => {
                match resolved_slot(slots, rule.companion) {
                    Some(companion_value) => companion_value,
                    None => {
                        return Extraction::Elicit {
                            slot_to_elicit: rule.companion.to_string(),
                            message: rule.elicit_message.to_string(),
                        };
                    }
                }
            }
            _ => value,
        };

        resolved.insert(spec.name.to_string(), final_value.to_string());
    }

    Extraction::Resolved(resolved)
}
