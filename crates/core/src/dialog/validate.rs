//! Required-slot validation.

use crate::dialog::types::{slot_filled, SlotMap};

/// Outcome of a required-slot check. `violated_slot` names the first missing
/// slot in required-list order and is only meaningful when `is_valid` is
/// false.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violated_slot: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, violated_slot: None }
    }

    pub fn violated(slot: &str) -> Self {
        Self { is_valid: false, violated_slot: Some(slot.to_string()) }
    }
}

/// Checks every name in `required`, in order, against the filled-slot
/// invariant. Short-circuits on the first missing slot; the remaining names
/// are not inspected.
pub fn validate(slots: &SlotMap, required: &[&str]) -> ValidationResult {
    for name in required {
        if !slot_filled(slots, name) {
            return ValidationResult::violated(name);
        }
    }
    ValidationResult::valid()
}

#[cfg(test)]
mod tests {
    use crate::dialog::types::{Slot, SlotMap, SlotValue};

    use super::{validate, ValidationResult};

    fn filled(value: &str) -> Option<Slot> {
        Some(Slot {
            value: Some(SlotValue {
                interpreted_value: Some(value.to_string()),
                original_value: None,
            }),
        })
    }

    #[test]
    fn all_required_slots_filled_is_valid() {
        let mut slots = SlotMap::new();
        slots.insert("ProductOrService".to_string(), filled("crm software"));
        slots.insert("BudgetRange".to_string(), filled("5k-10k"));

        let result = validate(&slots, &["ProductOrService", "BudgetRange"]);
        assert_eq!(result, ValidationResult::valid());
    }

    #[test]
    fn reports_first_missing_slot_in_required_order() {
        let mut slots = SlotMap::new();
        slots.insert("B".to_string(), filled("x"));

        let result = validate(&slots, &["A", "B"]);
        assert_eq!(result, ValidationResult::violated("A"));
    }

    #[test]
    fn required_order_beats_alphabetical_order() {
        let slots = SlotMap::new();

        // Both are missing; the list order decides, not the slot names.
        let result = validate(&slots, &["Zeta", "Alpha"]);
        assert_eq!(result.violated_slot.as_deref(), Some("Zeta"));
    }

    #[test]
    fn null_entry_counts_as_missing() {
        let mut slots = SlotMap::new();
        slots.insert("FileName".to_string(), None);

        let result = validate(&slots, &["FileName"]);
        assert_eq!(result, ValidationResult::violated("FileName"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut slots = SlotMap::new();
        slots.insert(
            "FileName".to_string(),
            Some(Slot {
                value: Some(SlotValue {
                    interpreted_value: Some("   ".to_string()),
                    original_value: Some(String::new()),
                }),
            }),
        );

        let result = validate(&slots, &["FileName"]);
        assert!(!result.is_valid);
    }

    #[test]
    fn empty_required_list_is_always_valid() {
        assert!(validate(&SlotMap::new(), &[]).is_valid);
    }
}
