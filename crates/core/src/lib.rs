//! Dialog Protocol Core - slot-fulfillment domain logic
//!
//! This crate holds the pure half of the salesdesk system:
//! - Wire types for the dialog platform's event/response envelopes (`dialog`)
//! - Required-slot validation and sentinel-override extraction (`dialog`)
//! - The supported intent catalog and slot schemas (`intents`)
//! - Best-effort section carving of completion text (`sections`)
//! - Error taxonomy and configuration (`errors`, `config`)
//!
//! # Design Principle
//!
//! Missing conversational slots are normal control flow, never errors. The
//! only error channel in this crate is reserved for genuine collaborator and
//! configuration failures; everything the user can fix by answering a
//! question is expressed as an elicitation outcome.

pub mod config;
pub mod dialog;
pub mod errors;
pub mod intents;
pub mod sections;

pub use dialog::extract::{extract, Extraction, OverrideRule, SlotSchema, SlotSpec};
pub use dialog::respond::{elicit, fail, fulfill};
pub use dialog::types::{
    DialogActionType, DialogEvent, DialogResponse, FulfillmentState, Message, Slot, SlotValue,
};
pub use dialog::validate::{validate, ValidationResult};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use intents::IntentKind;
pub use sections::{carve_sections, ReportSections};
