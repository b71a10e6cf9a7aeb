//! Shared questionnaire payload and email formatting.
//!
//! Both the form engine and the submission relay depend on this crate, so the
//! formatted message comes from exactly one side-effect-free implementation.

mod format;
mod labels;
mod payload;

pub use format::{
    as_display_list, as_display_value, create_email_message, format_full_name, map_value,
    map_value_list, EmailMessage, PLACEHOLDER,
};
pub use labels::{
    label_for, LabelTable, DEBT_STATUS, GENDER, LIVING_ISSUES, OCCUPATION, PROPERTY_TYPES,
};
pub use payload::{SubmissionPayload, Timestamp};
