//! Headless engine for the consultation questionnaire form.
//!
//! The whole form is a value: [`QuestionnaireForm`] holds every control's
//! state, and [`FormController`] wires it to the submission endpoint and the
//! postal-code autofill. A rendering layer owns nothing but a handle to the
//! form — no validation state lives in ambient globals.

mod controller;
mod postal;
mod state;

pub use controller::{FormController, SubmitOutcome};
pub use postal::{
    normalize_postal_code, Address, PostalAutofill, PostalClient, ZIPCLOUD_ENDPOINT,
};
pub use state::{
    Alert, AlertKind, CheckboxGroup, CheckboxOption, ConsentControl, QuestionnaireForm,
    RadioGroup, SelectControl, TextControl, DELINQUENT_CODE,
};
