//! Stateless submission relay.
//!
//! Accepts the questionnaire payload on `POST /api/submit`, filters naive
//! automation, formats the notification email, and forwards it to Brevo —
//! or echoes the formatted message back when dummy mode is enabled.

pub mod bot;
pub mod config;
pub mod error;
pub mod mail;
pub mod routes;
pub mod serve;

pub use config::{EnvConfig, RelayConfig};
pub use error::RelayError;
pub use routes::{api_router, AppState};
pub use serve::serve;
