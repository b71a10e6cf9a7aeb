use serde::de::DeserializeOwned;
use serde::Deserialize;

pub use config::ConfigError;

/// Deserializes a config struct straight from environment variables.
pub trait EnvConfig: Sized {
    fn from_env() -> Result<Self, ConfigError>;
    fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError>;
}

impl<D> EnvConfig for D
where
    D: DeserializeOwned,
{
    fn from_env() -> Result<Self, ConfigError> {
        let c = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .expect("basic config builder");
        c.try_deserialize()
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let c = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix))
            .build()
            .expect("basic config builder");
        c.try_deserialize()
    }
}

/// Relay settings, read once at startup.
///
/// Brevo credentials stay optional here and are validated per request, so
/// dummy mode works without any provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Port to bind (default: 8787).
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub brevo_api_key: Option<String>,

    #[serde(default)]
    pub brevo_sender_email: Option<String>,

    /// Sender display name; a fixed fallback applies when unset.
    #[serde(default)]
    pub brevo_sender_name: Option<String>,

    #[serde(default)]
    pub brevo_to_email: Option<String>,

    /// Recipient display name; attached only when non-blank.
    #[serde(default)]
    pub brevo_to_name: Option<String>,

    /// Overrides the Brevo send endpoint; used by tests.
    #[serde(default)]
    pub brevo_endpoint: Option<String>,

    /// `"true"` or `"1"` echoes the formatted message instead of sending.
    #[serde(default)]
    pub dummy_send: Option<String>,
}

fn default_port() -> u16 {
    8787
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            port: default_port(),
            brevo_api_key: None,
            brevo_sender_email: None,
            brevo_sender_name: None,
            brevo_to_email: None,
            brevo_to_name: None,
            brevo_endpoint: None,
            dummy_send: None,
        }
    }
}

impl RelayConfig {
    pub fn dummy_send_enabled(&self) -> bool {
        matches!(self.dummy_send.as_deref(), Some("true") | Some("1"))
    }
}
