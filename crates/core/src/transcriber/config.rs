use serde::{Deserialize, Serialize};

/// Connection settings for the transcription service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Base URL including the API version segment, e.g. `http://host:9997/v1`.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bearer credential. Empty means no `Authorization` header is sent.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "http://localhost:9997/v1".to_string()
}

fn default_model() -> String {
    "SenseVoiceSmall".to_string()
}

fn default_timeout() -> u64 {
    600
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}
