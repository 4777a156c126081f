use crate::audio::WindowConfig;
use crate::config::Config;

/// Per-session pipeline settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Window sizing for the decoded stream
    pub window: WindowConfig,

    /// Language that status messages are tagged with and segments are translated into
    pub primary_language: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            primary_language: "ko".to_string(),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            window: WindowConfig::from(&config.audio),
            primary_language: config.language.primary.clone(),
        }
    }
}
