use std::sync::Arc;
use vidscribe_core::{Authenticator, Config, SanitizedConfig, TaskStore, VideoProcessor};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    processor: VideoProcessor,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        processor: VideoProcessor,
    ) -> Self {
        Self {
            config,
            authenticator,
            processor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn processor(&self) -> &VideoProcessor {
        &self.processor
    }

    pub fn task_store(&self) -> Arc<dyn TaskStore> {
        self.processor.store()
    }
}
