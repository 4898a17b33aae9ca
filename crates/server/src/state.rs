use std::sync::Arc;

use pictovoz_core::suggest::RemoteSuggester;
use pictovoz_core::{Config, InMemoryVocabulary, RuleEngine, SanitizedConfig};

use crate::session::SessionRegistry;

/// Shared application state
pub struct AppState {
    config: Config,
    vocabulary: Arc<InMemoryVocabulary>,
    rules: Arc<RuleEngine>,
    sessions: SessionRegistry,
}

impl AppState {
    pub fn new(
        config: Config,
        vocabulary: Arc<InMemoryVocabulary>,
        rules: Arc<RuleEngine>,
        remote: Option<Arc<dyn RemoteSuggester>>,
    ) -> Self {
        let sessions = SessionRegistry::new(
            config.server.max_sessions,
            config.server.session_idle_timeout(),
            config.suggestions.clone(),
            Arc::clone(&rules),
            remote,
        );
        Self {
            config,
            vocabulary,
            rules,
            sessions,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn vocabulary(&self) -> &InMemoryVocabulary {
        &self.vocabulary
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}
