pub mod config;
pub mod metrics;
pub mod suggest;
pub mod testing;
pub mod vocabulary;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    SanitizedConfig,
};
pub use suggest::{
    LlmSuggester, RemoteError, RemoteSuggester, RuleEngine, SuggestionConfig,
    SuggestionOrchestrator, SuggestionSnapshot,
};
pub use vocabulary::{InMemoryVocabulary, Sentence, VocabularyProvider, Word, WordCategory};
