use std::sync::Arc;

use betty_classify::{HttpInferenceBackend, LexicalClassifier, SemanticClassifier};
use betty_core::classify::{Classify, ClassifyError};
use betty_core::config::{AppConfig, ConfigError, InferenceProvider, LoadOptions};
use betty_core::dialogue::engine::TriageEngine;
use betty_core::session::SessionStore;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<SessionStore>,
    pub classifier: Arc<dyn Classify>,
    pub engine: TriageEngine,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("inference backend setup failed: {0}")]
    Inference(#[from] ClassifyError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let classifier = build_classifier(&config)?;
    info!(
        event_name = "system.bootstrap.classifier_ready",
        provider = ?config.inference.provider,
        "classification backend initialized"
    );

    let store = Arc::new(SessionStore::new());
    info!(
        event_name = "system.bootstrap.sessions_ready",
        sessions = store.len().await,
        "session registry initialized with the implicit session"
    );

    Ok(Application { config, store, classifier, engine: TriageEngine::new() })
}

fn build_classifier(config: &AppConfig) -> Result<Arc<dyn Classify>, BootstrapError> {
    match config.inference.provider {
        InferenceProvider::Lexical => Ok(Arc::new(LexicalClassifier::new())),
        InferenceProvider::Http => {
            let base_url = config.inference.base_url.clone().ok_or_else(|| {
                ConfigError::Validation(
                    "inference.base_url is required for the http provider".to_string(),
                )
            })?;
            let backend = HttpInferenceBackend::new(
                base_url,
                config.inference.api_key.clone(),
                config.inference.timeout_secs,
            )?;
            Ok(Arc::new(SemanticClassifier::new(backend.clone(), backend)))
        }
    }
}

#[cfg(test)]
mod tests {
    use betty_core::config::{ConfigOverrides, InferenceProvider, LoadOptions};
    use betty_core::dialogue::states::{Block, ConversationState};
    use betty_core::session::SessionId;

    use crate::bootstrap::bootstrap;

    fn lexical_options() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                inference_provider: Some(InferenceProvider::Lexical),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_exposes_the_implicit_session_at_the_greeting() {
        let app = bootstrap(lexical_options()).await.expect("bootstrap succeeds");

        let state = app
            .store
            .snapshot(SessionId::implicit())
            .await
            .expect("implicit session registered");
        assert_eq!(state, ConversationState::initial());
        assert_eq!(state.block, Block::Greeting);
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_http_provider_has_no_base_url() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                inference_provider: Some(InferenceProvider::Http),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("inference.base_url"));
    }

    #[tokio::test]
    async fn bootstrap_accepts_an_http_provider_with_a_base_url() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                inference_provider: Some(InferenceProvider::Http),
                inference_base_url: Some("http://localhost:9090".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap succeeds");

        assert_eq!(app.config.inference.provider, InferenceProvider::Http);
    }
}
