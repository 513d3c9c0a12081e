use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memo_core::RawRequest;
use tracing::{debug, warn};

use crate::backend::{ModelBackend, OpenAiChatBackend};
use crate::config::{ClassifierConfig, MAX_RETRIES};
use crate::error::{ClassifierError, ModelError};
use crate::prompt::ClassificationPrompt;
use crate::response::parse_model_response;
use crate::{ClassifierOutcome, IntentClassifier};

/// Model-backed strategy: one bounded call, retried once on a transient failure.
#[derive(Clone)]
pub struct ModelIntentClassifier {
    backend: Arc<dyn ModelBackend>,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ModelIntentClassifier {
    pub fn new(backend: Arc<dyn ModelBackend>, config: &ClassifierConfig) -> Self {
        Self {
            backend,
            timeout: config.timeout,
            max_retries: config.max_retries.min(MAX_RETRIES),
            retry_backoff: config.retry_backoff,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let backend = OpenAiChatBackend::from_config(config)?;
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    async fn attempt(&self, prompt: &ClassificationPrompt) -> Result<String, ModelError> {
        match tokio::time::timeout(self.timeout, self.backend.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl IntentClassifier for ModelIntentClassifier {
    fn name(&self) -> &str {
        self.model_name()
    }

    async fn classify_detailed(&self, request: &RawRequest) -> ClassifierOutcome {
        let prompt = ClassificationPrompt::for_request(request);
        let mut attempts = 0;

        let result = loop {
            attempts += 1;
            match self.attempt(&prompt).await {
                Ok(raw) => break parse_model_response(&raw),
                Err(err) if err.is_transient() && attempts <= self.max_retries => {
                    warn!(attempt = attempts, error = %err, "model classification failed, retrying");
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(err) => break Err(ClassifierError::Model(err)),
            }
        };

        debug!(attempts, ok = result.is_ok(), model = %self.model_name(), "model classification finished");
        ClassifierOutcome {
            result,
            attempts,
            triggers: Vec::new(),
        }
    }
}
