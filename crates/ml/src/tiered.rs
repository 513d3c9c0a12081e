use std::sync::Arc;

use async_trait::async_trait;
use memo_core::{ClassificationRecord, Intent, RawRequest};
use memo_observability::{DiagnosticSink, TracingSink};
use tracing::warn;

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::fallback::HeuristicIntentClassifier;
use crate::model::ModelIntentClassifier;
use crate::{ClassifierOutcome, IntentClassifier};

const NOT_CONFIGURED: &str = "model classifier not configured";

/// Prefers the primary strategy's reading and degrades to keywords on any failure.
/// Never returns an error to the caller.
#[derive(Clone)]
pub struct TieredClassifier {
    primary: Option<Arc<dyn IntentClassifier>>,
    fallback: HeuristicIntentClassifier,
    sink: Arc<dyn DiagnosticSink>,
}

impl TieredClassifier {
    pub fn new(primary: Option<Arc<dyn IntentClassifier>>, fallback: HeuristicIntentClassifier) -> Self {
        Self {
            primary,
            fallback,
            sink: Arc::new(TracingSink),
        }
    }

    /// Builds the OpenAI-backed tier when an API key is configured, keywords only
    /// otherwise.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let fallback = HeuristicIntentClassifier::new(config.policy.clone())?;
        let primary: Option<Arc<dyn IntentClassifier>> = if config.model_enabled() {
            Some(Arc::new(ModelIntentClassifier::from_config(config)?))
        } else {
            None
        };
        Ok(Self::new(primary, fallback))
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn model_enabled(&self) -> bool {
        self.primary.is_some()
    }

    pub fn fallback(&self) -> &HeuristicIntentClassifier {
        &self.fallback
    }

    pub async fn classify_with_record(&self, request: &RawRequest) -> (Intent, ClassificationRecord) {
        let mut model_name = None;
        let mut attempts = 0;

        let failure = match &self.primary {
            Some(primary) => {
                model_name = Some(primary.name().to_string());
                let outcome = primary.classify_detailed(request).await;
                attempts = outcome.attempts;
                match outcome.result {
                    Ok(intent) => {
                        let mut record = ClassificationRecord::new(intent.clone());
                        record.model = model_name;
                        record.attempts = attempts;
                        record.triggers = outcome.triggers;
                        self.sink.record(&record);
                        return (intent, record);
                    }
                    Err(err) => err.to_string(),
                }
            }
            None => NOT_CONFIGURED.to_string(),
        };

        if self.primary.is_some() {
            warn!(reason = %failure, attempts, "model classification unavailable, using keyword fallback");
        }

        let outcome = self.fallback.outcome(request);
        let mut record = ClassificationRecord::new(outcome.intent.clone());
        record.model = model_name;
        record.attempts = attempts;
        record.fallback_reason = Some(failure);
        record.triggers = outcome.triggers;
        self.sink.record(&record);

        (outcome.intent, record)
    }
}

#[async_trait]
impl IntentClassifier for TieredClassifier {
    fn name(&self) -> &str {
        match &self.primary {
            Some(primary) => primary.name(),
            None => self.fallback.name(),
        }
    }

    async fn classify_detailed(&self, request: &RawRequest) -> ClassifierOutcome {
        let (intent, record) = self.classify_with_record(request).await;
        ClassifierOutcome {
            result: Ok(intent),
            attempts: record.attempts,
            triggers: record.triggers,
        }
    }
}
