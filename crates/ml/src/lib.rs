//! Intent classification strategies: a model-backed classifier, a keyword fallback,
//! and the tiered classifier that picks between them per call.

mod backend;
mod config;
mod error;
mod fallback;
mod model;
mod prompt;
mod response;
mod tiered;

use async_trait::async_trait;
use memo_core::{Intent, RawRequest, Trigger};

pub use backend::{ModelBackend, OpenAiChatBackend};
pub use config::ClassifierConfig;
pub use error::{ClassifierError, ModelError};
pub use fallback::HeuristicIntentClassifier;
pub use model::ModelIntentClassifier;
pub use prompt::{ClassificationPrompt, CLASSIFICATION_POLICY};
pub use response::parse_model_response;
pub use tiered::TieredClassifier;

/// One classification call: the result plus how it was reached.
#[derive(Debug)]
pub struct ClassifierOutcome {
    pub result: Result<Intent, ClassifierError>,
    pub attempts: u32,
    pub triggers: Vec<Trigger>,
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify_detailed(&self, request: &RawRequest) -> ClassifierOutcome;

    async fn classify(&self, request: &RawRequest) -> Result<Intent, ClassifierError> {
        self.classify_detailed(request).await.result
    }
}
