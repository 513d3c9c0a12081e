use async_trait::async_trait;
use memo_core::{HeuristicClassifier, HeuristicOutcome, KeywordPolicy, RawRequest};

use crate::error::ClassifierError;
use crate::{ClassifierOutcome, IntentClassifier};

/// Keyword strategy. Synchronous and infallible; the `Result` only satisfies the trait.
#[derive(Debug, Clone, Default)]
pub struct HeuristicIntentClassifier {
    inner: HeuristicClassifier,
}

impl HeuristicIntentClassifier {
    pub fn new(policy: KeywordPolicy) -> Result<Self, ClassifierError> {
        Ok(Self {
            inner: HeuristicClassifier::new(policy)?,
        })
    }

    pub fn outcome(&self, request: &RawRequest) -> HeuristicOutcome {
        self.inner.classify(request)
    }

    pub fn policy(&self) -> &KeywordPolicy {
        self.inner.policy()
    }
}

#[async_trait]
impl IntentClassifier for HeuristicIntentClassifier {
    fn name(&self) -> &str {
        "keyword-fallback"
    }

    async fn classify_detailed(&self, request: &RawRequest) -> ClassifierOutcome {
        let HeuristicOutcome { intent, triggers } = self.outcome(request);
        ClassifierOutcome {
            result: Ok(intent),
            attempts: 0,
            triggers,
        }
    }
}
