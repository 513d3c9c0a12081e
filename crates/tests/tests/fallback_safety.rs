use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memo_agents::PlanningAgent;
use memo_core::{classify_heuristic, ClassificationSource, PrimaryPath, RawRequest};
use memo_ml::{
    ClassificationPrompt, ClassifierConfig, HeuristicIntentClassifier, IntentClassifier,
    ModelBackend, ModelError, ModelIntentClassifier, TieredClassifier,
};
use memo_observability::{AppMetrics, MemorySink};

enum Behavior {
    Hang,
    ServerError,
    BadRequest,
    Reply(&'static str),
    /// 503 on the first call, then the reply.
    FlakyThenReply(&'static str),
}

struct FakeBackend {
    behavior: Behavior,
    calls: AtomicU32,
}

impl FakeBackend {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelBackend for FakeBackend {
    fn model_name(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, prompt: &ClassificationPrompt) -> Result<String, ModelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!prompt.system.is_empty());

        match self.behavior {
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(String::new())
            }
            Behavior::ServerError => Err(ModelError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            Behavior::BadRequest => Err(ModelError::Api {
                status: 400,
                message: "bad request".to_string(),
            }),
            Behavior::Reply(body) => Ok(body.to_string()),
            Behavior::FlakyThenReply(_) if call == 0 => Err(ModelError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            Behavior::FlakyThenReply(body) => Ok(body.to_string()),
        }
    }
}

fn classifier(backend: Arc<FakeBackend>, sink: Arc<MemorySink>) -> TieredClassifier {
    let config = ClassifierConfig {
        timeout: Duration::from_millis(25),
        retry_backoff: Duration::from_millis(1),
        ..ClassifierConfig::default()
    };
    let primary: Arc<dyn IntentClassifier> = Arc::new(ModelIntentClassifier::new(backend, &config));
    TieredClassifier::new(Some(primary), HeuristicIntentClassifier::default()).with_sink(sink)
}

fn urgent_corporation() -> RawRequest {
    RawRequest {
        company_name: Some("Acme Inc".to_string()),
        company_type: Some("Corporation".to_string()),
        timeline_preference: Some("ASAP".to_string()),
        ..RawRequest::default()
    }
}

async fn assert_falls_back(behavior: Behavior, expected_calls: u32) {
    let backend = FakeBackend::new(behavior);
    let sink = MemorySink::shared();
    let tiered = classifier(backend.clone(), sink.clone());
    let request = urgent_corporation();

    let (intent, record) = tiered.classify_with_record(&request).await;

    assert_eq!(intent.source, ClassificationSource::Fallback);
    assert_eq!(intent, classify_heuristic(&request).intent);
    assert_eq!(backend.calls(), expected_calls);
    assert_eq!(record.attempts, expected_calls);
    assert!(record.fallback_reason.is_some());
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn hanging_model_is_retried_once_then_falls_back() {
    assert_falls_back(Behavior::Hang, 2).await;
}

#[tokio::test]
async fn transient_server_error_is_retried_once() {
    assert_falls_back(Behavior::ServerError, 2).await;
}

#[tokio::test]
async fn client_error_is_not_retried() {
    assert_falls_back(Behavior::BadRequest, 1).await;
}

#[tokio::test]
async fn free_text_reply_falls_back_without_retry() {
    assert_falls_back(Behavior::Reply("Looks like a branch office to me."), 1).await;
}

#[tokio::test]
async fn unknown_enum_value_falls_back() {
    assert_falls_back(
        Behavior::Reply(r#"{"is_holding":false,"must_be_bv":false,"urgency":"CRITICAL"}"#),
        1,
    )
    .await;
}

#[tokio::test]
async fn valid_model_reply_wins_over_keywords() {
    let backend = FakeBackend::new(Behavior::Reply(
        r#"{"is_holding":false,"must_be_bv":true,"intent":"SETUP","entity_type":"BV",
            "urgency":"HIGH","industry_context":"GENERAL","plans_hiring":true}"#,
    ));
    let sink = MemorySink::shared();
    let agent = PlanningAgent::new(classifier(backend.clone(), sink.clone()), AppMetrics::shared());

    let outcome = agent.plan(urgent_corporation()).await.unwrap();

    assert_eq!(outcome.intent.source, ClassificationSource::Model);
    assert_eq!(outcome.plan.path, PrimaryPath::Bv);
    assert_eq!(outcome.record.model.as_deref(), Some("fake-model"));
    assert_eq!(backend.calls(), 1);
    assert_eq!(agent.metrics().snapshot().model_success_total, 1);
}

const BV_REPLY: &str = r#"{"is_holding":false,"must_be_bv":true,"urgency":"MEDIUM"}"#;

#[tokio::test]
async fn transient_failure_then_success_stays_on_model_path() {
    let backend = FakeBackend::new(Behavior::FlakyThenReply(BV_REPLY));
    let sink = MemorySink::shared();
    let tiered = classifier(backend.clone(), sink.clone());

    let (intent, record) = tiered.classify_with_record(&urgent_corporation()).await;

    assert_eq!(intent.source, ClassificationSource::Model);
    assert!(intent.must_be_bv);
    assert_eq!(record.attempts, 2);
    assert!(record.fallback_reason.is_none());
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn identical_requests_are_classified_independently() {
    let backend = FakeBackend::new(Behavior::Reply(BV_REPLY));
    let sink = MemorySink::shared();
    let tiered = classifier(backend.clone(), sink.clone());
    let request = urgent_corporation();

    let (first, _) = tiered.classify_with_record(&request).await;
    let (second, _) = tiered.classify_with_record(&request).await;

    assert_eq!(first, second);
    assert_eq!(backend.calls(), 2);
    assert_eq!(sink.len(), 2);
}

#[tokio::test]
async fn configured_retry_count_never_exceeds_one() {
    let backend = FakeBackend::new(Behavior::ServerError);
    let config = ClassifierConfig {
        timeout: Duration::from_millis(25),
        retry_backoff: Duration::from_millis(1),
        max_retries: 5,
        ..ClassifierConfig::default()
    };
    let primary: Arc<dyn IntentClassifier> =
        Arc::new(ModelIntentClassifier::new(backend.clone(), &config));
    let tiered = TieredClassifier::new(Some(primary), HeuristicIntentClassifier::default());

    let (intent, record) = tiered.classify_with_record(&urgent_corporation()).await;

    assert_eq!(intent.source, ClassificationSource::Fallback);
    assert_eq!(record.attempts, 2);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn fallback_plan_still_routes() {
    let backend = FakeBackend::new(Behavior::ServerError);
    let agent = PlanningAgent::new(
        classifier(backend, MemorySink::shared()),
        AppMetrics::shared(),
    );

    let outcome = agent.plan(urgent_corporation()).await.unwrap();
    assert_eq!(outcome.plan.path, PrimaryPath::Branch);

    let snapshot = agent.metrics().snapshot();
    assert_eq!(snapshot.fallback_total, 1);
    assert_eq!(snapshot.plans_total, 1);
}
