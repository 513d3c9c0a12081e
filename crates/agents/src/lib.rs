use std::sync::Arc;
use std::time::Instant;

use memo_core::{
    check_plan_vocabulary, plan_tasks, ClassificationRecord, Intent, RawRequest, RoutingError,
    TaskPlan,
};
use memo_ml::TieredClassifier;
use memo_observability::AppMetrics;
use serde::Serialize;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub intent: Intent,
    pub plan: TaskPlan,
    pub record: ClassificationRecord,
}

/// Classifies a request, routes it and audits the decision.
#[derive(Clone)]
pub struct PlanningAgent {
    classifier: TieredClassifier,
    metrics: Arc<AppMetrics>,
}

impl PlanningAgent {
    pub fn new(classifier: TieredClassifier, metrics: Arc<AppMetrics>) -> Self {
        Self {
            classifier,
            metrics,
        }
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.metrics
    }

    pub fn classifier(&self) -> &TieredClassifier {
        &self.classifier
    }

    /// Classification never fails; only a broken Intent/plan contract reaches the
    /// caller as an error.
    #[instrument(skip(self, request))]
    pub async fn plan(&self, request: RawRequest) -> Result<PlanOutcome, RoutingError> {
        let started = Instant::now();

        let (intent, record) = self.classifier.classify_with_record(&request).await;
        self.metrics.record_classification(intent.source);

        let plan = match route(&intent) {
            Ok(plan) => plan,
            Err(err) => {
                self.metrics.inc_routing_failure();
                error!(request_id = %record.request_id, error = %err, "routing contract violated");
                return Err(err);
            }
        };
        self.metrics.inc_plan();
        self.metrics.observe_latency(started.elapsed());

        info!(
            request_id = %record.request_id,
            source = intent.source.as_code(),
            path = plan.path.as_code(),
            tasks = plan.len(),
            "task plan built"
        );

        Ok(PlanOutcome {
            intent,
            plan,
            record,
        })
    }

    pub async fn classify(&self, request: &RawRequest) -> (Intent, ClassificationRecord) {
        let (intent, record) = self.classifier.classify_with_record(request).await;
        self.metrics.record_classification(intent.source);
        (intent, record)
    }
}

/// Routes an already classified intent and checks the plan against the path
/// vocabulary.
pub fn route(intent: &Intent) -> Result<TaskPlan, RoutingError> {
    let plan = plan_tasks(intent)?;
    check_plan_vocabulary(&plan)?;
    Ok(plan)
}
