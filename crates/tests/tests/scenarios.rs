use memo_agents::PlanningAgent;
use memo_core::{
    EntityType, IndustryContext, PrimaryPath, RawRequest, Urgency, EXPAT_PAYROLL_TASK,
    INNOVATION_BOX_TASK, RD_CREDIT_TASK,
};
use memo_ml::{ClassifierConfig, TieredClassifier};
use memo_observability::AppMetrics;

fn offline_agent() -> PlanningAgent {
    let classifier = TieredClassifier::from_config(&ClassifierConfig::default().offline())
        .expect("keyword classifier should build");
    PlanningAgent::new(classifier, AppMetrics::shared())
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

#[tokio::test]
async fn natural_language_bv_synonym_routes_to_bv_with_rd_incentive() {
    let outcome = offline_agent()
        .plan(RawRequest {
            company_name: text("Dutch Limited Liability Company"),
            industry: text("Software & Technology"),
            ..RawRequest::default()
        })
        .await
        .expect("plan should build");

    assert!(outcome.intent.must_be_bv);
    assert_eq!(outcome.intent.industry_context, IndustryContext::Tech);
    assert_eq!(outcome.plan.path, PrimaryPath::Bv);
    assert!(outcome.plan.task(RD_CREDIT_TASK.task_name).is_some());
    assert!(outcome.plan.task(INNOVATION_BOX_TASK.task_name).is_some());
}

#[tokio::test]
async fn generic_corporation_with_time_pressure_routes_to_branch() {
    let outcome = offline_agent()
        .plan(RawRequest {
            company_name: text("Acme Inc"),
            company_type: text("Corporation"),
            timeline_preference: text("ASAP"),
            ..RawRequest::default()
        })
        .await
        .expect("plan should build");

    assert!(!outcome.intent.must_be_bv);
    assert_eq!(outcome.intent.urgency, Urgency::High);
    assert_eq!(outcome.plan.path, PrimaryPath::Branch);
    assert!(outcome.plan.task(INNOVATION_BOX_TASK.task_name).is_none());
}

#[tokio::test]
async fn participation_exemption_overrides_corporation_label() {
    let outcome = offline_agent()
        .plan(RawRequest {
            company_type: text("Corporation"),
            tax_considerations: vec!["participation exemption".to_string()],
            ..RawRequest::default()
        })
        .await
        .expect("plan should build");

    assert!(outcome.intent.is_holding);
    assert_eq!(outcome.intent.entity_type, EntityType::Holding);
    assert_eq!(outcome.plan.path, PrimaryPath::Holding);
}

#[tokio::test]
async fn financial_services_label_never_earns_rd_incentive() {
    let outcome = offline_agent()
        .plan(RawRequest {
            industry: text("Financial Services & Technology"),
            entry_goals: vec!["Research and development".to_string()],
            ..RawRequest::default()
        })
        .await
        .expect("plan should build");

    assert_eq!(outcome.intent.industry_context, IndustryContext::Financial);
    assert!(outcome.plan.task(RD_CREDIT_TASK.task_name).is_none());
}

#[tokio::test]
async fn company_description_does_not_override_stated_timeline() {
    let outcome = offline_agent()
        .plan(RawRequest {
            industry: text("Food"),
            timeline_preference: text("Within 6 months"),
            additional_context: text("We make breakfast cereals and have 40 employees in Belgium"),
            ..RawRequest::default()
        })
        .await
        .expect("plan should build");

    assert_eq!(outcome.intent.urgency, Urgency::Medium);
    assert!(!outcome.intent.plans_hiring);
    assert_eq!(outcome.plan.path, PrimaryPath::Comparison);
    assert!(outcome.plan.task(EXPAT_PAYROLL_TASK.task_name).is_none());
}

#[tokio::test]
async fn empty_request_gets_comparison_plan() {
    let agent = offline_agent();
    let outcome = agent.plan(RawRequest::default()).await.expect("plan should build");

    assert_eq!(outcome.plan.path, PrimaryPath::Comparison);
    assert!(outcome.record.fallback_reason.is_some());
    assert_eq!(agent.metrics().snapshot().fallback_total, 1);
}

#[tokio::test]
async fn outcome_serializes_with_provenance() {
    let outcome = offline_agent()
        .plan(RawRequest {
            company_name: text("Tech Solutions B.V."),
            ..RawRequest::default()
        })
        .await
        .expect("plan should build");

    let value = serde_json::to_value(&outcome).expect("outcome should serialize");
    assert_eq!(value["plan"]["path"], "bv");
    assert_eq!(value["intent"]["source"], "FALLBACK");
    assert_eq!(value["record"]["triggers"][0]["keyword"], "b.v.");
}
