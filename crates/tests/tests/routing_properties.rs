use memo_core::{
    check_plan_vocabulary, plan_tasks, ClassificationSource, EntityType, IndustryContext, Intent,
    IntentKind, PrimaryPath, RoutingError, Urgency, EXPAT_PAYROLL_TASK, INNOVATION_BOX_TASK,
    RD_CREDIT_TASK,
};

/// Every well-formed Intent the classifiers can produce.
fn intent_space() -> Vec<Intent> {
    let mut intents = Vec::new();
    for is_holding in [false, true] {
        for must_be_bv in [false, true] {
            for urgency in Urgency::ALL {
                for industry_context in IndustryContext::ALL {
                    for plans_hiring in [false, true] {
                        intents.push(Intent {
                            is_holding,
                            must_be_bv,
                            intent_kind: IntentKind::Setup,
                            entity_type: Intent::resolve_entity_type(is_holding, must_be_bv, urgency),
                            urgency,
                            industry_context,
                            plans_hiring,
                            source: ClassificationSource::Fallback,
                        });
                    }
                }
            }
        }
    }
    intents
}

fn expected_path(intent: &Intent) -> PrimaryPath {
    if intent.is_holding {
        PrimaryPath::Holding
    } else if intent.must_be_bv {
        PrimaryPath::Bv
    } else if intent.urgency == Urgency::High {
        PrimaryPath::Branch
    } else {
        PrimaryPath::Comparison
    }
}

#[test]
fn precedence_is_total_over_the_intent_space() {
    let intents = intent_space();
    assert_eq!(intents.len(), 72);

    for intent in &intents {
        let plan = plan_tasks(intent).unwrap();
        assert_eq!(plan.path, expected_path(intent), "{intent:?}");
        assert!(!plan.is_empty());
    }
}

#[test]
fn routing_is_deterministic() {
    for intent in intent_space() {
        assert_eq!(plan_tasks(&intent).unwrap(), plan_tasks(&intent).unwrap());
    }
}

#[test]
fn every_plan_respects_its_vocabulary() {
    for intent in intent_space() {
        let plan = plan_tasks(&intent).unwrap();
        assert_eq!(check_plan_vocabulary(&plan), Ok(()), "{:?}", plan.path);

        if plan.path == PrimaryPath::Branch {
            for task in &plan.tasks {
                let query = task.search_query.to_lowercase().replace("no notary", "");
                assert!(!query.contains("notary"), "{}", task.task_name);
                assert!(!query.contains("share capital"), "{}", task.task_name);
            }
        }
    }
}

#[test]
fn additive_tasks_follow_their_gates() {
    for intent in intent_space() {
        let plan = plan_tasks(&intent).unwrap();

        assert_eq!(
            plan.task(RD_CREDIT_TASK.task_name).is_some(),
            intent.industry_context == IndustryContext::Tech
        );
        assert_eq!(
            plan.task(INNOVATION_BOX_TASK.task_name).is_some(),
            matches!(plan.path, PrimaryPath::Holding | PrimaryPath::Bv)
        );
        assert_eq!(
            plan.task(EXPAT_PAYROLL_TASK.task_name).is_some(),
            intent.plans_hiring
        );
    }
}

#[test]
fn priorities_are_contiguous_from_one() {
    for intent in intent_space() {
        let plan = plan_tasks(&intent).unwrap();
        let priorities: Vec<u32> = plan.tasks.iter().map(|task| task.priority).collect();
        let expected: Vec<u32> = (1..=plan.len() as u32).collect();
        assert_eq!(priorities, expected);
    }
}

#[test]
fn contradictory_intent_fails_fast() {
    let mut intent = Intent::conservative(ClassificationSource::Model);
    intent.must_be_bv = true;
    intent.urgency = Urgency::High;
    intent.entity_type = EntityType::Branch;

    assert!(matches!(plan_tasks(&intent), Err(RoutingError::InvariantViolation(_))));
}

#[test]
fn intent_json_with_missing_fields_is_rejected() {
    let parsed = serde_json::from_str::<Intent>(r#"{"is_holding": true}"#);
    assert!(parsed.is_err());
}
