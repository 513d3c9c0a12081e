use memo_core::{ClassificationSource, EntityType, IndustryContext, Intent, IntentKind, Urgency};
use serde::Deserialize;

use crate::error::ClassifierError;

#[derive(Debug, Deserialize)]
struct ModelIntentPayload {
    is_holding: bool,
    must_be_bv: bool,
    #[serde(default, alias = "intent_kind")]
    intent: IntentKind,
    #[serde(default)]
    entity_type: Option<EntityType>,
    urgency: Urgency,
    #[serde(default)]
    industry_context: Option<IndustryContext>,
    #[serde(default)]
    plans_hiring: bool,
}

/// Validates the model's structured output. Free text, unknown enum values and missing
/// required keys are all malformed; a valid payload is normalized so the entity type
/// agrees with the flags.
pub fn parse_model_response(raw: &str) -> Result<Intent, ClassifierError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ClassifierError::MalformedResponse("empty body".to_string()));
    }

    let payload: ModelIntentPayload = serde_json::from_str(body)
        .map_err(|err| ClassifierError::MalformedResponse(err.to_string()))?;

    let intent = Intent {
        is_holding: payload.is_holding,
        must_be_bv: payload.must_be_bv,
        intent_kind: payload.intent,
        entity_type: payload.entity_type.unwrap_or_default(),
        urgency: payload.urgency,
        industry_context: payload.industry_context.unwrap_or_default(),
        plans_hiring: payload.plans_hiring,
        source: ClassificationSource::Model,
    };
    Ok(intent.normalized())
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string ("json") on the opening fence line.
    match rest.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => rest.trim(),
    }
}
