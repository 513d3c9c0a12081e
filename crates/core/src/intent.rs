use crate::models::{
    ClassificationSource, IndustryContext, Intent, IntentKind, RawRequest, Trigger, Urgency,
};
use crate::policy::{first_match, KeywordPolicy, PolicyError, TokenMatcher};

pub const EMPTY_REQUEST_DESCRIPTION: &str = "User request for Netherlands market entry.";

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Renders the non-empty request fields as `"<label>: <value>"` lines in a fixed order.
pub fn describe_request(request: &RawRequest) -> String {
    let mut parts = Vec::new();

    push_line(&mut parts, "Company name", request.company_name.as_deref());
    push_line(&mut parts, "Company type", request.company_type.as_deref());
    push_line(&mut parts, "Industry", request.industry.as_deref());
    push_list(&mut parts, "Entry goals", &request.entry_goals);
    push_list(&mut parts, "Tax considerations", &request.tax_considerations);
    push_line(
        &mut parts,
        "Timeline preference",
        request.timeline_preference.as_deref(),
    );
    push_line(&mut parts, "Urgency level", request.urgency_level.as_deref());
    push_line(
        &mut parts,
        "Preferred structure",
        request.preferred_structure.as_deref(),
    );
    push_line(
        &mut parts,
        "Additional context",
        request.additional_context.as_deref(),
    );

    if parts.is_empty() {
        EMPTY_REQUEST_DESCRIPTION.to_string()
    } else {
        parts.join("\n")
    }
}

fn push_line(parts: &mut Vec<String>, label: &str, value: Option<&str>) {
    let value = normalize_text(value.unwrap_or_default());
    if !value.is_empty() {
        parts.push(format!("{label}: {value}"));
    }
}

fn push_list(parts: &mut Vec<String>, label: &str, values: &[String]) {
    let joined = values
        .iter()
        .map(|value| normalize_text(value))
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if !joined.is_empty() {
        parts.push(format!("{label}: {joined}"));
    }
}

#[derive(Debug, Clone)]
pub struct HeuristicOutcome {
    pub intent: Intent,
    pub triggers: Vec<Trigger>,
}

/// Deterministic keyword classifier used whenever the model path is unavailable.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    policy: KeywordPolicy,
    tokens: TokenSets,
}

#[derive(Debug, Clone, Default)]
struct TokenSets {
    suffix: Vec<TokenMatcher>,
    urgent: Vec<TokenMatcher>,
    relaxed: Vec<TokenMatcher>,
    hiring: Vec<TokenMatcher>,
}

impl TokenSets {
    fn compile(policy: &KeywordPolicy) -> Result<Self, PolicyError> {
        Ok(Self {
            suffix: policy.suffix_matchers()?,
            urgent: policy.urgent_matchers()?,
            relaxed: policy.relaxed_matchers()?,
            hiring: policy.hiring_matchers()?,
        })
    }
}

impl HeuristicClassifier {
    pub fn new(policy: KeywordPolicy) -> Result<Self, PolicyError> {
        let tokens = TokenSets::compile(&policy)?;
        Ok(Self { policy, tokens })
    }

    pub fn policy(&self) -> &KeywordPolicy {
        &self.policy
    }

    pub fn classify(&self, request: &RawRequest) -> HeuristicOutcome {
        let fields = LoweredFields::from_request(request);
        let mut triggers = Vec::new();

        let must_be_bv = self.detect_bv(&fields, &mut triggers);

        let is_holding = scan(
            &[
                ("company_name", &fields.company_name),
                ("company_type", &fields.company_type),
                ("preferred_structure", &fields.preferred_structure),
                ("tax_considerations", &fields.tax_considerations),
                ("entry_goals", &fields.entry_goals),
                ("additional_context", &fields.additional_context),
            ],
            &self.policy.holding_terms,
            &mut triggers,
        );

        // Free text is left out: it talks about the business, not the schedule.
        let timing = [
            ("timeline_preference", &fields.timeline_preference),
            ("urgency_level", &fields.urgency_level),
        ];
        let urgency = if scan_tokens(&timing, &self.tokens.urgent, &mut triggers) {
            Urgency::High
        } else if scan_tokens(&timing, &self.tokens.relaxed, &mut triggers) {
            Urgency::Low
        } else {
            Urgency::Medium
        };

        let industry_context = self.detect_industry(&fields, &mut triggers);

        let plans_hiring = scan_tokens(
            &[
                ("entry_goals", &fields.entry_goals),
                ("additional_context", &fields.additional_context),
            ],
            &self.tokens.hiring,
            &mut triggers,
        );

        let purpose = [
            ("entry_goals", &fields.entry_goals),
            ("additional_context", &fields.additional_context),
        ];
        let intent_kind = if scan(&purpose, &self.policy.compliance_terms, &mut triggers) {
            IntentKind::Compliance
        } else if scan(&purpose, &self.policy.advisory_terms, &mut triggers) {
            IntentKind::Advisory
        } else {
            IntentKind::Setup
        };

        let intent = Intent {
            is_holding,
            must_be_bv,
            intent_kind,
            entity_type: Intent::resolve_entity_type(is_holding, must_be_bv, urgency),
            urgency,
            industry_context,
            plans_hiring,
            source: ClassificationSource::Fallback,
        };

        HeuristicOutcome { intent, triggers }
    }

    fn detect_bv(&self, fields: &LoweredFields, triggers: &mut Vec<Trigger>) -> bool {
        let candidates = [
            ("company_name", &fields.company_name),
            ("company_type", &fields.company_type),
            ("preferred_structure", &fields.preferred_structure),
            ("additional_context", &fields.additional_context),
        ];

        scan_tokens(&candidates, &self.tokens.suffix, triggers)
            || scan(&candidates, &self.policy.bv_synonyms, triggers)
    }

    fn detect_industry(&self, fields: &LoweredFields, triggers: &mut Vec<Trigger>) -> IndustryContext {
        let industry = [("industry", &fields.industry)];

        // A financial-services label wins even when a tech term or R&D goal is present.
        if scan(&industry, &self.policy.tech_exclusions, triggers) {
            return IndustryContext::Financial;
        }
        if scan(&industry, &self.policy.tech_terms, triggers)
            || scan(
                &[("entry_goals", &fields.entry_goals)],
                &self.policy.tech_goal_tokens,
                triggers,
            )
        {
            return IndustryContext::Tech;
        }
        if scan(&industry, &self.policy.financial_terms, triggers) {
            return IndustryContext::Financial;
        }
        IndustryContext::General
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        let policy = KeywordPolicy::default();
        let tokens = TokenSets::compile(&policy).unwrap_or_default();
        Self { policy, tokens }
    }
}

/// Convenience entry point over the built-in policy table.
pub fn classify_heuristic(request: &RawRequest) -> HeuristicOutcome {
    HeuristicClassifier::default().classify(request)
}

struct LoweredFields {
    company_name: String,
    company_type: String,
    industry: String,
    entry_goals: String,
    tax_considerations: String,
    timeline_preference: String,
    urgency_level: String,
    preferred_structure: String,
    additional_context: String,
}

impl LoweredFields {
    fn from_request(request: &RawRequest) -> Self {
        let lower = |value: &Option<String>| value.as_deref().unwrap_or_default().to_lowercase();
        let lower_list = |values: &[String]| values.join(" | ").to_lowercase();

        Self {
            company_name: lower(&request.company_name),
            company_type: lower(&request.company_type),
            industry: lower(&request.industry),
            entry_goals: lower_list(&request.entry_goals),
            tax_considerations: lower_list(&request.tax_considerations),
            timeline_preference: lower(&request.timeline_preference),
            urgency_level: lower(&request.urgency_level),
            preferred_structure: lower(&request.preferred_structure),
            additional_context: lower(&request.additional_context),
        }
    }
}

fn scan(fields: &[(&'static str, &String)], needles: &[String], triggers: &mut Vec<Trigger>) -> bool {
    for &(field, text) in fields {
        if let Some(keyword) = first_match(text, needles) {
            triggers.push(Trigger {
                field,
                keyword: keyword.to_string(),
            });
            return true;
        }
    }
    false
}

fn scan_tokens(
    fields: &[(&'static str, &String)],
    matchers: &[TokenMatcher],
    triggers: &mut Vec<Trigger>,
) -> bool {
    for &(field, text) in fields {
        if let Some(matcher) = matchers.iter().find(|matcher| matcher.is_match(text)) {
            triggers.push(Trigger {
                field,
                keyword: matcher.term.clone(),
            });
            return true;
        }
    }
    false
}
