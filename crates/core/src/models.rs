use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRequest {
    #[serde(alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(alias = "companyType")]
    pub company_type: Option<String>,
    pub industry: Option<String>,
    #[serde(alias = "entryGoals", deserialize_with = "lenient_string_list")]
    pub entry_goals: Vec<String>,
    #[serde(alias = "taxConsiderations", deserialize_with = "lenient_string_list")]
    pub tax_considerations: Vec<String>,
    #[serde(alias = "timelinePreference")]
    pub timeline_preference: Option<String>,
    #[serde(alias = "urgencyLevel")]
    pub urgency_level: Option<String>,
    #[serde(alias = "preferredStructure")]
    pub preferred_structure: Option<String>,
    #[serde(alias = "additionalContext")]
    pub additional_context: Option<String>,
}

/// Accepts `null`, a single scalar, or a list of scalars and coerces every member
/// to its string form.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(&other).into_iter().collect(),
    })
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    #[default]
    Setup,
    Advisory,
    Compliance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Bv,
    Branch,
    Holding,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    High,
    #[default]
    Medium,
    Low,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::High, Urgency::Medium, Urgency::Low];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndustryContext {
    Tech,
    Financial,
    #[default]
    General,
}

impl IndustryContext {
    pub const ALL: [IndustryContext; 3] = [
        IndustryContext::Tech,
        IndustryContext::Financial,
        IndustryContext::General,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationSource {
    Model,
    Fallback,
}

impl ClassificationSource {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Model => "MODEL",
            Self::Fallback => "FALLBACK",
        }
    }
}

/// The classified reading of one intake request. Built once by a classifier and only
/// read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intent {
    pub is_holding: bool,
    pub must_be_bv: bool,
    pub intent_kind: IntentKind,
    pub entity_type: EntityType,
    pub urgency: Urgency,
    pub industry_context: IndustryContext,
    #[serde(default)]
    pub plans_hiring: bool,
    pub source: ClassificationSource,
}

impl Intent {
    /// Conservative defaults for a request that carries no signal at all.
    pub fn conservative(source: ClassificationSource) -> Self {
        Self {
            is_holding: false,
            must_be_bv: false,
            intent_kind: IntentKind::Setup,
            entity_type: EntityType::Unspecified,
            urgency: Urgency::Medium,
            industry_context: IndustryContext::General,
            plans_hiring: false,
            source,
        }
    }

    pub fn resolve_entity_type(is_holding: bool, must_be_bv: bool, urgency: Urgency) -> EntityType {
        if is_holding {
            EntityType::Holding
        } else if must_be_bv {
            EntityType::Bv
        } else if urgency == Urgency::High {
            EntityType::Branch
        } else {
            EntityType::Unspecified
        }
    }

    /// Brings `entity_type` in line with the flags: a holding is always `Holding`, an
    /// explicit BV is never `Branch`, and `Unspecified` is filled in from the flags.
    pub fn normalized(mut self) -> Self {
        let resolved = Self::resolve_entity_type(self.is_holding, self.must_be_bv, self.urgency);
        let conflicting = match self.entity_type {
            EntityType::Unspecified => true,
            EntityType::Branch => self.must_be_bv || self.is_holding,
            EntityType::Holding => !self.is_holding,
            EntityType::Bv => self.is_holding,
        };
        if conflicting {
            self.entity_type = resolved;
        }
        self
    }

    pub fn invariant_violation(&self) -> Option<&'static str> {
        if self.must_be_bv && self.entity_type == EntityType::Branch {
            return Some("must_be_bv intent resolved to a branch entity");
        }
        if self.is_holding && self.entity_type != EntityType::Holding {
            return Some("holding intent resolved to a non-holding entity");
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ExecutiveSummary,
    MarketEntryOptions,
    BusinessStructure,
    TaxConsiderations,
    ImplementationTimeline,
    LegalDeepDive,
}

impl Section {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "executive_summary",
            Self::MarketEntryOptions => "market_entry_options",
            Self::BusinessStructure => "business_structure",
            Self::TaxConsiderations => "tax_considerations",
            Self::ImplementationTimeline => "implementation_timeline",
            Self::LegalDeepDive => "legal_deep_dive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryPath {
    Holding,
    Bv,
    Branch,
    Comparison,
}

impl PrimaryPath {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Holding => "holding",
            Self::Bv => "bv",
            Self::Branch => "branch",
            Self::Comparison => "comparison",
        }
    }

    /// Paths whose entity has legal personality and can hold IP.
    pub fn incorporates_bv(self) -> bool {
        matches!(self, Self::Holding | Self::Bv)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_name: String,
    pub search_query: String,
    pub section_name: Section,
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    pub path: PrimaryPath,
    pub tasks: Vec<Task>,
}

impl TaskPlan {
    pub fn task(&self, task_name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.task_name == task_name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trigger {
    pub field: &'static str,
    pub keyword: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRecord {
    pub request_id: Uuid,
    pub classified_at: DateTime<Utc>,
    pub source: ClassificationSource,
    pub intent: Intent,
    pub model: Option<String>,
    pub attempts: u32,
    pub fallback_reason: Option<String>,
    pub triggers: Vec<Trigger>,
}

impl ClassificationRecord {
    pub fn new(intent: Intent) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            classified_at: Utc::now(),
            source: intent.source,
            intent,
            model: None,
            attempts: 0,
            fallback_reason: None,
            triggers: Vec::new(),
        }
    }
}
