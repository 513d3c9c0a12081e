//! Routing rules: a pure mapping from a classified [`Intent`] to the ordered
//! [`TaskPlan`] handed to the memo generator.
//!
//! Precedence is data, not control flow. [`PRIMARY_RULES`] is walked in order and the
//! first matching predicate picks the path; [`ADDITIVE_RULES`] are then applied
//! independently. The search-query wording is part of the routing contract: a branch
//! plan that asks for notary content makes the generator answer with BV facts.

use thiserror::Error;

use crate::models::{IndustryContext, Intent, PrimaryPath, Section, Task, TaskPlan, Urgency};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("routing precondition violated: {0}")]
    InvariantViolation(&'static str),
    #[error("{path:?} plan task {task_name:?} uses forbidden phrase {phrase:?}")]
    ForbiddenPhrase {
        path: PrimaryPath,
        task_name: String,
        phrase: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TaskTemplate {
    pub task_name: &'static str,
    pub search_query: &'static str,
    pub section: Section,
}

pub struct PrimaryRule {
    pub path: PrimaryPath,
    pub applies: fn(&Intent) -> bool,
}

pub struct AdditiveRule {
    pub name: &'static str,
    pub applies: fn(&Intent, PrimaryPath) -> bool,
    pub task: TaskTemplate,
}

pub static PRIMARY_RULES: [PrimaryRule; 4] = [
    PrimaryRule {
        path: PrimaryPath::Holding,
        applies: |intent| intent.is_holding,
    },
    PrimaryRule {
        path: PrimaryPath::Bv,
        applies: |intent| intent.must_be_bv,
    },
    PrimaryRule {
        path: PrimaryPath::Branch,
        applies: |intent| intent.urgency == Urgency::High,
    },
    PrimaryRule {
        path: PrimaryPath::Comparison,
        applies: |_| true,
    },
];

pub static ADDITIVE_RULES: [AdditiveRule; 3] = [
    AdditiveRule {
        name: "rd_credit",
        applies: |intent, _| intent.industry_context == IndustryContext::Tech,
        task: RD_CREDIT_TASK,
    },
    AdditiveRule {
        name: "innovation_box",
        applies: |_, path| path.incorporates_bv(),
        task: INNOVATION_BOX_TASK,
    },
    AdditiveRule {
        name: "expat_payroll",
        applies: |intent, _| intent.plans_hiring,
        task: EXPAT_PAYROLL_TASK,
    },
];

pub const RD_CREDIT_TASK: TaskTemplate = TaskTemplate {
    task_name: "R&D Incentives (WBSO)",
    search_query: "Netherlands WBSO R&D tax credit payroll tax reduction requirements software technology development 2025",
    section: Section::TaxConsiderations,
};

pub const INNOVATION_BOX_TASK: TaskTemplate = TaskTemplate {
    task_name: "Innovation Box",
    search_query: "Netherlands Innovation Box 9% effective rate qualifying intangible assets conditions for BV taxpayers 2025",
    section: Section::TaxConsiderations,
};

pub const EXPAT_PAYROLL_TASK: TaskTemplate = TaskTemplate {
    task_name: "30% Ruling & Payroll",
    search_query: "Netherlands 30% ruling for foreign employees payroll tax requirements employment contracts 2025",
    section: Section::LegalDeepDive,
};

static HOLDING_TASKS: &[TaskTemplate] = &[
    TaskTemplate {
        task_name: "Holding Company Executive Summary",
        search_query: "Netherlands holding company benefits executive summary participation exemption dividend withholding 2025",
        section: Section::ExecutiveSummary,
    },
    TaskTemplate {
        task_name: "Holding Structure (BV)",
        search_query: "Netherlands BV incorporation requirements for holding company legal personality share ownership 2025",
        section: Section::BusinessStructure,
    },
    TaskTemplate {
        task_name: "Participation Exemption Deep Dive",
        search_query: "Netherlands participation exemption deelnemingsvrijstelling requirements 5% ownership motive test dividends capital gains 2025",
        section: Section::TaxConsiderations,
    },
    TaskTemplate {
        task_name: "Corporate Tax for Holding Companies",
        search_query: "Netherlands corporate income tax treaty network holding company tax benefits 2025",
        section: Section::TaxConsiderations,
    },
    TaskTemplate {
        task_name: "Holding Company Compliance",
        search_query: "Netherlands holding company substance requirements compliance filing obligations 2025",
        section: Section::LegalDeepDive,
    },
    TaskTemplate {
        task_name: "Holding Implementation Timeline",
        search_query: "Netherlands holding BV setup timeline civil law notary deed of incorporation share capital KvK registration bank account 2025",
        section: Section::ImplementationTimeline,
    },
];

static BV_TASKS: &[TaskTemplate] = &[
    TaskTemplate {
        task_name: "BV Executive Summary",
        search_query: "Netherlands BV private limited company benefits liability protection executive summary 2025",
        section: Section::ExecutiveSummary,
    },
    TaskTemplate {
        task_name: "BV Incorporation Process",
        search_query: "Netherlands BV incorporation process notary requirements bank account opening KvK registration 2025",
        section: Section::BusinessStructure,
    },
    TaskTemplate {
        task_name: "BV Tax and Compliance",
        search_query: "Netherlands BV corporate income tax VAT registration obligations 2025",
        section: Section::TaxConsiderations,
    },
    TaskTemplate {
        task_name: "BV Implementation Timeline",
        search_query: "Netherlands BV setup timeline civil law notary deed of incorporation share capital deposit KvK registration bank account duration 2025",
        section: Section::ImplementationTimeline,
    },
];

static BRANCH_TASKS: &[TaskTemplate] = &[
    TaskTemplate {
        task_name: "Branch Office Executive Summary",
        search_query: "Netherlands Branch Office market entry speed benefits quick setup 2025",
        section: Section::ExecutiveSummary,
    },
    TaskTemplate {
        task_name: "Branch Registration (No Notary)",
        search_query: "Netherlands Branch Office registration Chamber of Commerce KvK no notary required fast setup 2025",
        section: Section::BusinessStructure,
    },
    TaskTemplate {
        task_name: "Branch Tax and Compliance",
        search_query: "Netherlands Branch Office tax obligations VAT registration corporate income tax permanent establishment 2025",
        section: Section::TaxConsiderations,
    },
    TaskTemplate {
        task_name: "Branch Implementation Timeline",
        search_query: "Netherlands Branch Office setup timeline Chamber of Commerce KvK registration no notary required bank account fast entry 2025",
        section: Section::ImplementationTimeline,
    },
];

static COMPARISON_TASKS: &[TaskTemplate] = &[
    TaskTemplate {
        task_name: "Market Entry Comparison",
        search_query: "Netherlands BV vs Branch Office comparison notary requirement differences tax liability speed setup requirements 2025",
        section: Section::MarketEntryOptions,
    },
    TaskTemplate {
        task_name: "Executive Summary Research",
        search_query: "Netherlands market entry overview corporate tax business structure 2025",
        section: Section::ExecutiveSummary,
    },
    TaskTemplate {
        task_name: "Tax Overview Research",
        search_query: "Netherlands corporate income tax rates VAT obligations tax overview 2025",
        section: Section::TaxConsiderations,
    },
    TaskTemplate {
        task_name: "Implementation Timeline Research",
        search_query: "Netherlands company registration timeline BV branch office setup duration 2025",
        section: Section::ImplementationTimeline,
    },
    TaskTemplate {
        task_name: "General Corporate Tax",
        search_query: "Netherlands corporate income tax rate VAT registration payroll tax obligations 2025",
        section: Section::TaxConsiderations,
    },
];

pub fn path_tasks(path: PrimaryPath) -> &'static [TaskTemplate] {
    match path {
        PrimaryPath::Holding => HOLDING_TASKS,
        PrimaryPath::Bv => BV_TASKS,
        PrimaryPath::Branch => BRANCH_TASKS,
        PrimaryPath::Comparison => COMPARISON_TASKS,
    }
}

pub fn select_path(intent: &Intent) -> PrimaryPath {
    PRIMARY_RULES
        .iter()
        .find(|rule| (rule.applies)(intent))
        .map(|rule| rule.path)
        // The last rule matches everything.
        .unwrap_or(PrimaryPath::Comparison)
}

pub fn plan_tasks(intent: &Intent) -> Result<TaskPlan, RoutingError> {
    if let Some(reason) = intent.invariant_violation() {
        return Err(RoutingError::InvariantViolation(reason));
    }

    let path = select_path(intent);
    let additive = ADDITIVE_RULES
        .iter()
        .filter(|rule| (rule.applies)(intent, path))
        .map(|rule| &rule.task);

    let tasks = path_tasks(path)
        .iter()
        .chain(additive)
        .zip(1u32..)
        .map(|(template, priority)| Task {
            task_name: template.task_name.to_string(),
            search_query: template.search_query.to_string(),
            section_name: template.section,
            priority,
        })
        .collect();

    Ok(TaskPlan { path, tasks })
}

/// Branch plans must not pull in incorporation vocabulary; BV-style plans must not
/// carry the branch's "no notary" wording.
pub fn check_plan_vocabulary(plan: &TaskPlan) -> Result<(), RoutingError> {
    for task in &plan.tasks {
        let query = task.search_query.to_lowercase();
        let forbidden = match plan.path {
            PrimaryPath::Branch => {
                let without_negation = query.replace("no notary", "");
                ["notary", "deed", "share capital"]
                    .into_iter()
                    .find(|phrase| without_negation.contains(phrase))
            }
            PrimaryPath::Bv | PrimaryPath::Holding => {
                ["no notary"].into_iter().find(|phrase| query.contains(phrase))
            }
            PrimaryPath::Comparison => None,
        };

        if let Some(phrase) = forbidden {
            return Err(RoutingError::ForbiddenPhrase {
                path: plan.path,
                task_name: task.task_name.clone(),
                phrase,
            });
        }
    }
    Ok(())
}
