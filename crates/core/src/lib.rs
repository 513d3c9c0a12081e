pub mod intent;
pub mod models;
pub mod planner;
pub mod policy;

pub use intent::{classify_heuristic, describe_request, normalize_text, HeuristicClassifier, HeuristicOutcome};
pub use models::*;
pub use planner::{
    check_plan_vocabulary, path_tasks, plan_tasks, select_path, RoutingError, TaskTemplate,
    EXPAT_PAYROLL_TASK, INNOVATION_BOX_TASK, RD_CREDIT_TASK,
};
pub use policy::{KeywordPolicy, PolicyError};
