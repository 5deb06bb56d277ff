//! Model side of the pipeline: validation, overlays, grading and audit.

pub mod auditor;
pub mod engine;
pub mod grader;
pub mod moneyline;
pub mod validator;

pub use auditor::ConsistencyAuditor;
pub use engine::{OverlayEngine, OverlayParams};
pub use grader::RecommendationGrader;
pub use moneyline::{favorite_win_probability, MoneylineResolver};
pub use validator::{implied_scores, ModelValidator};
