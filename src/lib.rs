pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod market;
pub mod odds;
pub mod overlay;

pub use config::EngineConfig;
pub use diagnostics::{Diagnostics, InvariantViolation, MismatchRecord, ProvenanceMismatch};
pub use domain::{
    Contest, Decision, Grade, LineType, MarketSnapshot, Pick, Quote, RawModelPrediction,
    Recommendation, Team, TeamSide,
};
pub use error::{Result, TrustlineError};
pub use evaluator::{read_json, BatchOutcome, EvaluationInput, Evaluator};
