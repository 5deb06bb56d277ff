//! End-to-end evaluation of one contest, and batch fan-out over many.

use crate::config::EngineConfig;
use crate::diagnostics::Diagnostics;
use crate::domain::{Contest, Decision, MarketKind, Quote, RawModelPrediction, Recommendation};
use crate::error::{Result, TrustlineError};
use crate::market::{BookGrouper, FavoriteResolver, SnapshotBuilder};
use crate::overlay::{
    ConsistencyAuditor, ModelValidator, MoneylineResolver, OverlayEngine, OverlayParams,
    RecommendationGrader,
};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Everything needed to evaluate one contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub contest: Contest,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub model: RawModelPrediction,
}

impl EvaluationInput {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Read a JSON document (one input or a batch) from disk
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Result of one contest inside a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub contest_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.decision.is_some()
    }
}

/// Runs the snapshot and overlay pipeline.
///
/// Holds only configuration, so one evaluator can be shared across threads.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EngineConfig,
}

impl Evaluator {
    /// Fails with [`TrustlineError::InvalidConfig`] unless `config` validates.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|errors| TrustlineError::InvalidConfig(errors.join("; ")))?;
        Ok(Self { config })
    }

    /// Evaluate one contest.
    ///
    /// Fatal conditions return an error and no decision; everything else is
    /// carried in the decision's diagnostics.
    pub fn evaluate(&self, input: &EvaluationInput) -> Result<Decision> {
        let config = &self.config;
        let contest = &input.contest;
        let mut diagnostics = Diagnostics::new();

        let selection = BookGrouper::select(&contest.id, &input.quotes, &mut diagnostics)?;
        debug!(
            contest_id = %contest.id,
            group = %selection.key,
            coverage = selection.coverage_score,
            "selected provider group"
        );

        let resolution = FavoriteResolver::resolve(
            &selection.spread,
            &selection.spread_quotes,
            contest,
            config.home_field_advantage,
            &mut diagnostics,
        )?;
        debug!(
            contest_id = %contest.id,
            favorite = %resolution.favorite,
            line = resolution.favorite_line,
            source = ?resolution.source,
            "resolved favorite"
        );

        let snapshot = SnapshotBuilder::new(config)
            .build(contest, &selection, &resolution, &mut diagnostics)
            .map_err(|e| {
                error!(
                    contest_id = %contest.id,
                    group = %selection.key,
                    favorite = %resolution.favorite,
                    line = resolution.favorite_line,
                    home_price = ?resolution.home_price,
                    away_price = ?resolution.away_price,
                    model = ?input.model,
                    "snapshot rejected: {}",
                    e
                );
                e
            })?;
        debug!(
            contest_id = %contest.id,
            snapshot_id = %snapshot.snapshot_id,
            "built market snapshot"
        );

        let prediction =
            ModelValidator::new(&config.model_bounds).validate(&input.model, &mut diagnostics);
        let model = ModelValidator::view(&prediction, snapshot.favorite.side);

        let grader = RecommendationGrader::new(&config.grade_thresholds);

        let spread_overlay = OverlayEngine::compute(
            snapshot.favorite_line,
            model.favorite_line,
            &OverlayParams::spread(config),
        );
        let spread = grader.recommend_spread(
            &snapshot,
            spread_overlay.clone(),
            model.spread_reason.clone(),
            config.extreme_favorite_threshold,
        );

        let total = match snapshot.total {
            Some(market_total) => grader.recommend_total(
                OverlayEngine::compute(market_total, model.total, &OverlayParams::total(config)),
                model.total_reason.clone(),
            ),
            None => Recommendation::none(MarketKind::Total, None, "no market total available"),
        };

        let (moneyline, moneyline_view) =
            MoneylineResolver::new(config).resolve(&snapshot, &spread_overlay);
        debug!(
            contest_id = %contest.id,
            spread = ?spread.side,
            total = ?total.side,
            moneyline = ?moneyline.side,
            "graded recommendations"
        );

        let mut decision = Decision {
            contest_id: contest.id.clone(),
            snapshot,
            model,
            spread,
            total,
            moneyline,
            moneyline_view,
            diagnostics,
        };

        let auditor = ConsistencyAuditor::new(config);
        let violations = auditor.audit(&decision);
        for violation in &violations {
            error!(
                contest_id = %contest.id,
                snapshot_id = %decision.snapshot.snapshot_id,
                model = ?input.model,
                context = ?violation.context,
                overlay = ?violation.overlay,
                "invariant violation: {}",
                violation
            );
        }
        auditor.apply(&mut decision, violations)?;

        log_diagnostics(&decision);
        Ok(decision)
    }

    /// Evaluate many contests in parallel. Output order matches input order.
    pub fn evaluate_batch(&self, inputs: &[EvaluationInput]) -> Vec<BatchOutcome> {
        let outcomes: Vec<BatchOutcome> = inputs
            .par_iter()
            .map(|input| match self.evaluate(input) {
                Ok(decision) => BatchOutcome {
                    contest_id: input.contest.id.clone(),
                    decision: Some(decision),
                    error: None,
                },
                Err(e) => {
                    if e.is_market_error() {
                        warn!(contest_id = %input.contest.id, "evaluation failed: {}", e);
                    } else {
                        error!(contest_id = %input.contest.id, "evaluation failed: {}", e);
                    }
                    BatchOutcome {
                        contest_id: input.contest.id.clone(),
                        decision: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            "Evaluated {} contests ({} failed)",
            outcomes.len(),
            failed
        );
        outcomes
    }
}

fn log_diagnostics(decision: &Decision) {
    let d = &decision.diagnostics;
    let contest_id = decision.contest_id.as_str();

    for mismatch in &d.provenance_mismatches {
        warn!(contest_id, "provenance mismatch: {}", mismatch);
    }
    if let Some(reason) = &d.low_confidence_favorite {
        warn!(contest_id, "low-confidence favorite: {}", reason);
    }
    if d.has_violations() {
        warn!(
            contest_id,
            snapshot_id = %decision.snapshot.snapshot_id,
            count = d.violations.len(),
            "decision carries violations: {}",
            d.violation_summary()
        );
    }
    if let Some(reason) = &d.model_spread_failure {
        debug!(contest_id, "model spread rejected: {}", reason);
    }
    if let Some(reason) = &d.model_total_failure {
        debug!(contest_id, "model total rejected: {}", reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineType, Pick, Team, TeamSide};
    use chrono::{DateTime, Duration};

    fn quote(line_type: LineType, value: f64, side: Option<TeamSide>, secs: i64) -> Quote {
        Quote {
            line_type,
            value,
            closing_value: None,
            side,
            provider: "espn".into(),
            book: "draftkings".into(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap()
                + Duration::seconds(secs),
        }
    }

    fn input(id: &str, quotes: Vec<Quote>, spread: Option<f64>, total: Option<f64>) -> EvaluationInput {
        EvaluationInput {
            contest: Contest {
                id: id.into(),
                home: Team {
                    id: "home".into(),
                    name: "Home".into(),
                    power_rating: Some(12.0),
                },
                away: Team {
                    id: "away".into(),
                    name: "Away".into(),
                    power_rating: Some(8.0),
                },
            },
            quotes,
            model: RawModelPrediction { spread, total },
        }
    }

    fn full_market() -> Vec<Quote> {
        vec![
            quote(LineType::Spread, -6.5, Some(TeamSide::Home), 0),
            quote(LineType::Spread, 6.5, Some(TeamSide::Away), 0),
            quote(LineType::Total, 47.5, None, 0),
            quote(LineType::Moneyline, -260.0, None, 1),
            quote(LineType::Moneyline, 210.0, None, 1),
        ]
    }

    #[test]
    fn test_full_pipeline() {
        let evaluator = Evaluator::new(EngineConfig::default()).unwrap();
        // Home by 15 with 56 total: overlay -2.125 on the spread, +2.125 on the total.
        let decision = evaluator
            .evaluate(&input("g1", full_market(), Some(15.0), Some(56.0)))
            .unwrap();

        assert_eq!(decision.snapshot.favorite.side, TeamSide::Home);
        assert_eq!(decision.spread.side, Some(Pick::Team(TeamSide::Home)));
        assert_eq!(decision.total.side, Some(Pick::Over));
        assert!(decision.moneyline_view.is_some());
        assert!(!decision.diagnostics.has_violations());
        assert!(decision.diagnostics.snapshot_id.is_some());
    }

    #[test]
    fn test_missing_spread_returns_no_decision() {
        let evaluator = Evaluator::new(EngineConfig::default()).unwrap();
        let quotes = vec![quote(LineType::Total, 47.5, None, 0)];
        let err = evaluator
            .evaluate(&input("g2", quotes, Some(3.0), Some(50.0)))
            .unwrap_err();
        assert!(err.is_market_error());
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        for config in [
            EngineConfig {
                cap_spread: -1.0,
                ..Default::default()
            },
            EngineConfig {
                cap_total: f64::NAN,
                ..Default::default()
            },
        ] {
            let err = Evaluator::new(config).unwrap_err();
            assert!(matches!(err, TrustlineError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_same_signed_tagged_pair_breaks_tolerance() {
        let quotes = vec![
            quote(LineType::Spread, -3.0, Some(TeamSide::Home), 10),
            quote(LineType::Spread, -2.5, Some(TeamSide::Away), 0),
            quote(LineType::Total, 47.5, None, 0),
        ];

        let strict = Evaluator::new(EngineConfig {
            strict_mode: true,
            ..Default::default()
        })
        .unwrap();
        let err = strict
            .evaluate(&input("g3", quotes.clone(), Some(4.0), None))
            .unwrap_err();
        assert!(matches!(err, TrustlineError::InvariantViolation { .. }));
        assert!(err.to_string().contains("spread_pair_tolerance"));

        let lenient = Evaluator::new(EngineConfig::default()).unwrap();
        let decision = lenient
            .evaluate(&input("g3", quotes, Some(4.0), None))
            .unwrap();
        assert!(decision.snapshot.flagged);
        assert_eq!(decision.diagnostics.violations.len(), 1);
        let violation = &decision.diagnostics.violations[0];
        assert_eq!(violation.check, "spread_pair_tolerance");
        let context = violation.context.as_ref().unwrap();
        assert_eq!((context.home_price, context.away_price), (Some(-3.0), Some(-2.5)));
    }

    #[test]
    fn test_from_json_and_read_json() {
        let raw = r#"{"contest":{"id":"j1","home":{"id":"h","name":"H"},"away":{"id":"a","name":"A"}}}"#;
        let parsed = EvaluationInput::from_json(raw).unwrap();
        assert_eq!(parsed.contest.id, "j1");
        assert!(parsed.quotes.is_empty());

        let err = EvaluationInput::from_json("{not json").unwrap_err();
        assert!(matches!(err, TrustlineError::Json(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(&path, raw).unwrap();
        let from_disk: EvaluationInput = read_json(&path).unwrap();
        assert_eq!(from_disk, parsed);

        let missing = read_json::<EvaluationInput>(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, TrustlineError::Io(_)));
    }

    #[test]
    fn test_batch_preserves_order_and_isolates_failures() {
        let evaluator = Evaluator::new(EngineConfig::default()).unwrap();
        let inputs = vec![
            input("a", full_market(), Some(7.0), Some(48.0)),
            input("b", Vec::new(), Some(7.0), Some(48.0)),
            input("c", full_market(), None, None),
        ];

        let outcomes = evaluator.evaluate_batch(&inputs);
        let ids: Vec<&str> = outcomes.iter().map(|o| o.contest_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(outcomes[0].is_ok());
        assert!(!outcomes[1].is_ok());
        assert!(outcomes[1].error.as_ref().unwrap().contains("b"));
        assert!(outcomes[2].is_ok());
    }
}
