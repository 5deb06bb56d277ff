//! Model output validation and favorite-centric conversion.

use crate::config::ModelBounds;
use crate::diagnostics::Diagnostics;
use crate::domain::{
    ModelPrediction, ModelRejection, ModelView, RawModelPrediction, TeamSide, ValidatedValue,
};

/// Max |home + away - total| for implied scores to count as consistent
const IMPLIED_SCORE_TOLERANCE: f64 = 0.5;

/// Checks model spread/total for units and internal consistency
pub struct ModelValidator<'a> {
    bounds: &'a ModelBounds,
}

impl<'a> ModelValidator<'a> {
    pub fn new(bounds: &'a ModelBounds) -> Self {
        Self { bounds }
    }

    /// Validate a raw prediction. Rejections are recorded in `diagnostics`.
    pub fn validate(
        &self,
        raw: &RawModelPrediction,
        diagnostics: &mut Diagnostics,
    ) -> ModelPrediction {
        let spread = self.validate_spread(raw.spread);
        let mut total = self.validate_total(raw.total, diagnostics);

        if let (Some(s), Some(t)) = (spread.value(), total.value()) {
            if !implied_scores_consistent(s, t) {
                total = ValidatedValue::invalid(
                    Some(t),
                    ModelRejection::ComputationFailure("inconsistent implied scores".to_string()),
                );
            }
        }

        diagnostics.model_spread_failure = spread.reason();
        diagnostics.model_total_failure = total.reason();

        ModelPrediction { spread, total }
    }

    fn validate_spread(&self, spread: Option<f64>) -> ValidatedValue {
        let Some(s) = spread else {
            return ValidatedValue::invalid(
                None,
                ModelRejection::MissingInputs("no model spread".to_string()),
            );
        };
        if !s.is_finite() {
            return ValidatedValue::invalid(
                Some(s),
                ModelRejection::ComputationFailure(format!("model spread {s} is not finite")),
            );
        }
        if s.abs() > self.bounds.max_abs_spread {
            return ValidatedValue::invalid(
                Some(s),
                ModelRejection::UnitMismatch(format!(
                    "spread {s} exceeds ±{} points",
                    self.bounds.max_abs_spread
                )),
            );
        }
        ValidatedValue::valid(s)
    }

    fn validate_total(&self, total: Option<f64>, diagnostics: &mut Diagnostics) -> ValidatedValue {
        let b = self.bounds;
        let Some(t) = total else {
            return ValidatedValue::invalid(
                None,
                ModelRejection::MissingInputs("no model total".to_string()),
            );
        };
        if !t.is_finite() {
            return ValidatedValue::invalid(
                Some(t),
                ModelRejection::ComputationFailure(format!("model total {t} is not finite")),
            );
        }
        if t <= b.total_hard_min || t >= b.total_hard_max {
            return ValidatedValue::invalid(
                Some(t),
                ModelRejection::UnitMismatch(format!(
                    "total {t} outside ({}, {}) points",
                    b.total_hard_min, b.total_hard_max
                )),
            );
        }
        if t < b.total_plausible_min || t > b.total_plausible_max {
            diagnostics.note(format!(
                "model total {t} is outside the plausible range [{}, {}]",
                b.total_plausible_min, b.total_plausible_max
            ));
        }
        ValidatedValue::valid(t)
    }

    /// Express a validated prediction relative to the resolved favorite.
    ///
    /// The raw spread is a home margin, so a home favorite's line is its
    /// negation and an away favorite's line is the margin itself.
    pub fn view(prediction: &ModelPrediction, favorite: TeamSide) -> ModelView {
        let spread = prediction.spread.value();
        let total = prediction.total.value();

        let favorite_line = spread.map(|s| match favorite {
            TeamSide::Home => -s,
            TeamSide::Away => s,
        });

        let (implied_home_score, implied_away_score) = match (spread, total) {
            (Some(s), Some(t)) => {
                let (home, away) = implied_scores(s, t);
                (Some(home), Some(away))
            }
            _ => (None, None),
        };

        ModelView {
            favorite_line,
            total,
            implied_home_score,
            implied_away_score,
            spread_reason: prediction.spread.reason(),
            total_reason: prediction.total.reason(),
        }
    }
}

/// (home, away) scores implied by a home margin and a total
pub fn implied_scores(spread: f64, total: f64) -> (f64, f64) {
    ((total + spread) / 2.0, (total - spread) / 2.0)
}

fn implied_scores_consistent(spread: f64, total: f64) -> bool {
    let (home, away) = implied_scores(spread, total);
    home.is_finite()
        && away.is_finite()
        && home >= 0.0
        && away >= 0.0
        && (home + away - total).abs() <= IMPLIED_SCORE_TOLERANCE
}
