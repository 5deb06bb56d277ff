//! Letter grades and bet-to/flip ranges for spread and total overlays.

use super::engine::OverlayEngine;
use crate::config::GradeThresholds;
use crate::domain::{Grade, MarketKind, MarketSnapshot, Overlay, Pick, Recommendation};

pub struct RecommendationGrader<'a> {
    thresholds: &'a GradeThresholds,
}

impl<'a> RecommendationGrader<'a> {
    pub fn new(thresholds: &'a GradeThresholds) -> Self {
        Self { thresholds }
    }

    /// Grade an overlay magnitude, demoting one tier when degraded
    pub fn grade(&self, value: f64, degraded: bool) -> Option<Grade> {
        let magnitude = value.abs();
        let grade = if magnitude >= self.thresholds.a {
            Grade::A
        } else if magnitude >= self.thresholds.b {
            Grade::B
        } else if magnitude >= self.thresholds.c {
            Grade::C
        } else {
            return None;
        };

        if degraded {
            grade.demote()
        } else {
            Some(grade)
        }
    }

    /// (bet_to, flip) for an overlay, both `None` unless actionable
    pub fn range(overlay: &Overlay) -> (Option<f64>, Option<f64>) {
        if !overlay.actionable {
            return (None, None);
        }
        let shift = overlay.value_used.signum() * overlay.edge_floor;
        (Some(overlay.market + shift), Some(overlay.market - shift))
    }

    /// Spread recommendation in favorite-centric terms.
    ///
    /// A negative overlay backs the favorite, a positive one the underdog.
    pub fn recommend_spread(
        &self,
        snapshot: &MarketSnapshot,
        overlay: Overlay,
        model_reason: Option<String>,
        extreme_favorite_threshold: f64,
    ) -> Recommendation {
        if !overlay.model_available() {
            let reason = model_reason.unwrap_or_else(|| "model unavailable".to_string());
            return Recommendation {
                overlay: Some(overlay),
                ..Recommendation::none(
                    MarketKind::Spread,
                    Some(snapshot.favorite_line),
                    format!("model unavailable: {reason}"),
                )
            };
        }

        let side = if overlay.value_used < 0.0 {
            snapshot.favorite.side
        } else {
            snapshot.underdog.side
        };
        let line = snapshot.side_line(side);
        let name = snapshot.identity(side).name.clone();

        let suppression = if overlay.actionable {
            OverlayEngine::extreme_favorite_guard(
                snapshot.favorite_line,
                &overlay,
                extreme_favorite_threshold,
            )
        } else {
            None
        };

        self.finish(
            MarketKind::Spread,
            Pick::Team(side),
            format!("{name} {line:+.1}"),
            line,
            overlay,
            suppression,
        )
    }

    /// Total recommendation: positive overlay is over, negative is under
    pub fn recommend_total(
        &self,
        overlay: Overlay,
        model_reason: Option<String>,
    ) -> Recommendation {
        let market = overlay.market;
        if !overlay.model_available() {
            let reason = model_reason.unwrap_or_else(|| "model unavailable".to_string());
            return Recommendation {
                overlay: Some(overlay),
                ..Recommendation::none(
                    MarketKind::Total,
                    Some(market),
                    format!("model unavailable: {reason}"),
                )
            };
        }

        let pick = if overlay.value_used > 0.0 {
            Pick::Over
        } else {
            Pick::Under
        };
        self.finish(
            MarketKind::Total,
            pick,
            format!("{pick} {market:.1}"),
            market,
            overlay,
            None,
        )
    }

    fn finish(
        &self,
        market: MarketKind,
        pick: Pick,
        label: String,
        line: f64,
        overlay: Overlay,
        suppression: Option<String>,
    ) -> Recommendation {
        let (bet_to, flip) = Self::range(&overlay);
        let value = overlay.value_used;
        let floor = overlay.edge_floor;
        let baseline = overlay.market;

        if !overlay.actionable {
            return Recommendation {
                overlay: Some(overlay),
                ..Recommendation::none(
                    market,
                    Some(baseline),
                    format!("overlay {value:+.2} below edge floor {floor:.1}"),
                )
            };
        }

        let grade = self.grade(value, overlay.confidence_degraded);
        let mut reasoning = format!(
            "{label}: overlay {value:+.2} (model {:.1} vs market {:.1})",
            overlay.model.unwrap_or(overlay.market),
            overlay.market
        );
        if overlay.confidence_degraded {
            reasoning.push_str("; large model/market disagreement, grade lowered");
        }

        match suppression {
            Some(reason) => Recommendation {
                market,
                side: None,
                line: Some(line),
                grade: None,
                bet_to,
                flip,
                reasoning,
                suppressed: true,
                suppression_reason: Some(reason),
                overlay: Some(overlay),
            },
            None => Recommendation {
                market,
                side: Some(pick),
                line: Some(line),
                grade,
                bet_to,
                flip,
                reasoning,
                suppressed: false,
                suppression_reason: None,
                overlay: Some(overlay),
            },
        }
    }
}
