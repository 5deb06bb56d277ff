//! Re-derives decision invariants from the finished objects.

use crate::config::EngineConfig;
use crate::diagnostics::{InvariantViolation, MismatchRecord};
use crate::domain::{Decision, MarketKind, Recommendation};
use crate::error::{Result, TrustlineError};

const EPSILON: f64 = 1e-6;

pub struct ConsistencyAuditor<'a> {
    config: &'a EngineConfig,
}

impl<'a> ConsistencyAuditor<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Every invariant the decision breaks
    pub fn audit(&self, decision: &Decision) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let snapshot = &decision.snapshot;
        let context = MismatchRecord {
            provider: snapshot.provenance.provider.clone(),
            book: snapshot.provenance.book.clone(),
            home_price: snapshot.home_price,
            away_price: snapshot.away_price,
            favorite: snapshot.favorite.side,
            favorite_line: snapshot.favorite_line,
        };

        violations.extend(
            InvariantViolation::favorite_line(snapshot.favorite_line)
                .map(|v| v.with_context(context.clone())),
        );

        if (snapshot.underdog_line + snapshot.favorite_line).abs() > EPSILON {
            violations.push(
                InvariantViolation::new(
                    "underdog_mirror",
                    format!(
                        "underdog line {} does not mirror favorite line {}",
                        snapshot.underdog_line, snapshot.favorite_line
                    ),
                )
                .with_context(context.clone()),
            );
        }

        if let (Some(home), Some(away)) = (snapshot.home_price, snapshot.away_price) {
            violations.extend(
                InvariantViolation::spread_pair(home, away, self.config.spread_pair_tolerance)
                    .map(|v| v.with_context(context.clone())),
            );
        }

        if snapshot.favorite_source.is_low_confidence()
            && decision.diagnostics.low_confidence_favorite.is_none()
        {
            violations.push(
                InvariantViolation::new(
                    "low_confidence_flagged",
                    format!(
                        "favorite {} came from {:?} but is not flagged for re-ingestion",
                        snapshot.favorite.name, snapshot.favorite_source
                    ),
                )
                .with_context(context.clone()),
            );
        }

        if snapshot.favorite.side == snapshot.underdog.side {
            violations.push(InvariantViolation::new(
                "distinct_sides",
                format!("favorite and underdog are both {}", snapshot.favorite.side),
            ));
        }

        for rec in [&decision.spread, &decision.total] {
            Self::audit_overlay_rec(rec, &mut violations);
        }

        for rec in [&decision.spread, &decision.total, &decision.moneyline] {
            if rec.grade.is_some() && !rec.is_actionable() {
                violations.push(InvariantViolation::new(
                    "grade_without_side",
                    format!("{:?} recommendation graded without a side", rec.market),
                ));
            }
        }

        if let (Some(_), Some(price)) = (decision.moneyline.side, decision.moneyline.line) {
            if price > self.config.longshot.max_price {
                violations.push(InvariantViolation::new(
                    "longshot_guard",
                    format!(
                        "moneyline pick at {price:+.0} beyond {:+.0}",
                        self.config.longshot.max_price
                    ),
                ));
            }
        }

        violations
    }

    fn audit_overlay_rec(rec: &Recommendation, violations: &mut Vec<InvariantViolation>) {
        let market = match rec.market {
            MarketKind::Spread => "spread",
            MarketKind::Total => "total",
            MarketKind::Moneyline => "moneyline",
        };

        let Some(overlay) = &rec.overlay else {
            if rec.is_actionable() {
                violations.push(InvariantViolation::new(
                    "side_iff_actionable",
                    format!("{market} pick without an overlay"),
                ));
            }
            return;
        };

        let mut found = Vec::new();
        if overlay.value_used.abs() > overlay.cap + EPSILON {
            found.push(InvariantViolation::new(
                "overlay_cap",
                format!(
                    "{market} overlay {} exceeds cap {}",
                    overlay.value_used, overlay.cap
                ),
            ));
        }

        if !overlay.model_available() && overlay.value_used != 0.0 {
            found.push(InvariantViolation::new(
                "overlay_without_model",
                format!("{market} overlay {} with no valid model", overlay.value_used),
            ));
        }

        if (overlay.final_value - (overlay.market + overlay.value_used)).abs() > EPSILON {
            found.push(InvariantViolation::new(
                "final_value",
                format!(
                    "{market} final {} != market {} + overlay {}",
                    overlay.final_value, overlay.market, overlay.value_used
                ),
            ));
        }

        let expected_side = overlay.value_used.abs() >= overlay.edge_floor && !rec.suppressed;
        if rec.is_actionable() != expected_side {
            found.push(InvariantViolation::new(
                "side_iff_actionable",
                format!(
                    "{market} side {:?} with overlay {} (floor {}, suppressed {})",
                    rec.side, overlay.value_used, overlay.edge_floor, rec.suppressed
                ),
            ));
        }

        violations.extend(found.into_iter().map(|v| v.with_overlay(overlay.clone())));
    }

    /// Apply the configured mode to findings from [`Self::audit`].
    ///
    /// Strict mode turns any violation into an error. Lenient mode appends the
    /// violations to the decision's diagnostics, skipping only those the
    /// snapshot builder already recorded verbatim.
    pub fn apply(&self, decision: &mut Decision, violations: Vec<InvariantViolation>) -> Result<()> {
        if violations.is_empty() {
            return Ok(());
        }

        if self.config.strict_mode {
            return Err(TrustlineError::invariants(&violations));
        }

        let recorded = decision.diagnostics.violations.len();
        for violation in violations {
            let seen = decision.diagnostics.violations[..recorded]
                .iter()
                .any(|v| v.check == violation.check && v.detail == violation.detail);
            if !seen {
                decision.diagnostics.record_violation(violation);
            }
        }
        Ok(())
    }

    /// Audit, then apply the configured mode
    pub fn enforce(&self, decision: &mut Decision) -> Result<()> {
        let violations = self.audit(decision);
        self.apply(decision, violations)
    }
}
