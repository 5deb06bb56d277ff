//! Diagnostics accumulated across one evaluation.
//!
//! Components record non-fatal findings here instead of logging them; the
//! evaluator decides what to emit through `tracing` once the pipeline is done.

use crate::domain::{GroupKey, LineType, Overlay, TeamSide};
use serde::{Deserialize, Serialize};

/// A total or moneyline taken from a different book than the spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceMismatch {
    pub line_type: LineType,
    pub expected: GroupKey,
    pub actual: GroupKey,
}

impl std::fmt::Display for ProvenanceMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} sourced from {} while spread came from {}",
            self.line_type, self.actual, self.expected
        )
    }
}

/// Context captured when the snapshot's sign or pricing invariants break
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismatchRecord {
    pub provider: String,
    pub book: String,
    pub home_price: Option<f64>,
    pub away_price: Option<f64>,
    pub favorite: TeamSide,
    pub favorite_line: f64,
}

/// One failed invariant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantViolation {
    pub check: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MismatchRecord>,
    /// Overlay inputs and outputs for market-level checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
}

impl InvariantViolation {
    pub fn new(check: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            detail: detail.into(),
            context: None,
            overlay: None,
        }
    }

    pub fn with_context(mut self, context: MismatchRecord) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// `favorite_line < 0`
    pub fn favorite_line(line: f64) -> Option<Self> {
        if line.is_finite() && line < 0.0 {
            None
        } else {
            Some(Self::new(
                "favorite_line_negative",
                format!("favorite line {line} is not negative"),
            ))
        }
    }

    /// `|home + away| <= tolerance` for an observed pair of spread prices
    pub fn spread_pair(home: f64, away: f64, tolerance: f64) -> Option<Self> {
        let imbalance = (home + away).abs();
        if imbalance <= tolerance {
            None
        } else {
            Some(Self::new(
                "spread_pair_tolerance",
                format!("|home {home} + away {away}| = {imbalance} exceeds {tolerance}"),
            ))
        }
    }
}

/// One-line summary of a set of violations
pub fn summarize(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.check, self.detail)
    }
}

/// Non-fatal findings for one evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub snapshot_id: Option<String>,
    pub violations: Vec<InvariantViolation>,
    pub provenance_mismatches: Vec<ProvenanceMismatch>,
    /// Set when the favorite came from the power-rating fallback
    pub low_confidence_favorite: Option<String>,
    pub model_spread_failure: Option<String>,
    pub model_total_failure: Option<String>,
    pub notes: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_violation(&mut self, violation: InvariantViolation) {
        self.violations.push(violation);
    }

    pub fn record_provenance_mismatch(&mut self, mismatch: ProvenanceMismatch) {
        self.provenance_mismatches.push(mismatch);
    }

    pub fn flag_low_confidence_favorite(&mut self, reason: impl Into<String>) {
        self.low_confidence_favorite = Some(reason.into());
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// One-line summary of all violations
    pub fn violation_summary(&self) -> String {
        summarize(&self.violations)
    }
}
