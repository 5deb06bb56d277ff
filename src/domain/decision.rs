use super::model::ModelView;
use super::quote::TeamSide;
use super::snapshot::MarketSnapshot;
use crate::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};

/// Market a recommendation is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Spread,
    Total,
    Moneyline,
}

/// Side of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pick {
    Team(TeamSide),
    Over,
    Under,
}

impl std::fmt::Display for Pick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pick::Team(side) => write!(f, "{side}"),
            Pick::Over => write!(f, "over"),
            Pick::Under => write!(f, "under"),
        }
    }
}

/// Letter grade for an actionable overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    C,
    B,
    A,
}

impl Grade {
    /// One tier lower; C has nowhere to go
    pub fn demote(self) -> Option<Grade> {
        match self {
            Grade::A => Some(Grade::B),
            Grade::B => Some(Grade::C),
            Grade::C => None,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
        };
        write!(f, "{s}")
    }
}

/// Capped blend of model against market for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub market: f64,
    pub model: Option<f64>,
    /// |model - market|, absent when the model is unavailable
    pub raw_disagreement: Option<f64>,
    pub lambda: f64,
    pub cap: f64,
    pub edge_floor: f64,
    /// lambda * (model - market) before clamping
    pub raw_value: f64,
    /// Clamped overlay actually applied
    pub value_used: f64,
    /// market + value_used
    pub final_value: f64,
    pub confidence_degraded: bool,
    pub actionable: bool,
}

impl Overlay {
    pub fn model_available(&self) -> bool {
        self.model.is_some()
    }
}

/// Recommendation for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub market: MarketKind,
    /// `None` means no actionable pick
    pub side: Option<Pick>,
    /// Headline market number for the picked side (or the market baseline)
    pub line: Option<f64>,
    pub grade: Option<Grade>,
    pub bet_to: Option<f64>,
    pub flip: Option<f64>,
    pub reasoning: String,
    pub suppressed: bool,
    pub suppression_reason: Option<String>,
    pub overlay: Option<Overlay>,
}

impl Recommendation {
    /// A recommendation with nothing actionable and a reason why
    pub fn none(market: MarketKind, line: Option<f64>, reasoning: impl Into<String>) -> Self {
        Self {
            market,
            side: None,
            line,
            grade: None,
            bet_to: None,
            flip: None,
            reasoning: reasoning.into(),
            suppressed: false,
            suppression_reason: None,
            overlay: None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.side.is_some()
    }
}

/// Per-side moneyline comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneylineSide {
    pub side: TeamSide,
    /// Observed American price
    pub price: Option<f64>,
    pub market_prob: Option<f64>,
    pub model_prob: f64,
    /// Model fair American price
    pub fair_price: f64,
    /// model_prob - market_prob
    pub value: Option<f64>,
}

/// Moneyline comparison for both sides of the contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneylineView {
    /// Spread the model probabilities were derived from (favorite-centric)
    pub final_spread: f64,
    pub favorite: MoneylineSide,
    pub underdog: MoneylineSide,
}

/// Everything the engine produces for one contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub contest_id: String,
    pub snapshot: MarketSnapshot,
    pub model: ModelView,
    pub spread: Recommendation,
    pub total: Recommendation,
    pub moneyline: Recommendation,
    pub moneyline_view: Option<MoneylineView>,
    pub diagnostics: Diagnostics,
}
