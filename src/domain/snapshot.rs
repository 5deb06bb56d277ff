use super::quote::TeamSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team identified by its role in the contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideIdentity {
    pub side: TeamSide,
    pub team_id: String,
    pub name: String,
}

/// Where the spread line came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub provider: String,
    pub book: String,
    pub timestamp: DateTime<Utc>,
}

/// How the favorite was identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteSource {
    /// Both sides tagged with opposite-signed prices
    BothSidesTagged,
    /// Only the canonical quote carried a tag
    SingleSideTagged,
    /// No tags; decided by power ratings
    PowerRating,
}

impl FavoriteSource {
    pub fn is_low_confidence(&self) -> bool {
        matches!(self, FavoriteSource::PowerRating)
    }
}

/// Canonical favorite-centric market view for one contest.
///
/// Built once per evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub favorite: SideIdentity,
    pub underdog: SideIdentity,
    /// Always negative
    pub favorite_line: f64,
    /// Always `-favorite_line`
    pub underdog_line: f64,
    pub total: Option<f64>,
    /// American odds, negative by construction
    pub moneyline_favorite: Option<f64>,
    /// American odds, positive by construction
    pub moneyline_underdog: Option<f64>,
    /// Observed home spread price, when the feed tagged it
    pub home_price: Option<f64>,
    /// Observed away spread price, when the feed tagged it
    pub away_price: Option<f64>,
    pub favorite_source: FavoriteSource,
    pub provenance: Provenance,
    pub snapshot_id: String,
    /// Set when lenient mode let an invariant break through
    pub flagged: bool,
}

impl MarketSnapshot {
    pub fn side_line(&self, side: TeamSide) -> f64 {
        if side == self.favorite.side {
            self.favorite_line
        } else {
            self.underdog_line
        }
    }

    pub fn identity(&self, side: TeamSide) -> &SideIdentity {
        if side == self.favorite.side {
            &self.favorite
        } else {
            &self.underdog
        }
    }
}
