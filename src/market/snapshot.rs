//! Snapshot assembly and sign/tolerance checks.

use super::favorite::FavoriteResolution;
use super::grouper::GroupSelection;
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostics, InvariantViolation, MismatchRecord};
use crate::domain::{Contest, MarketSnapshot, Provenance, Quote, SideIdentity, TeamSide};
use crate::error::{Result, TrustlineError};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Builds the immutable [`MarketSnapshot`] for one evaluation
pub struct SnapshotBuilder<'a> {
    config: &'a EngineConfig,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Assemble the snapshot and check its pricing invariants.
    ///
    /// In strict mode a broken invariant aborts with
    /// [`TrustlineError::InvariantViolation`]; otherwise it is recorded and the
    /// snapshot is returned with `flagged` set.
    pub fn build(
        &self,
        contest: &Contest,
        selection: &GroupSelection,
        resolution: &FavoriteResolution,
        diagnostics: &mut Diagnostics,
    ) -> Result<MarketSnapshot> {
        let favorite_line = resolution.favorite_line;
        let underdog_line = -favorite_line;

        let violations = self.check_pricing(resolution);
        let flagged = !violations.is_empty();
        if flagged {
            let record = MismatchRecord {
                provider: selection.key.provider.clone(),
                book: selection.key.book.clone(),
                home_price: resolution.home_price,
                away_price: resolution.away_price,
                favorite: resolution.favorite,
                favorite_line,
            };
            let violations: Vec<InvariantViolation> = violations
                .into_iter()
                .map(|v| v.with_context(record.clone()))
                .collect();

            if self.config.strict_mode {
                return Err(TrustlineError::invariants(&violations));
            }
            for violation in violations {
                diagnostics.record_violation(violation);
            }
        }

        let spread_ts = selection.spread.timestamp();
        let (moneyline_favorite, moneyline_underdog) = self.moneyline_prices(selection, spread_ts);

        let snapshot_id = snapshot_id(
            &selection.key.provider,
            &selection.key.book,
            spread_ts,
            selection.latest_timestamp(),
        );
        diagnostics.snapshot_id = Some(snapshot_id.clone());

        Ok(MarketSnapshot {
            favorite: identity(contest, resolution.favorite),
            underdog: identity(contest, resolution.favorite.opposite()),
            favorite_line,
            underdog_line,
            total: selection.total.as_ref().map(|t| t.canonical.value()),
            moneyline_favorite,
            moneyline_underdog,
            home_price: resolution.home_price,
            away_price: resolution.away_price,
            favorite_source: resolution.source,
            provenance: Provenance {
                provider: selection.key.provider.clone(),
                book: selection.key.book.clone(),
                timestamp: spread_ts,
            },
            snapshot_id,
            flagged,
        })
    }

    fn check_pricing(&self, resolution: &FavoriteResolution) -> Vec<InvariantViolation> {
        let pair = match (resolution.home_price, resolution.away_price) {
            (Some(home), Some(away)) => {
                InvariantViolation::spread_pair(home, away, self.config.spread_pair_tolerance)
            }
            _ => None,
        };
        InvariantViolation::favorite_line(resolution.favorite_line)
            .into_iter()
            .chain(pair)
            .collect()
    }

    /// (favorite, underdog) American prices.
    ///
    /// A negative and a positive quote near the spread timestamp are preferred;
    /// otherwise the single canonical moneyline is assigned by its sign.
    fn moneyline_prices(
        &self,
        selection: &GroupSelection,
        spread_ts: DateTime<Utc>,
    ) -> (Option<f64>, Option<f64>) {
        let window = self.config.moneyline_pair_window_secs;
        let nearest = |negative: bool| -> Option<f64> {
            selection
                .moneyline_quotes
                .iter()
                .filter(|q| {
                    let v = q.effective_value();
                    if negative {
                        v < 0.0
                    } else {
                        v > 0.0
                    }
                })
                .map(|q| (distance_secs(q, spread_ts), q))
                .filter(|(d, _)| *d <= window)
                .fold(None::<(i64, &Quote)>, |best, (d, q)| match best {
                    Some((bd, b)) if bd <= d => Some((bd, b)),
                    _ => Some((d, q)),
                })
                .map(|(_, q)| q.effective_value())
        };

        if let (Some(fav), Some(dog)) = (nearest(true), nearest(false)) {
            return (Some(fav), Some(dog));
        }

        match selection.moneyline.as_ref().map(|m| m.canonical.value()) {
            Some(price) if price < 0.0 => (Some(price), None),
            Some(price) if price > 0.0 => (None, Some(price)),
            _ => (None, None),
        }
    }
}

fn distance_secs(quote: &Quote, reference: DateTime<Utc>) -> i64 {
    (quote.timestamp - reference).num_seconds().abs()
}

fn identity(contest: &Contest, side: TeamSide) -> SideIdentity {
    let team = contest.team(side);
    SideIdentity {
        side,
        team_id: team.id.clone(),
        name: team.name.clone(),
    }
}

/// Stable id from provenance and the latest line timestamp
pub fn snapshot_id(
    provider: &str,
    book: &str,
    spread_ts: DateTime<Utc>,
    latest_ts: DateTime<Utc>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_bytes());
    hasher.update(b"|");
    hasher.update(book.as_bytes());
    hasher.update(b"|");
    hasher.update(spread_ts.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(latest_ts.to_rfc3339().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("snap_{}", &digest[..16])
}
