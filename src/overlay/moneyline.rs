//! Moneyline comparison driven by the overlay-adjusted spread.

use crate::config::{EngineConfig, LongshotGuard};
use crate::domain::{
    MarketKind, MarketSnapshot, MoneylineSide, MoneylineView, Overlay, Pick, Recommendation,
    TeamSide,
};
use crate::odds::{fair_american, implied_probability};
use statrs::distribution::{ContinuousCDF, Normal};

/// Favorite win probability for a favorite-centric spread.
///
/// The final margin is modelled as normal around the spread with
/// standard deviation `sigma`.
pub fn favorite_win_probability(final_spread: f64, sigma: f64) -> Option<f64> {
    let n = Normal::new(0.0, sigma).ok()?;
    Some(n.cdf(-final_spread))
}

pub struct MoneylineResolver<'a> {
    config: &'a EngineConfig,
}

impl<'a> MoneylineResolver<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Compare model and market win probabilities for both sides.
    ///
    /// The view is returned whenever a probability can be derived, even with no
    /// quotes or no spread model; a pick additionally needs both.
    pub fn resolve(
        &self,
        snapshot: &MarketSnapshot,
        spread_overlay: &Overlay,
    ) -> (Recommendation, Option<MoneylineView>) {
        let final_spread = spread_overlay.final_value;
        let Some(fav_prob) = favorite_win_probability(final_spread, self.config.moneyline_sigma)
        else {
            return (
                Recommendation::none(
                    MarketKind::Moneyline,
                    snapshot.moneyline_favorite,
                    "win probability unavailable for this spread",
                ),
                None,
            );
        };

        let view = MoneylineView {
            final_spread,
            favorite: side_view(snapshot.favorite.side, snapshot.moneyline_favorite, fav_prob),
            underdog: side_view(
                snapshot.underdog.side,
                snapshot.moneyline_underdog,
                1.0 - fav_prob,
            ),
        };

        if !spread_overlay.model_available() {
            let rec = Recommendation::none(
                MarketKind::Moneyline,
                snapshot.moneyline_favorite,
                "model unavailable; fair prices are informational",
            );
            return (rec, Some(view));
        }

        if view.favorite.price.is_none() && view.underdog.price.is_none() {
            let rec = Recommendation::none(
                MarketKind::Moneyline,
                None,
                format!(
                    "no moneyline quotes; fair prices {:+.0} / {:+.0}",
                    view.favorite.fair_price, view.underdog.fair_price
                ),
            );
            return (rec, Some(view));
        }

        (self.pick(snapshot, &view), Some(view))
    }

    fn pick(&self, snapshot: &MarketSnapshot, view: &MoneylineView) -> Recommendation {
        let min_value = self.config.moneyline_min_value;
        let mut candidates: Vec<&MoneylineSide> = [&view.favorite, &view.underdog]
            .into_iter()
            .filter(|s| s.value.is_some_and(|v| v > min_value))
            .collect();
        // Larger value first; the sort is stable so the favorite wins ties.
        candidates.sort_by(|a, b| {
            b.value
                .unwrap_or(0.0)
                .total_cmp(&a.value.unwrap_or(0.0))
        });

        let mut blocked: Option<String> = None;
        for side in candidates {
            let (Some(price), Some(value)) = (side.price, side.value) else {
                continue;
            };
            match longshot_block(&self.config.longshot, price, value) {
                Some(reason) => {
                    blocked.get_or_insert(reason);
                }
                None => {
                    let name = &snapshot.identity(side.side).name;
                    return Recommendation {
                        market: MarketKind::Moneyline,
                        side: Some(Pick::Team(side.side)),
                        line: Some(price),
                        grade: None,
                        bet_to: None,
                        flip: None,
                        reasoning: format!(
                            "{name} {price:+.0}: model {:.1}% vs market {:.1}% (fair {:+.0})",
                            side.model_prob * 100.0,
                            side.market_prob.unwrap_or(0.0) * 100.0,
                            side.fair_price
                        ),
                        suppressed: false,
                        suppression_reason: None,
                        overlay: None,
                    };
                }
            }
        }

        match blocked {
            Some(reason) => Recommendation {
                suppressed: true,
                suppression_reason: Some(reason.clone()),
                ..Recommendation::none(MarketKind::Moneyline, snapshot.moneyline_underdog, reason)
            },
            None => Recommendation::none(
                MarketKind::Moneyline,
                snapshot.moneyline_favorite,
                "no moneyline side shows value",
            ),
        }
    }
}

fn side_view(side: TeamSide, price: Option<f64>, model_prob: f64) -> MoneylineSide {
    let market_prob = price.and_then(implied_probability);
    MoneylineSide {
        side,
        price,
        market_prob,
        model_prob,
        fair_price: fair_american(model_prob),
        value: market_prob.map(|m| model_prob - m),
    }
}

/// Why a long-priced side may not be picked, if it may not
fn longshot_block(guard: &LongshotGuard, price: f64, value: f64) -> Option<String> {
    if price > guard.max_price {
        Some(format!(
            "longshot guard: {price:+.0} is beyond {:+.0}",
            guard.max_price
        ))
    } else if price > guard.hard_price && value <= guard.hard_min_value {
        Some(format!(
            "longshot guard: {price:+.0} needs more than {:.0}% value",
            guard.hard_min_value * 100.0
        ))
    } else if price > guard.soft_price && value <= guard.soft_min_value {
        Some(format!(
            "longshot guard: {price:+.0} needs more than {:.0}% value",
            guard.soft_min_value * 100.0
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FavoriteSource, Provenance, SideIdentity};
    use crate::overlay::engine::{OverlayEngine, OverlayParams};
    use approx::assert_abs_diff_eq;
    use chrono::DateTime;

    fn snapshot(line: f64, fav_ml: Option<f64>, dog_ml: Option<f64>) -> MarketSnapshot {
        MarketSnapshot {
            favorite: SideIdentity {
                side: TeamSide::Away,
                team_id: "a".into(),
                name: "Owls".into(),
            },
            underdog: SideIdentity {
                side: TeamSide::Home,
                team_id: "h".into(),
                name: "Hawks".into(),
            },
            favorite_line: line,
            underdog_line: -line,
            total: None,
            moneyline_favorite: fav_ml,
            moneyline_underdog: dog_ml,
            home_price: None,
            away_price: None,
            favorite_source: FavoriteSource::SingleSideTagged,
            provenance: Provenance {
                provider: "espn".into(),
                book: "dk".into(),
                timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            },
            snapshot_id: "snap_test".into(),
            flagged: false,
        }
    }

    fn overlay(market: f64, model: Option<f64>) -> Overlay {
        OverlayEngine::compute(market, model, &OverlayParams::spread(&EngineConfig::default()))
    }

    #[test]
    fn test_pickem_is_coin_flip() {
        assert_abs_diff_eq!(favorite_win_probability(0.0, 13.5).unwrap(), 0.5, epsilon = 1e-12);
        assert!(favorite_win_probability(-7.0, 13.5).unwrap() > 0.65);
        assert!(favorite_win_probability(-3.0, 0.0).is_none());
    }

    #[test]
    fn test_view_uses_final_spread() {
        let config = EngineConfig::default();
        let snap = snapshot(-3.0, Some(-150.0), Some(130.0));
        let (_, view) = MoneylineResolver::new(&config).resolve(&snap, &overlay(-3.0, Some(-11.0)));
        let view = view.unwrap();

        assert_eq!(view.final_spread, -5.0);
        assert_abs_diff_eq!(
            view.favorite.model_prob + view.underdog.model_prob,
            1.0,
            epsilon = 1e-12
        );
        assert_eq!(view.favorite.side, TeamSide::Away);
    }

    #[test]
    fn test_value_side_is_picked() {
        // Market says 60% at -150; the adjusted spread implies more.
        let config = EngineConfig::default();
        let snap = snapshot(-3.0, Some(-150.0), Some(130.0));
        let (rec, _) = MoneylineResolver::new(&config).resolve(&snap, &overlay(-3.0, Some(-15.0)));

        assert_eq!(rec.side, Some(Pick::Team(TeamSide::Away)));
        assert_eq!(rec.line, Some(-150.0));
        assert!(rec.grade.is_none() && rec.bet_to.is_none() && rec.flip.is_none());
    }

    #[test]
    fn test_price_beyond_max_never_picked() {
        // Huge favorite priced so the underdog looks like value.
        let config = EngineConfig::default();
        let snap = snapshot(-24.0, Some(-100_000.0), Some(2500.0));
        let (rec, view) = MoneylineResolver::new(&config).resolve(&snap, &overlay(-24.0, Some(-12.0)));

        assert!(view.unwrap().underdog.value.unwrap() > 0.0);
        assert!(rec.side.is_none());
        assert!(rec.suppressed);
        assert!(rec.suppression_reason.unwrap().contains("+2000"));
    }

    #[test]
    fn test_longshot_thresholds() {
        let guard = LongshotGuard::default();
        assert!(longshot_block(&guard, 450.0, 0.01).is_none());
        assert!(longshot_block(&guard, 600.0, 0.08).is_some());
        assert!(longshot_block(&guard, 600.0, 0.12).is_none());
        assert!(longshot_block(&guard, 1200.0, 0.20).is_some());
        assert!(longshot_block(&guard, 1200.0, 0.30).is_none());
        assert!(longshot_block(&guard, 2100.0, 0.90).is_some());
    }

    #[test]
    fn test_no_quotes_still_exposes_fair_prices() {
        let config = EngineConfig::default();
        let snap = snapshot(-7.0, None, None);
        let (rec, view) = MoneylineResolver::new(&config).resolve(&snap, &overlay(-7.0, Some(-8.0)));

        let view = view.unwrap();
        assert!(view.favorite.fair_price < -100.0);
        assert!(view.underdog.fair_price > 100.0);
        assert!(rec.side.is_none());
        assert!(rec.reasoning.contains("fair prices"));
    }

    #[test]
    fn test_missing_model_is_informational() {
        let config = EngineConfig::default();
        let snap = snapshot(-3.0, Some(-150.0), Some(130.0));
        let (rec, view) = MoneylineResolver::new(&config).resolve(&snap, &overlay(-3.0, None));

        assert!(view.is_some());
        assert!(rec.side.is_none());
        assert!(rec.reasoning.contains("model unavailable"));
    }
}
