//! Favorite identification independent of home/away position.

use super::selector::QuoteSelector;
use crate::diagnostics::Diagnostics;
use crate::domain::{CanonicalQuote, Contest, FavoriteSource, Quote, TeamSide};
use crate::error::{Result, TrustlineError};

/// Outcome of favorite resolution
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteResolution {
    pub favorite: TeamSide,
    /// Negative unless the market is a pick'em or the data is broken
    pub favorite_line: f64,
    pub source: FavoriteSource,
    /// Observed (tagged) home price
    pub home_price: Option<f64>,
    /// Observed (tagged) away price
    pub away_price: Option<f64>,
}

/// Decides which side is favored, strongest signal first:
/// both sides tagged, one side tagged, then power ratings.
pub struct FavoriteResolver;

impl FavoriteResolver {
    pub fn resolve(
        spread: &CanonicalQuote,
        group_spread_quotes: &[Quote],
        contest: &Contest,
        home_field_advantage: f64,
        diagnostics: &mut Diagnostics,
    ) -> Result<FavoriteResolution> {
        let home = Self::tagged(group_spread_quotes, TeamSide::Home);
        let away = Self::tagged(group_spread_quotes, TeamSide::Away);

        if let (Some(home), Some(away)) = (&home, &away) {
            let (hp, ap) = (home.value(), away.value());
            if hp * ap < 0.0 {
                let (favorite, favorite_line) = if hp < 0.0 {
                    (TeamSide::Home, hp)
                } else {
                    (TeamSide::Away, ap)
                };
                return Ok(FavoriteResolution {
                    favorite,
                    favorite_line,
                    source: FavoriteSource::BothSidesTagged,
                    home_price: Some(hp),
                    away_price: Some(ap),
                });
            }
            diagnostics.note(format!(
                "tagged spread prices do not have opposite signs (home {hp}, away {ap})"
            ));
        }

        let single = match spread.side() {
            Some(side) => Some((side, spread.value())),
            None => match (&home, &away) {
                (Some(h), None) => Some((TeamSide::Home, h.value())),
                (None, Some(a)) => Some((TeamSide::Away, a.value())),
                _ => None,
            },
        };

        if let Some((tagged_side, price)) = single {
            let (favorite, favorite_line) = if price > 0.0 {
                (tagged_side.opposite(), -price)
            } else {
                (tagged_side, price)
            };
            // Any tagged price seen for the other side stays observed so the
            // pair tolerance check still applies.
            let other = match tagged_side {
                TeamSide::Home => away.as_ref(),
                TeamSide::Away => home.as_ref(),
            }
            .map(CanonicalQuote::value);
            let (home_price, away_price) = match tagged_side {
                TeamSide::Home => (Some(price), other),
                TeamSide::Away => (other, Some(price)),
            };
            return Ok(FavoriteResolution {
                favorite,
                favorite_line,
                source: FavoriteSource::SingleSideTagged,
                home_price,
                away_price,
            });
        }

        let edge = contest.power_edge(home_field_advantage).ok_or_else(|| {
            TrustlineError::UnresolvedFavorite(format!(
                "contest {} has no side-tagged spread and no power ratings",
                contest.id
            ))
        })?;

        let favorite = if edge > 0.0 {
            TeamSide::Home
        } else if edge < 0.0 {
            TeamSide::Away
        } else {
            return Err(TrustlineError::UnresolvedFavorite(format!(
                "contest {} power ratings are level and no spread quote is tagged",
                contest.id
            )));
        };

        diagnostics.flag_low_confidence_favorite(format!(
            "favorite {} inferred from power ratings (edge {edge:+.1}); needs re-ingestion",
            contest.team(favorite).name
        ));

        Ok(FavoriteResolution {
            favorite,
            favorite_line: -spread.value().abs(),
            source: FavoriteSource::PowerRating,
            home_price: None,
            away_price: None,
        })
    }

    fn tagged(quotes: &[Quote], side: TeamSide) -> Option<CanonicalQuote> {
        QuoteSelector::select_latest(quotes.iter().filter(|q| q.side == Some(side)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineType, Team};
    use chrono::{DateTime, Duration};

    fn contest(home_rating: Option<f64>, away_rating: Option<f64>) -> Contest {
        Contest {
            id: "g1".into(),
            home: Team {
                id: "home-id".into(),
                name: "Home U".into(),
                power_rating: home_rating,
            },
            away: Team {
                id: "away-id".into(),
                name: "Away State".into(),
                power_rating: away_rating,
            },
        }
    }

    fn spread(value: f64, side: Option<TeamSide>, secs: i64) -> Quote {
        Quote {
            line_type: LineType::Spread,
            value,
            closing_value: None,
            side,
            provider: "espn".into(),
            book: "dk".into(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap()
                + Duration::seconds(secs),
        }
    }

    fn canonical(quotes: &[Quote]) -> CanonicalQuote {
        QuoteSelector::select(LineType::Spread, quotes).unwrap()
    }

    #[test]
    fn test_both_sides_tagged_away_favorite() {
        let quotes = vec![
            spread(4.5, Some(TeamSide::Home), 0),
            spread(-4.5, Some(TeamSide::Away), 0),
        ];
        let mut diagnostics = Diagnostics::new();
        let res = FavoriteResolver::resolve(
            &canonical(&quotes),
            &quotes,
            &contest(None, None),
            2.5,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(res.favorite, TeamSide::Away);
        assert_eq!(res.favorite_line, -4.5);
        assert_eq!(res.source, FavoriteSource::BothSidesTagged);
        assert_eq!((res.home_price, res.away_price), (Some(4.5), Some(-4.5)));
        assert!(diagnostics.low_confidence_favorite.is_none());
    }

    #[test]
    fn test_single_tag_positive_price_makes_other_side_favorite() {
        let quotes = vec![spread(6.0, Some(TeamSide::Home), 0)];
        let mut diagnostics = Diagnostics::new();
        let res = FavoriteResolver::resolve(
            &canonical(&quotes),
            &quotes,
            &contest(None, None),
            2.5,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(res.favorite, TeamSide::Away);
        assert_eq!(res.favorite_line, -6.0);
        assert_eq!(res.source, FavoriteSource::SingleSideTagged);
        assert_eq!(res.home_price, Some(6.0));
        assert_eq!(res.away_price, None);
    }

    #[test]
    fn test_same_signed_tags_fall_through_to_canonical_tag() {
        let quotes = vec![
            spread(-3.0, Some(TeamSide::Home), 10),
            spread(-2.5, Some(TeamSide::Away), 0),
        ];
        let mut diagnostics = Diagnostics::new();
        let res = FavoriteResolver::resolve(
            &canonical(&quotes),
            &quotes,
            &contest(None, None),
            2.5,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(res.favorite, TeamSide::Home);
        assert_eq!(res.favorite_line, -3.0);
        assert_eq!(res.source, FavoriteSource::SingleSideTagged);
        assert_eq!((res.home_price, res.away_price), (Some(-3.0), Some(-2.5)));
        assert_eq!(diagnostics.notes.len(), 1);
    }

    #[test]
    fn test_untagged_uses_power_ratings_and_flags() {
        // Home is stronger once home-field is added: 10 + 2.5 > 11.
        let quotes = vec![spread(-7.0, None, 0), spread(7.0, None, 0)];
        let mut diagnostics = Diagnostics::new();
        let res = FavoriteResolver::resolve(
            &canonical(&quotes),
            &quotes,
            &contest(Some(10.0), Some(11.0)),
            2.5,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(res.favorite, TeamSide::Home);
        assert_eq!(res.favorite_line, -7.0);
        assert_eq!(res.source, FavoriteSource::PowerRating);
        let flag = diagnostics.low_confidence_favorite.unwrap();
        assert!(flag.contains("Home U"));
        assert!(flag.contains("re-ingestion"));
    }

    #[test]
    fn test_power_ratings_can_favor_the_road_team() {
        let quotes = vec![spread(-3.0, None, 0)];
        let mut diagnostics = Diagnostics::new();
        let res = FavoriteResolver::resolve(
            &canonical(&quotes),
            &quotes,
            &contest(Some(0.0), Some(8.0)),
            2.5,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(res.favorite, TeamSide::Away);
        assert_eq!(res.favorite_line, -3.0);
    }

    #[test]
    fn test_no_signal_is_unresolved() {
        let quotes = vec![spread(-3.0, None, 0)];
        let mut diagnostics = Diagnostics::new();
        let err = FavoriteResolver::resolve(
            &canonical(&quotes),
            &quotes,
            &contest(Some(1.0), None),
            2.5,
            &mut diagnostics,
        )
        .unwrap_err();
        assert!(matches!(err, TrustlineError::UnresolvedFavorite(_)));
    }
}
