//! Canonical quote selection within one provider group.

use crate::domain::{CanonicalQuote, LineType, Quote};

/// Picks the single quote that represents a line type for a provider group.
///
/// Tie-break chain:
/// 1. spreads: keep negative (favorite) prices when any exist
/// 2. prefer quotes carrying a closing value
/// 3. most recent timestamp, first in input order on equal timestamps
pub struct QuoteSelector;

impl QuoteSelector {
    /// Select the canonical quote of `line_type` among `quotes`.
    ///
    /// Quotes of other line types are ignored. Returns `None` when nothing matches.
    pub fn select<'a, I>(line_type: LineType, quotes: I) -> Option<CanonicalQuote>
    where
        I: IntoIterator<Item = &'a Quote>,
    {
        let candidates: Vec<&Quote> = quotes
            .into_iter()
            .filter(|q| q.line_type == line_type)
            .collect();

        if candidates.is_empty() {
            return None;
        }

        let candidates = if line_type == LineType::Spread {
            let favorites: Vec<&Quote> = candidates
                .iter()
                .copied()
                .filter(|q| q.effective_value() < 0.0)
                .collect();
            if favorites.is_empty() {
                candidates
            } else {
                favorites
            }
        } else {
            candidates
        };

        Self::select_latest(candidates)
    }

    /// Closing-value preference then recency, without any sign filtering.
    pub fn select_latest<'a, I>(quotes: I) -> Option<CanonicalQuote>
    where
        I: IntoIterator<Item = &'a Quote>,
    {
        let candidates: Vec<&Quote> = quotes.into_iter().collect();

        let pool: Vec<&Quote> = if candidates.iter().any(|q| q.has_closing()) {
            candidates.into_iter().filter(|q| q.has_closing()).collect()
        } else {
            candidates
        };

        pool.into_iter()
            .fold(None::<&Quote>, |best, q| match best {
                Some(b) if b.timestamp >= q.timestamp => Some(b),
                _ => Some(q),
            })
            .map(|q| CanonicalQuote::new(q.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TeamSide;
    use chrono::{DateTime, Duration, Utc};

    fn base_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn quote(line_type: LineType, value: f64, closing: Option<f64>, secs: i64) -> Quote {
        Quote {
            line_type,
            value,
            closing_value: closing,
            side: None,
            provider: "espn".into(),
            book: "draftkings".into(),
            timestamp: base_time() + Duration::seconds(secs),
        }
    }

    #[test]
    fn test_empty_input_selects_nothing() {
        assert!(QuoteSelector::select(LineType::Spread, &Vec::<Quote>::new()).is_none());
    }

    #[test]
    fn test_spread_prefers_negative_price_over_newer_positive() {
        let quotes = vec![
            quote(LineType::Spread, -6.5, None, 0),
            quote(LineType::Spread, 6.5, None, 60),
        ];
        let selected = QuoteSelector::select(LineType::Spread, &quotes).unwrap();
        assert_eq!(selected.value(), -6.5);
    }

    #[test]
    fn test_spread_falls_back_to_positive_when_no_negative() {
        let quotes = vec![
            quote(LineType::Spread, 3.0, None, 0),
            quote(LineType::Spread, 3.5, None, 30),
        ];
        let selected = QuoteSelector::select(LineType::Spread, &quotes).unwrap();
        assert_eq!(selected.value(), 3.5);
    }

    #[test]
    fn test_negative_filter_uses_closing_value() {
        // Opened +1 but closed -1.5: the closing value makes it the favorite price.
        let quotes = vec![
            quote(LineType::Spread, 1.0, Some(-1.5), 0),
            quote(LineType::Spread, -1.0, None, 90),
        ];
        let selected = QuoteSelector::select(LineType::Spread, &quotes).unwrap();
        assert_eq!(selected.value(), -1.5);
        assert!(selected.used_closing);
    }

    #[test]
    fn test_closing_beats_recency() {
        let quotes = vec![
            quote(LineType::Total, 44.0, Some(45.5), 0),
            quote(LineType::Total, 46.0, None, 120),
        ];
        let selected = QuoteSelector::select(LineType::Total, &quotes).unwrap();
        assert_eq!(selected.value(), 45.5);
    }

    #[test]
    fn test_most_recent_wins_and_ties_keep_first() {
        let quotes = vec![
            quote(LineType::Moneyline, -150.0, None, 10),
            quote(LineType::Moneyline, -160.0, None, 20),
            quote(LineType::Moneyline, -170.0, None, 20),
        ];
        let selected = QuoteSelector::select(LineType::Moneyline, &quotes).unwrap();
        assert_eq!(selected.value(), -160.0);
    }

    #[test]
    fn test_other_line_types_ignored() {
        let mut tagged = quote(LineType::Spread, -3.0, None, 0);
        tagged.side = Some(TeamSide::Home);
        let quotes = vec![tagged, quote(LineType::Total, 41.0, None, 50)];
        let selected = QuoteSelector::select(LineType::Spread, &quotes).unwrap();
        assert_eq!(selected.value(), -3.0);
        assert_eq!(selected.side(), Some(TeamSide::Home));
        assert!(QuoteSelector::select(LineType::Moneyline, &quotes).is_none());
    }
}
