//! Provider/book grouping and best-coverage group selection.

use super::selector::QuoteSelector;
use crate::diagnostics::{Diagnostics, ProvenanceMismatch};
use crate::domain::{CanonicalQuote, GroupKey, LineType, Quote};
use crate::error::{Result, TrustlineError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A canonical quote plus the group it was taken from
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedQuote {
    pub canonical: CanonicalQuote,
    pub source: GroupKey,
    /// False when the quote came from the cross-group fallback
    pub from_spread_group: bool,
}

/// The provider group chosen for a contest
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSelection {
    pub key: GroupKey,
    pub coverage_score: u32,
    pub spread: CanonicalQuote,
    pub total: Option<SourcedQuote>,
    pub moneyline: Option<SourcedQuote>,
    /// Every spread quote in the winning group
    pub spread_quotes: Vec<Quote>,
    /// Moneyline quotes from wherever the moneyline was sourced
    pub moneyline_quotes: Vec<Quote>,
}

impl GroupSelection {
    /// Latest timestamp among the lines that made it into the selection
    pub fn latest_timestamp(&self) -> DateTime<Utc> {
        [
            Some(self.spread.timestamp()),
            self.total.as_ref().map(|t| t.canonical.timestamp()),
            self.moneyline.as_ref().map(|m| m.canonical.timestamp()),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or_else(|| self.spread.timestamp())
    }
}

/// Selections for one provider group
#[derive(Debug)]
struct GroupCandidate<'a> {
    key: GroupKey,
    quotes: Vec<&'a Quote>,
    spread: Option<CanonicalQuote>,
    total: Option<CanonicalQuote>,
    moneyline: Option<CanonicalQuote>,
}

impl<'a> GroupCandidate<'a> {
    fn new(key: GroupKey, quotes: Vec<&'a Quote>) -> Self {
        let spread = QuoteSelector::select(LineType::Spread, quotes.iter().copied());
        let total = QuoteSelector::select(LineType::Total, quotes.iter().copied());
        let moneyline = QuoteSelector::select(LineType::Moneyline, quotes.iter().copied());
        Self {
            key,
            quotes,
            spread,
            total,
            moneyline,
        }
    }

    /// 100 for a spread, 10 for a total, 1 for a moneyline
    fn coverage_score(&self) -> u32 {
        100 * u32::from(self.spread.is_some())
            + 10 * u32::from(self.total.is_some())
            + u32::from(self.moneyline.is_some())
    }

    fn latest(&self) -> Option<DateTime<Utc>> {
        [&self.spread, &self.total, &self.moneyline]
            .into_iter()
            .flatten()
            .map(CanonicalQuote::timestamp)
            .max()
    }

    fn has_tagged_spread(&self) -> bool {
        self.spread.is_some()
            && self
                .quotes
                .iter()
                .any(|q| q.line_type == LineType::Spread && q.side.is_some())
    }

    fn quotes_of(&self, line_type: LineType) -> Vec<Quote> {
        self.quotes
            .iter()
            .filter(|q| q.line_type == line_type)
            .map(|q| (*q).clone())
            .collect()
    }
}

/// Groups quotes by provider/book and picks the best-covered group
pub struct BookGrouper;

impl BookGrouper {
    /// Choose the provider group for a contest.
    ///
    /// Groups with side-tagged spreads are searched first. A missing spread is
    /// fatal; a missing total or moneyline falls back to a selection across all
    /// quotes and is recorded as a provenance mismatch.
    pub fn select(
        contest_id: &str,
        quotes: &[Quote],
        diagnostics: &mut Diagnostics,
    ) -> Result<GroupSelection> {
        let mut grouped: BTreeMap<GroupKey, Vec<&Quote>> = BTreeMap::new();
        for quote in quotes {
            grouped.entry(quote.group_key()).or_default().push(quote);
        }

        let candidates: Vec<GroupCandidate> = grouped
            .into_iter()
            .map(|(key, group)| GroupCandidate::new(key, group))
            .collect();

        let tagged: Vec<&GroupCandidate> =
            candidates.iter().filter(|c| c.has_tagged_spread()).collect();
        let pool: Vec<&GroupCandidate> = if tagged.is_empty() {
            candidates.iter().collect()
        } else {
            tagged
        };

        let best = Self::best_candidate(&pool).ok_or_else(|| {
            TrustlineError::MissingMandatoryMarket {
                contest_id: contest_id.to_string(),
            }
        })?;

        let spread = best
            .spread
            .clone()
            .ok_or_else(|| TrustlineError::MissingMandatoryMarket {
                contest_id: contest_id.to_string(),
            })?;

        let total = Self::sourced(best, best.total.clone(), LineType::Total, quotes, diagnostics);
        let moneyline = Self::sourced(
            best,
            best.moneyline.clone(),
            LineType::Moneyline,
            quotes,
            diagnostics,
        );

        let moneyline_quotes = match &moneyline {
            Some(ml) if ml.from_spread_group => best.quotes_of(LineType::Moneyline),
            Some(_) => quotes
                .iter()
                .filter(|q| q.line_type == LineType::Moneyline)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        Ok(GroupSelection {
            key: best.key.clone(),
            coverage_score: best.coverage_score(),
            spread,
            total,
            moneyline,
            spread_quotes: best.quotes_of(LineType::Spread),
            moneyline_quotes,
        })
    }

    /// Highest (coverage, latest timestamp); earlier keys win exact ties
    fn best_candidate<'c, 'a>(pool: &[&'c GroupCandidate<'a>]) -> Option<&'c GroupCandidate<'a>> {
        pool.iter().copied().fold(None, |best, candidate| match best {
            Some(b)
                if (b.coverage_score(), b.latest())
                    >= (candidate.coverage_score(), candidate.latest()) =>
            {
                Some(b)
            }
            _ => Some(candidate),
        })
    }

    fn sourced(
        best: &GroupCandidate,
        own: Option<CanonicalQuote>,
        line_type: LineType,
        quotes: &[Quote],
        diagnostics: &mut Diagnostics,
    ) -> Option<SourcedQuote> {
        if let Some(canonical) = own {
            return Some(SourcedQuote {
                canonical,
                source: best.key.clone(),
                from_spread_group: true,
            });
        }

        match QuoteSelector::select(line_type, quotes) {
            Some(canonical) => {
                let source = canonical.quote.group_key();
                diagnostics.record_provenance_mismatch(ProvenanceMismatch {
                    line_type,
                    expected: best.key.clone(),
                    actual: source.clone(),
                });
                Some(SourcedQuote {
                    canonical,
                    source,
                    from_spread_group: false,
                })
            }
            None => {
                diagnostics.note(format!("no {line_type} quote available from any provider"));
                None
            }
        }
    }
}
