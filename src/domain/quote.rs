use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which team a quote or pick refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Market a quote prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Spread,
    Total,
    Moneyline,
}

impl LineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineType::Spread => "spread",
            LineType::Total => "total",
            LineType::Moneyline => "moneyline",
        }
    }
}

impl std::fmt::Display for LineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One observed market price from a provider/book.
///
/// Spread and total values are in points; moneyline values are American odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub line_type: LineType,
    pub value: f64,
    #[serde(default)]
    pub closing_value: Option<f64>,
    /// Explicit team tag, when the feed provides one
    #[serde(default)]
    pub side: Option<TeamSide>,
    pub provider: String,
    pub book: String,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Closing value when present, otherwise the observed value
    pub fn effective_value(&self) -> f64 {
        self.closing_value.unwrap_or(self.value)
    }

    pub fn has_closing(&self) -> bool {
        self.closing_value.is_some()
    }

    /// Lower-cased (provider, book) grouping key
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            provider: self.provider.trim().to_lowercase(),
            book: self.book.trim().to_lowercase(),
        }
    }
}

/// Identity of a provider/book pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub provider: String,
    pub book: String,
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.book)
    }
}

/// The single quote chosen to represent one line type for a provider group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalQuote {
    pub quote: Quote,
    /// True when `closing_value` supplied the effective value
    pub used_closing: bool,
}

impl CanonicalQuote {
    pub fn new(quote: Quote) -> Self {
        let used_closing = quote.has_closing();
        Self {
            quote,
            used_closing,
        }
    }

    pub fn value(&self) -> f64 {
        self.quote.effective_value()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.quote.timestamp
    }

    pub fn side(&self) -> Option<TeamSide> {
        self.quote.side
    }
}
