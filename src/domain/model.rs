use serde::{Deserialize, Serialize};

/// Model output as supplied by the external model source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawModelPrediction {
    /// Predicted home margin (home score minus away score)
    #[serde(default)]
    pub spread: Option<f64>,
    /// Predicted combined points
    #[serde(default)]
    pub total: Option<f64>,
}

/// Why a model value was rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ModelRejection {
    MissingInputs(String),
    UnitMismatch(String),
    ComputationFailure(String),
}

impl ModelRejection {
    pub fn reason(&self) -> String {
        match self {
            ModelRejection::MissingInputs(detail) => format!("missing inputs: {detail}"),
            ModelRejection::UnitMismatch(detail) => {
                format!("unit mismatch (likely a rate, not points): {detail}")
            }
            ModelRejection::ComputationFailure(detail) => {
                format!("computation failed: {detail}")
            }
        }
    }
}

impl std::fmt::Display for ModelRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A model value together with its validity verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedValue {
    /// The value as supplied, even when rejected
    pub raw: Option<f64>,
    pub rejection: Option<ModelRejection>,
}

impl ValidatedValue {
    pub fn valid(value: f64) -> Self {
        Self {
            raw: Some(value),
            rejection: None,
        }
    }

    pub fn invalid(raw: Option<f64>, rejection: ModelRejection) -> Self {
        Self {
            raw,
            rejection: Some(rejection),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.rejection.is_none() && self.raw.is_some()
    }

    /// The value, only if it passed validation
    pub fn value(&self) -> Option<f64> {
        self.raw.filter(|_| self.is_valid())
    }

    pub fn reason(&self) -> Option<String> {
        self.rejection.as_ref().map(ModelRejection::reason)
    }
}

/// Validated model prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub spread: ValidatedValue,
    pub total: ValidatedValue,
}

/// Model output expressed relative to the resolved favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelView {
    /// Favorite-centric model line (negative when the model agrees on the favorite)
    pub favorite_line: Option<f64>,
    pub total: Option<f64>,
    pub implied_home_score: Option<f64>,
    pub implied_away_score: Option<f64>,
    pub spread_reason: Option<String>,
    pub total_reason: Option<String>,
}
