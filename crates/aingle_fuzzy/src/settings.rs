//! Evaluation settings
//!
//! The operator family and the aggregation/defuzzification strategies are an
//! explicit value passed to every evaluation, so concurrent evaluations with
//! different settings never interfere.

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the AND operator.
pub const ENV_AND: &str = "AINGLE_FUZZY_AND";
/// Environment variable overriding the OR operator.
pub const ENV_OR: &str = "AINGLE_FUZZY_OR";
/// Environment variable overriding the aggregation method.
pub const ENV_AGGREGATION: &str = "AINGLE_FUZZY_AGGREGATION";
/// Environment variable overriding the defuzzification method.
pub const ENV_DEFUZZ: &str = "AINGLE_FUZZY_DEFUZZ";

/// Leading keyword of a setting label: `"prod (multiplies degrees)"` reads as `"prod"`.
fn keyword(label: &str) -> String {
    label
        .trim()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
        .replace('-', "_")
}

/// T-norm used for AND rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AndOperator {
    /// `min(a, b)`
    #[default]
    Min,
    /// `a * b`
    #[serde(alias = "prod")]
    Product,
}

impl AndOperator {
    /// Combines two degrees.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            AndOperator::Min => a.min(b),
            AndOperator::Product => a * b,
        }
    }
}

impl FromStr for AndOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match keyword(s).as_str() {
            "min" | "minimum" => Ok(AndOperator::Min),
            "prod" | "product" => Ok(AndOperator::Product),
            _ => Err(Error::InvalidSetting {
                setting: "AND operator",
                value: s.to_string(),
            }),
        }
    }
}

/// T-conorm used for OR rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrOperator {
    /// `max(a, b)`
    #[default]
    Max,
    /// `a + b - a * b`
    #[serde(alias = "prob_sum", alias = "probor")]
    ProbabilisticSum,
}

impl OrOperator {
    /// Combines two degrees.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            OrOperator::Max => a.max(b),
            OrOperator::ProbabilisticSum => a + b - a * b,
        }
    }
}

impl FromStr for OrOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match keyword(s).as_str() {
            "max" | "maximum" => Ok(OrOperator::Max),
            "prob_sum" | "prob_or" | "probor" | "probabilistic_sum" => {
                Ok(OrOperator::ProbabilisticSum)
            }
            _ => Err(Error::InvalidSetting {
                setting: "OR operator",
                value: s.to_string(),
            }),
        }
    }
}

/// How clipped rule outputs sharing an output variable are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Pointwise maximum; overlapping firings do not accumulate.
    #[default]
    Max,
    /// `min(1, acc + clipped)`; firings accumulate up to 1.
    #[serde(alias = "sum_clipped")]
    BoundedSum,
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match keyword(s).as_str() {
            "max" | "maximum" => Ok(Aggregation::Max),
            "sum_clipped" | "bounded_sum" | "sum" => Ok(Aggregation::BoundedSum),
            _ => Err(Error::InvalidSetting {
                setting: "aggregation",
                value: s.to_string(),
            }),
        }
    }
}

/// How an aggregated curve is reduced to a crisp value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defuzzification {
    /// Center of area.
    #[default]
    Centroid,
    /// Mean of the positions attaining the maximum.
    #[serde(alias = "mom")]
    MeanOfMaxima,
    /// Largest position attaining the maximum.
    #[serde(alias = "lom")]
    LargestOfMaxima,
    /// Smallest position attaining the maximum.
    #[serde(alias = "som")]
    SmallestOfMaxima,
}

impl FromStr for Defuzzification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match keyword(s).as_str() {
            "centroid" | "coa" => Ok(Defuzzification::Centroid),
            "mom" | "mean_of_maxima" => Ok(Defuzzification::MeanOfMaxima),
            "lom" | "largest_of_maxima" => Ok(Defuzzification::LargestOfMaxima),
            "som" | "smallest_of_maxima" => Ok(Defuzzification::SmallestOfMaxima),
            _ => Err(Error::InvalidSetting {
                setting: "defuzzification",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Defuzzification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Defuzzification::Centroid => "centroid",
            Defuzzification::MeanOfMaxima => "mom",
            Defuzzification::LargestOfMaxima => "lom",
            Defuzzification::SmallestOfMaxima => "som",
        };
        f.write_str(name)
    }
}

/// Strategy selection for one evaluation session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Operator folded over the antecedents of AND rules.
    pub and: AndOperator,
    /// Operator folded over the antecedents of OR rules.
    pub or: OrOperator,
    /// Aggregation of clipped consequents.
    pub aggregation: Aggregation,
    /// Reduction of the aggregated curve to a scalar.
    pub defuzzification: Defuzzification,
}

impl EvaluationSettings {
    /// Classic Mamdani settings: min / max / max / centroid.
    pub fn mamdani() -> Self {
        Self::default()
    }

    /// Algebraic operators with accumulating aggregation:
    /// product / probabilistic sum / bounded sum / centroid.
    pub fn algebraic() -> Self {
        Self {
            and: AndOperator::Product,
            or: OrOperator::ProbabilisticSum,
            aggregation: Aggregation::BoundedSum,
            defuzzification: Defuzzification::Centroid,
        }
    }

    /// Sets the AND operator.
    pub fn with_and(mut self, and: AndOperator) -> Self {
        self.and = and;
        self
    }

    /// Sets the OR operator.
    pub fn with_or(mut self, or: OrOperator) -> Self {
        self.or = or;
        self
    }

    /// Sets the aggregation method.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Sets the defuzzification method.
    pub fn with_defuzzification(mut self, defuzzification: Defuzzification) -> Self {
        self.defuzzification = defuzzification;
        self
    }

    /// Builds settings from the environment, starting from the defaults.
    ///
    /// Reads [`ENV_AND`], [`ENV_OR`], [`ENV_AGGREGATION`] and [`ENV_DEFUZZ`].
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Some(and) = env_override(ENV_AND) {
            settings.and = and;
        }
        if let Some(or) = env_override(ENV_OR) {
            settings.or = or;
        }
        if let Some(aggregation) = env_override(ENV_AGGREGATION) {
            settings.aggregation = aggregation;
        }
        if let Some(defuzzification) = env_override(ENV_DEFUZZ) {
            settings.defuzzification = defuzzification;
        }

        settings
    }

    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the settings to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn env_override<T: FromStr<Err = Error>>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}: {}", var, e);
            None
        }
    }
}
