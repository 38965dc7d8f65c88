//! Parameter validation for fuzzy sets
//!
//! A set is only admitted into a variable once its raw parameters have been
//! parsed, counted and checked against the ordering invariant of its shape:
//!
//! - `trimf`: `(a, b, c)` with `a <= b <= c`
//! - `trapmf`: `(a, b, c, d)` with `a <= b <= c <= d`
//! - `gaussmf`: `(sigma, mean)` with `sigma > 0`

use serde_json::Value;
use thiserror::Error;

use crate::membership::{MembershipFunction, MembershipKind};

/// Why a parameter vector was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The kind tag does not name a supported shape.
    #[error("Unknown membership function kind '{0}' (expected trimf, trapmf or gaussmf)")]
    UnknownKind(String),

    /// A parameter could not be read as a finite real number.
    #[error("Parameter {index} is not numeric: '{value}'")]
    NonNumericParameter { index: usize, value: String },

    /// Wrong number of parameters for the shape.
    #[error("{kind} expects {expected} parameters, got {found}")]
    ArityMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    /// The parameters violate the shape's ordering invariant.
    #[error("{kind} requires {constraint}")]
    OrderingViolation {
        kind: &'static str,
        constraint: &'static str,
    },
}

/// A raw, not yet parsed, membership parameter.
///
/// Front ends hand parameters over as typed text, generators as JSON values,
/// and programmatic callers as plain numbers; all of them go through the same
/// validation path.
pub trait RawParam {
    /// Parses the parameter into a finite real, if possible.
    fn to_real(&self) -> Option<f64>;

    /// Renders the raw parameter for error messages.
    fn describe(&self) -> String;
}

impl RawParam for f64 {
    fn to_real(&self) -> Option<f64> {
        self.is_finite().then_some(*self)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl RawParam for f32 {
    fn to_real(&self) -> Option<f64> {
        f64::from(*self).to_real()
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl RawParam for i32 {
    fn to_real(&self) -> Option<f64> {
        Some(f64::from(*self))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl RawParam for i64 {
    fn to_real(&self) -> Option<f64> {
        Some(*self as f64)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl RawParam for str {
    fn to_real(&self) -> Option<f64> {
        self.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl RawParam for String {
    fn to_real(&self) -> Option<f64> {
        self.as_str().to_real()
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

impl RawParam for Value {
    fn to_real(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => s.to_real(),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl<T: RawParam + ?Sized> RawParam for &T {
    fn to_real(&self) -> Option<f64> {
        (**self).to_real()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Validates raw parameters for a kind given by its external tag.
///
/// # Examples
///
/// ```
/// use aingle_fuzzy::validator::{validate_params, ValidationError};
///
/// assert!(validate_params("trimf", &[0, 10, 20]).is_ok());
/// assert!(matches!(
///     validate_params("trimf", &[5, 2, 8]),
///     Err(ValidationError::OrderingViolation { .. })
/// ));
/// ```
pub fn validate_params<P: RawParam>(
    kind: &str,
    raw_params: &[P],
) -> Result<MembershipFunction, ValidationError> {
    let kind =
        MembershipKind::parse(kind).ok_or_else(|| ValidationError::UnknownKind(kind.to_string()))?;
    validate(kind, raw_params)
}

/// Validates raw parameters for a known kind and builds the membership function.
///
/// Checks run in order: every parameter numeric, then arity, then ordering.
pub fn validate<P: RawParam>(
    kind: MembershipKind,
    raw_params: &[P],
) -> Result<MembershipFunction, ValidationError> {
    let params = raw_params
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            raw.to_real()
                .ok_or_else(|| ValidationError::NonNumericParameter {
                    index,
                    value: raw.describe(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    if params.len() != kind.arity() {
        return Err(ValidationError::ArityMismatch {
            kind: kind.tag(),
            expected: kind.arity(),
            found: params.len(),
        });
    }

    let ordering = || ValidationError::OrderingViolation {
        kind: kind.tag(),
        constraint: kind.constraint(),
    };

    match kind {
        MembershipKind::Triangular => {
            let (a, b, c) = (params[0], params[1], params[2]);
            if !(a <= b && b <= c) {
                return Err(ordering());
            }
            Ok(MembershipFunction::Triangular { a, b, c })
        }
        MembershipKind::Trapezoidal => {
            let (a, b, c, d) = (params[0], params[1], params[2], params[3]);
            if !(a <= b && b <= c && c <= d) {
                return Err(ordering());
            }
            Ok(MembershipFunction::Trapezoidal { a, b, c, d })
        }
        MembershipKind::Gaussian => {
            let (sigma, mean) = (params[0], params[1]);
            if sigma <= 0.0 {
                return Err(ordering());
            }
            Ok(MembershipFunction::Gaussian { sigma, mean })
        }
    }
}

/// Splits a comma-separated parameter list typed by a user (`"0, 10, 20"`).
pub fn split_params(text: &str) -> Vec<&str> {
    text.split(',').map(str::trim).collect()
}
