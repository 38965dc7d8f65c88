//! Membership function library
//!
//! Fuzzy sets are represented as dense samples over their variable's universe.
//! Every evaluator takes an ordered sample vector and returns a same-length
//! vector of degrees in `[0, 1]`, so aggregation and defuzzification reduce to
//! pointwise vector operations.

use std::fmt;

/// The shape family of a membership function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipKind {
    /// Triangle `(a, b, c)`.
    Triangular,
    /// Trapezoid `(a, b, c, d)`.
    Trapezoidal,
    /// Gaussian bell `(sigma, mean)`.
    Gaussian,
}

impl MembershipKind {
    /// Resolves an external kind tag. Accepts the short tags (`trimf`, `trapmf`,
    /// `gaussmf`) and the long names, ignoring case and surrounding whitespace.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "trimf" | "triangular" | "triangle" => Some(MembershipKind::Triangular),
            "trapmf" | "trapezoidal" | "trapezoid" => Some(MembershipKind::Trapezoidal),
            "gaussmf" | "gaussian" | "gauss" => Some(MembershipKind::Gaussian),
            _ => None,
        }
    }

    /// Returns the short tag used in descriptions.
    pub fn tag(&self) -> &'static str {
        match self {
            MembershipKind::Triangular => "trimf",
            MembershipKind::Trapezoidal => "trapmf",
            MembershipKind::Gaussian => "gaussmf",
        }
    }

    /// Number of parameters this shape takes.
    pub fn arity(&self) -> usize {
        match self {
            MembershipKind::Triangular => 3,
            MembershipKind::Trapezoidal => 4,
            MembershipKind::Gaussian => 2,
        }
    }

    /// The ordering constraint the parameters must satisfy.
    pub fn constraint(&self) -> &'static str {
        match self {
            MembershipKind::Triangular => "a <= b <= c",
            MembershipKind::Trapezoidal => "a <= b <= c <= d",
            MembershipKind::Gaussian => "sigma > 0",
        }
    }
}

impl fmt::Display for MembershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A membership function.
///
/// [`crate::validator::validate`] checks the shape's parameter invariant, and
/// [`crate::model::System`] runs it again before storing a set, so a stored
/// function always satisfies it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MembershipFunction {
    /// Triangle with feet at `a` and `c` and peak at `b`.
    Triangular { a: f64, b: f64, c: f64 },
    /// Trapezoid with feet at `a` and `d` and plateau on `[b, c]`.
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
    /// Gaussian bell centered on `mean`.
    Gaussian { sigma: f64, mean: f64 },
}

impl MembershipFunction {
    /// The shape family.
    pub fn kind(&self) -> MembershipKind {
        match self {
            MembershipFunction::Triangular { .. } => MembershipKind::Triangular,
            MembershipFunction::Trapezoidal { .. } => MembershipKind::Trapezoidal,
            MembershipFunction::Gaussian { .. } => MembershipKind::Gaussian,
        }
    }

    /// The parameter vector in description order.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            MembershipFunction::Triangular { a, b, c } => vec![a, b, c],
            MembershipFunction::Trapezoidal { a, b, c, d } => vec![a, b, c, d],
            MembershipFunction::Gaussian { sigma, mean } => vec![sigma, mean],
        }
    }

    /// Evaluates the function at every sample point.
    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        match *self {
            MembershipFunction::Triangular { a, b, c } => triangular(x, a, b, c),
            MembershipFunction::Trapezoidal { a, b, c, d } => trapezoidal(x, a, b, c, d),
            MembershipFunction::Gaussian { sigma, mean } => gaussian(x, sigma, mean),
        }
    }

    /// Degree of membership of a crisp value, read off the curve sampled
    /// over `samples`.
    pub fn degree(&self, samples: &[f64], value: f64) -> f64 {
        let curve = self.evaluate(samples);
        interpolate(samples, &curve, value)
    }
}

/// Returns `n` evenly spaced samples over `[min, max]`, both endpoints included.
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            // Interpolated per point; `max - min` overflows for spans near f64::MAX.
            let last = (n - 1) as f64;
            let mut samples: Vec<f64> = (0..n)
                .map(|i| {
                    let t = i as f64 / last;
                    min * (1.0 - t) + max * t
                })
                .collect();
            samples[n - 1] = max;
            samples
        }
    }
}

/// Triangular membership.
///
/// A degenerate ramp (`a == b` or `b == c`) has no interior points, which
/// yields a shoulder without dividing by zero.
pub fn triangular(x: &[f64], a: f64, b: f64, c: f64) -> Vec<f64> {
    x.iter()
        .map(|&v| {
            if v == b {
                1.0
            } else if a < v && v < b {
                (v - a) / (b - a)
            } else if b < v && v < c {
                (c - v) / (c - b)
            } else {
                0.0
            }
        })
        .collect()
}

/// Trapezoidal membership with plateau on `[b, c]`.
pub fn trapezoidal(x: &[f64], a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    x.iter()
        .map(|&v| {
            if b <= v && v <= c {
                1.0
            } else if a < v && v < b {
                (v - a) / (b - a)
            } else if c < v && v < d {
                (d - v) / (d - c)
            } else {
                0.0
            }
        })
        .collect()
}

/// Gaussian membership `exp(-(x - mean)^2 / (2 sigma^2))`.
pub fn gaussian(x: &[f64], sigma: f64, mean: f64) -> Vec<f64> {
    let denom = 2.0 * sigma * sigma;
    x.iter()
        .map(|&v| (-((v - mean) * (v - mean)) / denom).exp())
        .collect()
}

/// Piecewise-linear interpolation of a sampled curve at `value`.
///
/// `xs` must be ascending. Queries outside the sampled range clamp to the
/// boundary values. An empty curve reads as 0 and a NaN query yields NaN.
pub fn interpolate(xs: &[f64], ys: &[f64], value: f64) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    if value.is_nan() {
        return f64::NAN;
    }
    if value <= xs[0] {
        return ys[0];
    }
    if value >= xs[n - 1] {
        return ys[n - 1];
    }

    // First index whose sample lies strictly right of the query; 1 <= hi < n here.
    let hi = xs[..n].partition_point(|&x| x <= value);
    let lo = hi - 1;
    let span = xs[hi] - xs[lo];
    if span == 0.0 {
        return ys[hi];
    }
    let t = (value - xs[lo]) / span;
    ys[lo] + t * (ys[hi] - ys[lo])
}
