//! Mamdani inference pipeline
//!
//! One evaluation runs five stages, once each and in order:
//!
//! 1. fuzzification of every rule antecedent against the crisp inputs
//! 2. rule strength, folding antecedent degrees with the AND/OR operator
//! 3. implication, clipping the consequent curve at the rule strength
//! 4. aggregation of clipped curves per output variable
//! 5. defuzzification of each aggregated curve to a scalar
//!
//! The pipeline only reads the [`System`] and the [`EvaluationSettings`]; it
//! keeps no state between calls, so repeated evaluations are bit-identical.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, trace};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Antecedent, Logic, Role, Rule, System, SystemOp, Variable};
use crate::settings::{Aggregation, Defuzzification, EvaluationSettings};

/// Crisp values for input variables, looked up by name.
pub trait InputValues {
    /// The crisp value for a variable, if one was supplied.
    fn value(&self, variable: &str) -> Option<f64>;
}

impl InputValues for HashMap<String, f64> {
    fn value(&self, variable: &str) -> Option<f64> {
        self.get(variable).copied()
    }
}

impl InputValues for BTreeMap<String, f64> {
    fn value(&self, variable: &str) -> Option<f64> {
        self.get(variable).copied()
    }
}

impl InputValues for IndexMap<String, f64> {
    fn value(&self, variable: &str) -> Option<f64> {
        self.get(variable).copied()
    }
}

impl InputValues for [(&str, f64)] {
    fn value(&self, variable: &str) -> Option<f64> {
        self.iter().find(|(name, _)| *name == variable).map(|(_, v)| *v)
    }
}

impl<const N: usize> InputValues for [(&str, f64); N] {
    fn value(&self, variable: &str) -> Option<f64> {
        self.as_slice().value(variable)
    }
}

/// A membership curve sampled over a universe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    /// Sample positions, ascending.
    pub x: Vec<f64>,
    /// Degrees at each position.
    pub y: Vec<f64>,
}

impl Curve {
    /// The largest degree on the curve (0 for an empty curve).
    pub fn height(&self) -> f64 {
        self.y.iter().copied().fold(0.0, f64::max)
    }
}

/// The result for one output variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputResult {
    /// Defuzzified crisp value.
    pub value: f64,
    /// The aggregated curve the value was computed from.
    pub curve: Curve,
}

/// The strength a rule fired with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFiring {
    /// The rule.
    pub rule: Rule,
    /// Combined degree of its antecedents.
    pub strength: f64,
}

/// The outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Crisp values of the system's input variables that were supplied.
    pub inputs: IndexMap<String, f64>,
    /// One result per output variable, in declaration order.
    pub outputs: IndexMap<String, OutputResult>,
    /// Every rule with its strength, in rule order.
    pub rule_firings: Vec<RuleFiring>,
}

impl Evaluation {
    /// The crisp value of an output, if it exists.
    pub fn value(&self, output: &str) -> Option<f64> {
        self.outputs.get(output).map(|r| r.value)
    }

    /// Rules that fired with a non-zero strength.
    pub fn fired(&self) -> impl Iterator<Item = &RuleFiring> {
        self.rule_firings.iter().filter(|f| f.strength > 0.0)
    }

    /// Renders a plain-text account of the evaluation: inputs, rule
    /// strengths and results.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        out.push_str("Inputs:\n");
        for (name, value) in &self.inputs {
            let _ = writeln!(out, "  {} = {:.3}", name, value);
        }
        out.push_str("Rule firings:\n");
        for (i, firing) in self.rule_firings.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} -> {:.3}", i + 1, firing.rule, firing.strength);
        }
        out.push_str("Results:\n");
        for (name, result) in &self.outputs {
            let _ = writeln!(out, "  {} = {:.3}", name, result.value);
        }
        out
    }
}

/// Degree of one antecedent for the supplied inputs.
///
/// The set is sampled over its variable's universe and the crisp value is
/// interpolated on that curve.
pub fn fuzzify<I: InputValues + ?Sized>(
    system: &System,
    antecedent: &Antecedent,
    inputs: &I,
) -> Result<f64> {
    let (variable, function) = system.resolve(Role::Input, &antecedent.variable, &antecedent.set)?;
    let value = crisp_value(inputs, &antecedent.variable)?;
    Ok(function.degree(&variable.universe().samples(), value))
}

/// Degree of a crisp value in every set of a variable.
pub fn fuzzify_variable(variable: &Variable, value: f64) -> IndexMap<String, f64> {
    let samples = variable.universe().samples();
    variable
        .sets()
        .iter()
        .map(|(name, function)| (name.clone(), function.degree(&samples, value)))
        .collect()
}

/// Folds antecedent degrees left to right with the operator selected by
/// `logic`. A single degree is returned as is; no degrees yield 0.
pub fn rule_strength(degrees: &[f64], logic: Logic, settings: &EvaluationSettings) -> f64 {
    let Some((&first, rest)) = degrees.split_first() else {
        return 0.0;
    };
    rest.iter().fold(first, |acc, &d| match logic {
        Logic::And => settings.and.apply(acc, d),
        Logic::Or => settings.or.apply(acc, d),
    })
}

/// Clips a consequent curve at the rule strength.
pub fn implicate(strength: f64, curve: &[f64]) -> Vec<f64> {
    curve.iter().map(|&y| y.min(strength)).collect()
}

/// Accumulates a clipped curve into the running aggregate.
pub fn aggregate(acc: &mut [f64], clipped: &[f64], method: Aggregation) {
    for (a, &c) in acc.iter_mut().zip(clipped) {
        *a = match method {
            Aggregation::Max => a.max(c),
            Aggregation::BoundedSum => (*a + c).min(1.0),
        };
    }
}

/// Reduces an aggregated curve to a scalar. A degenerate curve (all zero or
/// empty) yields 0 for every method.
pub fn defuzzify(xs: &[f64], ys: &[f64], method: Defuzzification) -> f64 {
    match method {
        Defuzzification::Centroid => {
            let area: f64 = ys.iter().sum();
            if area == 0.0 {
                return 0.0;
            }
            let moment: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
            moment / area
        }
        Defuzzification::MeanOfMaxima
        | Defuzzification::LargestOfMaxima
        | Defuzzification::SmallestOfMaxima => {
            let peak = ys.iter().copied().fold(0.0, f64::max);
            if peak <= 0.0 {
                return 0.0;
            }
            let maxima: Vec<f64> = xs
                .iter()
                .zip(ys)
                .filter(|&(_, &y)| y == peak)
                .map(|(&x, _)| x)
                .collect();
            match method {
                Defuzzification::MeanOfMaxima => maxima.iter().sum::<f64>() / maxima.len() as f64,
                Defuzzification::LargestOfMaxima => {
                    maxima.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                }
                _ => maxima.iter().copied().fold(f64::INFINITY, f64::min),
            }
        }
    }
}

/// Evaluates a system for the given crisp inputs.
///
/// Reference errors (`UnknownVariable`, `UnknownSet`) and missing or
/// non-finite inputs abort this call only.
pub fn evaluate<I: InputValues + ?Sized>(
    system: &System,
    settings: &EvaluationSettings,
    inputs: &I,
) -> Result<Evaluation> {
    let mut aggregates: IndexMap<&str, (Vec<f64>, Vec<f64>)> = system
        .outputs()
        .iter()
        .map(|(name, var)| {
            let xs = var.universe().samples();
            let ys = vec![0.0; xs.len()];
            (name.as_str(), (xs, ys))
        })
        .collect();

    let mut rule_firings = Vec::with_capacity(system.rules().len());

    for (index, rule) in system.rules().iter().enumerate() {
        let degrees = rule
            .antecedents()
            .iter()
            .map(|a| fuzzify(system, a, inputs))
            .collect::<Result<Vec<f64>>>()?;
        let strength = rule_strength(&degrees, rule.logic(), settings);
        trace!("Rule {} [{}] strength {:.4}", index + 1, rule, strength);

        let consequent = rule.consequent();
        let (_, function) = system.resolve(Role::Output, &consequent.variable, &consequent.set)?;
        let (xs, acc) = aggregates
            .get_mut(consequent.variable.as_str())
            .ok_or_else(|| Error::UnknownVariable {
                role: Role::Output,
                name: consequent.variable.clone(),
            })?;
        let clipped = implicate(strength, &function.evaluate(xs.as_slice()));
        aggregate(acc, &clipped, settings.aggregation);

        rule_firings.push(RuleFiring {
            rule: rule.clone(),
            strength,
        });
    }

    let outputs: IndexMap<String, OutputResult> = aggregates
        .into_iter()
        .map(|(name, (x, y))| {
            let value = defuzzify(&x, &y, settings.defuzzification);
            (
                name.to_string(),
                OutputResult {
                    value,
                    curve: Curve { x, y },
                },
            )
        })
        .collect();

    let inputs = system
        .inputs()
        .keys()
        .filter_map(|name| inputs.value(name).map(|v| (name.clone(), v)))
        .collect();

    debug!(
        "Evaluated {} rule(s) into {} output(s) using {}",
        rule_firings.len(),
        outputs.len(),
        settings.defuzzification
    );

    Ok(Evaluation {
        inputs,
        outputs,
        rule_firings,
    })
}

fn crisp_value<I: InputValues + ?Sized>(inputs: &I, variable: &str) -> Result<f64> {
    let value = inputs
        .value(variable)
        .ok_or_else(|| Error::MissingInput(variable.to_string()))?;
    if !value.is_finite() {
        return Err(Error::InvalidInput {
            name: variable.to_string(),
            value,
        });
    }
    Ok(value)
}

/// A system shared between an editing layer and concurrent evaluators.
///
/// Mutations take the write lock; evaluations hold a read lock for their
/// whole duration, so an evaluation never observes a half-applied edit.
#[derive(Debug, Clone, Default)]
pub struct SharedSystem {
    inner: Arc<RwLock<System>>,
}

impl SharedSystem {
    /// Wraps a system.
    pub fn new(system: System) -> Self {
        Self {
            inner: Arc::new(RwLock::new(system)),
        }
    }

    /// Applies a mutation under the write lock.
    pub fn apply(&self, op: SystemOp) -> Result<Vec<Rule>> {
        self.inner.write().apply(op)
    }

    /// Clones the current system for snapshot-then-evaluate use.
    pub fn snapshot(&self) -> System {
        self.inner.read().clone()
    }

    /// Runs a closure against the current system under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&System) -> R) -> R {
        f(&self.inner.read())
    }

    /// Evaluates the current system under the read lock.
    pub fn evaluate<I: InputValues + ?Sized>(
        &self,
        settings: &EvaluationSettings,
        inputs: &I,
    ) -> Result<Evaluation> {
        evaluate(&self.inner.read(), settings, inputs)
    }
}
