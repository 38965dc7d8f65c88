//! System model for the fuzzy inference engine
//!
//! A [`System`] holds two disjoint collections of linguistic variables (inputs
//! and outputs) and an ordered list of rules. Every mutation goes through
//! [`System::apply`], which enforces the model invariants:
//!
//! - universes are finite with `min < max`
//! - variable names are unique per collection, set names unique per variable
//! - every stored set passed parameter validation
//! - every rule has at least one antecedent and all its references resolve

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::membership::{linspace, MembershipFunction, MembershipKind};
use crate::validator::{validate, RawParam};

/// Number of samples used to discretize every universe.
pub const SAMPLE_RESOLUTION: usize = 400;

/// Which collection a variable belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read during fuzzification; receives one crisp value per evaluation.
    Input,
    /// Written during aggregation; produces one defuzzified value per evaluation.
    Output,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Input => f.write_str("input"),
            Role::Output => f.write_str("output"),
        }
    }
}

/// The closed interval a variable is defined over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Universe {
    min: f64,
    max: f64,
}

impl Universe {
    /// Creates a universe, rejecting non-finite or non-increasing bounds.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(Error::InvalidUniverse { min, max });
        }
        Ok(Self { min, max })
    }

    /// Creates a universe from bounds already known to satisfy `min < max`.
    pub(crate) const fn from_bounds(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// The midpoint, a convenient default crisp value for front ends.
    pub fn midpoint(&self) -> f64 {
        self.min / 2.0 + self.max / 2.0
    }

    /// The universe sampled at [`SAMPLE_RESOLUTION`] points.
    pub fn samples(&self) -> Vec<f64> {
        linspace(self.min, self.max, SAMPLE_RESOLUTION)
    }
}

/// A linguistic variable: a universe plus its named fuzzy sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    universe: Universe,
    sets: IndexMap<String, MembershipFunction>,
}

impl Variable {
    /// Creates a variable with no sets.
    pub fn new(name: impl Into<String>, universe: Universe) -> Self {
        Self {
            name: name.into(),
            universe,
            sets: IndexMap::new(),
        }
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variable universe.
    pub fn universe(&self) -> Universe {
        self.universe
    }

    /// All sets, in insertion order.
    pub fn sets(&self) -> &IndexMap<String, MembershipFunction> {
        &self.sets
    }

    /// Looks up a set by name.
    pub fn set(&self, name: &str) -> Option<&MembershipFunction> {
        self.sets.get(name)
    }

    /// Adds a set that already passed validation.
    pub(crate) fn add_set(
        &mut self,
        name: impl Into<String>,
        function: MembershipFunction,
    ) -> Result<()> {
        let name = name.into();
        if self.sets.contains_key(&name) {
            return Err(Error::DuplicateSet {
                variable: self.name.clone(),
                set: name,
            });
        }
        self.sets.insert(name, function);
        Ok(())
    }

    /// Inserts a set known to be valid, replacing any set of the same name.
    pub(crate) fn insert_set(&mut self, name: impl Into<String>, function: MembershipFunction) {
        self.sets.insert(name.into(), function);
    }

    /// Removes a set, returning it.
    pub fn remove_set(&mut self, name: &str) -> Result<MembershipFunction> {
        self.sets
            .shift_remove(name)
            .ok_or_else(|| Error::UnknownSet {
                variable: self.name.clone(),
                set: name.to_string(),
            })
    }
}

/// One `variable IS set` clause of a rule's premise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Antecedent {
    /// Input variable name.
    pub variable: String,
    /// Set name within that variable.
    pub set: String,
}

impl Antecedent {
    /// Creates an antecedent.
    pub fn new(variable: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
        }
    }
}

/// The `variable IS set` conclusion of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Consequent {
    /// Output variable name.
    pub variable: String,
    /// Set name within that variable.
    pub set: String,
}

impl Consequent {
    /// Creates a consequent.
    pub fn new(variable: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
        }
    }
}

/// How a rule combines its antecedent degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    /// Conjunction, using the configured AND operator.
    #[default]
    And,
    /// Disjunction, using the configured OR operator.
    Or,
}

impl Logic {
    /// Reads a logic tag (`AND`/`OR`, case-insensitive). Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "AND" | "E" | "&&" => Some(Logic::And),
            "OR" | "OU" | "||" => Some(Logic::Or),
            _ => None,
        }
    }

    /// Upper-case keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

/// A Mamdani rule: `IF a1 IS s1 <logic> a2 IS s2 ... THEN out IS s`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    antecedents: Vec<Antecedent>,
    consequent: Consequent,
    logic: Logic,
}

impl Rule {
    /// Creates a rule. Fails when there are no antecedents.
    pub fn new(antecedents: Vec<Antecedent>, consequent: Consequent, logic: Logic) -> Result<Self> {
        if antecedents.is_empty() {
            return Err(Error::InvalidRule(format!(
                "rule concluding {} IS {} has no antecedents",
                consequent.variable, consequent.set
            )));
        }
        Ok(Self {
            antecedents,
            consequent,
            logic,
        })
    }

    /// Creates a rule from antecedents already known to be non-empty.
    pub(crate) fn from_parts(
        antecedents: Vec<Antecedent>,
        consequent: Consequent,
        logic: Logic,
    ) -> Self {
        debug_assert!(!antecedents.is_empty());
        Self {
            antecedents,
            consequent,
            logic,
        }
    }

    /// Starts a fluent rule definition with its first antecedent.
    pub fn when(variable: impl Into<String>, set: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new().when(variable, set)
    }

    /// Antecedents in declaration order.
    pub fn antecedents(&self) -> &[Antecedent] {
        &self.antecedents
    }

    /// The consequent.
    pub fn consequent(&self) -> &Consequent {
        &self.consequent
    }

    /// The combination logic.
    pub fn logic(&self) -> Logic {
        self.logic
    }

    /// Whether any antecedent or the consequent mentions the variable in the given role.
    pub fn references_variable(&self, role: Role, variable: &str) -> bool {
        match role {
            Role::Input => self.antecedents.iter().any(|a| a.variable == variable),
            Role::Output => self.consequent.variable == variable,
        }
    }

    /// Whether any antecedent or the consequent mentions the given set.
    pub fn references_set(&self, role: Role, variable: &str, set: &str) -> bool {
        match role {
            Role::Input => self
                .antecedents
                .iter()
                .any(|a| a.variable == variable && a.set == set),
            Role::Output => self.consequent.variable == variable && self.consequent.set == set,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IF ")?;
        for (i, a) in self.antecedents.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.logic.keyword())?;
            }
            write!(f, "{} IS {}", a.variable, a.set)?;
        }
        write!(
            f,
            " THEN {} IS {}",
            self.consequent.variable, self.consequent.set
        )
    }
}

/// A builder for creating [`Rule`]s using a fluent API.
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    antecedents: Vec<Antecedent>,
    logic: Logic,
}

impl RuleBuilder {
    /// Creates an empty builder with AND logic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an antecedent.
    pub fn when(mut self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.antecedents.push(Antecedent::new(variable, set));
        self
    }

    /// Appends an antecedent and switches the rule to AND logic.
    pub fn and(mut self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.logic = Logic::And;
        self.when(variable, set)
    }

    /// Appends an antecedent and switches the rule to OR logic.
    pub fn or(mut self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.logic = Logic::Or;
        self.when(variable, set)
    }

    /// Sets the logic explicitly.
    pub fn logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// Finishes the rule with its consequent.
    pub fn then(self, variable: impl Into<String>, set: impl Into<String>) -> Result<Rule> {
        Rule::new(self.antecedents, Consequent::new(variable, set), self.logic)
    }
}

/// A mutation of a [`System`].
#[derive(Debug, Clone, PartialEq)]
pub enum SystemOp {
    /// Adds a variable with no sets.
    AddVariable {
        role: Role,
        name: String,
        universe: Universe,
    },
    /// Removes a variable and every rule referencing it.
    RemoveVariable { role: Role, name: String },
    /// Replaces a variable's universe.
    SetUniverse {
        role: Role,
        name: String,
        universe: Universe,
    },
    /// Adds a set to a variable. The function is validated before it is stored.
    AddSet {
        role: Role,
        variable: String,
        name: String,
        function: MembershipFunction,
    },
    /// Removes a set and every rule referencing it.
    RemoveSet {
        role: Role,
        variable: String,
        name: String,
    },
    /// Appends a rule whose references must resolve.
    AddRule(Rule),
    /// Removes the rule at an index.
    RemoveRule(usize),
}

/// A complete fuzzy inference system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct System {
    inputs: IndexMap<String, Variable>,
    outputs: IndexMap<String, Variable>,
    rules: Vec<Rule>,
}

impl System {
    /// Creates an empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a system from parts whose invariants the caller guarantees.
    pub(crate) fn from_parts(
        inputs: Vec<Variable>,
        outputs: Vec<Variable>,
        rules: Vec<Rule>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().map(|v| (v.name.clone(), v)).collect(),
            outputs: outputs.into_iter().map(|v| (v.name.clone(), v)).collect(),
            rules,
        }
    }

    /// Input variables in insertion order.
    pub fn inputs(&self) -> &IndexMap<String, Variable> {
        &self.inputs
    }

    /// Output variables in insertion order.
    pub fn outputs(&self) -> &IndexMap<String, Variable> {
        &self.outputs
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The collection for a role.
    pub fn variables(&self, role: Role) -> &IndexMap<String, Variable> {
        match role {
            Role::Input => &self.inputs,
            Role::Output => &self.outputs,
        }
    }

    fn variables_mut(&mut self, role: Role) -> &mut IndexMap<String, Variable> {
        match role {
            Role::Input => &mut self.inputs,
            Role::Output => &mut self.outputs,
        }
    }

    /// Looks up a variable, failing with `UnknownVariable`.
    pub fn variable(&self, role: Role, name: &str) -> Result<&Variable> {
        self.variables(role)
            .get(name)
            .ok_or_else(|| Error::UnknownVariable {
                role,
                name: name.to_string(),
            })
    }

    fn variable_mut(&mut self, role: Role, name: &str) -> Result<&mut Variable> {
        self.variables_mut(role)
            .get_mut(name)
            .ok_or_else(|| Error::UnknownVariable {
                role,
                name: name.to_string(),
            })
    }

    /// Resolves a `(variable, set)` reference in a collection.
    pub fn resolve(
        &self,
        role: Role,
        variable: &str,
        set: &str,
    ) -> Result<(&Variable, &MembershipFunction)> {
        let var = self.variable(role, variable)?;
        let function = var.set(set).ok_or_else(|| Error::UnknownSet {
            variable: variable.to_string(),
            set: set.to_string(),
        })?;
        Ok((var, function))
    }

    /// Checks that every reference of a rule resolves.
    pub fn check_rule(&self, rule: &Rule) -> Result<()> {
        for a in rule.antecedents() {
            self.resolve(Role::Input, &a.variable, &a.set)?;
        }
        let c = rule.consequent();
        self.resolve(Role::Output, &c.variable, &c.set)?;
        Ok(())
    }

    /// Applies a mutation, returning the rules it removed as a side effect
    /// (rules left dangling by a variable or set removal, or the removed rule).
    pub fn apply(&mut self, op: SystemOp) -> Result<Vec<Rule>> {
        match op {
            SystemOp::AddVariable {
                role,
                name,
                universe,
            } => {
                if name.trim().is_empty() {
                    return Err(Error::InvalidDescription(format!(
                        "{} variable name must not be empty",
                        role
                    )));
                }
                if self.variables(role).contains_key(&name) {
                    return Err(Error::DuplicateVariable { role, name });
                }
                let var = Variable::new(name.clone(), universe);
                self.variables_mut(role).insert(name, var);
                Ok(Vec::new())
            }
            SystemOp::RemoveVariable { role, name } => {
                self.variables_mut(role)
                    .shift_remove(&name)
                    .ok_or_else(|| Error::UnknownVariable {
                        role,
                        name: name.clone(),
                    })?;
                Ok(self.drop_rules(|r| r.references_variable(role, &name)))
            }
            SystemOp::SetUniverse {
                role,
                name,
                universe,
            } => {
                self.variable_mut(role, &name)?.universe = universe;
                Ok(Vec::new())
            }
            SystemOp::AddSet {
                role,
                variable,
                name,
                function,
            } => {
                let function = validate(function.kind(), &function.params()).map_err(|source| {
                    Error::InvalidSet {
                        role,
                        variable: variable.clone(),
                        set: name.clone(),
                        source,
                    }
                })?;
                self.variable_mut(role, &variable)?.add_set(name, function)?;
                Ok(Vec::new())
            }
            SystemOp::RemoveSet {
                role,
                variable,
                name,
            } => {
                self.variable_mut(role, &variable)?.remove_set(&name)?;
                Ok(self.drop_rules(|r| r.references_set(role, &variable, &name)))
            }
            SystemOp::AddRule(rule) => {
                self.check_rule(&rule)?;
                self.rules.push(rule);
                Ok(Vec::new())
            }
            SystemOp::RemoveRule(index) => {
                if index >= self.rules.len() {
                    return Err(Error::RuleOutOfRange {
                        index,
                        len: self.rules.len(),
                    });
                }
                Ok(vec![self.rules.remove(index)])
            }
        }
    }

    /// Validates raw parameters and adds the resulting set, reporting
    /// validation failures with the set and variable they concern.
    pub fn add_set_raw<P: RawParam>(
        &mut self,
        role: Role,
        variable: &str,
        name: &str,
        kind: MembershipKind,
        raw_params: &[P],
    ) -> Result<()> {
        let function = validate(kind, raw_params).map_err(|source| Error::InvalidSet {
            role,
            variable: variable.to_string(),
            set: name.to_string(),
            source,
        })?;
        self.apply(SystemOp::AddSet {
            role,
            variable: variable.to_string(),
            name: name.to_string(),
            function,
        })
        .map(|_| ())
    }

    fn drop_rules(&mut self, orphaned: impl Fn(&Rule) -> bool) -> Vec<Rule> {
        let (dropped, kept): (Vec<Rule>, Vec<Rule>) =
            std::mem::take(&mut self.rules).into_iter().partition(|r| orphaned(r));
        self.rules = kept;
        if !dropped.is_empty() {
            debug!("Removed {} rule(s) left dangling by a removal", dropped.len());
        }
        dropped
    }
}

/// Applies a mutation to a system. Equivalent to [`System::apply`].
pub fn mutate_system(system: &mut System, op: SystemOp) -> Result<Vec<Rule>> {
    system.apply(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ValidationError;

    fn tri(a: f64, b: f64, c: f64) -> MembershipFunction {
        MembershipFunction::Triangular { a, b, c }
    }

    fn system() -> System {
        let mut sys = System::new();
        sys.apply(SystemOp::AddVariable {
            role: Role::Input,
            name: "temperature".into(),
            universe: Universe::new(0.0, 40.0).unwrap(),
        })
        .unwrap();
        sys.apply(SystemOp::AddVariable {
            role: Role::Output,
            name: "power".into(),
            universe: Universe::new(0.0, 100.0).unwrap(),
        })
        .unwrap();
        for (name, f) in [("cold", tri(0.0, 0.0, 15.0)), ("hot", tri(25.0, 40.0, 40.0))] {
            sys.apply(SystemOp::AddSet {
                role: Role::Input,
                variable: "temperature".into(),
                name: name.into(),
                function: f,
            })
            .unwrap();
        }
        for (name, f) in [("low", tri(0.0, 0.0, 50.0)), ("high", tri(50.0, 100.0, 100.0))] {
            sys.apply(SystemOp::AddSet {
                role: Role::Output,
                variable: "power".into(),
                name: name.into(),
                function: f,
            })
            .unwrap();
        }
        sys
    }

    #[test]
    fn test_universe_invariant() {
        assert!(Universe::new(0.0, 1.0).is_ok());
        assert!(matches!(
            Universe::new(5.0, 5.0),
            Err(Error::InvalidUniverse { .. })
        ));
        assert!(Universe::new(10.0, 0.0).is_err());
        assert!(Universe::new(0.0, f64::INFINITY).is_err());
        assert_eq!(Universe::new(0.0, 40.0).unwrap().samples().len(), SAMPLE_RESOLUTION);
    }

    #[test]
    fn test_rule_requires_antecedent() {
        let err = Rule::new(vec![], Consequent::new("power", "low"), Logic::And).unwrap_err();
        assert!(matches!(err, Error::InvalidRule(_)));
    }

    #[test]
    fn test_rule_builder_and_display() {
        let rule = Rule::when("temperature", "hot")
            .or("humidity", "high")
            .then("power", "high")
            .unwrap();
        assert_eq!(rule.logic(), Logic::Or);
        assert_eq!(rule.antecedents().len(), 2);
        assert_eq!(
            rule.to_string(),
            "IF temperature IS hot OR humidity IS high THEN power IS high"
        );
    }

    #[test]
    fn test_logic_parse() {
        assert_eq!(Logic::parse("and"), Some(Logic::And));
        assert_eq!(Logic::parse(" OR "), Some(Logic::Or));
        assert_eq!(Logic::parse("xor"), None);
        assert_eq!(Logic::default(), Logic::And);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut sys = system();
        let err = sys
            .apply(SystemOp::AddVariable {
                role: Role::Input,
                name: "temperature".into(),
                universe: Universe::new(0.0, 1.0).unwrap(),
            })
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateVariable { .. }));

        // Same name in the other collection is fine
        assert!(sys
            .apply(SystemOp::AddVariable {
                role: Role::Output,
                name: "temperature".into(),
                universe: Universe::new(0.0, 1.0).unwrap(),
            })
            .is_ok());

        let err = sys
            .apply(SystemOp::AddSet {
                role: Role::Input,
                variable: "temperature".into(),
                name: "cold".into(),
                function: tri(0.0, 1.0, 2.0),
            })
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSet { .. }));
    }

    #[test]
    fn test_add_rule_checks_references() {
        let mut sys = system();
        let ok = Rule::when("temperature", "cold").then("power", "low").unwrap();
        assert!(sys.apply(SystemOp::AddRule(ok)).is_ok());

        let bad_var = Rule::when("humidity", "high").then("power", "low").unwrap();
        assert!(matches!(
            sys.apply(SystemOp::AddRule(bad_var)),
            Err(Error::UnknownVariable {
                role: Role::Input,
                ..
            })
        ));

        let bad_set = Rule::when("temperature", "cold").then("power", "max").unwrap();
        assert!(matches!(
            sys.apply(SystemOp::AddRule(bad_set)),
            Err(Error::UnknownSet { .. })
        ));
        assert_eq!(sys.rules().len(), 1);
    }

    #[test]
    fn test_removals_cascade_to_rules() {
        let mut sys = system();
        let r1 = Rule::when("temperature", "cold").then("power", "low").unwrap();
        let r2 = Rule::when("temperature", "hot").then("power", "high").unwrap();
        sys.apply(SystemOp::AddRule(r1.clone())).unwrap();
        sys.apply(SystemOp::AddRule(r2.clone())).unwrap();

        let removed = sys
            .apply(SystemOp::RemoveSet {
                role: Role::Output,
                variable: "power".into(),
                name: "high".into(),
            })
            .unwrap();
        assert_eq!(removed, vec![r2]);
        assert_eq!(sys.rules(), &[r1.clone()]);

        let removed = sys
            .apply(SystemOp::RemoveVariable {
                role: Role::Input,
                name: "temperature".into(),
            })
            .unwrap();
        assert_eq!(removed, vec![r1]);
        assert!(sys.rules().is_empty());
        assert!(sys.inputs().is_empty());
    }

    #[test]
    fn test_remove_rule_out_of_range() {
        let mut sys = system();
        assert_eq!(
            sys.apply(SystemOp::RemoveRule(0)).unwrap_err(),
            Error::RuleOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn test_add_set_raw_reports_context() {
        let mut sys = system();
        let err = mutate_system(
            &mut sys,
            SystemOp::RemoveSet {
                role: Role::Input,
                variable: "temperature".into(),
                name: "warm".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownSet { .. }));

        let err = sys
            .add_set_raw(
                Role::Input,
                "temperature",
                "warm",
                MembershipKind::Triangular,
                &[30, 20, 10],
            )
            .unwrap_err();
        match err {
            Error::InvalidSet { variable, set, .. } => {
                assert_eq!(variable, "temperature");
                assert_eq!(set, "warm");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(sys.inputs()["temperature"].set("warm").is_none());

        sys.add_set_raw(
            Role::Input,
            "temperature",
            "warm",
            MembershipKind::Triangular,
            &["10", "20", "30"],
        )
        .unwrap();
        assert_eq!(
            sys.inputs()["temperature"].set("warm"),
            Some(&tri(10.0, 20.0, 30.0))
        );
    }

    #[test]
    fn test_add_set_rejects_invalid_functions() {
        let mut sys = system();
        let err = sys
            .apply(SystemOp::AddSet {
                role: Role::Input,
                variable: "temperature".into(),
                name: "warm".into(),
                function: tri(5.0, 2.0, 8.0),
            })
            .unwrap_err();
        match err {
            Error::InvalidSet {
                role,
                variable,
                set,
                source,
            } => {
                assert_eq!(role, Role::Input);
                assert_eq!(variable, "temperature");
                assert_eq!(set, "warm");
                assert!(matches!(source, ValidationError::OrderingViolation { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = sys
            .apply(SystemOp::AddSet {
                role: Role::Output,
                variable: "power".into(),
                name: "mid".into(),
                function: MembershipFunction::Gaussian {
                    sigma: 0.0,
                    mean: 5.0,
                },
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSet { role: Role::Output, .. }));

        let err = sys
            .apply(SystemOp::AddSet {
                role: Role::Output,
                variable: "power".into(),
                name: "nan".into(),
                function: tri(0.0, f64::NAN, 10.0),
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSet { .. }));

        assert!(sys.inputs()["temperature"].set("warm").is_none());
        assert!(sys.outputs()["power"].set("mid").is_none());
        assert!(sys.outputs()["power"].set("nan").is_none());
        assert_eq!(sys.outputs()["power"].sets().len(), 2);
    }

    #[test]
    fn test_extreme_universe_samples_stay_finite() {
        let universe = Universe::new(-1e308, 1e308).unwrap();
        assert_eq!(universe.midpoint(), 0.0);
        let samples = universe.samples();
        assert_eq!(samples.len(), SAMPLE_RESOLUTION);
        assert!(samples.iter().all(|x| x.is_finite()));
        assert_eq!(samples[0], -1e308);
        assert_eq!(samples[SAMPLE_RESOLUTION - 1], 1e308);

        let universe = Universe::new(f64::MAX / 2.0, f64::MAX).unwrap();
        assert!(universe.midpoint().is_finite());
    }

    #[test]
    fn test_set_universe() {
        let mut sys = system();
        sys.apply(SystemOp::SetUniverse {
            role: Role::Output,
            name: "power".into(),
            universe: Universe::new(0.0, 200.0).unwrap(),
        })
        .unwrap();
        assert_eq!(sys.outputs()["power"].universe().max(), 200.0);
        assert!(sys
            .apply(SystemOp::SetUniverse {
                role: Role::Output,
                name: "speed".into(),
                universe: Universe::new(0.0, 1.0).unwrap(),
            })
            .is_err());
    }
}
