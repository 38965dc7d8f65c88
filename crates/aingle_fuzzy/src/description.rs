//! Canonical system descriptions
//!
//! A [`SystemDescription`] is the serializable, unvalidated form of a
//! [`System`]. Descriptions come from files, editors or text generators; the
//! tolerant path is [`parse_description`], which extracts the JSON object from
//! surrounding text and runs it through the normalizer. [`SystemDescription::build`]
//! then validates every set and wires the rules into a [`System`].

use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Antecedent, Consequent, Logic, Role, Rule, System, SystemOp, Universe};
use crate::normalizer::{normalize_description, Issue, Normalized};
use crate::validator::validate_params;

/// A fuzzy set as written in a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDescription {
    /// Shape tag: `trimf`, `trapmf` or `gaussmf`.
    pub kind: String,
    /// Raw parameters; numbers or numeric strings.
    pub params: Vec<Value>,
}

/// A linguistic variable as written in a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescription {
    pub universe: [f64; 2],
    #[serde(default)]
    pub sets: IndexMap<String, SetDescription>,
}

/// A rule as written in a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDescription {
    /// `(input variable, set)` pairs in premise order.
    pub antecedents: Vec<(String, String)>,
    /// `(output variable, set)`.
    pub consequent: (String, String),
    #[serde(default)]
    pub logic: Logic,
}

/// A complete system description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemDescription {
    pub inputs: IndexMap<String, VariableDescription>,
    pub outputs: IndexMap<String, VariableDescription>,
    pub rules: Vec<RuleDescription>,
    /// Free-text explanation shipped with generated systems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl SystemDescription {
    /// Builds a validated system.
    ///
    /// Any invalid universe or set parameter refuses the whole description.
    /// Rules that cannot be wired (unknown variables or sets, no antecedents)
    /// are dropped and reported as issues.
    pub fn build(&self) -> Result<Normalized<System>> {
        let mut system = System::new();

        for (role, variables) in [(Role::Input, &self.inputs), (Role::Output, &self.outputs)] {
            for (name, var) in variables {
                let universe = Universe::new(var.universe[0], var.universe[1])?;
                system.apply(SystemOp::AddVariable {
                    role,
                    name: name.clone(),
                    universe,
                })?;
                for (set, desc) in &var.sets {
                    let function = validate_params(&desc.kind, &desc.params).map_err(|source| {
                        Error::InvalidSet {
                            role,
                            variable: name.clone(),
                            set: set.clone(),
                            source,
                        }
                    })?;
                    system.apply(SystemOp::AddSet {
                        role,
                        variable: name.clone(),
                        name: set.clone(),
                        function,
                    })?;
                }
            }
        }

        let mut issues = Vec::new();
        for (i, desc) in self.rules.iter().enumerate() {
            let antecedents = desc
                .antecedents
                .iter()
                .map(|(variable, set)| Antecedent::new(variable.as_str(), set.as_str()))
                .collect();
            let (variable, set) = &desc.consequent;
            let consequent = Consequent::new(variable.as_str(), set.as_str());
            let added = Rule::new(antecedents, consequent, desc.logic)
                .and_then(|rule| system.apply(SystemOp::AddRule(rule)));
            if let Err(e) = added {
                issues.push(Issue::new(format!("rules[{}]", i), e.to_string()));
            }
        }

        if !issues.is_empty() {
            warn!(
                "Dropped {} of {} rule(s) with unresolved references",
                issues.len(),
                self.rules.len()
            );
        }
        debug!(
            "Built system: {} input(s), {} output(s), {} rule(s)",
            system.inputs().len(),
            system.outputs().len(),
            system.rules().len()
        );

        Ok(Normalized {
            value: system,
            issues,
        })
    }

    /// Serializes to pretty-printed canonical JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl System {
    /// Converts the system back into its canonical description.
    pub fn to_description(&self) -> SystemDescription {
        let variables = |role: Role| -> IndexMap<String, VariableDescription> {
            self.variables(role)
                .iter()
                .map(|(name, var)| {
                    let sets = var
                        .sets()
                        .iter()
                        .map(|(set, function)| {
                            let desc = SetDescription {
                                kind: function.kind().tag().to_string(),
                                params: function.params().into_iter().map(Value::from).collect(),
                            };
                            (set.clone(), desc)
                        })
                        .collect();
                    let universe = [var.universe().min(), var.universe().max()];
                    (name.clone(), VariableDescription { universe, sets })
                })
                .collect()
        };

        let rules = self
            .rules()
            .iter()
            .map(|rule| RuleDescription {
                antecedents: rule
                    .antecedents()
                    .iter()
                    .map(|a| (a.variable.clone(), a.set.clone()))
                    .collect(),
                consequent: (rule.consequent().variable.clone(), rule.consequent().set.clone()),
                logic: rule.logic(),
            })
            .collect();

        SystemDescription {
            inputs: variables(Role::Input),
            outputs: variables(Role::Output),
            rules,
            explanation: None,
        }
    }
}

/// Finds the JSON object in generator output.
///
/// Prefers the content of a fenced code block (```json ... ```), and falls back
/// to the span from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let fenced = Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*\})\s*```").ok()?;
    if let Some(m) = fenced.captures(text).and_then(|c| c.get(1)) {
        return Some(m.as_str());
    }
    let bare = Regex::new(r"(?s)\{.*\}").ok()?;
    bare.find(text).map(|m| m.as_str())
}

/// Parses a description from raw JSON or from text containing it.
pub fn parse_description(text: &str) -> Result<Normalized<SystemDescription>> {
    let json = extract_json(text)
        .ok_or_else(|| Error::InvalidDescription("no JSON object found".to_string()))?;
    let raw: Value = serde_json::from_str(json)?;
    Ok(normalize_description(&raw))
}

/// Reads and parses a description file.
pub fn load_description(path: impl AsRef<Path>) -> Result<Normalized<SystemDescription>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    debug!("Loaded description from {}", path.as_ref().display());
    parse_description(&text)
}

/// Reads, parses and builds a system, merging normalizer and build issues.
pub fn load_system(path: impl AsRef<Path>) -> Result<Normalized<System>> {
    let (description, mut issues) = load_description(path)?.into_parts();
    let built = description.build()?;
    issues.extend(built.issues);
    Ok(Normalized {
        value: built.value,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinSystems;
    use crate::validator::ValidationError;
    use serde_json::json;
    use std::io::Write;

    const FAN: &str = r#"{
        "inputs": {"temperature": {"universe": [0, 40], "sets": {
            "cold": {"kind": "trimf", "params": [0, 0, 15]},
            "warm": {"kind": "trimf", "params": [10, 20, 30]},
            "hot":  {"kind": "trimf", "params": [25, 40, 40]}}}},
        "outputs": {"power": {"universe": [0, 100], "sets": {
            "low":  {"kind": "trimf", "params": [0, 0, 50]},
            "mid":  {"kind": "trimf", "params": [25, 50, 75]},
            "high": {"kind": "trimf", "params": [50, 100, 100]}}}},
        "rules": [
            {"antecedents": [["temperature", "cold"]], "consequent": ["power", "low"]},
            {"antecedents": [["temperature", "warm"]], "consequent": ["power", "mid"]},
            {"antecedents": [["temperature", "hot"]], "consequent": ["power", "high"]}
        ]
    }"#;

    #[test]
    fn test_extract_json_from_fenced_text() {
        let text = "Here is your system:\n```json\n{\"a\": {\"b\": 1}}\n```\nEnjoy!";
        assert_eq!(extract_json(text), Some("{\"a\": {\"b\": 1}}"));

        let bare = "noise {\"x\": 1} trailing";
        assert_eq!(extract_json(bare), Some("{\"x\": 1}"));
        assert_eq!(extract_json("no object here"), None);
    }

    #[test]
    fn test_parse_and_build_fan_controller() {
        let parsed = parse_description(FAN).unwrap();
        assert!(parsed.is_clean());
        let built = parsed.value.build().unwrap();
        assert!(built.is_clean());
        assert_eq!(built.value, BuiltinSystems::fan_controller());
    }

    #[test]
    fn test_to_description_round_trip() {
        let system = BuiltinSystems::comfort_controller();
        let desc = system.to_description();
        let json = desc.to_json().unwrap();
        let reparsed = parse_description(&json).unwrap();
        assert!(reparsed.is_clean(), "{:?}", reparsed.issues);
        assert_eq!(reparsed.value, desc);
        assert_eq!(reparsed.value.build().unwrap().value, system);
    }

    #[test]
    fn test_invalid_set_refuses_import() {
        let mut desc = parse_description(FAN).unwrap().value;
        desc.inputs["temperature"].sets["warm"].params = vec![json!(30), json!(20), json!(10)];
        match desc.build().unwrap_err() {
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

        let mut desc = parse_description(FAN).unwrap().value;
        desc.outputs["power"].universe = [100.0, 0.0];
        assert!(matches!(desc.build(), Err(Error::InvalidUniverse { .. })));
    }

    #[test]
    fn test_dangling_rules_dropped() {
        let mut desc = parse_description(FAN).unwrap().value;
        desc.rules.push(RuleDescription {
            antecedents: vec![("humidity".into(), "high".into())],
            consequent: ("power".into(), "high".into()),
            logic: Logic::And,
        });
        desc.rules.push(RuleDescription {
            antecedents: vec![("temperature".into(), "hot".into())],
            consequent: ("power".into(), "max".into()),
            logic: Logic::Or,
        });
        let built = desc.build().unwrap();
        assert_eq!(built.value.rules().len(), 3);
        assert_eq!(built.issues.len(), 2);
        assert_eq!(built.issues[0].path, "rules[3]");
        assert!(built.issues[1].reason.contains("max"));
    }

    #[test]
    fn test_parse_rejects_broken_json() {
        assert!(matches!(
            parse_description("plain text"),
            Err(Error::InvalidDescription(_))
        ));
        assert!(matches!(
            parse_description("{ not json }"),
            Err(Error::SerializationError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "```json\n{}\n```", FAN).unwrap();

        let system = load_system(file.path()).unwrap();
        assert!(system.is_clean());
        assert_eq!(system.value.rules().len(), 3);

        let missing = file.path().with_extension("missing");
        assert!(matches!(load_description(&missing), Err(Error::Io(_))));
    }
}
