//! Tolerant normalization of external system descriptions
//!
//! Descriptions written by hand or produced by a text generator rarely agree on
//! shape. Collections show up as name-keyed objects or as arrays of
//! single-entry objects, antecedents as objects, pairs or records, and keys
//! in English or Portuguese. The functions here fold every accepted encoding
//! into the canonical description types and never fail: anything that cannot
//! be interpreted is dropped and reported as an [`Issue`].

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::description::{RuleDescription, SetDescription, SystemDescription, VariableDescription};
use crate::model::Logic;
use crate::validator::{split_params, RawParam};

const INPUTS: &[&str] = &["inputs", "entradas"];
const OUTPUTS: &[&str] = &["outputs", "saidas", "saídas"];
const RULES: &[&str] = &["rules", "regras"];
const UNIVERSE: &[&str] = &["universe", "universo"];
const SETS: &[&str] = &["sets", "conjuntos"];
const KIND: &[&str] = &["kind", "type", "tipo"];
const PARAMS: &[&str] = &["params", "parametros", "parâmetros"];
const ANTECEDENTS: &[&str] = &["antecedents", "antecedentes"];
const CONSEQUENT: &[&str] = &["consequent", "consequente"];
const LOGIC: &[&str] = &["logic", "logica", "lógica"];
const EXPLANATION: &[&str] = &["explanation", "explicacao", "explicação"];
const NAME: &[&str] = &["name", "nome"];
const REF_VARIABLE: &[&str] = &["variable", "var", "variavel"];
const REF_SET: &[&str] = &["set", "conj", "conjunto"];

/// Something the normalizer dropped or defaulted, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Location in the description, e.g. `rules[2].antecedents[0]`.
    pub path: String,
    /// Human-readable reason.
    pub reason: String,
}

impl Issue {
    /// Creates an issue.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// A value together with the issues collected while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    /// The normalized value.
    pub value: T,
    /// Entries dropped or defaulted along the way, in input order.
    pub issues: Vec<Issue>,
}

impl<T> Normalized<T> {
    /// A value with no issues.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    /// Whether nothing was dropped or defaulted.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Transforms the value, keeping the issues.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Normalized<U> {
        Normalized {
            value: f(self.value),
            issues: self.issues,
        }
    }

    /// Splits into value and issues.
    pub fn into_parts(self) -> (T, Vec<Issue>) {
        (self.value, self.issues)
    }
}

/// Issue collector shared by the normalization passes.
#[derive(Default)]
struct Report {
    issues: Vec<Issue>,
}

impl Report {
    fn push(&mut self, path: &str, reason: impl Into<String>) {
        let issue = Issue::new(path, reason);
        debug!("Normalizer: {}", issue);
        self.issues.push(issue);
    }

    fn finish<T>(self, value: T) -> Normalized<T> {
        Normalized {
            value,
            issues: self.issues,
        }
    }
}

/// First field present under any of the given keys (case-insensitive).
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    obj.iter()
        .find(|(k, _)| keys.iter().any(|key| k.eq_ignore_ascii_case(key)))
        .map(|(_, v)| v)
}

fn string_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    field(obj, keys).and_then(Value::as_str).map(str::trim)
}

/// Flattens a name-keyed object or an array of named entries into
/// `(name, record)` pairs.
///
/// Array items may be single-entry objects (`{"cold": {...}}`) or records
/// carrying their own `name` field. Later duplicates of a name are dropped.
fn named_entries<'a>(raw: &'a Value, path: &str, report: &mut Report) -> Vec<(String, &'a Value)> {
    let mut entries: Vec<(String, &'a Value)> = Vec::new();

    match raw {
        Value::Object(map) => {
            entries.extend(map.iter().map(|(k, v)| (k.trim().to_string(), v)));
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, i);
                let Some(obj) = item.as_object() else {
                    report.push(&item_path, "expected an object");
                    continue;
                };
                if let Some(name) = string_field(obj, NAME) {
                    entries.push((name.to_string(), item));
                } else if obj.len() == 1 {
                    if let Some((k, v)) = obj.iter().next() {
                        entries.push((k.trim().to_string(), v));
                    }
                } else {
                    report.push(&item_path, "expected a single-entry object or a named record");
                }
            }
        }
        Value::Null => {}
        _ => report.push(path, "expected an object or an array"),
    }

    let mut seen = std::collections::HashSet::new();
    entries.retain(|(name, _)| {
        if name.is_empty() {
            report.push(path, "dropped entry with an empty name");
            return false;
        }
        if !seen.insert(name.clone()) {
            report.push(&format!("{}.{}", path, name), "duplicate name, keeping the first");
            return false;
        }
        true
    });
    entries
}

fn normalize_set(raw: &Value, path: &str, report: &mut Report) -> Option<SetDescription> {
    let Some(obj) = raw.as_object() else {
        report.push(path, "set must be an object");
        return None;
    };
    let Some(kind) = string_field(obj, KIND) else {
        report.push(path, "set has no kind");
        return None;
    };
    let params = match field(obj, PARAMS) {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(text)) => split_params(text)
            .into_iter()
            .map(|p| Value::String(p.to_string()))
            .collect(),
        _ => {
            report.push(path, "set has no parameter list");
            return None;
        }
    };
    Some(SetDescription {
        kind: kind.to_string(),
        params,
    })
}

fn normalize_universe(raw: Option<&Value>) -> Option<[f64; 2]> {
    match raw? {
        Value::Array(bounds) if bounds.len() == 2 => {
            Some([bounds[0].to_real()?, bounds[1].to_real()?])
        }
        _ => None,
    }
}

fn normalize_variable(raw: &Value, path: &str, report: &mut Report) -> Option<VariableDescription> {
    let Some(obj) = raw.as_object() else {
        report.push(path, "variable must be an object");
        return None;
    };
    let Some(universe) = normalize_universe(field(obj, UNIVERSE)) else {
        report.push(path, "universe must be a pair of numbers");
        return None;
    };
    let Some(raw_sets) = field(obj, SETS) else {
        report.push(path, "variable has no set collection");
        return None;
    };

    let sets_path = format!("{}.sets", path);
    let mut sets = IndexMap::new();
    for (name, raw_set) in named_entries(raw_sets, &sets_path, report) {
        let set_path = format!("{}.{}", sets_path, name);
        if let Some(set) = normalize_set(raw_set, &set_path, report) {
            sets.insert(name, set);
        }
    }
    Some(VariableDescription { universe, sets })
}

fn collection(
    raw: &Value,
    path: &str,
    report: &mut Report,
) -> IndexMap<String, VariableDescription> {
    let mut variables = IndexMap::new();
    for (name, raw_var) in named_entries(raw, path, report) {
        let var_path = format!("{}.{}", path, name);
        if let Some(var) = normalize_variable(raw_var, &var_path, report) {
            variables.insert(name, var);
        }
    }
    variables
}

/// Normalizes a variable collection (inputs or outputs).
pub fn normalize_variable_collection(
    raw: &Value,
) -> Normalized<IndexMap<String, VariableDescription>> {
    let mut report = Report::default();
    let variables = collection(raw, "variables", &mut report);
    report.finish(variables)
}

type RefMatcher = fn(&Value) -> Option<(String, String)>;

/// `["temperature", "cold"]`
fn match_pair(item: &Value) -> Option<(String, String)> {
    match item.as_array()?.as_slice() {
        [Value::String(v), Value::String(s)] => Some((v.trim().to_string(), s.trim().to_string())),
        _ => None,
    }
}

/// `{"variable": "temperature", "set": "cold"}`
fn match_explicit(item: &Value) -> Option<(String, String)> {
    let obj = item.as_object()?;
    let variable = string_field(obj, REF_VARIABLE)?;
    let set = string_field(obj, REF_SET)?;
    Some((variable.to_string(), set.to_string()))
}

/// `{"temperature": "cold"}`
fn match_single_key(item: &Value) -> Option<(String, String)> {
    let obj = item.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    let (variable, set) = obj.iter().next()?;
    Some((variable.trim().to_string(), set.as_str()?.trim().to_string()))
}

/// Reference matchers, tried in order on every item.
const REF_MATCHERS: &[(&str, RefMatcher)] = &[
    ("pair", match_pair),
    ("explicit record", match_explicit),
    ("single-key record", match_single_key),
];

fn non_empty(pair: &(String, String)) -> bool {
    !pair.0.is_empty() && !pair.1.is_empty()
}

fn match_reference(item: &Value) -> Option<(String, String)> {
    REF_MATCHERS.iter().find_map(|(_, matcher)| matcher(item).filter(non_empty))
}

/// Folds any accepted antecedent encoding into an ordered list of pairs.
fn normalize_antecedents(
    raw: Option<&Value>,
    path: &str,
    report: &mut Report,
) -> Vec<(String, String)> {
    let mut antecedents = Vec::new();
    match raw {
        Some(Value::Object(map)) => {
            for (variable, set) in map {
                match set.as_str() {
                    Some(set) if !set.trim().is_empty() => {
                        antecedents.push((variable.trim().to_string(), set.trim().to_string()))
                    }
                    _ => {
                        let set_path = format!("{}.{}", path, variable);
                        report.push(&set_path, "set name must be a string")
                    }
                }
            }
        }
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                match match_reference(item) {
                    Some(pair) => antecedents.push(pair),
                    None => report.push(&format!("{}[{}]", path, i), "uninterpretable antecedent"),
                }
            }
        }
        Some(_) => report.push(path, "antecedents must be an object or an array"),
        None => {}
    }
    antecedents
}

fn normalize_rule(raw: &Value, path: &str, report: &mut Report) -> Option<RuleDescription> {
    let Some(obj) = raw.as_object() else {
        report.push(path, "rule must be an object");
        return None;
    };

    // Consequents accept the pair encoding only.
    let consequent = field(obj, CONSEQUENT).and_then(match_pair).filter(non_empty);
    let Some(consequent) = consequent else {
        report.push(path, "rule dropped: consequent must be an (output, set) pair");
        return None;
    };

    let antecedents =
        normalize_antecedents(field(obj, ANTECEDENTS), &format!("{}.antecedents", path), report);
    if antecedents.is_empty() {
        report.push(path, "rule dropped: no usable antecedents");
        return None;
    }

    let logic = match field(obj, LOGIC) {
        None | Some(Value::Null) => Logic::And,
        Some(tag) => match tag.as_str().and_then(Logic::parse) {
            Some(logic) => logic,
            None => {
                let reason = format!("unrecognized logic {}, using AND", tag);
                report.push(&format!("{}.logic", path), reason);
                Logic::And
            }
        },
    };

    Some(RuleDescription {
        antecedents,
        consequent,
        logic,
    })
}

fn rule_list(raw: &Value, path: &str, report: &mut Report) -> Vec<RuleDescription> {
    let items: &[Value] = match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => std::slice::from_ref(raw),
        Value::Null => &[],
        _ => {
            report.push(path, "rules must be an array");
            &[]
        }
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| normalize_rule(item, &format!("{}[{}]", path, i), report))
        .collect()
}

/// Normalizes a rule list. Rules that cannot be interpreted are dropped.
pub fn normalize_rules(raw: &Value) -> Normalized<Vec<RuleDescription>> {
    let mut report = Report::default();
    let rules = rule_list(raw, "rules", &mut report);
    report.finish(rules)
}

/// Normalizes a whole description object.
pub fn normalize_description(raw: &Value) -> Normalized<SystemDescription> {
    let mut report = Report::default();
    let Some(obj) = raw.as_object() else {
        report.push("$", "description must be an object");
        return report.finish(SystemDescription::default());
    };

    let null = Value::Null;
    let inputs = collection(field(obj, INPUTS).unwrap_or(&null), "inputs", &mut report);
    let outputs = collection(field(obj, OUTPUTS).unwrap_or(&null), "outputs", &mut report);
    let rules = rule_list(field(obj, RULES).unwrap_or(&null), "rules", &mut report);
    let explanation = string_field(obj, EXPLANATION)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    report.finish(SystemDescription {
        inputs,
        outputs,
        rules,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(v: &str, s: &str) -> (String, String) {
        (v.to_string(), s.to_string())
    }

    fn rule_with(antecedents: Value) -> Value {
        json!({ "antecedents": antecedents, "consequent": ["power", "high"] })
    }

    #[test]
    fn test_antecedent_encodings_agree() {
        let expected = vec![pair("temp", "hot")];
        for antecedents in [
            json!({"temp": "hot"}),
            json!([["temp", "hot"]]),
            json!([{"temp": "hot"}]),
            json!([{"variable": "temp", "set": "hot"}]),
            json!([{"var": "temp", "conj": "hot"}]),
        ] {
            let result = normalize_rules(&json!([rule_with(antecedents.clone())]));
            assert!(result.is_clean(), "{antecedents}: {:?}", result.issues);
            assert_eq!(result.value.len(), 1);
            assert_eq!(result.value[0].antecedents, expected, "{antecedents}");
        }
    }

    #[test]
    fn test_mixed_antecedents_keep_order() {
        let result = normalize_rules(&json!([rule_with(json!([
            ["temperature", "hot"],
            {"humidity": "high"},
            {"variable": "wind", "set": "calm"},
            42,
            ["only-one"]
        ]))]));
        assert_eq!(
            result.value[0].antecedents,
            vec![pair("temperature", "hot"), pair("humidity", "high"), pair("wind", "calm")]
        );
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].path, "rules[0].antecedents[3]");
    }

    #[test]
    fn test_rule_without_consequent_dropped() {
        let result = normalize_rules(&json!([
            {"antecedents": [["temp", "hot"]]},
            {"antecedents": [["temp", "hot"]], "consequent": ["power"]},
            {"antecedents": [["temp", "hot"]], "consequent": ["power", "high", "extra"]},
            {"antecedents": [["temp", "hot"]], "consequent": ["power", ""]},
            {"antecedents": [["temp", "hot"]], "consequent": ["power", "high"]}
        ]));
        assert_eq!(result.value.len(), 1);
        assert_eq!(result.issues.len(), 4);
        assert!(result.issues.iter().all(|i| i.reason.contains("consequent")));
    }

    #[test]
    fn test_consequent_records_not_accepted() {
        let result = normalize_rules(&json!([
            {"antecedents": [["temp", "hot"]], "consequent": {"power": "high"}},
            {"antecedents": [["temp", "hot"]], "consequent": {"variable": "power", "set": "high"}},
            {"antecedents": {"temp": "hot"}, "consequent": ["power", "high"]}
        ]));
        assert_eq!(result.value.len(), 1);
        assert_eq!(result.value[0].consequent, pair("power", "high"));
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].path, "rules[0]");
        assert_eq!(result.issues[1].path, "rules[1]");
        assert!(result.issues.iter().all(|i| i.reason.contains("consequent")));
    }

    #[test]
    fn test_rule_with_empty_antecedents_dropped() {
        let result = normalize_rules(&json!([rule_with(json!([])), rule_with(json!([7]))]));
        assert!(result.value.is_empty());
        assert!(result.issues.iter().any(|i| i.reason.contains("no usable antecedents")));
    }

    #[test]
    fn test_logic_defaults_to_and() {
        let result = normalize_rules(&json!([
            {"antecedents": {"a": "x", "b": "y"}, "consequent": ["o", "s"]},
            {"antecedents": {"a": "x"}, "consequent": ["o", "s"], "logic": "or"},
            {"antecedents": {"a": "x"}, "consequent": ["o", "s"], "logica": "OU"},
            {"antecedents": {"a": "x"}, "consequent": ["o", "s"], "logic": "XOR"}
        ]));
        let logics: Vec<Logic> = result.value.iter().map(|r| r.logic).collect();
        assert_eq!(logics, vec![Logic::And, Logic::Or, Logic::Or, Logic::And]);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].path, "rules[3].logic");
    }

    #[test]
    fn test_variable_collection_shapes() {
        let keyed = json!({
            "temperature": {
                "universe": [0, 40],
                "sets": {"cold": {"kind": "trimf", "params": [0, 0, 15]}}
            }
        });
        let listed = json!([
            {"temperature": {
                "universo": [0, 40],
                "conjuntos": [{"cold": {"tipo": "trimf", "parametros": [0, 0, 15]}}]
            }}
        ]);
        let a = normalize_variable_collection(&keyed);
        let b = normalize_variable_collection(&listed);
        assert!(a.is_clean());
        assert!(b.is_clean());
        assert_eq!(a.value, b.value);
        assert_eq!(a.value["temperature"].universe, [0.0, 40.0]);
        assert_eq!(a.value["temperature"].sets["cold"].kind, "trimf");
    }

    #[test]
    fn test_named_records_and_text_params() {
        let raw = json!([
            {"name": "power", "universe": ["0", "100"], "sets": [
                {"name": "low", "type": "trimf", "params": "0, 0, 50"}
            ]}
        ]);
        let result = normalize_variable_collection(&raw);
        assert!(result.is_clean());
        let low = &result.value["power"].sets["low"];
        assert_eq!(low.params, vec![json!("0"), json!("0"), json!("50")]);
    }

    #[test]
    fn test_bad_variables_dropped_with_issues() {
        let raw = json!({
            "a": {"universe": [0], "sets": {}},
            "b": {"universe": [0, 1]},
            "c": {"universe": [0, 1], "sets": {"x": {"params": [1, 2, 3]}, "y": {"kind": "trimf"}}},
            "d": "nope"
        });
        let result = normalize_variable_collection(&raw);
        assert_eq!(result.value.len(), 1);
        assert!(result.value["c"].sets.is_empty());
        assert_eq!(result.issues.len(), 5);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let raw = json!([
            {"t": {"universe": [0, 1], "sets": {}}},
            {"t": {"universe": [0, 2], "sets": {}}}
        ]);
        let result = normalize_variable_collection(&raw);
        assert_eq!(result.value["t"].universe, [0.0, 1.0]);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_normalize_description_portuguese_keys() {
        let raw = json!({
            "entradas": {"temperatura": {
                "universo": [0, 40],
                "conjuntos": {"frio": {"tipo": "trimf", "parametros": [0, 0, 15]}}
            }},
            "saidas": {"potencia": {
                "universo": [0, 100],
                "conjuntos": {"baixa": {"tipo": "trimf", "parametros": [0, 0, 50]}}
            }},
            "regras": [{
                "antecedentes": [["temperatura", "frio"]],
                "consequente": ["potencia", "baixa"],
                "logica": "E"
            }],
            "explicacao": "Sistema simples"
        });
        let result = normalize_description(&raw);
        assert!(result.is_clean(), "{:?}", result.issues);
        let desc = result.value;
        assert_eq!(desc.inputs.len(), 1);
        assert_eq!(desc.outputs.len(), 1);
        assert_eq!(desc.rules.len(), 1);
        assert_eq!(desc.explanation.as_deref(), Some("Sistema simples"));
    }

    #[test]
    fn test_normalize_description_never_fails() {
        let result = normalize_description(&json!([1, 2, 3]));
        assert_eq!(result.value, SystemDescription::default());
        assert_eq!(result.issues.len(), 1);

        let result = normalize_description(&json!({"inputs": 5, "rules": "none"}));
        assert!(result.value.inputs.is_empty());
        assert_eq!(result.issues.len(), 2);
    }
}
