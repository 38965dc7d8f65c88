//! AIngle Fuzzy - Mamdani Fuzzy Inference Engine
//!
//! This crate lets a caller define a fuzzy inference system (linguistic
//! variables, membership functions and AND/OR rules) and evaluate it against
//! crisp inputs. Descriptions may come from loosely structured JSON, including
//! the output of text generators, and are normalized before validation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Fuzzy Inference Engine                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │              Description Loading                      │   │
//! │  │  JSON Extraction │ Normalizer │ Parameter Validator  │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 System Model                          │   │
//! │  │  Variables │ Fuzzy Sets │ Rules │ Mutations          │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │               Inference Pipeline                      │   │
//! │  │  Fuzzify │ Strength │ Implicate │ Aggregate │ Defuzz │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use aingle_fuzzy::{evaluate, BuiltinSystems, EvaluationSettings};
//!
//! let system = BuiltinSystems::fan_controller();
//! let settings = EvaluationSettings::default();
//! let result = evaluate(&system, &settings, &[("temperature", 20.0)]).unwrap();
//!
//! let power = result.value("power").unwrap();
//! assert!((power - 50.0).abs() < 0.5);
//! ```

pub mod builtin;
pub mod description;
pub mod engine;
pub mod error;
pub mod membership;
pub mod model;
pub mod normalizer;
pub mod settings;
pub mod validator;

// Re-exports
pub use builtin::BuiltinSystems;
pub use description::{
    extract_json, load_description, load_system, parse_description, RuleDescription,
    SetDescription, SystemDescription, VariableDescription,
};
pub use engine::{
    evaluate, fuzzify_variable, Curve, Evaluation, InputValues, OutputResult, RuleFiring,
    SharedSystem,
};
pub use error::{Error, Result};
pub use membership::{MembershipFunction, MembershipKind};
pub use model::{
    mutate_system, Antecedent, Consequent, Logic, Role, Rule, RuleBuilder, System, SystemOp,
    Universe, Variable, SAMPLE_RESOLUTION,
};
pub use normalizer::{
    normalize_description, normalize_rules, normalize_variable_collection, Issue, Normalized,
};
pub use settings::{AndOperator, Aggregation, Defuzzification, EvaluationSettings, OrOperator};
pub use validator::{validate_params, ValidationError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
