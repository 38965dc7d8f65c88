//! AIngle Fuzzy CLI
//!
//! Evaluates a fuzzy system description for crisp inputs.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate a description file
//! aingle-fuzzy system.json temperature=20
//!
//! # Evaluate a built-in system with algebraic operators
//! AINGLE_FUZZY_AND=prod aingle-fuzzy --builtin comfort temperature=24 humidity=70
//! ```

use std::env;
use std::process;

use aingle_fuzzy::{
    evaluate, load_system, BuiltinSystems, Error, EvaluationSettings, Normalized, Result, Role,
    System,
};
use indexmap::IndexMap;
use log::{info, warn};

#[derive(Debug, Default)]
struct Options {
    source: Option<Source>,
    inputs: Vec<(String, f64)>,
    explain: bool,
    json: bool,
    describe: bool,
}

#[derive(Debug)]
enum Source {
    File(String),
    Builtin(String),
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--builtin" | "-b" => {
                let name = iter.next().ok_or_else(|| {
                    Error::InvalidDescription("--builtin needs a name".to_string())
                })?;
                options.source = Some(Source::Builtin(name.clone()));
            }
            "--explain" | "-e" => options.explain = true,
            "--json" => options.json = true,
            "--describe" => options.describe = true,
            _ => {
                if let Some((name, value)) = arg.split_once('=') {
                    let value = value.trim().parse::<f64>().map_err(|_| {
                        Error::InvalidDescription(format!(
                            "invalid value '{}' for input '{}'",
                            value.trim(),
                            name.trim()
                        ))
                    })?;
                    options.inputs.push((name.trim().to_string(), value));
                } else {
                    options.source = Some(Source::File(arg.clone()));
                }
            }
        }
    }

    Ok(options)
}

fn load(source: &Source) -> Result<System> {
    let Normalized { value, issues } = match source {
        Source::File(path) => load_system(path)?,
        Source::Builtin(name) => BuiltinSystems::by_name(name)
            .map(Normalized::clean)
            .ok_or_else(|| {
                Error::InvalidDescription(format!(
                    "unknown built-in system '{}' (available: {})",
                    name,
                    BuiltinSystems::NAMES.join(", ")
                ))
            })?,
    };
    for issue in &issues {
        warn!("{}", issue);
    }
    Ok(value)
}

/// Crisp inputs from the command line; unspecified inputs take their
/// universe midpoint.
fn crisp_inputs(system: &System, given: &[(String, f64)]) -> IndexMap<String, f64> {
    let mut inputs: IndexMap<String, f64> = given.iter().cloned().collect();
    for (name, var) in system.variables(Role::Input) {
        if !inputs.contains_key(name) {
            let midpoint = var.universe().midpoint();
            info!("No value for '{}', using midpoint {}", name, midpoint);
            inputs.insert(name.clone(), midpoint);
        }
    }
    inputs
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("aingle-fuzzy {}", aingle_fuzzy::VERSION);
        return Ok(());
    }

    let options = parse_args(&args)?;
    let Some(source) = &options.source else {
        print_help();
        process::exit(2);
    };

    let system = load(source)?;

    if options.describe {
        println!("{}", system.to_description().to_json()?);
        return Ok(());
    }

    let settings = EvaluationSettings::from_env();
    info!(
        "Settings: AND={:?} OR={:?} aggregation={:?} defuzzification={}",
        settings.and, settings.or, settings.aggregation, settings.defuzzification
    );

    let inputs = crisp_inputs(&system, &options.inputs);
    let result = evaluate(&system, &settings, &inputs)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if options.explain {
        print!("{}", result.explain());
    } else {
        for (name, output) in &result.outputs {
            println!("{} = {:.4}", name, output.value);
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"
aingle-fuzzy - Mamdani fuzzy inference for AIngle

USAGE:
    aingle-fuzzy [OPTIONS] <DESCRIPTION.json> [NAME=VALUE ...]
    aingle-fuzzy [OPTIONS] --builtin <NAME> [NAME=VALUE ...]

OPTIONS:
    -h, --help            Print help information
    -V, --version         Print version information
    -b, --builtin <NAME>  Use a built-in system (fan, comfort)
    -e, --explain         Print inputs, rule strengths and results
        --json            Print the full evaluation as JSON
        --describe        Print the system's canonical description and exit

ENVIRONMENT VARIABLES:
    AINGLE_FUZZY_AND=<min|prod>                 AND operator
    AINGLE_FUZZY_OR=<max|prob_sum>              OR operator
    AINGLE_FUZZY_AGGREGATION=<max|sum_clipped>  Aggregation method
    AINGLE_FUZZY_DEFUZZ=<centroid|mom|lom|som>  Defuzzification method
    RUST_LOG=<level>                            Log filter (default: info)

EXAMPLES:
    # Fan power at 20 degrees
    aingle-fuzzy --builtin fan temperature=20

    # Mean of maxima with a description file
    AINGLE_FUZZY_DEFUZZ=mom aingle-fuzzy system.json temperature=31 --explain
"#
    );
}
