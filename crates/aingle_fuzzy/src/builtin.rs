//! Built-in fuzzy systems
//!
//! Ready-made systems for demonstrations and tests:
//! - `fan_controller`: one input, one output, three single-antecedent rules
//! - `comfort_controller`: two inputs, two outputs, mixed AND/OR rules over
//!   triangular, trapezoidal and Gaussian sets

use crate::membership::MembershipFunction;
use crate::model::{Antecedent, Consequent, Logic, Rule, System, Universe, Variable};

/// A collection of pre-defined fuzzy systems.
pub struct BuiltinSystems;

fn tri(a: f64, b: f64, c: f64) -> MembershipFunction {
    MembershipFunction::Triangular { a, b, c }
}

fn trap(a: f64, b: f64, c: f64, d: f64) -> MembershipFunction {
    MembershipFunction::Trapezoidal { a, b, c, d }
}

fn gauss(sigma: f64, mean: f64) -> MembershipFunction {
    MembershipFunction::Gaussian { sigma, mean }
}

fn variable(name: &str, min: f64, max: f64, sets: &[(&str, MembershipFunction)]) -> Variable {
    let mut var = Variable::new(name, Universe::from_bounds(min, max));
    for (set, function) in sets {
        var.insert_set(*set, *function);
    }
    var
}

fn rule(antecedents: &[(&str, &str)], consequent: (&str, &str), logic: Logic) -> Rule {
    Rule::from_parts(
        antecedents
            .iter()
            .map(|(v, s)| Antecedent::new(*v, *s))
            .collect(),
        Consequent::new(consequent.0, consequent.1),
        logic,
    )
}

impl BuiltinSystems {
    /// Names accepted by [`BuiltinSystems::by_name`].
    pub const NAMES: [&'static str; 2] = ["fan", "comfort"];

    /// Looks up a built-in system by name.
    pub fn by_name(name: &str) -> Option<System> {
        match name {
            "fan" | "fan_controller" => Some(Self::fan_controller()),
            "comfort" | "comfort_controller" => Some(Self::comfort_controller()),
            _ => None,
        }
    }

    /// Fan power from room temperature.
    ///
    /// `temperature` over `[0, 40]` (cold, warm, hot) drives `power` over
    /// `[0, 100]` (low, mid, high) through one rule per set.
    pub fn fan_controller() -> System {
        let temperature = variable(
            "temperature",
            0.0,
            40.0,
            &[
                ("cold", tri(0.0, 0.0, 15.0)),
                ("warm", tri(10.0, 20.0, 30.0)),
                ("hot", tri(25.0, 40.0, 40.0)),
            ],
        );
        let power = variable(
            "power",
            0.0,
            100.0,
            &[
                ("low", tri(0.0, 0.0, 50.0)),
                ("mid", tri(25.0, 50.0, 75.0)),
                ("high", tri(50.0, 100.0, 100.0)),
            ],
        );
        let rules = vec![
            rule(&[("temperature", "cold")], ("power", "low"), Logic::And),
            rule(&[("temperature", "warm")], ("power", "mid"), Logic::And),
            rule(&[("temperature", "hot")], ("power", "high"), Logic::And),
        ];
        System::from_parts(vec![temperature], vec![power], rules)
    }

    /// Fan speed and heater level from temperature and relative humidity.
    pub fn comfort_controller() -> System {
        let temperature = variable(
            "temperature",
            0.0,
            40.0,
            &[
                ("cold", trap(0.0, 0.0, 10.0, 18.0)),
                ("pleasant", tri(15.0, 22.0, 29.0)),
                ("hot", trap(26.0, 32.0, 40.0, 40.0)),
            ],
        );
        let humidity = variable(
            "humidity",
            0.0,
            100.0,
            &[
                ("dry", gauss(15.0, 0.0)),
                ("normal", gauss(15.0, 50.0)),
                ("humid", gauss(15.0, 100.0)),
            ],
        );
        let fan_speed = variable(
            "fan_speed",
            0.0,
            100.0,
            &[
                ("off", tri(0.0, 0.0, 30.0)),
                ("medium", tri(20.0, 50.0, 80.0)),
                ("high", tri(60.0, 100.0, 100.0)),
            ],
        );
        let heater = variable(
            "heater",
            0.0,
            10.0,
            &[("off", tri(0.0, 0.0, 5.0)), ("on", tri(3.0, 10.0, 10.0))],
        );
        let rules = vec![
            rule(
                &[("temperature", "hot"), ("humidity", "humid")],
                ("fan_speed", "high"),
                Logic::Or,
            ),
            rule(
                &[("temperature", "pleasant"), ("humidity", "normal")],
                ("fan_speed", "medium"),
                Logic::And,
            ),
            rule(&[("temperature", "cold")], ("fan_speed", "off"), Logic::And),
            rule(
                &[("temperature", "cold"), ("humidity", "dry")],
                ("heater", "on"),
                Logic::And,
            ),
            rule(
                &[("temperature", "pleasant"), ("temperature", "hot")],
                ("heater", "off"),
                Logic::Or,
            ),
        ];
        System::from_parts(vec![temperature, humidity], vec![fan_speed, heater], rules)
    }
}
