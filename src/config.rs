//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::sim::battery::{DispatchOrder, FULL_CHARGE_EPSILON_KWH};
use crate::sim::slot::parse_hhmm;
use crate::tariff::{RatePeriod, Tariff};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the flat preset. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::flat`] for the
/// built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Battery scenarios and dispatch policy.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Tariff plans to price every scenario under.
    #[serde(default = "default_tariff_plans", rename = "tariff")]
    pub tariffs: Vec<TariffPlanConfig>,
}

/// Battery scenarios and dispatch policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Battery capacities to simulate (kWh); 0 is the no-battery baseline.
    pub battery_capacities_kwh: Vec<f64>,
    /// Per-window operation order: `"consumption-first"` or
    /// `"generation-first"`.
    pub dispatch_order: String,
    /// Margin below capacity at which a window counts as fully charged (kWh).
    pub full_charge_epsilon_kwh: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            battery_capacities_kwh: vec![0.0, 13.5],
            dispatch_order: DispatchOrder::ConsumptionFirst.name().to_string(),
            full_charge_epsilon_kwh: FULL_CHARGE_EPSILON_KWH,
        }
    }
}

/// One tariff plan: a feed-in rate plus either a flat purchase rate or a set
/// of time-of-use periods.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffPlanConfig {
    pub name: String,
    /// Flat rate paid per exported kWh (cents).
    pub feed_in_cents_per_kwh: f64,
    /// Purchase rate for every window (cents/kWh). Mutually exclusive with
    /// `period`.
    #[serde(default)]
    pub flat_rate_cents_per_kwh: Option<f64>,
    /// Time-of-use bands; together they must cover the whole day.
    #[serde(default, rename = "period")]
    pub periods: Vec<RatePeriodConfig>,
}

/// One time-of-use band. `start`/`end` are `"HH:MM"` clock times on the
/// half-hour grid; a band with `start` after `end` wraps past midnight.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatePeriodConfig {
    pub start: String,
    pub end: String,
    pub rate_cents_per_kwh: f64,
}

fn default_tariff_plans() -> Vec<TariffPlanConfig> {
    ScenarioConfig::flat().tariffs
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.dispatch_order"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the flat preset: no-battery baseline plus a 13.5 kWh battery
    /// under a single flat-rate plan.
    pub fn flat() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            tariffs: vec![TariffPlanConfig {
                name: "Flat".to_string(),
                feed_in_cents_per_kwh: 5.0,
                flat_rate_cents_per_kwh: Some(25.0),
                periods: Vec::new(),
            }],
        }
    }

    /// Returns the time-of-use preset: the flat plan plus a peak/shoulder/
    /// off-peak plan for comparison.
    pub fn time_of_use() -> Self {
        let mut config = Self::flat();
        config.tariffs.push(TariffPlanConfig {
            name: "Time of Use".to_string(),
            feed_in_cents_per_kwh: 5.0,
            flat_rate_cents_per_kwh: None,
            periods: vec![
                RatePeriodConfig {
                    start: "22:00".to_string(),
                    end: "07:00".to_string(),
                    rate_cents_per_kwh: 15.0,
                },
                RatePeriodConfig {
                    start: "07:00".to_string(),
                    end: "14:00".to_string(),
                    rate_cents_per_kwh: 25.0,
                },
                RatePeriodConfig {
                    start: "14:00".to_string(),
                    end: "20:00".to_string(),
                    rate_cents_per_kwh: 40.0,
                },
                RatePeriodConfig {
                    start: "20:00".to_string(),
                    end: "22:00".to_string(),
                    rate_cents_per_kwh: 25.0,
                },
            ],
        });
        config
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["flat", "time-of-use"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "flat" => Ok(Self::flat()),
            "time-of-use" => Ok(Self::time_of_use()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// The configured dispatch order, if its name is recognised.
    pub fn dispatch_order(&self) -> Option<DispatchOrder> {
        DispatchOrder::from_name(&self.simulation.dispatch_order)
    }

    /// Compiles every tariff plan to its per-window price table.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for the first plan whose rate structure is
    /// contradictory, unparseable, or does not cover the whole day.
    pub fn build_tariffs(&self) -> Result<Vec<Tariff>, ConfigError> {
        self.tariffs
            .iter()
            .enumerate()
            .map(|(i, plan)| build_tariff(plan, i))
            .collect()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.battery_capacities_kwh.is_empty() {
            errors.push(ConfigError {
                field: "simulation.battery_capacities_kwh".into(),
                message: "must list at least one capacity".into(),
            });
        }
        for (i, capacity) in s.battery_capacities_kwh.iter().enumerate() {
            if !capacity.is_finite() || *capacity < 0.0 {
                errors.push(ConfigError {
                    field: format!("simulation.battery_capacities_kwh[{i}]"),
                    message: format!("must be a finite value >= 0, got {capacity}"),
                });
            }
        }
        if self.dispatch_order().is_none() {
            errors.push(ConfigError {
                field: "simulation.dispatch_order".into(),
                message: format!(
                    "must be one of {:?}, got \"{}\"",
                    DispatchOrder::NAMES,
                    s.dispatch_order
                ),
            });
        }
        if !s.full_charge_epsilon_kwh.is_finite() || s.full_charge_epsilon_kwh < 0.0 {
            errors.push(ConfigError {
                field: "simulation.full_charge_epsilon_kwh".into(),
                message: "must be a finite value >= 0".into(),
            });
        }

        if self.tariffs.is_empty() {
            errors.push(ConfigError {
                field: "tariff".into(),
                message: "must define at least one tariff plan".into(),
            });
        }
        for (i, plan) in self.tariffs.iter().enumerate() {
            if plan.name.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("tariff[{i}].name"),
                    message: "must not be empty".into(),
                });
            }
            if self.tariffs[..i].iter().any(|p| p.name == plan.name) {
                errors.push(ConfigError {
                    field: format!("tariff[{i}].name"),
                    message: format!("duplicate plan name \"{}\"", plan.name),
                });
            }
            if !plan.feed_in_cents_per_kwh.is_finite() || plan.feed_in_cents_per_kwh < 0.0 {
                errors.push(ConfigError {
                    field: format!("tariff[{i}].feed_in_cents_per_kwh"),
                    message: "must be a finite value >= 0".into(),
                });
            }
            if let Err(e) = build_tariff(plan, i) {
                errors.push(e);
            }
        }

        errors
    }
}

fn build_tariff(plan: &TariffPlanConfig, index: usize) -> Result<Tariff, ConfigError> {
    match (&plan.flat_rate_cents_per_kwh, plan.periods.is_empty()) {
        (Some(rate), true) => {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(ConfigError {
                    field: format!("tariff[{index}].flat_rate_cents_per_kwh"),
                    message: "must be a finite value >= 0".into(),
                });
            }
            Ok(Tariff::flat(&plan.name, plan.feed_in_cents_per_kwh, *rate))
        }
        (None, false) => {
            let mut periods = Vec::with_capacity(plan.periods.len());
            for (p, period) in plan.periods.iter().enumerate() {
                if !period.rate_cents_per_kwh.is_finite() || period.rate_cents_per_kwh < 0.0 {
                    return Err(ConfigError {
                        field: format!("tariff[{index}].period[{p}].rate_cents_per_kwh"),
                        message: "must be a finite value >= 0".into(),
                    });
                }
                let start = parse_hhmm(&period.start).ok_or_else(|| ConfigError {
                    field: format!("tariff[{index}].period[{p}].start"),
                    message: format!("\"{}\" is not a valid HH:MM time", period.start),
                })?;
                let end = parse_hhmm(&period.end).ok_or_else(|| ConfigError {
                    field: format!("tariff[{index}].period[{p}].end"),
                    message: format!("\"{}\" is not a valid HH:MM time", period.end),
                })?;
                periods.push(RatePeriod {
                    start_minutes: start,
                    end_minutes: end,
                    rate_cents_per_kwh: period.rate_cents_per_kwh,
                });
            }
            Tariff::from_periods(&plan.name, plan.feed_in_cents_per_kwh, &periods).map_err(|e| {
                ConfigError {
                    field: format!("tariff[{index}].period"),
                    message: e.to_string(),
                }
            })
        }
        (Some(_), false) => Err(ConfigError {
            field: format!("tariff[{index}]"),
            message: "flat_rate_cents_per_kwh and period are mutually exclusive".into(),
        }),
        (None, true) => Err(ConfigError {
            field: format!("tariff[{index}]"),
            message: "must set flat_rate_cents_per_kwh or at least one period".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_preset_valid() {
        let cfg = ScenarioConfig::flat();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "flat preset should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.err();
        assert!(e.is_some_and(|e| e.message.contains("unknown preset")));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
battery_capacities_kwh = [0.0, 6.5, 13.5]
dispatch_order = "generation-first"
full_charge_epsilon_kwh = 0.001

[[tariff]]
name = "Flat"
feed_in_cents_per_kwh = 6.7
flat_rate_cents_per_kwh = 28.0

[[tariff]]
name = "Night Saver"
feed_in_cents_per_kwh = 5.0

[[tariff.period]]
start = "23:00"
end = "07:00"
rate_cents_per_kwh = 12.0

[[tariff.period]]
start = "07:00"
end = "23:00"
rate_cents_per_kwh = 32.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(
            cfg.as_ref().map(|c| c.simulation.battery_capacities_kwh.len()),
            Some(3)
        );
        assert_eq!(
            cfg.as_ref().map(|c| c.dispatch_order()),
            Some(Some(DispatchOrder::GenerationFirst))
        );
        assert_eq!(cfg.as_ref().map(|c| c.tariffs.len()), Some(2));
        let errors = cfg.map(|c| c.validate()).unwrap_or_default();
        assert!(errors.is_empty(), "should validate: {errors:?}");
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
battery_capacities_kwh = [0.0]
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
battery_capacities_kwh = [7.0]
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(
            cfg.as_ref()
                .map(|c| c.simulation.battery_capacities_kwh.clone()),
            Some(vec![7.0])
        );
        // dispatch order and tariffs fall back to the flat preset defaults
        assert_eq!(
            cfg.as_ref().map(|c| c.dispatch_order()),
            Some(Some(DispatchOrder::ConsumptionFirst))
        );
        assert_eq!(cfg.as_ref().map(|c| c.tariffs.len()), Some(1));
    }

    #[test]
    fn validation_catches_negative_capacity() {
        let mut cfg = ScenarioConfig::flat();
        cfg.simulation.battery_capacities_kwh = vec![13.5, -1.0];
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "simulation.battery_capacities_kwh[1]")
        );
    }

    #[test]
    fn validation_catches_bad_dispatch_order() {
        let mut cfg = ScenarioConfig::flat();
        cfg.simulation.dispatch_order = "solar-first".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.dispatch_order"));
    }

    #[test]
    fn validation_catches_duplicate_plan_names() {
        let mut cfg = ScenarioConfig::flat();
        let duplicate = cfg.tariffs[0].clone();
        cfg.tariffs.push(duplicate);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tariff[1].name"));
    }

    #[test]
    fn validation_catches_contradictory_rate_structure() {
        let mut cfg = ScenarioConfig::time_of_use();
        cfg.tariffs[1].flat_rate_cents_per_kwh = Some(20.0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tariff[1]"));
    }

    #[test]
    fn validation_catches_uncovered_day() {
        let mut cfg = ScenarioConfig::flat();
        cfg.tariffs[0].flat_rate_cents_per_kwh = None;
        cfg.tariffs[0].periods = vec![RatePeriodConfig {
            start: "00:00".to_string(),
            end: "12:00".to_string(),
            rate_cents_per_kwh: 20.0,
        }];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tariff[0].period"));
    }

    #[test]
    fn build_tariffs_compiles_time_of_use_bands() {
        let cfg = ScenarioConfig::time_of_use();
        let tariffs = cfg.build_tariffs().unwrap();
        assert_eq!(tariffs.len(), 2);
        // 15:00 falls in the peak band of the second plan.
        assert_eq!(tariffs[1].price_at(30), 40.0);
        // 02:00 falls in the overnight off-peak band.
        assert_eq!(tariffs[1].price_at(4), 15.0);
    }
}
