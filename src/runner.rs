//! Scenario fan-out across battery capacities and tariff plans.
//!
//! Every (capacity, tariff) pair is an independent computation with its own
//! simulation state and buckets; one simulation per capacity is shared across
//! that capacity's tariff evaluations, since pricing does not feed back into
//! dispatch.

use std::error::Error;
use std::fmt;

use crate::aggregate::{Summary, aggregate};
use crate::config::{ConfigError, ScenarioConfig};
use crate::sim::battery::DispatchOrder;
use crate::sim::day::MeterDay;
use crate::sim::engine::{BatteryParams, SimError, SimulatedDay, simulate};

/// Month/year summary for one tariff plan.
#[derive(Debug, Clone)]
pub struct TariffSummary {
    pub tariff_name: String,
    pub summary: Summary,
}

/// All results for one battery capacity: the simulated series plus one
/// summary per tariff plan.
#[derive(Debug, Clone)]
pub struct CapacityRun {
    pub capacity_kwh: f64,
    pub days: Vec<SimulatedDay>,
    pub tariffs: Vec<TariffSummary>,
}

/// Scenario evaluation failure.
#[derive(Debug)]
pub enum RunError {
    Config(ConfigError),
    Sim(SimError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Sim(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RunError {}

impl From<ConfigError> for RunError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<SimError> for RunError {
    fn from(err: SimError) -> Self {
        Self::Sim(err)
    }
}

/// Evaluates every configured battery capacity under every tariff plan.
///
/// `meter_days` must be the merged, date-sorted series (the merge builder's
/// output). Returns one [`CapacityRun`] per capacity, in config order.
///
/// # Errors
///
/// Returns a `RunError` if the config's tariffs or dispatch order do not
/// compile, or if simulation parameters or day ordering are invalid. All
/// validation happens before the first simulation.
pub fn run_scenarios(
    config: &ScenarioConfig,
    meter_days: &[MeterDay],
) -> Result<Vec<CapacityRun>, RunError> {
    let tariffs = config.build_tariffs()?;
    let dispatch_order: DispatchOrder =
        config.dispatch_order().ok_or_else(|| ConfigError {
            field: "simulation.dispatch_order".to_string(),
            message: format!(
                "must be one of {:?}, got \"{}\"",
                DispatchOrder::NAMES,
                config.simulation.dispatch_order
            ),
        })?;

    let mut runs = Vec::with_capacity(config.simulation.battery_capacities_kwh.len());
    for &capacity_kwh in &config.simulation.battery_capacities_kwh {
        let params = BatteryParams {
            capacity_kwh,
            dispatch_order,
            full_charge_epsilon_kwh: config.simulation.full_charge_epsilon_kwh,
        };
        let days = simulate(meter_days, &params)?;

        let tariffs = tariffs
            .iter()
            .map(|tariff| TariffSummary {
                tariff_name: tariff.name.clone(),
                summary: aggregate(&days, tariff),
            })
            .collect();

        runs.push(CapacityRun {
            capacity_kwh,
            days,
            tariffs,
        });
    }
    Ok(runs)
}
