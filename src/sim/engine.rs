//! Day-sequence battery simulation with carried end-of-day charge.
//!
//! The simulator is an explicit fold over chronologically ordered meter days:
//! each day is transformed with the charge it inherited from the previous
//! day's last window, and returns the charge it hands to the next. Inputs
//! are never mutated; every stage produces fresh records.

use std::error::Error;
use std::fmt;

use chrono::NaiveDate;

use super::battery::{
    DispatchOrder, FULL_CHARGE_EPSILON_KWH, charge_from_generation, discharge_for_consumption,
    reaches_full_charge,
};
use super::day::MeterDay;
use super::slot::SLOTS_PER_DAY;

/// Parameters of one battery simulation scenario.
#[derive(Debug, Clone, Copy)]
pub struct BatteryParams {
    /// Usable battery capacity (kWh). Zero models the no-battery baseline.
    pub capacity_kwh: f64,
    /// Which of the two per-window operations runs first.
    pub dispatch_order: DispatchOrder,
    /// Margin below capacity at which a window counts as fully charged.
    pub full_charge_epsilon_kwh: f64,
}

impl BatteryParams {
    /// Creates parameters with the canonical dispatch order and epsilon.
    pub fn new(capacity_kwh: f64) -> Self {
        Self {
            capacity_kwh,
            dispatch_order: DispatchOrder::ConsumptionFirst,
            full_charge_epsilon_kwh: FULL_CHARGE_EPSILON_KWH,
        }
    }

    /// Validates the parameters before any simulation work.
    ///
    /// # Errors
    ///
    /// Returns `SimError::NegativeCapacity` or `SimError::NegativeEpsilon`
    /// when the respective value is negative or not finite.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.capacity_kwh.is_finite() || self.capacity_kwh < 0.0 {
            return Err(SimError::NegativeCapacity(self.capacity_kwh));
        }
        if !self.full_charge_epsilon_kwh.is_finite() || self.full_charge_epsilon_kwh < 0.0 {
            return Err(SimError::NegativeEpsilon(self.full_charge_epsilon_kwh));
        }
        Ok(())
    }
}

/// One half-hour window after battery dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedWindow {
    /// Energy still bought from the grid (kWh).
    pub consumption_kwh: f64,
    /// Energy still exported to the grid (kWh).
    pub generation_kwh: f64,
    /// Battery charge at the end of the window (kWh).
    pub battery_charge_kwh: f64,
    /// Whether the ending charge is within epsilon of capacity.
    pub at_max_charge: bool,
}

/// One calendar day after battery dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedDay {
    pub date: NaiveDate,
    pub slots: [SimulatedWindow; SLOTS_PER_DAY],
}

impl SimulatedDay {
    /// Battery charge at the end of the day's last window (kWh).
    pub fn closing_charge_kwh(&self) -> f64 {
        self.slots[SLOTS_PER_DAY - 1].battery_charge_kwh
    }

    /// Whether any window of this day ended within epsilon of capacity.
    pub fn reached_full_charge(&self) -> bool {
        self.slots.iter().any(|w| w.at_max_charge)
    }
}

/// Simulation configuration or input-ordering error.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Battery capacity was negative or not finite.
    NegativeCapacity(f64),
    /// Full-charge epsilon was negative or not finite.
    NegativeEpsilon(f64),
    /// The day sequence was not strictly ascending by date.
    OutOfOrder { prev: NaiveDate, next: NaiveDate },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeCapacity(value) => {
                write!(f, "battery capacity must be >= 0 kWh, got {value}")
            }
            Self::NegativeEpsilon(value) => {
                write!(f, "full-charge epsilon must be >= 0 kWh, got {value}")
            }
            Self::OutOfOrder { prev, next } => write!(
                f,
                "meter days must be strictly ascending by date: {next} follows {prev}"
            ),
        }
    }
}

impl Error for SimError {}

/// Simulates one day from a starting charge.
///
/// Returns the simulated day and the charge handed to the next day. This is
/// the fold step of [`simulate`]; exposing it keeps the dependency on
/// processing order explicit and lets a single day be tested in isolation.
pub fn simulate_day(
    day: &MeterDay,
    start_charge_kwh: f64,
    params: &BatteryParams,
) -> (SimulatedDay, f64) {
    let mut charge = start_charge_kwh;
    let mut slots = [SimulatedWindow {
        consumption_kwh: 0.0,
        generation_kwh: 0.0,
        battery_charge_kwh: 0.0,
        at_max_charge: false,
    }; SLOTS_PER_DAY];

    for (index, reading) in day.slots.iter().enumerate() {
        let (remaining_consumption, remaining_generation) = match params.dispatch_order {
            DispatchOrder::ConsumptionFirst => {
                let (after_discharge, remaining_consumption) =
                    discharge_for_consumption(charge, reading.consumption_kwh);
                let (after_charge, remaining_generation) = charge_from_generation(
                    after_discharge,
                    params.capacity_kwh,
                    reading.generation_kwh,
                );
                charge = after_charge;
                (remaining_consumption, remaining_generation)
            }
            DispatchOrder::GenerationFirst => {
                let (after_charge, remaining_generation) =
                    charge_from_generation(charge, params.capacity_kwh, reading.generation_kwh);
                let (after_discharge, remaining_consumption) =
                    discharge_for_consumption(after_charge, reading.consumption_kwh);
                charge = after_discharge;
                (remaining_consumption, remaining_generation)
            }
        };

        slots[index] = SimulatedWindow {
            consumption_kwh: remaining_consumption,
            generation_kwh: remaining_generation,
            battery_charge_kwh: charge,
            at_max_charge: reaches_full_charge(
                charge,
                params.capacity_kwh,
                params.full_charge_epsilon_kwh,
            ),
        };
    }

    (
        SimulatedDay {
            date: day.date,
            slots,
        },
        charge,
    )
}

/// Simulates a chronologically ordered day sequence from an empty battery.
///
/// The charge at each day's last window becomes the next day's starting
/// charge; there is no reset between days.
///
/// # Errors
///
/// Returns a `SimError` if the parameters are invalid or the days are not
/// strictly ascending by date. Validation happens before any day is
/// simulated.
pub fn simulate(days: &[MeterDay], params: &BatteryParams) -> Result<Vec<SimulatedDay>, SimError> {
    params.validate()?;
    for pair in days.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(SimError::OutOfOrder {
                prev: pair[0].date,
                next: pair[1].date,
            });
        }
    }

    let mut simulated = Vec::with_capacity(days.len());
    let mut charge = 0.0;
    for day in days {
        let (sim_day, end_charge) = simulate_day(day, charge, params);
        simulated.push(sim_day);
        charge = end_charge;
    }
    Ok(simulated)
}
