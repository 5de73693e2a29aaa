//! Calendar-month and calendar-year aggregation of a simulated series.
//!
//! Computed in one pass from `&[SimulatedDay]` so bucket fields stay
//! consistent with the per-window data. Battery intake deltas are tracked
//! continuously across day boundaries, mirroring the carried charge in the
//! simulator.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::sim::engine::SimulatedDay;
use crate::tariff::Tariff;

/// Summed cost and energy figures for one month or one year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    /// Energy bought from the grid (kWh).
    pub consumed_kwh: f64,
    /// Cost of bought energy (cents).
    pub consumption_cost_cents: f64,
    /// Energy exported to the grid (kWh).
    pub generated_kwh: f64,
    /// Feed-in earnings for exported energy (cents).
    pub generation_earnings_cents: f64,
    /// Energy pushed into the battery: sum of positive charge deltas (kWh).
    pub battery_charged_kwh: f64,
    /// Days with at least one window at full charge.
    pub days_reached_full_charge: u32,
}

impl Bucket {
    /// Net cost: purchases minus feed-in earnings (cents). Derived, not
    /// stored.
    pub fn net_cost_cents(&self) -> f64 {
        self.consumption_cost_cents - self.generation_earnings_cents
    }

    fn accumulate(&mut self, other: &Bucket) {
        self.consumed_kwh += other.consumed_kwh;
        self.consumption_cost_cents += other.consumption_cost_cents;
        self.generated_kwh += other.generated_kwh;
        self.generation_earnings_cents += other.generation_earnings_cents;
        self.battery_charged_kwh += other.battery_charged_kwh;
        self.days_reached_full_charge += other.days_reached_full_charge;
    }
}

/// Month and year buckets for one simulated scenario under one tariff.
///
/// Month keys are `"YYYY-MM"`, year keys `"YYYY"`; `BTreeMap` keeps both in
/// chronological order for reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub by_month: BTreeMap<String, Bucket>,
    pub by_year: BTreeMap<String, Bucket>,
}

/// Folds a simulated day sequence into month and year buckets.
///
/// Every window contributes `consumption * price[window]` to cost and
/// `generation * feed_in` to earnings. Battery intake counts only positive
/// charge deltas between consecutive windows, seeded from the simulator's
/// initial charge of zero and never reset at day or bucket boundaries.
pub fn aggregate(days: &[SimulatedDay], tariff: &Tariff) -> Summary {
    let mut summary = Summary::default();
    let mut prev_charge_kwh = 0.0;

    for day in days {
        let mut day_bucket = Bucket::default();
        for (index, window) in day.slots.iter().enumerate() {
            day_bucket.consumed_kwh += window.consumption_kwh;
            day_bucket.consumption_cost_cents += window.consumption_kwh * tariff.price_at(index);
            day_bucket.generated_kwh += window.generation_kwh;
            day_bucket.generation_earnings_cents +=
                window.generation_kwh * tariff.feed_in_cents_per_kwh;

            let delta = window.battery_charge_kwh - prev_charge_kwh;
            if delta > 0.0 {
                day_bucket.battery_charged_kwh += delta;
            }
            prev_charge_kwh = window.battery_charge_kwh;
        }
        if day.reached_full_charge() {
            day_bucket.days_reached_full_charge = 1;
        }

        let month_key = format!("{:04}-{:02}", day.date.year(), day.date.month());
        let year_key = format!("{:04}", day.date.year());
        summary
            .by_month
            .entry(month_key)
            .or_default()
            .accumulate(&day_bucket);
        summary
            .by_year
            .entry(year_key)
            .or_default()
            .accumulate(&day_bucket);
    }

    summary
}
