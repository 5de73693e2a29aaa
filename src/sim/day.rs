//! Raw meter-day records and the per-date merge builder.
//!
//! A smart-meter export reports generation and consumption as separate rows
//! for the same calendar date. The merge builder folds those rows into one
//! [`MeterDay`] per distinct date with both channels populated per window.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::slot::SLOTS_PER_DAY;

/// Raw half-hour reading: energy drawn from and exported to the grid.
///
/// Immutable once parsed; both quantities are non-negative before simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowReading {
    /// Energy consumed from the grid in this window (kWh).
    pub consumption_kwh: f64,
    /// Energy generated and exported in this window (kWh).
    pub generation_kwh: f64,
}

/// Which channel a raw meter row reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Consumption,
    Generation,
}

/// One raw row from a meter export: a date, a flow channel, and 48 window
/// values in slot order.
#[derive(Debug, Clone)]
pub struct MeterRow {
    pub date: NaiveDate,
    pub flow: FlowKind,
    pub slot_kwh: [f64; SLOTS_PER_DAY],
}

/// All raw readings for one calendar date, both channels merged.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterDay {
    pub date: NaiveDate,
    pub slots: [WindowReading; SLOTS_PER_DAY],
}

impl MeterDay {
    /// Returns a day with every window zeroed, the accumulator base for
    /// merging.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            slots: [WindowReading::default(); SLOTS_PER_DAY],
        }
    }

    /// Sum of consumption across all 48 windows (kWh).
    pub fn total_consumption_kwh(&self) -> f64 {
        self.slots.iter().map(|w| w.consumption_kwh).sum()
    }

    /// Sum of generation across all 48 windows (kWh).
    pub fn total_generation_kwh(&self) -> f64 {
        self.slots.iter().map(|w| w.generation_kwh).sum()
    }
}

/// Merges raw rows into one [`MeterDay`] per distinct date, sorted ascending.
///
/// Rows are grouped by exact date equality and summed per window per channel,
/// so duplicate feeds merge additively and input order never changes the
/// totals. Ascending output is what the simulator requires as input.
pub fn merge_rows(rows: &[MeterRow]) -> Vec<MeterDay> {
    let mut by_date: BTreeMap<NaiveDate, MeterDay> = BTreeMap::new();

    for row in rows {
        let day = by_date
            .entry(row.date)
            .or_insert_with(|| MeterDay::empty(row.date));
        for (window, kwh) in day.slots.iter_mut().zip(row.slot_kwh.iter()) {
            match row.flow {
                FlowKind::Consumption => window.consumption_kwh += kwh,
                FlowKind::Generation => window.generation_kwh += kwh,
            }
        }
    }

    by_date.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date: NaiveDate, flow: FlowKind, values: &[(usize, f64)]) -> MeterRow {
        let mut slot_kwh = [0.0; SLOTS_PER_DAY];
        for &(index, kwh) in values {
            slot_kwh[index] = kwh;
        }
        MeterRow {
            date,
            flow,
            slot_kwh,
        }
    }

    #[test]
    fn merges_both_channels_for_one_date() {
        let d = date(2023, 7, 14);
        let rows = vec![
            row(d, FlowKind::Consumption, &[(0, 1.5), (20, 0.3)]),
            row(d, FlowKind::Generation, &[(20, 2.0)]),
        ];
        let days = merge_rows(&rows);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, d);
        assert_eq!(days[0].slots[0].consumption_kwh, 1.5);
        assert_eq!(days[0].slots[20].consumption_kwh, 0.3);
        assert_eq!(days[0].slots[20].generation_kwh, 2.0);
        assert_eq!(days[0].slots[0].generation_kwh, 0.0);
    }

    #[test]
    fn duplicate_feeds_merge_additively() {
        let d = date(2023, 7, 14);
        let rows = vec![
            row(d, FlowKind::Consumption, &[(5, 1.0)]),
            row(d, FlowKind::Consumption, &[(5, 0.25)]),
        ];
        let days = merge_rows(&rows);
        assert_eq!(days.len(), 1);
        assert!((days[0].slots[5].consumption_kwh - 1.25).abs() < 1e-12);
    }

    #[test]
    fn merge_is_order_independent() {
        let a = row(date(2023, 7, 14), FlowKind::Consumption, &[(3, 0.7)]);
        let b = row(date(2023, 7, 14), FlowKind::Generation, &[(3, 1.1)]);
        let c = row(date(2023, 7, 15), FlowKind::Consumption, &[(3, 0.2)]);

        let forward = merge_rows(&[a.clone(), b.clone(), c.clone()]);
        let backward = merge_rows(&[c, b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn output_is_sorted_ascending_with_one_record_per_date() {
        let rows = vec![
            row(date(2023, 8, 2), FlowKind::Consumption, &[(0, 1.0)]),
            row(date(2023, 7, 30), FlowKind::Consumption, &[(0, 1.0)]),
            row(date(2023, 8, 1), FlowKind::Generation, &[(0, 1.0)]),
            row(date(2023, 7, 30), FlowKind::Generation, &[(0, 1.0)]),
        ];
        let days = merge_rows(&rows);
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![date(2023, 7, 30), date(2023, 8, 1), date(2023, 8, 2)]
        );
    }

    #[test]
    fn same_weekday_different_dates_stay_separate() {
        // Two Mondays a week apart must not collapse into one record.
        let rows = vec![
            row(date(2023, 7, 3), FlowKind::Consumption, &[(0, 1.0)]),
            row(date(2023, 7, 10), FlowKind::Consumption, &[(0, 2.0)]),
        ];
        let days = merge_rows(&rows);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].slots[0].consumption_kwh, 1.0);
        assert_eq!(days[1].slots[0].consumption_kwh, 2.0);
    }

    #[test]
    fn day_totals_sum_all_windows() {
        let d = date(2023, 7, 14);
        let rows = vec![
            row(d, FlowKind::Consumption, &[(0, 1.0), (47, 2.0)]),
            row(d, FlowKind::Generation, &[(24, 4.5)]),
        ];
        let days = merge_rows(&rows);
        assert!((days[0].total_consumption_kwh() - 3.0).abs() < 1e-12);
        assert!((days[0].total_generation_kwh() - 4.5).abs() < 1e-12);
    }
}
