//! Shared test fixtures for integration tests.

use chrono::NaiveDate;
use pv_battery_sim::sim::day::{MeterDay, WindowReading};
use pv_battery_sim::sim::slot::{SLOTS_PER_DAY, label_at};

/// Builds a date without the `Option` noise.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builds a meter day with `(index, consumption, generation)` overrides over
/// zeroed windows.
pub fn meter_day(date: NaiveDate, values: &[(usize, f64, f64)]) -> MeterDay {
    let mut day = MeterDay::empty(date);
    for &(index, consumption, generation) in values {
        day.slots[index] = WindowReading {
            consumption_kwh: consumption,
            generation_kwh: generation,
        };
    }
    day
}

/// The standard meter CSV header: date, type, then all 48 window labels.
pub fn csv_header() -> String {
    let mut header = String::from("date,type");
    for index in 0..SLOTS_PER_DAY {
        header.push(',');
        header.push_str(&label_at(index));
    }
    header
}

/// One CSV data row with `(index, value)` overrides over zero-filled windows.
pub fn csv_row(date: &str, flow: &str, values: &[(usize, f64)]) -> String {
    let mut cells = vec!["0.0".to_string(); SLOTS_PER_DAY];
    for &(index, value) in values {
        cells[index] = format!("{value}");
    }
    format!("{date},{flow},{}", cells.join(","))
}

/// A complete CSV document from header plus rows.
pub fn csv_document(rows: &[String]) -> String {
    let mut out = csv_header();
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}
