//! CSV export for a simulated half-hour series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::engine::SimulatedDay;
use crate::sim::slot::label_at;

/// Column header for the simulated-series export.
const HEADER: &str = "date,window,consumption_kwh,generation_kwh,battery_charge_kwh,at_max_charge";

/// Exports a simulated series to a CSV file at the given path.
///
/// Writes a header row followed by one row per day per window, in
/// chronological order. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(days: &[SimulatedDay], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(days, buf)
}

/// Writes a simulated series as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(days: &[SimulatedDay], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for day in days {
        let date = day.date.format("%Y-%m-%d").to_string();
        for (index, window) in day.slots.iter().enumerate() {
            wtr.write_record(&[
                date.clone(),
                label_at(index),
                format!("{:.4}", window.consumption_kwh),
                format!("{:.4}", window.generation_kwh),
                format!("{:.4}", window.battery_charge_kwh),
                window.at_max_charge.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
