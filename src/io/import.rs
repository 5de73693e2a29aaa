//! Smart-meter CSV ingestion.
//!
//! Accepts the interval-data export format: a header row with a date column,
//! a flow-type column, and one labelled column per half-hour window
//! (`"00:00 - 00:30"` … `"23:30 - 24:00"`), then one row per (date, flow).
//! Bad data is a hard error naming the offending line and column — a wrong
//! number silently coerced to zero would corrupt every cost figure downstream.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::sim::day::{FlowKind, MeterRow};
use crate::sim::slot::{SLOTS_PER_DAY, index_of, label_at, parse_label};

/// Accepted header names for the flow-type column.
const FLOW_HEADERS: &[&str] = &["type", "flow"];

/// Accepted date formats, tried in order.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

/// Ingestion failure with enough context to locate the bad input.
#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// No header matched the date column.
    MissingDateColumn,
    /// No header matched the flow-type column.
    MissingFlowColumn,
    /// Two headers named the same half-hour window.
    DuplicateSlotColumn { label: String },
    /// A half-hour window has no column.
    MissingSlotColumn { label: String },
    /// The flow tag is neither `Generation` nor `Consumption`.
    UnknownFlowTag { line: u64, tag: String },
    /// The date field did not parse in any accepted format.
    BadDate { line: u64, value: String },
    /// A window value is not a non-negative finite number.
    BadSlotValue {
        line: u64,
        label: String,
        value: String,
    },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read meter data: {err}"),
            Self::Csv(err) => write!(f, "malformed CSV: {err}"),
            Self::MissingDateColumn => write!(f, "header has no \"date\" column"),
            Self::MissingFlowColumn => {
                write!(f, "header has no flow-type column (\"type\" or \"flow\")")
            }
            Self::DuplicateSlotColumn { label } => {
                write!(f, "header names window \"{label}\" more than once")
            }
            Self::MissingSlotColumn { label } => {
                write!(f, "header is missing window column \"{label}\"")
            }
            Self::UnknownFlowTag { line, tag } => write!(
                f,
                "line {line}: flow type \"{tag}\" is not \"Generation\" or \"Consumption\""
            ),
            Self::BadDate { line, value } => {
                write!(f, "line {line}: \"{value}\" is not a valid date")
            }
            Self::BadSlotValue { line, label, value } => write!(
                f,
                "line {line}, window \"{label}\": \"{value}\" is not a non-negative number"
            ),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Column positions resolved from the header row.
struct HeaderLayout {
    date_col: usize,
    flow_col: usize,
    /// Record index of each window column, in dense slot order.
    slot_cols: [usize; SLOTS_PER_DAY],
}

impl HeaderLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let mut date_col = None;
        let mut flow_col = None;
        let mut slot_cols = [usize::MAX; SLOTS_PER_DAY];

        for (col, header) in headers.iter().enumerate() {
            let header = header.trim();
            if let Some(key) = parse_label(header) {
                let index = index_of(key).unwrap_or(0);
                if slot_cols[index] != usize::MAX {
                    return Err(ImportError::DuplicateSlotColumn {
                        label: header.to_string(),
                    });
                }
                slot_cols[index] = col;
            } else if header.eq_ignore_ascii_case("date") {
                date_col = Some(col);
            } else if FLOW_HEADERS.iter().any(|h| header.eq_ignore_ascii_case(h)) {
                flow_col = Some(col);
            }
            // Other columns (meter serial numbers and the like) are ignored.
        }

        if let Some(index) = slot_cols.iter().position(|&col| col == usize::MAX) {
            return Err(ImportError::MissingSlotColumn {
                label: label_at(index),
            });
        }

        Ok(Self {
            date_col: date_col.ok_or(ImportError::MissingDateColumn)?,
            flow_col: flow_col.ok_or(ImportError::MissingFlowColumn)?,
            slot_cols,
        })
    }

    fn parse_record(&self, record: &StringRecord, line: u64) -> Result<MeterRow, ImportError> {
        let date_text = record.get(self.date_col).unwrap_or("").trim();
        let date = parse_date(date_text).ok_or_else(|| ImportError::BadDate {
            line,
            value: date_text.to_string(),
        })?;

        let tag = record.get(self.flow_col).unwrap_or("").trim();
        let flow = if tag.eq_ignore_ascii_case("consumption") {
            FlowKind::Consumption
        } else if tag.eq_ignore_ascii_case("generation") {
            FlowKind::Generation
        } else {
            return Err(ImportError::UnknownFlowTag {
                line,
                tag: tag.to_string(),
            });
        };

        let mut slot_kwh = [0.0; SLOTS_PER_DAY];
        for (index, &col) in self.slot_cols.iter().enumerate() {
            let text = record.get(col).unwrap_or("").trim();
            let value: f64 = text.parse().map_err(|_| ImportError::BadSlotValue {
                line,
                label: label_at(index),
                value: text.to_string(),
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(ImportError::BadSlotValue {
                    line,
                    label: label_at(index),
                    value: text.to_string(),
                });
            }
            slot_kwh[index] = value;
        }

        Ok(MeterRow {
            date,
            flow,
            slot_kwh,
        })
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Reads raw meter rows from any reader.
///
/// # Errors
///
/// Returns an `ImportError` on the first malformed header, date, flow tag,
/// or window value; nothing is silently substituted.
pub fn read_meter_rows<R: Read>(reader: R) -> Result<Vec<MeterRow>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let layout = HeaderLayout::from_headers(rdr.headers()?)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        rows.push(layout.parse_record(&record, line)?);
    }
    Ok(rows)
}

/// Reads raw meter rows from a CSV file.
///
/// # Errors
///
/// Returns an `ImportError` if the file cannot be opened or any row fails to
/// parse.
pub fn read_meter_rows_path(path: &Path) -> Result<Vec<MeterRow>, ImportError> {
    let file = File::open(path).map_err(ImportError::Io)?;
    read_meter_rows(file)
}
