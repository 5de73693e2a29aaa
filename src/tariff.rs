//! Tariff plans: a flat feed-in rate plus per-window purchase prices.
//!
//! A plan is either a single flat rate or a set of `[start, end)` time-of-use
//! bands. Either way it compiles down to a dense 48-entry price table, so
//! aggregation never looks up a possibly-absent key.

use std::error::Error;
use std::fmt;

use crate::sim::slot::{SLOT_MINUTES, SLOTS_PER_DAY, key_at};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// One time-of-use band: `[start, end)` in minutes since midnight.
///
/// Bands with `start > end` wrap past midnight (an overnight off-peak band).
/// `end` may be 1440 to name the end of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePeriod {
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub rate_cents_per_kwh: f64,
}

/// A tariff plan compiled to a per-window price table.
#[derive(Debug, Clone, PartialEq)]
pub struct Tariff {
    pub name: String,
    /// Flat rate paid for every exported kWh (cents).
    pub feed_in_cents_per_kwh: f64,
    /// Grid purchase price per window (cents/kWh), indexed densely.
    pub price_cents_per_kwh: [f64; SLOTS_PER_DAY],
}

/// Tariff construction error: the band set does not tile the day.
#[derive(Debug, Clone, PartialEq)]
pub enum TariffError {
    /// A band boundary is not on a half-hour mark (minutes since midnight).
    UnalignedBoundary { minutes: u32 },
    /// A band has zero width.
    EmptyPeriod { start_minutes: u32 },
    /// Two bands both price the window with this key.
    OverlappingSlot { key: u32 },
    /// No band prices the window with this key.
    UncoveredSlot { key: u32 },
}

impl fmt::Display for TariffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnalignedBoundary { minutes } => write!(
                f,
                "period boundary at minute {minutes} is not on a half-hour mark"
            ),
            Self::EmptyPeriod { start_minutes } => {
                write!(f, "period starting at minute {start_minutes} has zero width")
            }
            Self::OverlappingSlot { key } => write!(
                f,
                "window {:02}:{:02} is priced by more than one period",
                key / 60,
                key % 60
            ),
            Self::UncoveredSlot { key } => write!(
                f,
                "window {:02}:{:02} has no price in any period",
                key / 60,
                key % 60
            ),
        }
    }
}

impl Error for TariffError {}

impl Tariff {
    /// Builds a plan with one price for every window.
    pub fn flat(name: &str, feed_in_cents_per_kwh: f64, rate_cents_per_kwh: f64) -> Self {
        Self {
            name: name.to_string(),
            feed_in_cents_per_kwh,
            price_cents_per_kwh: [rate_cents_per_kwh; SLOTS_PER_DAY],
        }
    }

    /// Builds a time-of-use plan from bands that must tile the whole day.
    ///
    /// # Errors
    ///
    /// Returns a `TariffError` when a boundary is off the half-hour grid, a
    /// band is empty, or the bands leave any window uncovered or doubly
    /// covered.
    pub fn from_periods(
        name: &str,
        feed_in_cents_per_kwh: f64,
        periods: &[RatePeriod],
    ) -> Result<Self, TariffError> {
        let mut prices: [Option<f64>; SLOTS_PER_DAY] = [None; SLOTS_PER_DAY];

        for period in periods {
            for boundary in [period.start_minutes, period.end_minutes] {
                if boundary % SLOT_MINUTES != 0 || boundary > MINUTES_PER_DAY {
                    return Err(TariffError::UnalignedBoundary { minutes: boundary });
                }
            }
            if period.start_minutes == period.end_minutes {
                return Err(TariffError::EmptyPeriod {
                    start_minutes: period.start_minutes,
                });
            }

            let mut minute = period.start_minutes % MINUTES_PER_DAY;
            let end = period.end_minutes;
            loop {
                let index = (minute / SLOT_MINUTES) as usize;
                if prices[index].is_some() {
                    return Err(TariffError::OverlappingSlot { key: minute });
                }
                prices[index] = Some(period.rate_cents_per_kwh);

                minute = (minute + SLOT_MINUTES) % MINUTES_PER_DAY;
                if minute == end % MINUTES_PER_DAY {
                    break;
                }
            }
        }

        let mut table = [0.0; SLOTS_PER_DAY];
        for (index, price) in prices.iter().enumerate() {
            match price {
                Some(rate) => table[index] = *rate,
                None => {
                    return Err(TariffError::UncoveredSlot {
                        key: key_at(index),
                    });
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            feed_in_cents_per_kwh,
            price_cents_per_kwh: table,
        })
    }

    /// Purchase price for the window at dense index `index` (cents/kWh).
    pub fn price_at(&self, index: usize) -> f64 {
        self.price_cents_per_kwh[index]
    }
}
