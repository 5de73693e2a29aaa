//! Greedy per-window battery dispatch primitives.
//!
//! Two pure operations — discharge to cover consumption, charge from surplus
//! generation — plus the policy parameter choosing which runs first within a
//! window. Both are clamped by `min`, so they are total for any non-negative
//! inputs.

/// Tolerance below capacity at which a battery counts as fully charged.
///
/// Repeated fractional charge steps rarely land exactly on capacity, so the
/// full-charge test allows this margin. Tunable per scenario through the
/// simulation config.
pub const FULL_CHARGE_EPSILON_KWH: f64 = 0.005;

/// Order of the two dispatch operations within one half-hour window.
///
/// The order changes numeric outcomes whenever a window has both consumption
/// and generation, so it is an explicit policy choice rather than an
/// implementation detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOrder {
    /// Discharge for consumption first, then absorb generation. Canonical.
    ConsumptionFirst,
    /// Absorb generation first, then discharge for consumption.
    GenerationFirst,
}

impl DispatchOrder {
    /// Config-facing names accepted by [`DispatchOrder::from_name`].
    pub const NAMES: &[&str] = &["consumption-first", "generation-first"];

    /// Parses a config string into a dispatch order.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "consumption-first" => Some(Self::ConsumptionFirst),
            "generation-first" => Some(Self::GenerationFirst),
            _ => None,
        }
    }

    /// The config-facing name of this order.
    pub fn name(self) -> &'static str {
        match self {
            Self::ConsumptionFirst => "consumption-first",
            Self::GenerationFirst => "generation-first",
        }
    }
}

/// Draws stored energy to cover consumption.
///
/// Returns `(new_charge, remaining_consumption)`: the charge after drawing
/// `min(charge, consumption)`, and what must still be bought from the grid.
pub fn discharge_for_consumption(charge_kwh: f64, consumption_kwh: f64) -> (f64, f64) {
    let drawn = charge_kwh.min(consumption_kwh);
    (charge_kwh - drawn, consumption_kwh - drawn)
}

/// Absorbs surplus generation up to the remaining headroom.
///
/// Returns `(new_charge, remaining_generation)`: the charge after absorbing
/// `min(capacity - charge, generation)`, and what is still exported to the
/// grid.
pub fn charge_from_generation(
    charge_kwh: f64,
    capacity_kwh: f64,
    generation_kwh: f64,
) -> (f64, f64) {
    let headroom = (capacity_kwh - charge_kwh).max(0.0);
    let absorbed = headroom.min(generation_kwh);
    (charge_kwh + absorbed, generation_kwh - absorbed)
}

/// Whether a charge level counts as "full" for the given capacity.
///
/// A zero-capacity battery is never full: the flag marks a real battery
/// saturating, not the degenerate no-battery scenario.
pub fn reaches_full_charge(charge_kwh: f64, capacity_kwh: f64, epsilon_kwh: f64) -> bool {
    capacity_kwh > 0.0 && charge_kwh >= capacity_kwh - epsilon_kwh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discharge_covers_consumption_while_charge_lasts() {
        let (charge, remaining) = discharge_for_consumption(5.0, 2.0);
        assert_eq!(charge, 3.0);
        assert_eq!(remaining, 0.0);
    }

    #[test]
    fn discharge_is_limited_by_stored_energy() {
        let (charge, remaining) = discharge_for_consumption(1.5, 4.0);
        assert_eq!(charge, 0.0);
        assert_eq!(remaining, 2.5);
    }

    #[test]
    fn discharge_with_empty_battery_is_identity() {
        let (charge, remaining) = discharge_for_consumption(0.0, 3.0);
        assert_eq!(charge, 0.0);
        assert_eq!(remaining, 3.0);
    }

    #[test]
    fn charge_absorbs_generation_up_to_headroom() {
        let (charge, remaining) = charge_from_generation(1.0, 2.0, 3.0);
        assert_eq!(charge, 2.0);
        assert_eq!(remaining, 2.0);
    }

    #[test]
    fn charge_takes_everything_when_headroom_suffices() {
        let (charge, remaining) = charge_from_generation(1.0, 10.0, 3.0);
        assert_eq!(charge, 4.0);
        assert_eq!(remaining, 0.0);
    }

    #[test]
    fn zero_capacity_charge_is_identity() {
        let (charge, remaining) = charge_from_generation(0.0, 0.0, 3.0);
        assert_eq!(charge, 0.0);
        assert_eq!(remaining, 3.0);
    }

    #[test]
    fn full_charge_flag_uses_epsilon() {
        assert!(reaches_full_charge(2.0, 2.0, FULL_CHARGE_EPSILON_KWH));
        assert!(reaches_full_charge(1.996, 2.0, FULL_CHARGE_EPSILON_KWH));
        assert!(!reaches_full_charge(1.99, 2.0, FULL_CHARGE_EPSILON_KWH));
    }

    #[test]
    fn zero_capacity_battery_is_never_full() {
        assert!(!reaches_full_charge(0.0, 0.0, FULL_CHARGE_EPSILON_KWH));
    }

    #[test]
    fn dispatch_order_names_round_trip() {
        for &name in DispatchOrder::NAMES {
            let order = DispatchOrder::from_name(name).unwrap();
            assert_eq!(order.name(), name);
        }
        assert_eq!(DispatchOrder::from_name("solar-first"), None);
    }
}
