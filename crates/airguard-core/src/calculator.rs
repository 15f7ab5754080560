//! Air-budget physics: pressure-to-time formulas for SCBA work planning
//!
//! Stateless functions over (pressure, device) inputs. Pressures are in bar,
//! volumes in liters, times in minutes, consumption in l/min. Atmospheric
//! pressure is the constant 1.0 bar.
//!
//! Contract: every externally visible minute count is truncated toward zero
//! (floor), never rounded up — safety margins must not be rounded in the
//! team's favor. Intermediate values stay floating point.

use serde::{Deserialize, Serialize};

use crate::device::DeviceProfile;
use crate::types::WorkMode;

/// Atmospheric pressure, bar
pub const ATMOSPHERIC_PRESSURE_BAR: f64 = 1.0;

/// Shortest search time used when estimating real consumption, minutes.
/// Guards the division against near-zero elapsed time.
pub const MIN_EFFECTIVE_SEARCH_TIME_MIN: f64 = 0.5;

/// Lower clamp on estimated consumption, as a fraction of the rated value
pub const CONSUMPTION_FLOOR_FACTOR: f64 = 0.5;

/// Upper clamp on estimated consumption, as a fraction of the rated value
pub const CONSUMPTION_CEILING_FACTOR: f64 = 2.0;

/// Consumption surcharge while evacuating a victim
pub const EVACUATION_LOAD_FACTOR: f64 = 1.5;

/// Universal work-time formula: `(N · V · P_work) / (Q · P_atm)`, minutes.
///
/// Every other time computation in this module is this formula applied to a
/// different working-pressure delta.
pub fn work_time_minutes(
    cylinder_count: u8,
    cylinder_volume_l: f64,
    working_pressure_bar: f64,
    consumption_lpm: f64,
) -> f64 {
    let numerator = f64::from(cylinder_count) * cylinder_volume_l * working_pressure_bar;
    numerator / (consumption_lpm * ATMOSPHERIC_PRESSURE_BAR)
}

/// [`work_time_minutes`] truncated to whole minutes, negatives clamped to 0.
pub fn work_time_minutes_floored(
    cylinder_count: u8,
    cylinder_volume_l: f64,
    working_pressure_bar: f64,
    consumption_lpm: f64,
) -> u32 {
    let exact = work_time_minutes(
        cylinder_count,
        cylinder_volume_l,
        working_pressure_bar,
        consumption_lpm,
    );
    if exact <= 0.0 {
        0
    } else {
        exact.floor() as u32
    }
}

/// Total nominal operating time at rated consumption, down to the reserve.
pub fn protection_time(min_pressure_bar: f64, device: &DeviceProfile) -> u32 {
    work_time_minutes_floored(
        device.cylinder_count,
        device.cylinder_volume_l,
        min_pressure_bar - device.reserve_pressure_bar,
        device.nominal_consumption_lpm,
    )
}

/// Critical pressure `P_cr = (P_incl − P_res) / 2`, bar.
///
/// Midpoint at which the team should reassess its margin.
pub fn critical_pressure(p_incl_bar: f64, p_res_bar: f64) -> f64 {
    (p_incl_bar - p_res_bar) / 2.0
}

/// Minimum pressure at which the emergency hood can still be donned and
/// egress completed, bar.
///
/// `3·(P_incl − P_start_work) + P_res` when assisting a victim,
/// `2·(P_incl − P_start_work) + P_res` for self-rescue.
pub fn hood_pressure(
    p_incl_bar: f64,
    p_start_work_bar: f64,
    victim_assist: bool,
    p_res_bar: f64,
) -> f64 {
    let diff = p_incl_bar - p_start_work_bar;
    if victim_assist {
        3.0 * diff + p_res_bar
    } else {
        2.0 * diff + p_res_bar
    }
}

/// Pressure at which the team must begin egress, bar.
///
/// Pressure already spent traveling to the source, plus the reserve:
/// `P_exit = (P_min − P_at_work) + P_res`.
pub fn exit_start_pressure(
    min_pressure_bar: f64,
    pressure_at_work_bar: f64,
    device: &DeviceProfile,
) -> f64 {
    (min_pressure_bar - pressure_at_work_bar) + device.reserve_pressure_bar
}

/// Outcome of estimating real air consumption from a search leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionEstimate {
    /// Estimated consumption, clamped to `[0.5, 2.0] × nominal`, l/min
    pub rate_lpm: f64,

    /// The unclamped estimate exceeded twice the rated value. Elevated real
    /// consumption may indicate equipment leakage or overexertion; surfaced
    /// to the safety officer but never blocks the operation.
    pub anomaly: bool,
}

/// Estimate real air consumption from the pressure drop during the search.
///
/// Returns the rated value when there is no usable signal (no pressure
/// drop). The estimate is clamped to `[0.5, 2.0] × nominal`; crossing the
/// ceiling is reported as an anomaly, not an error.
pub fn actual_air_consumption(
    initial_pressure_bar: f64,
    current_pressure_bar: f64,
    search_time_min: f64,
    device: &DeviceProfile,
) -> ConsumptionEstimate {
    let nominal = device.nominal_consumption_lpm;
    let pressure_spent = initial_pressure_bar - current_pressure_bar;

    if pressure_spent <= 0.0 {
        return ConsumptionEstimate {
            rate_lpm: nominal,
            anomaly: false,
        };
    }

    let effective_search_time = search_time_min.max(MIN_EFFECTIVE_SEARCH_TIME_MIN);
    let volume_spent_l = f64::from(device.cylinder_count)
        * device.cylinder_volume_l
        * pressure_spent
        / ATMOSPHERIC_PRESSURE_BAR;
    let rate = volume_spent_l / effective_search_time;

    let floor = nominal * CONSUMPTION_FLOOR_FACTOR;
    let ceiling = nominal * CONSUMPTION_CEILING_FACTOR;

    ConsumptionEstimate {
        rate_lpm: rate.clamp(floor, ceiling),
        anomaly: rate > ceiling,
    }
}

/// Time available to evacuate with a victim, whole minutes.
///
/// Infeasible (pressure already below the victim-assist hood threshold)
/// yields 0. Evacuation load raises consumption by 50% on top of the
/// selected work mode.
pub fn evacuation_time_with_victim(
    min_pressure_bar: f64,
    device: &DeviceProfile,
    work_mode: WorkMode,
) -> u32 {
    let critical = critical_pressure(min_pressure_bar, device.reserve_pressure_bar);
    let hood = hood_pressure(min_pressure_bar, critical, true, device.reserve_pressure_bar);

    if min_pressure_bar < hood {
        return 0;
    }

    work_time_minutes_floored(
        device.cylinder_count,
        device.cylinder_volume_l,
        min_pressure_bar - hood,
        work_mode.consumption_lpm() * EVACUATION_LOAD_FACTOR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ApparatusKind;

    fn drager_class() -> DeviceProfile {
        // Single 6.8 L cylinder, 50 bar reserve, 40 l/min rated
        DeviceProfile {
            cylinder_count: 1,
            cylinder_volume_l: 6.8,
            reserve_pressure_bar: 50.0,
            nominal_consumption_lpm: 40.0,
        }
    }

    #[test]
    fn test_zero_working_pressure_is_zero_time() {
        assert_eq!(work_time_minutes(1, 6.0, 0.0, 40.0), 0.0);
        assert_eq!(work_time_minutes_floored(2, 4.5, 0.0, 54.0), 0);
    }

    #[test]
    fn test_negative_working_pressure_clamps_to_zero() {
        assert_eq!(work_time_minutes_floored(1, 6.0, -20.0, 40.0), 0);
    }

    #[test]
    fn test_protection_time_drager_scenario() {
        // (1 × 6.8 × (300 − 50)) / 40 = 42.5 → 42 minutes floored
        assert_eq!(protection_time(300.0, &drager_class()), 42);
    }

    #[test]
    fn test_protection_time_non_negative_and_monotonic() {
        for kind in ApparatusKind::ALL {
            let device = kind.profile();
            let mut last = 0;
            for pressure in (0..=300).step_by(10) {
                let t = protection_time(f64::from(pressure), &device);
                assert!(t >= last, "{kind:?} not monotonic at {pressure} bar");
                last = t;
            }
        }
    }

    #[test]
    fn test_critical_pressure_midpoint() {
        assert_eq!(critical_pressure(300.0, 50.0), 125.0);
        assert_eq!(critical_pressure(50.0, 50.0), 0.0);
    }

    #[test]
    fn test_hood_pressure_victim_assist_dominates() {
        for p_incl in [180.0, 240.0, 300.0] {
            for p_start in [90.0, 125.0, 160.0] {
                let with_victim = hood_pressure(p_incl, p_start, true, 50.0);
                let solo = hood_pressure(p_incl, p_start, false, 50.0);
                assert!(with_victim >= solo);
            }
        }
    }

    #[test]
    fn test_hood_pressure_formula() {
        // diff = 300 − 125 = 175
        assert_eq!(hood_pressure(300.0, 125.0, false, 50.0), 400.0);
        assert_eq!(hood_pressure(300.0, 125.0, true, 50.0), 575.0);
    }

    #[test]
    fn test_exit_start_pressure_scenario() {
        // (300 − 220) + 50 = 130 bar
        let device = drager_class();
        assert_eq!(exit_start_pressure(300.0, 220.0, &device), 130.0);
    }

    #[test]
    fn test_actual_consumption_no_signal_returns_nominal() {
        let device = drager_class();
        let estimate = actual_air_consumption(300.0, 300.0, 10.0, &device);
        assert_eq!(estimate.rate_lpm, 40.0);
        assert!(!estimate.anomaly);

        // Pressure rising (gauge glitch) also has no usable signal
        let estimate = actual_air_consumption(290.0, 300.0, 10.0, &device);
        assert_eq!(estimate.rate_lpm, 40.0);
        assert!(!estimate.anomaly);
    }

    #[test]
    fn test_actual_consumption_stays_within_clamp() {
        let device = drager_class();
        for initial in [200u16, 250, 300] {
            for current in [0u16, 100, 199, 250, 300] {
                for minutes in [0.0, 0.2, 1.0, 15.0, 60.0] {
                    let estimate = actual_air_consumption(
                        f64::from(initial),
                        f64::from(current),
                        minutes,
                        &device,
                    );
                    assert!(estimate.rate_lpm >= 20.0 && estimate.rate_lpm <= 80.0);
                }
            }
        }
    }

    #[test]
    fn test_actual_consumption_anomaly_flagged_but_clamped() {
        let device = drager_class();
        // 100 bar spent in 2 minutes: 6.8 × 100 / 2 = 340 l/min, far past 80
        let estimate = actual_air_consumption(300.0, 200.0, 2.0, &device);
        assert_eq!(estimate.rate_lpm, 80.0);
        assert!(estimate.anomaly);
    }

    #[test]
    fn test_actual_consumption_short_search_uses_floor_time() {
        let device = drager_class();
        // 10 bar over "zero" minutes: 68 l / 0.5 min = 136 l/min → clamped, anomaly
        let estimate = actual_air_consumption(300.0, 290.0, 0.0, &device);
        assert_eq!(estimate.rate_lpm, 80.0);
        assert!(estimate.anomaly);
    }

    #[test]
    fn test_evacuation_infeasible_below_hood_pressure() {
        // critical = 125, hood = 3 × 175 + 50 = 575 > 300 → infeasible
        let device = drager_class();
        assert_eq!(evacuation_time_with_victim(300.0, &device, WorkMode::Heavy), 0);
    }

    #[test]
    fn test_evacuation_infeasible_across_catalog() {
        // hood = 3·(P + res)/2 + res exceeds P for any positive reserve, so
        // the victim-assist margin cannot be met from the critical midpoint.
        for kind in ApparatusKind::ALL {
            let device = kind.profile();
            for pressure in [180.0, 240.0, 300.0, 330.0] {
                assert_eq!(
                    evacuation_time_with_victim(pressure, &device, WorkMode::Average),
                    0
                );
            }
        }
    }
}
