// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Material/air properties and unit conversions (component A).

/// Density of air at sea level, 20 degC (kg/m3).
pub const RHO_AIR: f64 = 1.204;

/// Specific heat capacity of air, constant pressure (J/(kg K)).
pub const C_AIR: f64 = 1006.0;

/// Specific heat capacity of water (J/(kg K)).
pub const C_WATER: f64 = 4184.0;

/// Density of water (kg/m3).
pub const RHO_WATER: f64 = 998.21;

/// Standard gravity (m/s2).
pub const G: f64 = 9.81;

/// Absolute zero, in degrees Celsius.
pub const ABS_ZERO_CELSIUS: f64 = -273.15;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Watt-hours per kWh.
pub const WH_PER_KWH: f64 = 1000.0;

pub fn celsius_to_kelvin(t_celsius: f64) -> f64 {
    t_celsius - ABS_ZERO_CELSIUS
}

pub fn kelvin_to_celsius(t_kelvin: f64) -> f64 {
    t_kelvin + ABS_ZERO_CELSIUS
}

/// Air density at a given altitude, accounting for the reduction in
/// atmospheric pressure with height (barometric formula, ISO 52016-1 form).
pub fn air_density_at_altitude(altitude_m: f64) -> f64 {
    RHO_AIR * (1.0 - 0.0065 * altitude_m / 293.0).powf(5.26)
}

/// Converts a joule quantity accumulated over a timestep of `delta_t_h` hours
/// to average kW.
pub fn joules_to_kwh(joules: f64) -> f64 {
    joules / (WH_PER_KWH * SECONDS_PER_HOUR)
}

pub fn kwh_to_joules(kwh: f64) -> f64 {
    kwh * WH_PER_KWH * SECONDS_PER_HOUR
}

/// Rounds to 6 decimal places for CSV output, matching the engine's
/// documented output precision.
pub fn fround6(val: f64) -> f64 {
    (val * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_celsius_kelvin() {
        assert!((kelvin_to_celsius(celsius_to_kelvin(21.3)) - 21.3).abs() < 1e-9);
    }

    #[test]
    fn altitude_reduces_density() {
        assert!(air_density_at_altitude(500.0) < RHO_AIR);
    }

    #[test]
    fn fround6_drops_noise() {
        assert_eq!(fround6(1.0000001), 1.0);
        assert_eq!(fround6(0.123456789), 0.123457);
    }
}
