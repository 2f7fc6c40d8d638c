// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Fan-coil manufacturer-data path (§4.E): a table of (delta-T, fan-speed)
//! to heat output, interpolated at the current delta-T to find the
//! cheapest fan speed that still meets demand.

use serde::{Deserialize, Serialize};

use crate::error::{HemError, HemResult};
use crate::utils::linear_interp;

/// One fan speed's characteristic output curve against delta-T, plus its
/// electrical power draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanCoilSpeed {
    pub delta_t_c: Vec<f64>,
    pub output_w: Vec<f64>,
    pub fan_power_w: f64,
}

pub struct FanCoilLookup {
    speeds: Vec<FanCoilSpeed>,
}

impl FanCoilLookup {
    pub fn new(speeds: Vec<FanCoilSpeed>) -> HemResult<Self> {
        for speed in &speeds {
            if speed.delta_t_c.len() != speed.output_w.len() || speed.delta_t_c.len() < 2 {
                return Err(HemError::config(
                    "fan-coil lookup: delta_t_c/output_w must be equal length and >= 2 points",
                ));
            }
        }
        Ok(FanCoilLookup { speeds })
    }

    /// Interpolated output (W) of one fan speed at the given delta-T.
    pub fn output_w(&self, delta_t: f64, speed: &FanCoilSpeed) -> f64 {
        linear_interp(&speed.delta_t_c, &speed.output_w, delta_t)
    }

    /// Picks the lowest fan speed whose interpolated output at `delta_t`
    /// meets `power_demand_w`, falling back to the fastest speed if none
    /// suffices; returns the chosen speed and its runtime fraction derived
    /// from the minimum-speed output (§4.E).
    pub fn select_speed(&self, delta_t: f64, power_demand_w: f64) -> (&FanCoilSpeed, f64) {
        let min_speed = self
            .speeds
            .first()
            .expect("fan-coil lookup must have at least one speed to select from");
        let min_output = self.output_w(delta_t, min_speed);

        for speed in &self.speeds {
            let output = self.output_w(delta_t, speed);
            if output >= power_demand_w {
                let runtime_fraction = if output > 0.0 {
                    (power_demand_w / output).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                return (speed, runtime_fraction);
            }
        }
        let fastest = self.speeds.last().unwrap_or(min_speed);
        let _ = min_output;
        (fastest, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lookup() -> FanCoilLookup {
        FanCoilLookup::new(vec![
            FanCoilSpeed {
                delta_t_c: vec![0.0, 10.0, 20.0],
                output_w: vec![0.0, 500.0, 1000.0],
                fan_power_w: 10.0,
            },
            FanCoilSpeed {
                delta_t_c: vec![0.0, 10.0, 20.0],
                output_w: vec![0.0, 900.0, 1800.0],
                fan_power_w: 25.0,
            },
        ])
        .unwrap()
    }

    #[test]
    fn selects_low_speed_when_sufficient() {
        let lookup = sample_lookup();
        let (speed, fraction) = lookup.select_speed(20.0, 400.0);
        assert_eq!(speed.fan_power_w, 10.0);
        assert!(fraction > 0.0 && fraction <= 1.0);
    }

    #[test]
    fn escalates_to_high_speed_when_needed() {
        let lookup = sample_lookup();
        let (speed, _) = lookup.select_speed(20.0, 1200.0);
        assert_eq!(speed.fan_power_w, 25.0);
    }

    #[test]
    fn rejects_mismatched_table_lengths() {
        let result = FanCoilLookup::new(vec![FanCoilSpeed {
            delta_t_c: vec![0.0, 10.0],
            output_w: vec![0.0],
            fan_power_w: 10.0,
        }]);
        assert!(result.is_err());
    }
}
