// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Hot-water demand & pipework losses (component G): event-driven
//! draw-offs, waste-water heat recovery, and distribution/primary
//! pipework cool-down losses.

pub mod cylinder;
pub mod pipework;
pub mod wwhrs;

pub use cylinder::{HotWaterSource, StorageCylinder};
pub use pipework::{Pipe, PipeLocation};
pub use wwhrs::{Wwhrs, WwhrsTopology};

use crate::units::RHO_WATER;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawOffType {
    Shower,
    Bath,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawOffEvent {
    pub draw_off_type: DrawOffType,
    pub name: String,
    pub start_h: f64,
    pub duration_h: f64,
    pub warm_temp_c: f64,
    /// Exactly one of these is populated depending on whether the event
    /// specifies a fixed volume or a fixed warm-water volume (§4.G).
    pub volume_l: Option<f64>,
    pub warm_volume_l: Option<f64>,
}

/// Cold-water source: a monthly temperature profile sampled by month index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColdWaterSource {
    pub name: String,
    pub monthly_temperatures_c: [f64; 12],
    pub start_day: u32,
    pub time_series_step: f64,
}

impl ColdWaterSource {
    pub fn temperature(&self, month: usize) -> f64 {
        self.monthly_temperatures_c[month % 12]
    }
}

/// Fraction of a warm-water volume that must be drawn as fully-hot water to
/// produce the required warm-water temperature by mixing with cold water:
/// `(T_warm - T_cold) / (T_hot - T_cold)` (§4.G).
pub fn frac_hot_water(t_warm_c: f64, t_hot_c: f64, t_cold_c: f64) -> f64 {
    let denom = t_hot_c - t_cold_c;
    if denom.abs() < 1e-9 {
        return 0.0;
    }
    ((t_warm_c - t_cold_c) / denom).clamp(0.0, 1.0)
}

/// Resolved volumes for one draw-off event after WWHRS/cold-source
/// resolution.
pub struct DrawOffResult {
    pub warm_volume_l: f64,
    pub hot_volume_l: f64,
    pub energy_kwh: f64,
}

/// Computes the hot-water volume and energy content of one draw-off event,
/// applying WWHRS return-temperature recovery if present (§4.G).
pub fn resolve_draw_off(
    event: &DrawOffEvent,
    t_hot_c: f64,
    t_cold_c: f64,
    wwhrs: Option<&Wwhrs>,
) -> DrawOffResult {
    let warm_volume_l = match (event.volume_l, event.warm_volume_l) {
        (Some(v), _) => v,
        (None, Some(wv)) => wv,
        (None, None) => 0.0,
    };

    let effective_cold_temp = match wwhrs {
        Some(w) if event.draw_off_type == DrawOffType::Shower => {
            w.recovered_cold_temp(t_cold_c, event.warm_temp_c)
        }
        _ => t_cold_c,
    };

    let frac = frac_hot_water(event.warm_temp_c, t_hot_c, effective_cold_temp);
    let hot_volume_l = warm_volume_l * frac;

    const J_PER_LITRE_KELVIN: f64 = RHO_WATER * 4184.0 / 1000.0;
    let energy_kwh =
        hot_volume_l * J_PER_LITRE_KELVIN * (t_hot_c - effective_cold_temp) / 3.6e6 * 1000.0;

    DrawOffResult {
        warm_volume_l,
        hot_volume_l,
        energy_kwh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frac_hot_water_is_zero_when_warm_equals_cold() {
        assert_eq!(frac_hot_water(10.0, 55.0, 10.0), 0.0);
    }

    #[test]
    fn frac_hot_water_is_one_when_warm_equals_hot() {
        assert!((frac_hot_water(55.0, 55.0, 10.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn resolve_draw_off_uses_warm_volume_when_no_fixed_volume() {
        let event = DrawOffEvent {
            draw_off_type: DrawOffType::Bath,
            name: "bath1".into(),
            start_h: 7.0,
            duration_h: 0.2,
            warm_temp_c: 41.0,
            volume_l: None,
            warm_volume_l: Some(80.0),
        };
        let result = resolve_draw_off(&event, 55.0, 10.0, None);
        assert_eq!(result.warm_volume_l, 80.0);
        assert!(result.hot_volume_l > 0.0 && result.hot_volume_l < 80.0);
        assert!(result.energy_kwh > 0.0);
    }
}
