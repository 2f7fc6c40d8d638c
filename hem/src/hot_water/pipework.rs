// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Distribution and primary pipework cool-down losses (§4.G).

use crate::units::{C_WATER, RHO_WATER};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipeLocation {
    Internal,
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub name: String,
    pub location: PipeLocation,
    pub internal_diameter_mm: f64,
    pub length_m: f64,
    pub insulation_thickness_mm: f64,
    pub insulation_thermal_conductivity_w_per_mk: f64,
}

impl Pipe {
    /// Volume of water held in the pipe run (litres).
    pub fn volume_l(&self) -> f64 {
        let r_m = self.internal_diameter_mm / 2000.0;
        std::f64::consts::PI * r_m * r_m * self.length_m * 1000.0
    }

    /// Cool-down energy loss (kWh) for one draw-off: the held water cools
    /// from the draw temperature to the ambient temperature before the next
    /// draw reheats the pipe run (§4.G).
    pub fn cooldown_loss_kwh(&self, t_draw_c: f64, t_ambient_c: f64) -> f64 {
        let volume_kg = self.volume_l() * RHO_WATER / 1000.0;
        let joules = volume_kg * C_WATER * (t_draw_c - t_ambient_c).max(0.0);
        joules / 3.6e6
    }
}

/// Sums cool-down losses across a pipe list, split by internal/external
/// location as reported separately in the output CSV (§4.G, §6).
pub fn cooldown_losses_by_location(
    pipes: &[Pipe],
    t_draw_c: f64,
    t_ambient_internal_c: f64,
    t_ambient_external_c: f64,
) -> (f64, f64) {
    let mut internal = 0.0;
    let mut external = 0.0;
    for pipe in pipes {
        match pipe.location {
            PipeLocation::Internal => {
                internal += pipe.cooldown_loss_kwh(t_draw_c, t_ambient_internal_c)
            }
            PipeLocation::External => {
                external += pipe.cooldown_loss_kwh(t_draw_c, t_ambient_external_c)
            }
        }
    }
    (internal, external)
}

/// Primary pipework standing loss (kWh) incurred when the storage tank
/// calls for heat, proportional to the held volume's temperature drop over
/// the heating-call duration represented implicitly by `calls_for_heat`.
pub fn primary_standing_loss_kwh(pipes: &[Pipe], t_store_c: f64, t_ambient_c: f64, calls_for_heat: bool) -> f64 {
    if !calls_for_heat {
        return 0.0;
    }
    pipes
        .iter()
        .map(|p| p.cooldown_loss_kwh(t_store_c, t_ambient_c))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pipe(location: PipeLocation) -> Pipe {
        Pipe {
            name: "p1".into(),
            location,
            internal_diameter_mm: 15.0,
            length_m: 4.0,
            insulation_thickness_mm: 10.0,
            insulation_thermal_conductivity_w_per_mk: 0.035,
        }
    }

    #[test]
    fn volume_scales_with_length() {
        let mut pipe = sample_pipe(PipeLocation::Internal);
        let base = pipe.volume_l();
        pipe.length_m *= 2.0;
        assert!((pipe.volume_l() - 2.0 * base).abs() < 1e-9);
    }

    #[test]
    fn cooldown_loss_is_nonnegative() {
        let pipe = sample_pipe(PipeLocation::External);
        assert!(pipe.cooldown_loss_kwh(45.0, 10.0) >= 0.0);
        assert_eq!(pipe.cooldown_loss_kwh(10.0, 45.0), 0.0);
    }

    #[test]
    fn losses_split_by_location() {
        let pipes = vec![
            sample_pipe(PipeLocation::Internal),
            sample_pipe(PipeLocation::External),
        ];
        let (internal, external) = cooldown_losses_by_location(&pipes, 45.0, 20.0, 5.0);
        assert!(internal > 0.0);
        assert!(external > internal);
    }

    #[test]
    fn primary_loss_is_zero_when_not_calling_for_heat() {
        let pipes = vec![sample_pipe(PipeLocation::Internal)];
        assert_eq!(primary_standing_loss_kwh(&pipes, 55.0, 20.0, false), 0.0);
    }
}
