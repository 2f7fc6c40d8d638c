// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Steady-state ductwork heat loss for MVHR supply/extract runs (a
//! supplemented feature beyond the distilled airflow-network spec: the
//! original implementation tracks duct losses separately from the MVHR
//! unit's own heat-recovery efficiency).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuctType {
    Supply,
    Extract,
    IntakeFromOutside,
    ExhaustToOutside,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuctworkRun {
    pub name: String,
    pub duct_type: DuctType,
    pub internal_diameter_mm: f64,
    pub external_diameter_mm: f64,
    pub length_m: f64,
    pub insulation_thermal_conductivity_w_per_mk: f64,
    pub insulation_thickness_mm: f64,
    pub reflective: bool,
    pub surface_resistance_m2k_per_w: f64,
}

impl DuctworkRun {
    /// Linear conductance from airflow to the surrounding space, `U_duct *
    /// perimeter`, via a cylindrical-wall resistance plus surface
    /// resistance in series: `R = ln(d_ext/d_int) / (2*pi*k) + R_se / (pi*d_ext)`.
    pub fn heat_loss_coeff_w_per_k(&self) -> f64 {
        let d_int_m = self.internal_diameter_mm / 1000.0;
        let d_ext_m = self.external_diameter_mm / 1000.0;
        let k = self.insulation_thermal_conductivity_w_per_mk.max(1e-6);

        let r_insulation = (d_ext_m / d_int_m).ln() / (2.0 * std::f64::consts::PI * k);
        let r_surface = self.surface_resistance_m2k_per_w / (std::f64::consts::PI * d_ext_m);
        let reflective_factor = if self.reflective { 0.5 } else { 1.0 };

        let r_total = r_insulation + r_surface * reflective_factor;
        self.length_m / r_total.max(1e-9)
    }

    /// Steady-state loss (W) for a duct carrying air at `t_air_c` through
    /// an environment at `t_surround_c`.
    pub fn heat_loss_w(&self, t_air_c: f64, t_surround_c: f64) -> f64 {
        self.heat_loss_coeff_w_per_k() * (t_air_c - t_surround_c)
    }

    /// Temperature of the airflow leaving the duct run given an inlet
    /// temperature, mass flow rate and specific heat capacity, assuming the
    /// surrounding temperature is held constant along the run (lumped
    /// single-node approximation consistent with a steady-state loss model).
    pub fn outlet_temp_c(
        &self,
        t_inlet_c: f64,
        t_surround_c: f64,
        mass_flow_kg_s: f64,
        specific_heat_j_per_kgk: f64,
    ) -> f64 {
        let ua = self.heat_loss_coeff_w_per_k();
        let mc = (mass_flow_kg_s * specific_heat_j_per_kgk).max(1e-9);
        let ntu = ua / mc;
        t_surround_c + (t_inlet_c - t_surround_c) * (-ntu).exp()
    }
}

/// Sums the steady-state loss (W) across a full MVHR ductwork set for one
/// timestep's supply-air conditions.
pub fn total_ductwork_loss_w(runs: &[DuctworkRun], t_air_c: f64, t_surround_c: f64) -> f64 {
    runs.iter()
        .map(|r| r.heat_loss_w(t_air_c, t_surround_c))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run() -> DuctworkRun {
        DuctworkRun {
            name: "supply_run".into(),
            duct_type: DuctType::Supply,
            internal_diameter_mm: 125.0,
            external_diameter_mm: 150.0,
            length_m: 5.0,
            insulation_thermal_conductivity_w_per_mk: 0.04,
            insulation_thickness_mm: 12.5,
            reflective: false,
            surface_resistance_m2k_per_w: 0.1,
        }
    }

    #[test]
    fn heat_loss_coeff_is_positive() {
        let run = sample_run();
        assert!(run.heat_loss_coeff_w_per_k() > 0.0);
    }

    #[test]
    fn reflective_duct_loses_less_heat() {
        let mut run = sample_run();
        let normal = run.heat_loss_coeff_w_per_k();
        run.reflective = true;
        let reflective = run.heat_loss_coeff_w_per_k();
        assert!(reflective < normal);
    }

    #[test]
    fn outlet_temp_approaches_surround_for_long_duct() {
        let mut run = sample_run();
        run.length_m = 500.0;
        let t_out = run.outlet_temp_c(20.0, 5.0, 0.05, 1006.0);
        assert!((t_out - 5.0).abs() < 1.0);
    }

    #[test]
    fn outlet_temp_equals_inlet_for_zero_length() {
        let mut run = sample_run();
        run.length_m = 0.0;
        let t_out = run.outlet_temp_c(20.0, 5.0, 0.05, 1006.0);
        assert!((t_out - 20.0).abs() < 1e-6);
    }

    #[test]
    fn total_loss_sums_across_runs() {
        let runs = vec![sample_run(), sample_run()];
        let single = sample_run().heat_loss_w(20.0, 5.0);
        let total = total_ductwork_loss_w(&runs, 20.0, 5.0);
        assert!((total - 2.0 * single).abs() < 1e-9);
    }
}
