// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Electric storage heater core model (component F): a state-of-charge
//! ODE integrated over two output modes, charge-controlled by one of the
//! logics in `controls::charge_control`.

use crate::controls::charge_control::ChargeControl;
use crate::error::{HemError, HemResult};
use crate::numerics::solve_ivp_rk45;
use crate::utils::linear_interp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Min,
    Max,
}

/// Monotonic SOC -> power interpolation curve (§4.F). Validated on
/// construction by sampling 100 points across `[0, 1]`.
#[derive(Debug, Clone)]
pub struct PowerCurve {
    soc: Vec<f64>,
    power_w: Vec<f64>,
}

impl PowerCurve {
    pub fn new(soc: Vec<f64>, power_w: Vec<f64>) -> HemResult<Self> {
        if soc.len() != power_w.len() || soc.len() < 2 {
            return Err(HemError::config(
                "storage heater power curve: soc/power_w must be equal length and >= 2 points",
            ));
        }
        if soc[0] > 1e-9 || power_w[0].abs() > 1e-9 {
            return Err(HemError::config(
                "storage heater power curve: must start at soc=0 with power=0",
            ));
        }
        let mut prev = f64::NEG_INFINITY;
        for i in 1..soc.len() {
            if soc[i] <= prev {
                return Err(HemError::config(
                    "storage heater power curve: soc values must be strictly increasing",
                ));
            }
            if power_w[i] < power_w[i - 1] {
                return Err(HemError::config(
                    "storage heater power curve: power must be monotonic in soc",
                ));
            }
            prev = soc[i];
        }
        Ok(PowerCurve { soc, power_w })
    }

    pub fn interp(&self, soc: f64) -> f64 {
        linear_interp(&self.soc, &self.power_w, soc.clamp(0.0, 1.0))
    }
}

/// Checks `p_max(soc) >= p_min(soc)` for all soc by sampling 100 points,
/// per §4.F's monotonicity invariant.
fn validate_curves_ordered(p_min: &PowerCurve, p_max: &PowerCurve) -> HemResult<()> {
    for i in 0..=100 {
        let soc = i as f64 / 100.0;
        if p_max.interp(soc) + 1e-9 < p_min.interp(soc) {
            return Err(HemError::physical(
                "storage heater: p_max(soc) must be >= p_min(soc) for all soc",
            ));
        }
    }
    Ok(())
}

pub struct StorageHeater {
    pub nominal_power_w: f64,
    pub capacity_kwh: f64,
    pub p_min: PowerCurve,
    pub p_max: PowerCurve,
    pub fan_power_w: f64,
    pub instant_backup_power_w: f64,
    pub heat_retention_ratio: f64,
    pub state_of_charge: f64,
}

struct IntegrationOutcome {
    soc_final: f64,
    energy_delivered_kwh: f64,
}

impl StorageHeater {
    pub fn new(
        nominal_power_w: f64,
        capacity_kwh: f64,
        p_min: PowerCurve,
        p_max: PowerCurve,
        fan_power_w: f64,
        instant_backup_power_w: f64,
    ) -> HemResult<Self> {
        validate_curves_ordered(&p_min, &p_max)?;
        let heat_retention_ratio = Self::compute_heat_retention_ratio(capacity_kwh, &p_min);
        Ok(StorageHeater {
            nominal_power_w,
            capacity_kwh,
            p_min,
            p_max,
            fan_power_w,
            instant_backup_power_w,
            heat_retention_ratio,
            state_of_charge: 0.0,
        })
    }

    /// SOC remaining after 16 hours of P_min-only discharge from SOC=1.0,
    /// per BS EN 60531 (§4.F). Computed once at construction.
    fn compute_heat_retention_ratio(capacity_kwh: f64, p_min: &PowerCurve) -> f64 {
        let rhs = |_t: f64, y: &[f64]| {
            let soc = y[0].clamp(0.0, 1.0);
            let discharge_w = p_min.interp(soc);
            vec![-discharge_w / 1000.0 / capacity_kwh.max(1e-9)]
        };
        let sol = solve_ivp_rk45(
            rhs,
            16.0 * 3600.0,
            &[1.0],
            1e-1,
            1e-3,
            None::<fn(f64, &[f64]) -> f64>,
        );
        sol.y[0].clamp(0.0, 1.0)
    }

    /// Integrates the charge/discharge ODE over `[0, delta_t_h]` for one
    /// output mode (§4.F); `target_charge` > 0 enables charging, subject to
    /// the SOC=0 terminal event.
    fn integrate(
        &self,
        output_curve: &PowerCurve,
        target_charge: f64,
        delta_t_h: f64,
        soc_max: f64,
    ) -> IntegrationOutcome {
        let nominal_power_w = self.nominal_power_w;
        let capacity_kwh = self.capacity_kwh.max(1e-9);

        let rhs = move |_t: f64, y: &[f64]| -> Vec<f64> {
            let soc = y[0].clamp(0.0, 1.0);
            let discharge_w = output_curve.interp(soc);
            let charge_w = if soc < soc_max && target_charge > 0.0 {
                nominal_power_w
            } else if (soc - soc_max).abs() < 1e-6 && target_charge > 0.0 {
                discharge_w.min(nominal_power_w)
            } else {
                0.0
            };
            let d_soc = (charge_w - discharge_w) / 1000.0 / capacity_kwh;
            vec![d_soc, discharge_w / 1000.0]
        };
        let event = |_t: f64, y: &[f64]| y[0];

        let sol = solve_ivp_rk45(
            rhs,
            delta_t_h * 3600.0,
            &[self.state_of_charge, 0.0],
            1e-4,
            1e-6,
            Some(event),
        );

        IntegrationOutcome {
            soc_final: sol.y[0].clamp(0.0, 1.0),
            energy_delivered_kwh: sol.y[1],
        }
    }

    /// Per-timestep demand dispatch (§4.F): MIN output first, escalating to
    /// MAX and finally instant backup if still insufficient. Returns
    /// `(energy_delivered_kwh, fan_energy_kwh, backup_energy_kwh)`. State is
    /// committed only when `commit` is true.
    pub fn demand(
        &mut self,
        energy_demand_kwh: f64,
        target_charge: f64,
        delta_t_h: f64,
        airflow_active: bool,
        commit: bool,
    ) -> (f64, f64, f64) {
        let soc_max = 1.0;

        let min_outcome = self.integrate(&self.p_min, target_charge, delta_t_h, soc_max);
        let (soc_final, delivered_kwh, used_mode) = if min_outcome.energy_delivered_kwh + 1e-9
            >= energy_demand_kwh
        {
            (min_outcome.soc_final, min_outcome.energy_delivered_kwh, OutputMode::Min)
        } else {
            let max_outcome = self.integrate(&self.p_max, target_charge, delta_t_h, soc_max);
            (max_outcome.soc_final, max_outcome.energy_delivered_kwh, OutputMode::Max)
        };
        let _ = used_mode;

        let backup_kwh = if delivered_kwh + 1e-9 < energy_demand_kwh {
            let shortfall = energy_demand_kwh - delivered_kwh;
            shortfall.min(self.instant_backup_power_w * delta_t_h / 1000.0)
        } else {
            0.0
        };

        let fan_kwh = if airflow_active {
            self.fan_power_w * delta_t_h / 1000.0
        } else {
            0.0
        };

        if commit {
            self.state_of_charge = soc_final;
        }

        (delivered_kwh + backup_kwh, fan_kwh, backup_kwh)
    }

    /// Convenience wrapper resolving the target charge from a `ChargeControl`
    /// for the given timestep.
    pub fn demand_with_control(
        &mut self,
        energy_demand_kwh: f64,
        control: &ChargeControl,
        timestep_idx: usize,
        room_temp: f64,
        month: usize,
        t_ext: f64,
        delta_t_h: f64,
        airflow_active: bool,
        commit: bool,
    ) -> (f64, f64, f64) {
        let target_charge = control.target_charge(
            timestep_idx,
            room_temp,
            month,
            t_ext,
            self.state_of_charge,
            self.capacity_kwh,
        );
        self.demand(energy_demand_kwh, target_charge, delta_t_h, airflow_active, commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_heater() -> StorageHeater {
        let p_min = PowerCurve::new(vec![0.0, 0.5, 1.0], vec![0.0, 50.0, 100.0]).unwrap();
        let p_max = PowerCurve::new(vec![0.0, 0.5, 1.0], vec![0.0, 1500.0, 3000.0]).unwrap();
        StorageHeater::new(3000.0, 10.0, p_min, p_max, 30.0, 1000.0).unwrap()
    }

    #[test]
    fn rejects_curves_where_max_dips_below_min() {
        let p_min = PowerCurve::new(vec![0.0, 1.0], vec![0.0, 500.0]).unwrap();
        let p_max = PowerCurve::new(vec![0.0, 1.0], vec![0.0, 400.0]).unwrap();
        assert!(StorageHeater::new(3000.0, 10.0, p_min, p_max, 30.0, 1000.0).is_err());
    }

    #[test]
    fn heat_retention_ratio_in_bounds() {
        let heater = sample_heater();
        assert!(heater.heat_retention_ratio >= 0.0 && heater.heat_retention_ratio <= 1.0);
    }

    #[test]
    fn charging_raises_soc() {
        let mut heater = sample_heater();
        heater.state_of_charge = 0.0;
        let (_delivered, _fan, _backup) = heater.demand(0.0, 1.0, 1.0, false, true);
        assert!(heater.state_of_charge > 0.0);
    }

    #[test]
    fn insufficient_min_output_escalates_to_backup() {
        let mut heater = sample_heater();
        heater.state_of_charge = 0.0;
        let (delivered, _fan, backup) = heater.demand(5.0, 0.0, 1.0, false, true);
        assert!(delivered <= 5.0 + 1e-6);
        assert!(backup >= 0.0);
    }

    #[test]
    fn fan_energy_only_counted_when_active() {
        let mut heater = sample_heater();
        let (_d, fan_off, _b) = heater.demand(0.1, 0.0, 1.0, false, false);
        let (_d2, fan_on, _b2) = heater.demand(0.1, 0.0, 1.0, true, false);
        assert_eq!(fan_off, 0.0);
        assert!(fan_on > 0.0);
    }

    #[test]
    fn exploratory_call_does_not_mutate_soc() {
        let mut heater = sample_heater();
        heater.state_of_charge = 0.3;
        heater.demand(0.5, 1.0, 1.0, false, false);
        assert_eq!(heater.state_of_charge, 0.3);
    }
}
