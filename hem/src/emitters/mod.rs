// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Emitter / wet distribution (component E): an ODE-integrated lumped
//! emitter temperature coupled to a heat source, with ecodesign
//! flow/return control, bypass mixing and a fan-coil lookup path.

mod fancoil;

pub use fancoil::{FanCoilLookup, FanCoilSpeed};

use serde::{Deserialize, Serialize};

use crate::error::{HemError, HemResult};
use crate::numerics::{brentq, solve_ivp_rk45};
use crate::units::{C_WATER, RHO_WATER};

/// The eight ecodesign controller classes (glossary, §4.E). Only II, III,
/// VI, VII apply weather compensation; the rest use the design flow
/// temperature unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcodesignClass {
    I,
    Ii,
    Iii,
    Iv,
    V,
    Vi,
    Vii,
    Viii,
}

impl EcodesignClass {
    fn weather_compensated(&self) -> bool {
        matches!(
            self,
            EcodesignClass::Ii | EcodesignClass::Iii | EcodesignClass::Vi | EcodesignClass::Vii
        )
    }
}

/// One emitter's characteristic output law `c * max(0, T_E - T_rm)^n`
/// (§4.E). Radiator coefficients are supplied by the manufacturer; UFH's
/// are derived from a performance factor and floor area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EmitterKind {
    Radiator { c: f64, n: f64 },
    Ufh { perf_factor: f64, area_m2: f64 },
}

impl EmitterKind {
    fn c_n(&self) -> (f64, f64) {
        match self {
            EmitterKind::Radiator { c, n } => (*c, *n),
            EmitterKind::Ufh { perf_factor, area_m2 } => (perf_factor * area_m2 / 1000.0, 1.0),
        }
    }

    fn output_w(&self, delta_t: f64) -> f64 {
        let (c, n) = self.c_n();
        c * delta_t.max(0.0).powf(n)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum FlowType {
    Fixed { design_flow_rate_l_s: f64 },
    Variable { min_flow_rate_l_s: f64, max_flow_rate_l_s: f64 },
}

/// A heat source capable of supplying an emitter circuit: a heat pump,
/// boiler, or heat-interface-unit. Queried for the maximum energy it can
/// deliver over an interval at a given flow/return temperature pair.
pub trait HeatSourceWet {
    fn energy_output_max(
        &self,
        temp_output_c: f64,
        temp_return_c: f64,
        time_available_h: f64,
    ) -> f64;

    fn demand_energy(
        &mut self,
        energy_demand_kwh: f64,
        temp_output_c: f64,
        temp_return_c: f64,
        time_available_h: f64,
    ) -> f64;
}

/// Lumped emitter circuit: thermal mass, a list of (non-mixed-with-fan-coil)
/// emitter specs, flow-temperature control parameters and persistent state
/// `temp_emitter_prev` (§3).
pub struct EmitterCircuit {
    pub thermal_mass_kwh_per_k: f64,
    pub emitters: Vec<EmitterKind>,
    pub fancoil: Option<FanCoilLookup>,
    pub design_flow_temp_c: f64,
    pub min_flow_temp_c: f64,
    pub min_outdoor_temp_c: f64,
    pub max_outdoor_temp_c: f64,
    pub ecodesign_class: EcodesignClass,
    pub bypass_fraction: f64,
    pub flow_type: FlowType,
    pub temp_emitter_prev: f64,
}

impl EmitterCircuit {
    pub fn new(
        thermal_mass_kwh_per_k: f64,
        emitters: Vec<EmitterKind>,
        fancoil: Option<FanCoilLookup>,
        design_flow_temp_c: f64,
        min_flow_temp_c: f64,
        min_outdoor_temp_c: f64,
        max_outdoor_temp_c: f64,
        ecodesign_class: EcodesignClass,
        bypass_fraction: f64,
        flow_type: FlowType,
    ) -> HemResult<Self> {
        if !emitters.is_empty() && fancoil.is_some() {
            return Err(HemError::config(
                "emitter circuit: radiator/UFH emitters cannot be mixed with a fan-coil",
            ));
        }
        if !(0.0..=1.0).contains(&bypass_fraction) {
            return Err(HemError::config("emitter circuit: bypass_fraction must lie in [0, 1]"));
        }
        Ok(EmitterCircuit {
            thermal_mass_kwh_per_k,
            emitters,
            fancoil,
            design_flow_temp_c,
            min_flow_temp_c,
            min_outdoor_temp_c,
            max_outdoor_temp_c,
            ecodesign_class,
            bypass_fraction,
            flow_type,
            temp_emitter_prev: 20.0,
        })
    }

    /// Combined emitter thermal mass `K_E`, kJ/K (converted from kWh/K).
    fn k_e_kj_per_k(&self) -> f64 {
        self.thermal_mass_kwh_per_k * 3600.0
    }

    /// Weather-compensated (or fixed) flow temperature for the given
    /// external temperature (§4.E).
    pub fn flow_temp_c(&self, t_ext_c: f64) -> f64 {
        if !self.ecodesign_class.weather_compensated() {
            return self.design_flow_temp_c;
        }
        if self.max_outdoor_temp_c <= self.min_outdoor_temp_c {
            return self.design_flow_temp_c;
        }
        let frac = ((t_ext_c - self.min_outdoor_temp_c)
            / (self.max_outdoor_temp_c - self.min_outdoor_temp_c))
            .clamp(0.0, 1.0);
        self.design_flow_temp_c + frac * (self.min_flow_temp_c - self.design_flow_temp_c)
    }

    /// Initial return temperature before flow-rate rebalancing: `6/7 *
    /// flow`, capped at 60 degC once flow >= 70 degC (§4.E).
    fn initial_return_temp_c(&self, flow_temp_c: f64) -> f64 {
        let naive = 6.0 / 7.0 * flow_temp_c;
        if flow_temp_c >= 70.0 {
            naive.min(60.0)
        } else {
            naive
        }
    }

    /// Flow/return temperatures including variable-flow-rate rebalancing
    /// and bypass blending; returns `(t_flow_blended, t_return, flow_rate_l_s)`.
    pub fn flow_return_temps(&self, t_ext_c: f64, power_w: f64) -> (f64, f64, f64) {
        let t_flow = self.flow_temp_c(t_ext_c);
        let mut t_return = self.initial_return_temp_c(t_flow);

        let flow_rate_l_s = match self.flow_type {
            FlowType::Fixed { design_flow_rate_l_s } => design_flow_rate_l_s,
            FlowType::Variable {
                min_flow_rate_l_s,
                max_flow_rate_l_s,
            } => {
                let design_dt = (t_flow - t_return).max(1e-6);
                let required_l_s = power_w / (RHO_WATER * C_WATER * design_dt) * 1000.0;
                let clamped = required_l_s.clamp(min_flow_rate_l_s, max_flow_rate_l_s);
                if (clamped - required_l_s).abs() > 1e-9 {
                    // fsolve-equivalent rebalance: closes P = rho*cp*V*dT
                    // for the achievable flow rate (xtol=1e-2, §5).
                    let target = |dt: f64| -> f64 {
                        RHO_WATER * C_WATER * (clamped / 1000.0) * dt - power_w
                    };
                    if let Ok(dt) = brentq(target, 0.1, 80.0, 1e-2, 100) {
                        t_return = t_flow - dt;
                    }
                }
                clamped
            }
        };

        let t_flow_blended =
            (t_flow + self.bypass_fraction * t_return) / (1.0 + self.bypass_fraction);
        (t_flow_blended, t_return, flow_rate_l_s)
    }

    /// Steady-state emitter temperature solving `P = Sum c_i*(T_E -
    /// T_rm)^n_i` for `T_E` (§4.E step 1).
    fn required_emitter_temp(&self, power_w: f64, t_room_c: f64) -> HemResult<f64> {
        if power_w <= 0.0 {
            return Ok(t_room_c);
        }
        let residual = |t_e: f64| -> f64 {
            self.emitters
                .iter()
                .map(|e| e.output_w(t_e - t_room_c))
                .sum::<f64>()
                - power_w
        };
        brentq(residual, t_room_c, t_room_c + 120.0, 1e-2, 100)
            .map_err(|_| HemError::solver("emitter: required temperature did not converge"))
    }

    fn rhs(&self, power_in_w: f64, t_room_c: f64) -> impl Fn(f64, &[f64]) -> Vec<f64> + '_ {
        move |_t, y| {
            let output: f64 = self.emitters.iter().map(|e| e.output_w(y[0] - t_room_c)).sum();
            vec![(power_in_w - output) * 3600.0 / self.k_e_kj_per_k().max(1e-6)]
        }
    }

    /// Per-timestep demand against this circuit (§4.E). `heat_source`
    /// provides `energy_output_max`/`demand_energy`; when `commit` is
    /// false, `temp_emitter_prev` is left untouched (§5's
    /// `update_state=false` exploratory mode). Returns `(delivered_kwh,
    /// fan_energy_kwh)`; fan energy is only nonzero on the fan-coil path.
    #[allow(clippy::too_many_arguments)]
    pub fn demand(
        &mut self,
        energy_demand_kwh: f64,
        t_room_c: f64,
        t_ext_c: f64,
        delta_t_h: f64,
        heat_source: &mut dyn HeatSourceWet,
        commit: bool,
    ) -> HemResult<(f64, f64)> {
        if self.fancoil.is_some() {
            return self.demand_fancoil(energy_demand_kwh, t_room_c, delta_t_h, heat_source, commit);
        }

        let power_demand_w = energy_demand_kwh * 1000.0 / delta_t_h.max(1e-9);
        let t_e_req = self.required_emitter_temp(power_demand_w, t_room_c)?;
        let (t_flow, t_return, _flow_rate) = self.flow_return_temps(t_ext_c, power_demand_w);

        let t_e_prev = self.temp_emitter_prev;
        let delta_t_s = delta_t_h * 3600.0;

        // Step 2: cool-down phase, if the emitter starts hotter than required.
        let t_heat_start = if t_e_prev > t_e_req + 1e-9 {
            let cooldown_rhs = self.rhs(0.0, t_room_c);
            let event = |_t: f64, y: &[f64]| y[0] - t_e_req;
            let sol = solve_ivp_rk45(cooldown_rhs, delta_t_s, &[t_e_prev], 1e-6, 1e-8, Some(event));
            if sol.terminated_early {
                sol.t / 3600.0
            } else {
                delta_t_h
            }
        } else {
            0.0
        };

        if t_heat_start >= delta_t_h {
            // Never reaches the required temperature; emitter coasts down
            // releasing only its own stored heat, heat source idle.
            let t_final = {
                let cooldown_rhs = self.rhs(0.0, t_room_c);
                let sol = solve_ivp_rk45(
                    cooldown_rhs,
                    delta_t_s,
                    &[t_e_prev],
                    1e-6,
                    1e-8,
                    None::<fn(f64, &[f64]) -> f64>,
                );
                sol.y[0]
            };
            let released_kwh = self.thermal_mass_kwh_per_k * (t_e_prev - t_final);
            if commit {
                self.temp_emitter_prev = t_final;
            }
            return Ok((released_kwh.max(0.0), 0.0));
        }

        let time_available_h = delta_t_h - t_heat_start;
        let max_output_kwh = heat_source.energy_output_max(t_flow, t_return, time_available_h);
        let residual_kwh = energy_demand_kwh.min(max_output_kwh.max(0.0));
        let power_in_w = residual_kwh * 1000.0 / time_available_h.max(1e-9);

        let warmup_rhs = self.rhs(power_in_w, t_room_c);
        let event = |_t: f64, y: &[f64]| y[0] - t_e_req;
        let sol = solve_ivp_rk45(
            warmup_rhs,
            time_available_h * 3600.0,
            &[t_e_prev.min(t_e_req)],
            1e-6,
            1e-8,
            Some(event),
        );
        let t_final = if sol.terminated_early { t_e_req } else { sol.y[0] };

        let source_energy_kwh = heat_source.demand_energy(residual_kwh, t_flow, t_return, time_available_h);
        let released_kwh = source_energy_kwh + self.thermal_mass_kwh_per_k * (t_e_prev - t_final);

        if commit {
            self.temp_emitter_prev = t_final;
        }
        Ok((released_kwh.max(0.0), 0.0))
    }

    fn demand_fancoil(
        &mut self,
        energy_demand_kwh: f64,
        t_room_c: f64,
        delta_t_h: f64,
        heat_source: &mut dyn HeatSourceWet,
        commit: bool,
    ) -> HemResult<(f64, f64)> {
        let lookup = self.fancoil.as_ref().unwrap();
        let power_demand_w = energy_demand_kwh * 1000.0 / delta_t_h.max(1e-9);
        let t_flow = self.flow_temp_c(0.0);
        let t_return = self.initial_return_temp_c(t_flow);
        let delta_t = 0.5 * (t_flow + t_return) - t_room_c;

        let (speed, runtime_fraction) = lookup.select_speed(delta_t, power_demand_w);
        let achievable_w = lookup.output_w(delta_t, speed);
        let output_kwh = (achievable_w.min(power_demand_w)) * delta_t_h / 1000.0;
        let fan_energy_kwh = speed.fan_power_w * runtime_fraction * delta_t_h / 1000.0;

        let delivered = heat_source.demand_energy(output_kwh, t_flow, t_return, delta_t_h);
        if commit {
            self.temp_emitter_prev = t_room_c + delta_t;
        }
        Ok((delivered, fan_energy_kwh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct IdealHeatSource;
    impl HeatSourceWet for IdealHeatSource {
        fn energy_output_max(&self, _tf: f64, _tr: f64, time_available_h: f64) -> f64 {
            100.0 * time_available_h
        }
        fn demand_energy(&mut self, energy_demand_kwh: f64, _tf: f64, _tr: f64, _t: f64) -> f64 {
            energy_demand_kwh
        }
    }

    fn radiator_circuit() -> EmitterCircuit {
        EmitterCircuit::new(
            0.5,
            vec![EmitterKind::Radiator { c: 15.0, n: 1.3 }],
            None,
            55.0,
            35.0,
            -5.0,
            15.0,
            EcodesignClass::Ii,
            0.1,
            FlowType::Fixed {
                design_flow_rate_l_s: 0.2,
            },
        )
        .unwrap()
    }

    #[test]
    fn rejects_mixed_radiator_and_fancoil() {
        let result = EmitterCircuit::new(
            0.5,
            vec![EmitterKind::Radiator { c: 15.0, n: 1.3 }],
            Some(FanCoilLookup::new(vec![]).unwrap()),
            55.0,
            35.0,
            -5.0,
            15.0,
            EcodesignClass::I,
            0.0,
            FlowType::Fixed {
                design_flow_rate_l_s: 0.2,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn weather_compensated_flow_interpolates() {
        let circuit = radiator_circuit();
        let mid = 0.5 * (circuit.min_outdoor_temp_c + circuit.max_outdoor_temp_c);
        let flow = circuit.flow_temp_c(mid);
        assert!(flow > circuit.min_flow_temp_c && flow < circuit.design_flow_temp_c);
    }

    #[test]
    fn non_compensated_class_uses_design_flow_temp() {
        let mut circuit = radiator_circuit();
        circuit.ecodesign_class = EcodesignClass::I;
        assert_eq!(circuit.flow_temp_c(-5.0), circuit.design_flow_temp_c);
    }

    #[test]
    fn demand_heats_emitter_toward_room_when_no_load() {
        let mut circuit = radiator_circuit();
        circuit.temp_emitter_prev = 20.0;
        let mut source = IdealHeatSource;
        let (released, _fan) = circuit.demand(0.0, 20.0, 5.0, 1.0, &mut source, true).unwrap();
        assert!(released >= 0.0);
    }

    #[test]
    fn demand_releases_stored_heat_during_cooldown() {
        let mut circuit = radiator_circuit();
        circuit.temp_emitter_prev = 45.0;
        let mut source = IdealHeatSource;
        let (released, _fan) = circuit.demand(0.2, 20.0, 5.0, 1.0, &mut source, true).unwrap();
        assert!(released > 0.0);
        assert!(circuit.temp_emitter_prev <= 45.0);
    }

    #[test]
    fn exploratory_call_does_not_mutate_state_when_commit_false() {
        let mut circuit = radiator_circuit();
        circuit.temp_emitter_prev = 45.0;
        let mut source = IdealHeatSource;
        let before = circuit.temp_emitter_prev;
        circuit.demand(0.3, 20.0, 5.0, 1.0, &mut source, false).unwrap();
        assert_eq!(circuit.temp_emitter_prev, before);
    }
}
