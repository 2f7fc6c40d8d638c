// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Zone thermal solver (component D): per-zone lumped-node RC network per
//! BS EN ISO 52016-1, solved each timestep for node temperatures,
//! operative/air temperature and required heating/cooling load.

mod fast_solver;
mod heat_balance;
mod matrix;

pub use heat_balance::{HeatBalanceEntry, HeatBalanceKind, HeatBalanceReport};

use crate::elements::{BuildingElement, F_HC_C, F_INT_C, F_SOL_C};
use crate::error::HemError;
use crate::units::air_density_at_altitude;

/// Setpoint sensing basis: whether the thermostat senses air or operative
/// temperature (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SetpointBasis {
    Air,
    Operative,
}

/// Gains to distribute across a timestep's heat balance: internal gains
/// (metabolic/appliance), solar gains already localised to the relevant
/// exterior nodes, and heating/cooling load under trial.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneGains {
    pub internal_gains_w: f64,
    pub solar_gains_w: f64,
    pub heating_cooling_w: f64,
}

/// A thermal zone: building elements + thermal bridge + floor area +
/// volume + ventilation reference + setpoint basis. Owns a per-node
/// temperature vector persisted between timesteps (§3).
pub struct Zone {
    pub name: String,
    pub elements: Vec<BuildingElement>,
    pub thermal_bridge_coeff_w_per_k: f64,
    pub floor_area_m2: f64,
    pub volume_m3: f64,
    pub setpoint_basis: SetpointBasis,
    pub altitude_m: f64,

    /// Offsets of each element's first node within `temperatures`.
    offsets: Vec<usize>,
    /// Total node count including the trailing air node.
    n: usize,
    /// Persistent per-node temperatures; the air node is the last entry.
    pub temperatures: Vec<f64>,
}

impl Zone {
    pub fn new(
        name: String,
        elements: Vec<BuildingElement>,
        thermal_bridge_coeff_w_per_k: f64,
        floor_area_m2: f64,
        volume_m3: f64,
        setpoint_basis: SetpointBasis,
        altitude_m: f64,
        init_temp: f64,
    ) -> Result<Self, HemError> {
        for e in &elements {
            e.validate()?;
        }
        let mut offsets = Vec::with_capacity(elements.len());
        let mut n = 0usize;
        for e in &elements {
            offsets.push(n);
            n += e.node_chain().node_count();
        }
        let n_total = n + 1; // + air node
        Ok(Zone {
            name,
            elements,
            thermal_bridge_coeff_w_per_k,
            floor_area_m2,
            volume_m3,
            setpoint_basis,
            altitude_m,
            offsets,
            n: n_total,
            temperatures: vec![init_temp; n_total],
        })
    }

    pub fn air_node_idx(&self) -> usize {
        self.n - 1
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    pub fn interior_surface_idx(&self, element_idx: usize) -> usize {
        self.offsets[element_idx] + self.elements[element_idx].node_chain().node_count() - 1
    }

    pub fn element_offset(&self, element_idx: usize) -> usize {
        self.offsets[element_idx]
    }

    /// Internal air volumetric capacitance, `C_int = 10000 J/m2K * A_floor`
    /// (§4.D).
    pub fn air_capacitance(&self) -> f64 {
        10_000.0 * self.floor_area_m2
    }

    pub fn air_density(&self) -> f64 {
        air_density_at_altitude(self.altitude_m)
    }

    /// Operative temperature: mean of air temperature and the area-weighted
    /// mean interior-surface temperature (glossary).
    pub fn operative_temp(&self, temperatures: &[f64]) -> f64 {
        let t_air = temperatures[self.air_node_idx()];
        let total_area: f64 = self.elements.iter().map(|e| e.area()).sum();
        let weighted: f64 = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| e.area() * temperatures[self.interior_surface_idx(i)])
            .sum();
        let t_surf_mean = if total_area > 0.0 {
            weighted / total_area
        } else {
            t_air
        };
        0.5 * (t_air + t_surf_mean)
    }

    pub fn air_temp(&self, temperatures: &[f64]) -> f64 {
        temperatures[self.air_node_idx()]
    }

    /// Solves for free-float + heating/cooling demand per §4.D's five-step
    /// algorithm. `q_ve_ach` is the air changes/hour from the ventilation
    /// solver (component C); `use_fast_solver` selects the matrix path.
    /// Returns `(heating_kwh, cooling_kwh, final_temperatures)`; state is
    /// NOT mutated here (callers commit via `commit_temperatures`), matching
    /// §5's `update_state=false` exploratory-call requirement.
    #[allow(clippy::too_many_arguments)]
    pub fn space_heat_cool_demand(
        &self,
        inputs: &matrix::ZoneSolveInputs,
        temp_setpnt_heat: f64,
        temp_setpnt_cool_vent: f64,
        temp_setpnt_cool: f64,
        delta_t_h: f64,
        use_fast_solver: bool,
    ) -> Result<DemandResult, HemError> {
        if !(temp_setpnt_heat <= temp_setpnt_cool_vent && temp_setpnt_cool_vent <= temp_setpnt_cool)
        {
            return Err(HemError::config(
                "setpoints must satisfy temp_setpnt_heat <= temp_setpnt_cool_vent <= temp_setpnt_cool",
            ));
        }

        let solve = |gains: ZoneGains, ach: f64| -> Result<Vec<f64>, HemError> {
            if use_fast_solver {
                fast_solver::solve(self, inputs, gains, ach, delta_t_h)
            } else {
                matrix::solve_naive(self, inputs, gains, ach, delta_t_h)
            }
        };

        // Step 1: free-float at baseline ACH.
        let t_free = solve(ZoneGains::default(), inputs.ach_baseline)?;
        let t_op_free = self.operative_temp(&t_free);
        let t_air_free = self.air_temp(&t_free);

        let (t_op_used, t_air_used, basis_free) = match self.setpoint_basis {
            SetpointBasis::Operative => (t_op_free, t_op_free, t_op_free),
            SetpointBasis::Air => (t_op_free, t_air_free, t_air_free),
        };
        let _ = t_op_used;

        // Step 2: ventilative-cooling potential, ACH adopted for the
        // remaining steps.
        let mut ach_cooling = inputs.ach_baseline;
        if basis_free > temp_setpnt_cool_vent && inputs.ach_windows_open > inputs.ach_target {
            let t_max_vent = solve(ZoneGains::default(), inputs.ach_windows_open)?;
            let basis_max_vent = self.setpoint_reading(&t_max_vent);
            if basis_free > basis_max_vent {
                let frac = ((basis_free - temp_setpnt_cool_vent)
                    / (basis_free - basis_max_vent))
                    .clamp(0.0, 1.0);
                ach_cooling = inputs.ach_baseline
                    + frac * (inputs.ach_windows_open - inputs.ach_baseline);
            }
            let t_adopted = solve(ZoneGains::default(), ach_cooling)?;
            if self.setpoint_reading(&t_adopted) > temp_setpnt_cool {
                ach_cooling = inputs.ach_target;
            }
        }

        let t_free2 = solve(ZoneGains::default(), ach_cooling)?;
        let basis_free2 = self.setpoint_reading(&t_free2);

        // Step 3: regime decision.
        let area_total: f64 = self.elements.iter().map(|e| e.area()).sum();
        let (trial_load, setpoint) = if basis_free2 > temp_setpnt_cool {
            (-10.0 * self.floor_area_m2.max(area_total.max(1.0)), temp_setpnt_cool)
        } else if basis_free2 < temp_setpnt_heat {
            (10.0 * self.floor_area_m2.max(area_total.max(1.0)), temp_setpnt_heat)
        } else {
            return Ok(DemandResult {
                heating_kwh: 0.0,
                cooling_kwh: 0.0,
                temperatures: t_free2,
                operative_temp: self.operative_temp(&t_free2),
                air_temp: self.air_temp(&t_free2),
                ach_used: ach_cooling,
            });
        };

        // Step 4: trial solve with the candidate load.
        let gains_trial = ZoneGains {
            heating_cooling_w: trial_load,
            ..Default::default()
        };
        let t_upper = solve(gains_trial, ach_cooling)?;
        let basis_upper = self.setpoint_reading(&t_upper);

        // Step 5: linear interpolation to the setpoint.
        let denom = basis_upper - basis_free2;
        if denom.abs() < 1e-9 {
            return Err(HemError::physical(
                "zone demand interpolation: non-positive effective thermal mass (zero sensitivity to trial load)",
            ));
        }
        let demand_w = trial_load * (setpoint - basis_free2) / denom;
        let demand_kwh = demand_w * delta_t_h / 1000.0;

        let gains_final = ZoneGains {
            heating_cooling_w: demand_w,
            ..Default::default()
        };
        let t_final = solve(gains_final, ach_cooling)?;

        let (heating_kwh, cooling_kwh) = if demand_w >= 0.0 {
            (demand_kwh, 0.0)
        } else {
            (0.0, demand_kwh)
        };

        Ok(DemandResult {
            heating_kwh,
            cooling_kwh,
            temperatures: t_final,
            operative_temp: self.operative_temp(&t_final),
            air_temp: self.air_temp(&t_final),
            ach_used: ach_cooling,
        })
    }

    fn setpoint_reading(&self, temperatures: &[f64]) -> f64 {
        match self.setpoint_basis {
            SetpointBasis::Operative => self.operative_temp(temperatures),
            SetpointBasis::Air => self.air_temp(temperatures),
        }
    }

    /// Persists a solved temperature vector as the zone's new state. Must
    /// be called exactly once per committed timestep (§5).
    pub fn commit_temperatures(&mut self, temperatures: Vec<f64>) {
        self.temperatures = temperatures;
    }

    /// Steady-state initialisation: iterates the demand-then-update cycle
    /// at Delta t = 8760 h until consecutive temperature vectors agree to
    /// <= 1e-8 relative tolerance, with frac_convective = 0.4 (§4.D).
    pub fn initialise_steady_state(
        &mut self,
        inputs: &matrix::ZoneSolveInputs,
        t_setpnt_init: f64,
    ) -> Result<(), HemError> {
        let _ = (F_INT_C, F_HC_C, F_SOL_C, t_setpnt_init);
        let max_iter = 200;
        for _ in 0..max_iter {
            let prev = self.temperatures.clone();
            let t_next = matrix::solve_naive(self, inputs, ZoneGains::default(), inputs.ach_baseline, 8760.0)?;
            let max_rel_diff = prev
                .iter()
                .zip(t_next.iter())
                .map(|(a, b)| ((a - b).abs() / a.abs().max(1.0)))
                .fold(0.0_f64, f64::max);
            self.temperatures = t_next;
            if max_rel_diff <= 1e-8 {
                return Ok(());
            }
        }
        Err(HemError::solver(
            "zone steady-state initialisation did not converge within the iteration budget",
        ))
    }
}

pub struct DemandResult {
    pub heating_kwh: f64,
    pub cooling_kwh: f64,
    pub temperatures: Vec<f64>,
    pub operative_temp: f64,
    pub air_temp: f64,
    pub ach_used: f64,
}

pub use matrix::ZoneSolveInputs;
