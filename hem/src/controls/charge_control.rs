// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Charge-control logics for electric storage heaters (component F),
//! modelled per §9's "polymorphic charge control" redesign note as a sum
//! type rather than a method that branches on a `logic_type` string.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::Control;

/// Lookup table mapping outdoor temperature to a maximum charge fraction,
/// linearly interpolated (AUTOMATIC/CELECT).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempChargeCurve {
    pub temperatures: Vec<f64>,
    pub max_charge_fractions: Vec<f64>,
}

impl TempChargeCurve {
    pub fn interp(&self, t_ext: f64) -> f64 {
        crate::utils::linear_interp(&self.temperatures, &self.max_charge_fractions, t_ext)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChargeLogic {
    Manual,
    Automatic {
        external_sensor_curve: TempChargeCurve,
        temp_charge_cut: f64,
        monthly_charge_cut_delta: [f64; 12],
    },
    Celect {
        external_sensor_curve: TempChargeCurve,
        temp_charge_cut: f64,
        monthly_charge_cut_delta: [f64; 12],
    },
    Hhrsh {
        heat_retention_ratio: f64,
    },
    /// Heat-battery style control: behaves like MANUAL for target-charge
    /// purposes but is kept distinct because a `ChargeControl` combined in
    /// a `CombinationTimeControl` must not mix with another `ChargeControl`
    /// (§6 configuration invariant).
    HeatBattery,
}

/// Named daily target-SOC schedule plus the charge logic that modulates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeControl {
    pub schedule_target_soc: Vec<f64>,
    pub start_day: u32,
    pub time_series_step: f64,
    pub logic: ChargeLogic,

    /// 24-hour ring buffers owned by the HHRSH logic (§3 "Electric storage
    /// heater"): recent external temperature, look-ahead external
    /// temperature, and recent demand. Not serialised; rebuilt/fed by the
    /// owning storage heater each timestep.
    #[serde(skip)]
    pub hhrsh_past_ext_temp: VecDeque<f64>,
    #[serde(skip)]
    pub hhrsh_future_ext_temp: VecDeque<f64>,
    #[serde(skip)]
    pub hhrsh_recent_demand: VecDeque<f64>,
}

const HHRSH_RING_LEN: usize = 24;

impl ChargeControl {
    /// Nominal scheduled target SOC for a timestep, before any weather- or
    /// demand-derived limiting.
    pub fn scheduled_target_soc(&self, timestep_idx: usize) -> f64 {
        if self.schedule_target_soc.is_empty() {
            return 0.0;
        }
        self.schedule_target_soc[timestep_idx % self.schedule_target_soc.len()]
    }

    pub fn push_hhrsh_sample(&mut self, past_ext_temp: f64, future_ext_temp: f64, demand_kwh: f64) {
        push_ring(&mut self.hhrsh_past_ext_temp, past_ext_temp, HHRSH_RING_LEN);
        push_ring(
            &mut self.hhrsh_future_ext_temp,
            future_ext_temp,
            HHRSH_RING_LEN,
        );
        push_ring(&mut self.hhrsh_recent_demand, demand_kwh, HHRSH_RING_LEN);
    }

    /// Target SOC for the given timestep's charge, resolving the active
    /// logic. `room_temp`/`month` are only consulted by AUTOMATIC/CELECT;
    /// `state_of_charge`/`storage_capacity_kwh` are only consulted by HHRSH,
    /// which closes the loop against what the heater is actually holding.
    pub fn target_charge(
        &self,
        timestep_idx: usize,
        room_temp: f64,
        month: usize,
        t_ext: f64,
        state_of_charge: f64,
        storage_capacity_kwh: f64,
    ) -> f64 {
        let scheduled = self.scheduled_target_soc(timestep_idx);
        match &self.logic {
            ChargeLogic::Manual | ChargeLogic::HeatBattery => scheduled,
            ChargeLogic::Automatic {
                external_sensor_curve,
                temp_charge_cut,
                monthly_charge_cut_delta,
            }
            | ChargeLogic::Celect {
                external_sensor_curve,
                temp_charge_cut,
                monthly_charge_cut_delta,
            } => {
                let cut = temp_charge_cut + monthly_charge_cut_delta[month % 12];
                if room_temp >= cut {
                    0.0
                } else {
                    scheduled * external_sensor_curve.interp(t_ext)
                }
            }
            ChargeLogic::Hhrsh {
                heat_retention_ratio,
            } => scheduled.min(self.hhrsh_target(
                *heat_retention_ratio,
                state_of_charge,
                storage_capacity_kwh,
            )),
        }
    }

    /// High heat-retention sizing: `energy_to_store` is proportional to the
    /// ratio of forecast to historical heating-degree-hours, scaled by
    /// recent demand. The shortfall against what is already stored
    /// (`state_of_charge * storage_capacity_kwh`) is then scaled by the
    /// heat-retention ratio and added back onto the current SOC (§4.F).
    fn hhrsh_target(
        &self,
        heat_retention_ratio: f64,
        state_of_charge: f64,
        storage_capacity_kwh: f64,
    ) -> f64 {
        const BASE_TEMP: f64 = 15.5;

        let hdh = |ring: &VecDeque<f64>| -> f64 {
            ring.iter().map(|&t| (BASE_TEMP - t).max(0.0)).sum::<f64>()
        };
        let past_hdh = hdh(&self.hhrsh_past_ext_temp);
        let future_hdh = hdh(&self.hhrsh_future_ext_temp);
        let recent_demand: f64 = self.hhrsh_recent_demand.iter().sum();

        if past_hdh <= 0.0 {
            return 0.0;
        }
        let energy_to_store = (future_hdh / past_hdh) * recent_demand;
        if energy_to_store <= 0.0 {
            return 0.0;
        }
        let capacity = storage_capacity_kwh.max(1e-9);
        let energy_stored = state_of_charge * capacity;
        let energy_to_add = if heat_retention_ratio <= 0.0 {
            capacity - energy_stored
        } else {
            (1.0 / heat_retention_ratio) * (energy_to_store - energy_stored)
        };
        (state_of_charge + energy_to_add / capacity).clamp(0.0, 1.0)
    }
}

fn push_ring(ring: &mut VecDeque<f64>, value: f64, max_len: usize) {
    ring.push_back(value);
    while ring.len() > max_len {
        ring.pop_front();
    }
}

impl Control for ChargeControl {
    fn is_on(&self, timestep_idx: usize) -> bool {
        self.scheduled_target_soc(timestep_idx) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> ChargeControl {
        ChargeControl {
            schedule_target_soc: vec![0.0, 1.0],
            start_day: 0,
            time_series_step: 1.0,
            logic: ChargeLogic::Manual,
            hhrsh_past_ext_temp: VecDeque::new(),
            hhrsh_future_ext_temp: VecDeque::new(),
            hhrsh_recent_demand: VecDeque::new(),
        }
    }

    #[test]
    fn manual_follows_schedule() {
        let c = manual();
        assert_eq!(c.target_charge(0, 18.0, 0, 5.0, 0.0, 10.0), 0.0);
        assert_eq!(c.target_charge(1, 18.0, 0, 5.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn automatic_cuts_above_temp_threshold() {
        let mut c = manual();
        c.schedule_target_soc = vec![1.0];
        c.logic = ChargeLogic::Automatic {
            external_sensor_curve: TempChargeCurve {
                temperatures: vec![-5.0, 15.0],
                max_charge_fractions: vec![1.0, 0.2],
            },
            temp_charge_cut: 20.0,
            monthly_charge_cut_delta: [0.0; 12],
        };
        assert_eq!(c.target_charge(0, 21.0, 0, 0.0, 0.0, 10.0), 0.0);
        let below_cut = c.target_charge(0, 19.0, 0, -5.0, 0.0, 10.0);
        assert!((below_cut - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hhrsh_zero_demand_gives_zero_target() {
        let mut c = manual();
        c.schedule_target_soc = vec![1.0];
        c.logic = ChargeLogic::Hhrsh {
            heat_retention_ratio: 0.5,
        };
        assert_eq!(c.target_charge(0, 18.0, 0, 5.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn hhrsh_nonzero_demand_is_capped_by_schedule() {
        let mut c = manual();
        c.schedule_target_soc = vec![0.3];
        c.logic = ChargeLogic::Hhrsh {
            heat_retention_ratio: 0.6,
        };
        for _ in 0..24 {
            c.push_hhrsh_sample(0.0, -5.0, 2.0);
        }
        let target = c.target_charge(0, 18.0, 0, 0.0, 0.0, 10.0);
        assert!(target <= 0.3 + 1e-9);
        assert!(target >= 0.0);
    }

    #[test]
    fn hhrsh_wants_less_the_more_is_already_stored() {
        let mut c = manual();
        c.schedule_target_soc = vec![1.0];
        c.logic = ChargeLogic::Hhrsh {
            heat_retention_ratio: 0.6,
        };
        for _ in 0..24 {
            c.push_hhrsh_sample(0.0, -5.0, 2.0);
        }
        let target_empty = c.target_charge(0, 18.0, 0, 0.0, 0.0, 10.0);
        let target_half_full = c.target_charge(0, 18.0, 0, 0.0, 0.5, 10.0);
        assert!(target_half_full < target_empty);
    }

    #[test]
    fn hhrsh_targets_full_when_retention_ratio_is_zero() {
        let mut c = manual();
        c.schedule_target_soc = vec![1.0];
        c.logic = ChargeLogic::Hhrsh {
            heat_retention_ratio: 0.0,
        };
        for _ in 0..24 {
            c.push_hhrsh_sample(0.0, -5.0, 2.0);
        }
        let target = c.target_charge(0, 18.0, 0, 0.0, 0.2, 10.0);
        assert!((target - 1.0).abs() < 1e-9);
    }
}
