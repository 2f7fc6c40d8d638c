// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Electric battery with round-trip efficiency, SOC bookkeeping and
//! age-derated capacity (§3 "Energy supply"; supplemented from the source
//! material's battery ageing model, beyond the distilled airflow spec).

use serde::{Deserialize, Serialize};

use crate::error::{HemError, HemResult};

/// Battery installation location, used to derate available capacity for
/// ambient-temperature effects on cell chemistry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryLocation {
    Indoor,
    Outdoor,
}

pub struct ElectricBattery {
    pub nominal_capacity_kwh: f64,
    /// One-way (charge or discharge) efficiency, `sqrt(round_trip_efficiency)`.
    pub one_way_efficiency: f64,
    pub max_charge_rate_kw: f64,
    pub max_discharge_rate_kw: f64,
    pub age_years: f64,
    pub location: BatteryLocation,
    soc: f64,
}

impl ElectricBattery {
    pub fn new(
        nominal_capacity_kwh: f64,
        round_trip_efficiency: f64,
        max_charge_rate_kw: f64,
        max_discharge_rate_kw: f64,
        age_years: f64,
        design_life_years: f64,
    ) -> HemResult<Self> {
        if !(0.0..=1.0).contains(&round_trip_efficiency) {
            return Err(HemError::config(
                "electric battery: round_trip_efficiency must lie in [0, 1]",
            ));
        }
        let _ = design_life_years;
        Ok(ElectricBattery {
            nominal_capacity_kwh,
            one_way_efficiency: round_trip_efficiency.sqrt(),
            max_charge_rate_kw,
            max_discharge_rate_kw,
            age_years,
            location: BatteryLocation::Indoor,
            soc: 0.0,
        })
    }

    /// State-of-health derating: a linear fade to 80% capacity retention
    /// over the design life, a common first-order approximation for
    /// Li-ion cycle ageing.
    pub fn state_of_health(&self, design_life_years: f64) -> f64 {
        if design_life_years <= 0.0 {
            return 1.0;
        }
        let fade = 0.2 * (self.age_years / design_life_years).min(1.0);
        1.0 - fade
    }

    /// Usable capacity after SOH and a fixed outdoor-location derating
    /// (cold ambient temperature reduces usable Li-ion capacity).
    pub fn effective_capacity_kwh(&self, design_life_years: f64) -> f64 {
        let location_derate = match self.location {
            BatteryLocation::Indoor => 1.0,
            BatteryLocation::Outdoor => 0.9,
        };
        self.nominal_capacity_kwh * self.state_of_health(design_life_years) * location_derate
    }

    pub fn state_of_charge(&self) -> f64 {
        self.soc
    }

    /// Accepts up to `available_kwh` of supply over `delta_t_h`, bounded by
    /// charge-rate and remaining headroom; returns the energy actually
    /// drawn from supply (before one-way efficiency losses).
    pub fn charge(&mut self, available_kwh: f64, delta_t_h: f64) -> f64 {
        let capacity = self.nominal_capacity_kwh.max(1e-9);
        let rate_limited_kwh = self.max_charge_rate_kw * delta_t_h;
        let headroom_kwh = (1.0 - self.soc) * capacity / self.one_way_efficiency.max(1e-9);
        let drawn_kwh = available_kwh.min(rate_limited_kwh).min(headroom_kwh).max(0.0);
        self.soc += drawn_kwh * self.one_way_efficiency / capacity;
        self.soc = self.soc.clamp(0.0, 1.0);
        drawn_kwh
    }

    /// Discharges up to `demand_kwh` over `delta_t_h`, bounded by
    /// discharge-rate and remaining charge; returns the energy delivered
    /// to the load (after one-way efficiency losses).
    pub fn discharge(&mut self, demand_kwh: f64, delta_t_h: f64) -> f64 {
        let capacity = self.nominal_capacity_kwh.max(1e-9);
        let rate_limited_kwh = self.max_discharge_rate_kw * delta_t_h;
        let available_kwh = self.soc * capacity * self.one_way_efficiency;
        let delivered_kwh = demand_kwh.min(rate_limited_kwh).min(available_kwh).max(0.0);
        self.soc -= (delivered_kwh / self.one_way_efficiency.max(1e-9)) / capacity;
        self.soc = self.soc.clamp(0.0, 1.0);
        delivered_kwh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_round_trip_efficiency() {
        assert!(ElectricBattery::new(5.0, 1.5, 2.0, 2.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn charge_and_discharge_stay_within_bounds() {
        let mut battery = ElectricBattery::new(5.0, 0.9, 3.0, 3.0, 0.0, 10.0).unwrap();
        for _ in 0..20 {
            battery.charge(10.0, 1.0);
            assert!(battery.state_of_charge() >= 0.0 && battery.state_of_charge() <= 1.0);
        }
        for _ in 0..20 {
            battery.discharge(10.0, 1.0);
            assert!(battery.state_of_charge() >= 0.0 && battery.state_of_charge() <= 1.0);
        }
    }

    #[test]
    fn state_of_health_fades_with_age() {
        let mut battery = ElectricBattery::new(5.0, 0.9, 3.0, 3.0, 0.0, 10.0).unwrap();
        let fresh = battery.state_of_health(10.0);
        battery.age_years = 10.0;
        let aged = battery.state_of_health(10.0);
        assert!(aged < fresh);
        assert!(aged >= 0.79 && aged <= 0.81);
    }

    #[test]
    fn outdoor_location_derates_effective_capacity() {
        let mut battery = ElectricBattery::new(5.0, 0.9, 3.0, 3.0, 0.0, 10.0).unwrap();
        let indoor = battery.effective_capacity_kwh(10.0);
        battery.location = BatteryLocation::Outdoor;
        let outdoor = battery.effective_capacity_kwh(10.0);
        assert!(outdoor < indoor);
    }
}
