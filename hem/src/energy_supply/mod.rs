// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Energy supply & on-site generation (component H): a per-fuel ledger
//! shared by every HVAC/HW consumer, an electric battery, a PV
//! closed-form calculator, and a single-slot diverter.

pub mod battery;
pub mod pv;

pub use battery::ElectricBattery;
pub use pv::PvSystem;

use crate::error::{HemError, HemResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelType {
    MainsGas,
    Electricity,
    UnmetDemand,
    Custom,
    LpgBulk,
    LpgBottled,
    LpgCondition11F,
    EnergyFromEnvironment,
}

/// One timestep's totals for a fuel supply: demand broken down by
/// registered end-user, plus import/export/generation splits (§3, §6).
#[derive(Debug, Clone, Default)]
pub struct SupplyTotals {
    pub demand_by_end_user_kwh: IndexMap<String, f64>,
    pub total_demand_kwh: f64,
    pub import_kwh: f64,
    pub export_kwh: f64,
    pub generated_total_kwh: f64,
    pub generation_to_consumption_kwh: f64,
    pub generation_to_storage_kwh: f64,
    pub generation_to_diverter_kwh: f64,
    pub diverted_kwh: f64,
}

/// A per-fuel energy ledger. Every consumer registers a unique name before
/// writing demand; double-registration is fatal (§5's shared-resource
/// rule). An optional battery and diverter may be attached, and an
/// ordered priority list of sink names resolves surplus generation.
pub struct EnergySupply {
    pub name: String,
    pub fuel: FuelType,
    pub is_export_capable: bool,
    pub priority: Vec<String>,
    pub battery: Option<ElectricBattery>,
    has_diverter: bool,

    registered_end_users: IndexMap<String, ()>,
    pub totals: SupplyTotals,
}

impl EnergySupply {
    pub fn new(name: String, fuel: FuelType, is_export_capable: bool, priority: Vec<String>) -> Self {
        EnergySupply {
            name,
            fuel,
            is_export_capable,
            priority,
            battery: None,
            has_diverter: false,
            registered_end_users: IndexMap::new(),
            totals: SupplyTotals::default(),
        }
    }

    pub fn register_end_user(&mut self, end_user_name: &str) -> HemResult<()> {
        if self.registered_end_users.contains_key(end_user_name) {
            return Err(HemError::config(format!(
                "energy supply '{}': end user '{}' is already registered",
                self.name, end_user_name
            )));
        }
        self.registered_end_users.insert(end_user_name.to_string(), ());
        self.totals.demand_by_end_user_kwh.insert(end_user_name.to_string(), 0.0);
        Ok(())
    }

    pub fn connect_diverter(&mut self) -> HemResult<()> {
        if self.has_diverter {
            return Err(HemError::config(format!(
                "energy supply '{}': a diverter is already connected",
                self.name
            )));
        }
        self.has_diverter = true;
        Ok(())
    }

    pub fn demand_energy(&mut self, end_user_name: &str, kwh: f64) -> HemResult<()> {
        let entry = self
            .totals
            .demand_by_end_user_kwh
            .get_mut(end_user_name)
            .ok_or_else(|| {
                HemError::config(format!(
                    "energy supply '{}': end user '{}' was never registered",
                    self.name, end_user_name
                ))
            })?;
        *entry += kwh;
        self.totals.total_demand_kwh += kwh;
        Ok(())
    }

    /// Distributes one timestep's generated supply across the priority
    /// sink list, then import/export (§3, testable property 6: the parts
    /// must sum back to `total_generation`).
    pub fn distribute_generation(&mut self, generated_kwh: f64) {
        self.totals.generated_total_kwh += generated_kwh;
        let mut remaining = generated_kwh;

        let demand_remaining = (self.totals.total_demand_kwh - self.totals.generation_to_consumption_kwh).max(0.0);
        let to_consumption = remaining.min(demand_remaining);
        self.totals.generation_to_consumption_kwh += to_consumption;
        remaining -= to_consumption;

        for sink in self.priority.clone() {
            if remaining <= 1e-12 {
                break;
            }
            if sink.eq_ignore_ascii_case("electricbattery") {
                if let Some(battery) = self.battery.as_mut() {
                    let accepted = battery.charge(remaining, 1.0);
                    self.totals.generation_to_storage_kwh += accepted;
                    remaining -= accepted;
                }
            } else if sink.eq_ignore_ascii_case("diverter") && self.has_diverter {
                self.totals.generation_to_diverter_kwh += remaining;
                self.totals.diverted_kwh += remaining;
                remaining = 0.0;
            }
        }

        if self.is_export_capable {
            self.totals.export_kwh += remaining;
        } else {
            // Curtailed surplus with no export capability contributes
            // nothing further; left untracked as the reference model does.
        }
    }

    /// Settles the timestep's import requirement against any unmet demand
    /// once generation has been distributed.
    pub fn settle_import(&mut self) {
        let met = self.totals.generation_to_consumption_kwh;
        let shortfall = (self.totals.total_demand_kwh - met).max(0.0);
        self.totals.import_kwh += shortfall;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_registration_is_fatal() {
        let mut supply = EnergySupply::new("mains_elec".into(), FuelType::Electricity, true, vec![]);
        supply.register_end_user("space_heat").unwrap();
        assert!(supply.register_end_user("space_heat").is_err());
    }

    #[test]
    fn double_diverter_connection_is_fatal() {
        let mut supply = EnergySupply::new("mains_elec".into(), FuelType::Electricity, true, vec![]);
        supply.connect_diverter().unwrap();
        assert!(supply.connect_diverter().is_err());
    }

    #[test]
    fn demand_energy_rejects_unregistered_end_user() {
        let mut supply = EnergySupply::new("mains_elec".into(), FuelType::Electricity, true, vec![]);
        assert!(supply.demand_energy("ghost", 1.0).is_err());
    }

    #[test]
    fn generation_round_trips_to_consumption_and_export() {
        let mut supply = EnergySupply::new("mains_elec".into(), FuelType::Electricity, true, vec![]);
        supply.register_end_user("appliances").unwrap();
        supply.demand_energy("appliances", 2.0).unwrap();
        supply.distribute_generation(5.0);
        let sum = supply.totals.generation_to_consumption_kwh
            + supply.totals.generation_to_storage_kwh
            + supply.totals.generation_to_diverter_kwh
            + supply.totals.export_kwh;
        assert!((sum - supply.totals.generated_total_kwh).abs() < 1e-9);
        assert!((supply.totals.generation_to_consumption_kwh - 2.0).abs() < 1e-9);
        assert!((supply.totals.export_kwh - 3.0).abs() < 1e-9);
    }

    #[test]
    fn priority_battery_then_diverter_before_export() {
        let mut supply = EnergySupply::new(
            "mains_elec".into(),
            FuelType::Electricity,
            true,
            vec!["ElectricBattery".into(), "diverter".into()],
        );
        supply.battery = Some(ElectricBattery::new(2.0, 0.9, 1.0, 1.0, 0.0, 20.0).unwrap());
        supply.connect_diverter().unwrap();
        supply.distribute_generation(5.0);
        assert!(supply.totals.generation_to_storage_kwh > 0.0);
        assert!(supply.battery.as_ref().unwrap().state_of_charge() > 0.0);
    }
}
