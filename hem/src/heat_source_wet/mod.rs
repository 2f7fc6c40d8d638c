// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Heat sources wet (component G): the generators an emitter circuit or
//! storage-cylinder coil draws on. Three variants cover the named
//! equipment classes (glossary): an air/ground-source heat pump with a
//! flow-temperature-dependent COP curve, a combustion boiler with a
//! return-temperature-dependent efficiency curve, and a heat-interface
//! unit drawing from a district network at fixed efficiency.

use serde::{Deserialize, Serialize};

use crate::emitters::HeatSourceWet;
use crate::utils::linear_interp;

/// COP as a function of flow temperature, at a fixed assumed source
/// temperature; linearly interpolated (manufacturer test-point table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopCurve {
    pub flow_temp_c: Vec<f64>,
    pub cop: Vec<f64>,
}

impl CopCurve {
    fn cop_at(&self, flow_temp_c: f64) -> f64 {
        linear_interp(&self.flow_temp_c, &self.cop, flow_temp_c).max(0.1)
    }
}

/// Thermal efficiency as a function of return temperature (condensing
/// boilers recover more latent heat at lower return temperatures).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyCurve {
    pub return_temp_c: Vec<f64>,
    pub efficiency: Vec<f64>,
}

impl EfficiencyCurve {
    fn efficiency_at(&self, return_temp_c: f64) -> f64 {
        linear_interp(&self.return_temp_c, &self.efficiency, return_temp_c).clamp(0.01, 1.2)
    }
}

/// Electrically driven heat pump: output bounded by rated thermal power,
/// electrical draw billed to `energy_supply_name` via the supplied fuel
/// ledger name (resolved by the caller, since the heat source itself does
/// not own a reference to the project's `EnergySupply` map).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatPump {
    pub rated_thermal_power_w: f64,
    pub cop_curve: CopCurve,
    pub energy_supply_name: String,
}

/// Fuel-fired boiler: output bounded by rated thermal power, fuel draw
/// billed to `energy_supply_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boiler {
    pub rated_thermal_power_w: f64,
    pub efficiency_curve: EfficiencyCurve,
    pub energy_supply_name: String,
}

/// Heat-interface unit: a district-network substation at a fixed heat
/// exchanger efficiency, billed against a heat-network fuel ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hiu {
    pub rated_thermal_power_w: f64,
    pub efficiency: f64,
    pub energy_supply_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnyHeatSourceWet {
    HeatPump(HeatPump),
    Boiler(Boiler),
    Hiu(Hiu),
}

impl AnyHeatSourceWet {
    pub fn energy_supply_name(&self) -> &str {
        match self {
            AnyHeatSourceWet::HeatPump(h) => &h.energy_supply_name,
            AnyHeatSourceWet::Boiler(h) => &h.energy_supply_name,
            AnyHeatSourceWet::Hiu(h) => &h.energy_supply_name,
        }
    }

    /// Energy drawn from the fuel supply (kWh) to deliver `delivered_kwh`
    /// of heat at the given flow/return pair.
    pub fn fuel_energy_for(&self, delivered_kwh: f64, temp_output_c: f64, temp_return_c: f64) -> f64 {
        match self {
            AnyHeatSourceWet::HeatPump(h) => delivered_kwh / h.cop_curve.cop_at(temp_output_c),
            AnyHeatSourceWet::Boiler(h) => delivered_kwh / h.efficiency_curve.efficiency_at(temp_return_c),
            AnyHeatSourceWet::Hiu(h) => delivered_kwh / h.efficiency.max(0.01),
        }
    }
}

impl HeatSourceWet for AnyHeatSourceWet {
    fn energy_output_max(&self, _temp_output_c: f64, _temp_return_c: f64, time_available_h: f64) -> f64 {
        let rated_w = match self {
            AnyHeatSourceWet::HeatPump(h) => h.rated_thermal_power_w,
            AnyHeatSourceWet::Boiler(h) => h.rated_thermal_power_w,
            AnyHeatSourceWet::Hiu(h) => h.rated_thermal_power_w,
        };
        rated_w * time_available_h / 1000.0
    }

    fn demand_energy(
        &mut self,
        energy_demand_kwh: f64,
        temp_output_c: f64,
        temp_return_c: f64,
        time_available_h: f64,
    ) -> f64 {
        let max = self.energy_output_max(temp_output_c, temp_return_c, time_available_h);
        energy_demand_kwh.min(max).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heat_pump() -> AnyHeatSourceWet {
        AnyHeatSourceWet::HeatPump(HeatPump {
            rated_thermal_power_w: 8000.0,
            cop_curve: CopCurve {
                flow_temp_c: vec![35.0, 45.0, 55.0],
                cop: vec![4.0, 3.2, 2.5],
            },
            energy_supply_name: "mains_elec".into(),
        })
    }

    #[test]
    fn demand_is_bounded_by_rated_power() {
        let mut hp = heat_pump();
        let delivered = hp.demand_energy(100.0, 45.0, 30.0, 1.0);
        assert!((delivered - 8.0).abs() < 1e-9);
    }

    #[test]
    fn higher_flow_temperature_costs_more_fuel_energy() {
        let hp = heat_pump();
        let cheap = hp.fuel_energy_for(1.0, 35.0, 30.0);
        let dear = hp.fuel_energy_for(1.0, 55.0, 30.0);
        assert!(dear > cheap);
    }

    #[test]
    fn boiler_efficiency_improves_at_lower_return_temp() {
        let boiler = AnyHeatSourceWet::Boiler(Boiler {
            rated_thermal_power_w: 24000.0,
            efficiency_curve: EfficiencyCurve {
                return_temp_c: vec![30.0, 50.0, 70.0],
                efficiency: vec![1.08, 0.95, 0.88],
            },
            energy_supply_name: "mains_gas".into(),
        });
        let low_return = boiler.fuel_energy_for(1.0, 60.0, 30.0);
        let high_return = boiler.fuel_energy_for(1.0, 60.0, 70.0);
        assert!(low_return < high_return);
    }
}
