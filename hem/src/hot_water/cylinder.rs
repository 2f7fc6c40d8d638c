// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Hot-water source (§3 "Hot-water system"): a storage cylinder with
//! standing losses and a coil fed by a heat source wet, or a direct
//! point-of-use/combi/HIU path with no stored volume.

use serde::{Deserialize, Serialize};

use crate::emitters::HeatSourceWet;
use crate::heat_source_wet::AnyHeatSourceWet;
use crate::units::RHO_WATER;

const J_PER_LITRE_KELVIN: f64 = RHO_WATER * 4184.0 / 1000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageCylinder {
    pub volume_l: f64,
    /// Standing heat-loss coefficient, W/K above ambient.
    pub loss_coeff_w_per_k: f64,
    pub setpoint_c: f64,
    pub heat_source: AnyHeatSourceWet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HotWaterSource {
    Storage(StorageCylinder),
    PointOfUse(AnyHeatSourceWet),
    Combi(AnyHeatSourceWet),
    Hiu(AnyHeatSourceWet),
}

impl HotWaterSource {
    fn heat_source_mut(&mut self) -> &mut AnyHeatSourceWet {
        match self {
            HotWaterSource::Storage(c) => &mut c.heat_source,
            HotWaterSource::PointOfUse(h) | HotWaterSource::Combi(h) | HotWaterSource::Hiu(h) => h,
        }
    }

    /// Standing loss for a storage cylinder over `delta_t_h` at the given
    /// ambient temperature; zero for direct/instantaneous sources, which
    /// hold no stored volume (§4.G, `primary_standing_loss_kwh` handles the
    /// distribution pipework's own standby loss separately).
    pub fn standing_loss_kwh(&self, t_ambient_c: f64, delta_t_h: f64) -> f64 {
        match self {
            HotWaterSource::Storage(c) => {
                c.loss_coeff_w_per_k * (c.setpoint_c - t_ambient_c).max(0.0) * delta_t_h / 1000.0
            }
            _ => 0.0,
        }
    }

    /// Energy drawn from the fuel ledger (kWh) to meet `demand_kwh` of hot
    /// water at the cylinder/delivery setpoint over `delta_t_h`, bounded by
    /// the heat source's rated output.
    pub fn fuel_energy_for_demand(&mut self, demand_kwh: f64, flow_temp_c: f64, return_temp_c: f64, delta_t_h: f64) -> f64 {
        let heat_source = self.heat_source_mut();
        let delivered = heat_source.demand_energy(demand_kwh, flow_temp_c, return_temp_c, delta_t_h);
        heat_source.fuel_energy_for(delivered, flow_temp_c, return_temp_c)
    }
}

/// Energy (kWh) needed to raise `volume_l` of water from `t_cold_c` to
/// `t_hot_c`.
pub fn heating_energy_kwh(volume_l: f64, t_cold_c: f64, t_hot_c: f64) -> f64 {
    volume_l * J_PER_LITRE_KELVIN * (t_hot_c - t_cold_c).max(0.0) / 3.6e6 * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat_source_wet::{CopCurve, HeatPump};

    fn heat_pump() -> AnyHeatSourceWet {
        AnyHeatSourceWet::HeatPump(HeatPump {
            rated_thermal_power_w: 3000.0,
            cop_curve: CopCurve {
                flow_temp_c: vec![45.0, 55.0],
                cop: vec![3.0, 2.5],
            },
            energy_supply_name: "mains_elec".into(),
        })
    }

    #[test]
    fn storage_cylinder_accrues_standing_loss_above_ambient() {
        let cylinder = HotWaterSource::Storage(StorageCylinder {
            volume_l: 150.0,
            loss_coeff_w_per_k: 2.0,
            setpoint_c: 55.0,
            heat_source: heat_pump(),
        });
        let loss = cylinder.standing_loss_kwh(20.0, 1.0);
        assert!((loss - 2.0 * 35.0 / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn point_of_use_has_no_standing_loss() {
        let source = HotWaterSource::PointOfUse(heat_pump());
        assert_eq!(source.standing_loss_kwh(20.0, 1.0), 0.0);
    }

    #[test]
    fn fuel_energy_scales_with_cop() {
        let mut source = HotWaterSource::PointOfUse(heat_pump());
        let fuel = source.fuel_energy_for_demand(1.0, 55.0, 10.0, 1.0);
        assert!((fuel - 1.0 / 2.5).abs() < 1e-9);
    }
}
