// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! JSON input document. A single `#[serde(default)]` struct tree
//! deserialised wholesale, with named maps resolved against each other by
//! `project::build_project` rather than at parse time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::clock::SimulationTime;
use crate::controls::AnyControl;
use crate::elements::BuildingElement;
use crate::emitters::{EcodesignClass, EmitterKind, FanCoilSpeed, FlowType};
use crate::energy_supply::FuelType;
use crate::energy_supply::battery::BatteryLocation;
use crate::external_conditions::ExternalConditions;
use crate::heat_source_wet::AnyHeatSourceWet;
use crate::hot_water::{ColdWaterSource, DrawOffEvent, HotWaterSource, Pipe, Wwhrs};
use crate::ventilation::airflow_path::AirflowPath;
use crate::ventilation::ductwork::DuctworkRun;
use crate::ventilation::{ShieldClass, TerrainClass};
use crate::zone::SetpointBasis;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryInput {
    pub nominal_capacity_kwh: f64,
    pub round_trip_efficiency: f64,
    pub max_charge_rate_kw: f64,
    pub max_discharge_rate_kw: f64,
    #[serde(default)]
    pub age_years: f64,
    pub design_life_years: f64,
    #[serde(default)]
    pub location: Option<BatteryLocation>,
}

/// One entry of the `EnergySupply` map: a named fuel ledger plus optional
/// on-site storage and a priority list resolving surplus generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergySupplyInput {
    pub fuel: FuelType,
    #[serde(default)]
    pub is_export_capable: bool,
    #[serde(default)]
    pub priority: Vec<String>,
    #[serde(default)]
    pub diverter: bool,
    #[serde(default)]
    pub electric_battery: Option<BatteryInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfiltrationVentilationInput {
    pub altitude_m: f64,
    pub ventilation_zone_base_height_m: f64,
    pub terrain_class: TerrainClass,
    pub shield_class: ShieldClass,
    #[serde(default)]
    pub cross_vent_possible: bool,
    #[serde(default)]
    pub ach_min: Option<f64>,
    #[serde(default)]
    pub ach_max: Option<f64>,
    #[serde(default)]
    pub paths: Vec<AirflowPath>,
    #[serde(default)]
    pub ductwork: Vec<DuctworkRun>,
}

/// A named `BuildingElements` map plus the zone-level scalars `Zone::new`
/// needs; `space_heat_system`/`space_cool_system` reference entries in the
/// top-level maps by name (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneInput {
    pub area_m2: f64,
    pub volume_m3: f64,
    pub thermal_bridging_w_per_k: f64,
    pub temp_setpnt_init: f64,
    #[serde(default = "default_setpoint_basis")]
    pub temp_setpnt_basis: SetpointBasis,
    pub building_elements: IndexMap<String, BuildingElement>,
    #[serde(default)]
    pub space_heat_system: Option<String>,
    #[serde(default)]
    pub space_cool_system: Option<String>,
    #[serde(default)]
    pub heating_setpoint_control: Option<String>,
    #[serde(default)]
    pub cooling_setpoint_control: Option<String>,
    #[serde(default)]
    pub internal_gains_w_per_m2: f64,
}

fn default_setpoint_basis() -> SetpointBasis {
    SetpointBasis::Operative
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterCircuitInput {
    pub thermal_mass_kwh_per_k: f64,
    #[serde(default)]
    pub emitters: Vec<EmitterKind>,
    #[serde(default)]
    pub fancoil_speeds: Vec<FanCoilSpeed>,
    pub design_flow_temp_c: f64,
    pub min_flow_temp_c: f64,
    pub min_outdoor_temp_c: f64,
    pub max_outdoor_temp_c: f64,
    pub ecodesign_class: EcodesignClass,
    #[serde(default)]
    pub bypass_fraction: f64,
    pub flow_type: FlowType,
    pub heat_source_wet: String,
    pub control: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageHeaterInput {
    pub nominal_power_w: f64,
    pub capacity_kwh: f64,
    pub p_min: PowerCurveInput,
    pub p_max: PowerCurveInput,
    #[serde(default)]
    pub fan_power_w: f64,
    #[serde(default)]
    pub instant_backup_power_w: f64,
    pub control: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerCurveInput {
    pub soc: Vec<f64>,
    pub power_w: Vec<f64>,
}

/// Direct electric space heater (§3 "SpaceHeatSystem"): no thermal mass, no
/// flow circuit, no warm-up transient. Delivers up to `rated_power_w` in any
/// timestep the zone demands heat, at 100% efficiency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantElecHeaterInput {
    pub rated_power_w: f64,
    pub control: String,
    pub energy_supply: String,
}

/// Space-heating system: a wet emitter circuit, an electric storage heater,
/// or a direct instant electric heater, tagged by variant (§3
/// "SpaceHeatSystem").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SpaceHeatSystemInput {
    WetDistribution(EmitterCircuitInput),
    ElectricStorageHeater(StorageHeaterInput),
    InstantElecHeater(InstantElecHeaterInput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceCoolSystemInput {
    pub cooling_capacity_w: f64,
    pub seer: f64,
    pub control: String,
    pub energy_supply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotWaterDemandInput {
    #[serde(default)]
    pub events: Vec<DrawOffEvent>,
    #[serde(default)]
    pub distribution: Vec<Pipe>,
    #[serde(default)]
    pub wwhrs: Option<Wwhrs>,
    pub cold_water_source: String,
    pub hot_water_source: String,
}

/// Top-level 24-hour-ahead-forecast smart appliance scheduling (§3);
/// `demand_kwh` is a repeating daily profile, `forecast_horizon_h` the
/// look-ahead window used to flatten the served load against it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SmartApplianceControlsInput {
    #[serde(default)]
    pub demand_kwh: Vec<f64>,
    #[serde(default)]
    pub forecast_horizon_h: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PvSystemInput {
    pub peak_power_kw: f64,
    pub pitch_deg: f32,
    pub orientation_deg: f32,
    #[serde(default = "default_inverter_efficiency")]
    pub inverter_efficiency: f64,
    #[serde(default = "default_temp_coeff")]
    pub temp_coeff_per_k: f64,
    #[serde(default = "default_noct_rise")]
    pub noct_rise_k: f64,
    pub energy_supply: String,
}

fn default_inverter_efficiency() -> f64 {
    0.96
}
fn default_temp_coeff() -> f64 {
    0.004
}
fn default_noct_rise() -> f64 {
    25.0
}

/// The whole input document: every named map keyed exactly as the engine's
/// internal registries are, so `project::build_project` can resolve
/// cross-references (control names, heat-source names, fuel-ledger names)
/// directly against these keys.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectInput {
    pub simulation_time: Option<SimulationTime>,
    pub external_conditions: Option<ExternalConditions>,
    pub cold_water_source: IndexMap<String, ColdWaterSource>,
    pub energy_supply: IndexMap<String, EnergySupplyInput>,
    pub control: IndexMap<String, AnyControl>,
    pub infiltration_ventilation: Option<InfiltrationVentilationInput>,
    pub zone: IndexMap<String, ZoneInput>,
    pub heat_source_wet: IndexMap<String, AnyHeatSourceWet>,
    pub hot_water_source: IndexMap<String, HotWaterSource>,
    pub hot_water_demand: Option<HotWaterDemandInput>,
    pub space_heat_system: IndexMap<String, SpaceHeatSystemInput>,
    pub space_cool_system: IndexMap<String, SpaceCoolSystemInput>,
    pub on_site_generation: IndexMap<String, PvSystemInput>,
    pub smart_appliance_controls: SmartApplianceControlsInput,
}

impl ProjectInput {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn as_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_parses_with_defaults() {
        let input = ProjectInput::from_json("{}").unwrap();
        assert!(input.zone.is_empty());
        assert!(input.energy_supply.is_empty());
    }

    #[test]
    fn roundtrips_through_json() {
        let mut input = ProjectInput::default();
        input
            .energy_supply
            .insert(
                "mains_elec".into(),
                EnergySupplyInput {
                    fuel: FuelType::Electricity,
                    is_export_capable: true,
                    priority: vec![],
                    diverter: false,
                    electric_battery: None,
                },
            );
        let json = input.as_json().unwrap();
        let back = ProjectInput::from_json(&json).unwrap();
        assert_eq!(back.energy_supply.len(), 1);
    }
}
