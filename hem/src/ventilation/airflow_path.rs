// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

use serde::{Deserialize, Serialize};

/// One window "part" at a given height within a window (§3: "N_w_div
/// internal heights").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowPart {
    pub mid_height_m: f64,
    pub equivalent_area_m2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MechanicalVentilatorType {
    IntermittentMev,
    CentralisedMev,
    DecentralisedMev,
    Mvhr { efficiency: f64 },
    Piv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacadeOrientation {
    Windward,
    Leeward,
    Roof,
}

/// One airflow path across the envelope, contributing a mass-flow term to
/// the pressure-balance equation (§4.C).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AirflowPath {
    Window {
        name: String,
        mid_height_m: f64,
        parts: Vec<WindowPart>,
        opening_ratio: f64,
        orientation: FacadeOrientation,
    },
    Vent {
        name: String,
        mid_height_m: f64,
        equivalent_area_m2: f64,
        opening_ratio: f64,
        orientation: FacadeOrientation,
    },
    Leak {
        name: String,
        mid_height_m: f64,
        leakage_coeff: f64,
        orientation: FacadeOrientation,
    },
    CombustionAppliance {
        name: String,
        mid_height_m: f64,
        fuel_flow_factor: f64,
        rated_input_power_kw: f64,
        appliance_system_factor: f64,
    },
    PassiveDuct {
        name: String,
        mid_height_m: f64,
        equivalent_area_m2: f64,
    },
    Mechanical {
        name: String,
        mid_height_m: f64,
        supply_flow_m3_s: f64,
        extract_flow_m3_s: f64,
        ventilator_type: MechanicalVentilatorType,
    },
}

impl AirflowPath {
    pub fn name(&self) -> &str {
        match self {
            AirflowPath::Window { name, .. }
            | AirflowPath::Vent { name, .. }
            | AirflowPath::Leak { name, .. }
            | AirflowPath::CombustionAppliance { name, .. }
            | AirflowPath::PassiveDuct { name, .. }
            | AirflowPath::Mechanical { name, .. } => name,
        }
    }

    pub fn mid_height_m(&self) -> f64 {
        match self {
            AirflowPath::Window { mid_height_m, .. }
            | AirflowPath::Vent { mid_height_m, .. }
            | AirflowPath::Leak { mid_height_m, .. }
            | AirflowPath::CombustionAppliance { mid_height_m, .. }
            | AirflowPath::PassiveDuct { mid_height_m, .. }
            | AirflowPath::Mechanical { mid_height_m, .. } => *mid_height_m,
        }
    }

    pub fn orientation(&self) -> FacadeOrientation {
        match self {
            AirflowPath::Window { orientation, .. }
            | AirflowPath::Vent { orientation, .. }
            | AirflowPath::Leak { orientation, .. } => *orientation,
            _ => FacadeOrientation::Roof,
        }
    }
}
