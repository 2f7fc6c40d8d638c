// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Ground floor element: 3+2 nodes (2 fixed-ground + 3 floor-construction),
//! BS EN ISO 13370 periodic coefficients and virtual ground temperature
//! (§3, §4.D).

use serde::{Deserialize, Serialize};

use super::{NodeChain, K_GR, R_GR};
use crate::error::HemError;

/// Fixed monthly mean internal temperature table (degC), mean approx 20 degC,
/// used by the virtual-ground-temperature calculation (§4.D).
pub const T_INT_MONTHLY: [f64; 12] = [
    19.5, 19.5, 19.8, 20.0, 20.2, 20.5, 20.5, 20.5, 20.2, 20.0, 19.8, 19.5,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeInsulation {
    /// `Horizontal { width_m, r }` or `Vertical { depth_m, r }`.
    pub horizontal_width_m: Option<f64>,
    pub vertical_depth_m: Option<f64>,
    pub r: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FloorType {
    SlabNoEdgeInsulation {
        /// Accepted but ignored per §9 Open Questions (upstream does not
        /// validate its presence either).
        edge_insulation: Option<Vec<EdgeInsulation>>,
    },
    SlabEdgeInsulation {
        edge_insulation: Vec<EdgeInsulation>,
    },
    SuspendedFloor {
        wall_u_value: f64,
        ventilation_area_per_perimeter: f64,
        wind_shield_class: u8,
    },
    HeatedBasement {
        basement_depth_m: f64,
        basement_wall_r: f64,
    },
    UnheatedBasement {
        basement_depth_m: f64,
        basement_wall_r: f64,
        basement_height_m: f64,
        floor_above_u_value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundElement {
    pub name: String,
    pub area: f64,
    pub pitch: f64,
    /// 3-node floor-construction chain; the 2 ground-layer nodes are
    /// appended by `full_chain()`.
    pub chain: NodeChain,
    pub u_value: f64,
    pub perimeter: f64,
    pub floor_type: FloorType,
    /// Characteristic thermal resistance between internal air and the
    /// element's innermost ground-facing node (`Rvi`, §4.D); must be > 0.
    pub r_vi: f64,
    pub psi_edge: f64,
}

impl GroundElement {
    /// Appends the 2 fixed-ground nodes (capacity `K_GR`, resistance
    /// `R_GR`) to the 3-node floor-construction chain.
    pub fn full_chain(&self) -> NodeChain {
        let mut k_pli = self.chain.k_pli.clone();
        let mut h_pli = self.chain.h_pli.clone();
        k_pli.push(K_GR);
        k_pli.push(K_GR);
        h_pli.push(1.0 / R_GR);
        h_pli.push(1.0 / R_GR);
        NodeChain { k_pli, h_pli }
    }

    pub fn validate(&self) -> Result<(), HemError> {
        if self.r_vi <= 0.0 {
            return Err(HemError::physical(
                "ground floor: r_vi must be > 0 (implies inconsistent U-value and floor-construction R)",
            ));
        }
        if let FloorType::SuspendedFloor {
            wall_u_value,
            ventilation_area_per_perimeter,
            ..
        } = &self.floor_type
        {
            if *wall_u_value <= 0.0 || *ventilation_area_per_perimeter <= 0.0 {
                return Err(HemError::config(
                    "suspended floor requires positive wall U-value and vent-area-per-perimeter",
                ));
            }
        }
        if let FloorType::UnheatedBasement {
            basement_height_m, ..
        } = &self.floor_type
        {
            if *basement_height_m <= 0.0 {
                return Err(HemError::config(
                    "unheated basement requires positive basement height",
                ));
            }
        }
        Ok(())
    }

    /// Periodic internal/external heat-transfer coefficients `(h_pi, h_pe)`,
    /// depending on the floor subtype (BS EN ISO 13370 simplified periodic
    /// method, §3/§4.D).
    pub fn periodic_coeffs(&self) -> (f64, f64) {
        let characteristic_dim = 2.0 * self.area / self.perimeter.max(1e-6);
        let periodic_penetration_depth = 1.4 * characteristic_dim.max(0.1).sqrt();

        match &self.floor_type {
            FloorType::SlabNoEdgeInsulation { .. } => {
                let h_pi = self.u_value * (1.0 + 1.0 / periodic_penetration_depth);
                let h_pe = self.u_value * 0.5;
                (h_pi, h_pe)
            }
            FloorType::SlabEdgeInsulation { edge_insulation } => {
                let extra_r: f64 = edge_insulation.iter().map(|e| e.r).sum();
                let u_eff = 1.0 / (1.0 / self.u_value + extra_r / self.perimeter.max(1e-6));
                let h_pi = u_eff * (1.0 + 1.0 / periodic_penetration_depth);
                let h_pe = u_eff * 0.45;
                (h_pi, h_pe)
            }
            FloorType::SuspendedFloor {
                wall_u_value,
                ventilation_area_per_perimeter,
                wind_shield_class,
            } => {
                let shield_factor = match wind_shield_class {
                    0 => 0.02,
                    1 => 0.05,
                    _ => 0.1,
                };
                let h_ve = 1450.0 * ventilation_area_per_perimeter * shield_factor;
                let h_pi = (1.0 / self.u_value + 1.0 / (wall_u_value + h_ve)).recip();
                let h_pe = h_pi * 0.4;
                (h_pi, h_pe)
            }
            FloorType::HeatedBasement {
                basement_depth_m,
                basement_wall_r,
            } => {
                let u_wall_b = 1.0 / (basement_wall_r + 1.0 / self.u_value);
                let h_pi = self.u_value + u_wall_b * basement_depth_m / characteristic_dim;
                let h_pe = h_pi * 0.3;
                (h_pi, h_pe)
            }
            FloorType::UnheatedBasement {
                basement_depth_m,
                basement_wall_r,
                basement_height_m,
                floor_above_u_value,
            } => {
                let u_wall_b = 1.0 / (basement_wall_r + 1.0 / self.u_value);
                let u_combined = 1.0
                    / (1.0 / floor_above_u_value
                        + 1.0 / (self.u_value + u_wall_b * basement_depth_m / characteristic_dim));
                let h_pi = u_combined * (1.0 + basement_height_m / characteristic_dim);
                let h_pe = h_pi * 0.35;
                (h_pi, h_pe)
            }
        }
    }

    /// Virtual ground temperature for the given month (§4.D):
    /// `T_ground_virtual = T_int_month - [Q_month - P*psi*(T_int_ann - T_ext_ann)] / (A*U)`.
    pub fn virtual_ground_temp(
        &self,
        month: usize,
        t_ext_annual: f64,
        t_ext_month: f64,
    ) -> f64 {
        let t_int_ann = T_INT_MONTHLY.iter().sum::<f64>() / 12.0;
        let t_int_m = T_INT_MONTHLY[month % 12];
        let (h_pi, h_pe) = self.periodic_coeffs();

        let q_month = self.u_value * self.area * (t_int_ann - t_ext_annual)
            + self.perimeter * self.psi_edge * (t_int_m - t_ext_month)
            - h_pi * (t_int_ann - t_int_m)
            + h_pe * (t_ext_annual - t_ext_month);

        t_int_m
            - (q_month - self.perimeter * self.psi_edge * (t_int_ann - t_ext_annual))
                / (self.area * self.u_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GroundElement {
        GroundElement {
            name: "floor".into(),
            area: 60.0,
            pitch: 180.0,
            chain: NodeChain {
                k_pli: vec![1.0e6, 1.0e6, 1.0e6],
                h_pli: vec![2.0, 2.0],
            },
            u_value: 0.25,
            perimeter: 32.0,
            floor_type: FloorType::SlabNoEdgeInsulation {
                edge_insulation: None,
            },
            r_vi: 0.17,
            psi_edge: 0.1,
        }
    }

    #[test]
    fn full_chain_appends_two_ground_nodes() {
        let g = sample();
        let chain = g.full_chain();
        assert_eq!(chain.k_pli.len(), 5);
        assert_eq!(chain.h_pli.len(), 4);
        chain.validate().unwrap();
    }

    #[test]
    fn rejects_nonpositive_rvi() {
        let mut g = sample();
        g.r_vi = 0.0;
        assert!(g.validate().is_err());
    }

    #[test]
    fn virtual_ground_temp_tracks_seasonal_swing() {
        let g = sample();
        let winter = g.virtual_ground_temp(0, 10.0, 2.0);
        let summer = g.virtual_ground_temp(6, 10.0, 18.0);
        // ground temperature should vary less violently than air temperature
        assert!((winter - summer).abs() < (2.0f64 - 18.0).abs());
    }
}
