// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Optional heat-balance decomposition: per-element-type gains/losses,
//! distinguishing the air-node and internal-fabric-boundary balances
//! (§4.D).

use super::Zone;
use crate::elements::BuildingElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatBalanceKind {
    AirNode,
    InternalBoundary,
    ExternalBoundary,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeatBalanceEntry {
    pub opaque_w: f64,
    pub transparent_w: f64,
    pub ground_w: f64,
    pub ztc_w: f64, // adjacent conditioned ("zone to conditioned")
    pub ztu_w: f64, // adjacent unconditioned ("zone to unconditioned")
}

pub struct HeatBalanceReport {
    pub kind: HeatBalanceKind,
    pub entry: HeatBalanceEntry,
}

/// Computes `Sum k_pli * (T_new - T_prev)` per element type, the fabric
/// storage term used by the energy-balance-closure testable property.
pub fn fabric_storage_by_type(zone: &Zone, t_prev: &[f64], t_new: &[f64]) -> HeatBalanceEntry {
    let mut entry = HeatBalanceEntry::default();
    for (ei, element) in zone.elements.iter().enumerate() {
        let offset = zone.element_offset(ei);
        let chain = element.node_chain();
        let mut delta_u = 0.0;
        for i in 0..chain.node_count() {
            delta_u += chain.k_pli[i] * (t_new[offset + i] - t_prev[offset + i]);
        }
        match element {
            BuildingElement::Opaque(_) => entry.opaque_w += delta_u,
            BuildingElement::Transparent(_) => entry.transparent_w += delta_u,
            BuildingElement::Ground(_) => entry.ground_w += delta_u,
            BuildingElement::AdjacentConditioned(_) => entry.ztc_w += delta_u,
            BuildingElement::AdjacentUnconditioned(_) => entry.ztu_w += delta_u,
        }
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{NodeChain, OpaqueElement};
    use crate::zone::SetpointBasis;

    #[test]
    fn fabric_storage_is_zero_at_steady_state() {
        let wall = BuildingElement::Opaque(OpaqueElement {
            name: "w".into(),
            area: 10.0,
            pitch: 90.0,
            orientation: 0.0,
            chain: NodeChain {
                k_pli: vec![1.0, 1.0],
                h_pli: vec![1.0],
            },
            solar_absorption_coeff: 0.5,
        });
        let zone = Zone::new(
            "z".into(),
            vec![wall],
            0.0,
            10.0,
            25.0,
            SetpointBasis::Air,
            0.0,
            20.0,
        )
        .unwrap();
        let t_prev = zone.temperatures.clone();
        let t_new = zone.temperatures.clone();
        let entry = fabric_storage_by_type(&zone, &t_prev, &t_new);
        assert_eq!(entry.opaque_w, 0.0);
    }
}
