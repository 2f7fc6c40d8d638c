// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Waste-water heat recovery system (§4.G): three instantaneous topologies
//! differing in whether recovered heat returns to the shower head (A), to
//! the hot-water source (B), or to both (C).

use crate::utils::linear_interp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WwhrsTopology {
    /// Preheats the cold feed at the shower mixer only.
    A,
    /// Preheats the cold feed to the hot-water source only.
    B,
    /// Preheats both the shower mixer feed and the hot-water source feed.
    C,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wwhrs {
    pub topology: WwhrsTopology,
    pub flow_rates_l_per_min: Vec<f64>,
    pub efficiencies: Vec<f64>,
    pub utilisation_factor: f64,
}

impl Wwhrs {
    fn efficiency_at(&self, flow_rate_l_per_min: f64) -> f64 {
        linear_interp(&self.flow_rates_l_per_min, &self.efficiencies, flow_rate_l_per_min)
            * self.utilisation_factor
    }

    /// Effective cold-feed temperature once preheated by waste-water
    /// recovery, for topologies A and C (shower-head preheating).
    pub fn recovered_cold_temp(&self, t_cold_c: f64, t_warm_c: f64) -> f64 {
        match self.topology {
            WwhrsTopology::B => t_cold_c,
            WwhrsTopology::A | WwhrsTopology::C => {
                let eff = self.efficiency_at(self.nominal_flow_rate());
                t_cold_c + eff * (t_warm_c - t_cold_c)
            }
        }
    }

    /// Effective cold-feed temperature supplied to the hot-water source,
    /// for topologies B and C.
    pub fn recovered_source_feed_temp(&self, t_cold_c: f64, t_warm_c: f64) -> f64 {
        match self.topology {
            WwhrsTopology::A => t_cold_c,
            WwhrsTopology::B | WwhrsTopology::C => {
                let eff = self.efficiency_at(self.nominal_flow_rate());
                t_cold_c + eff * (t_warm_c - t_cold_c)
            }
        }
    }

    fn nominal_flow_rate(&self) -> f64 {
        self.flow_rates_l_per_min
            .get(self.flow_rates_l_per_min.len() / 2)
            .copied()
            .unwrap_or(8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(topology: WwhrsTopology) -> Wwhrs {
        Wwhrs {
            topology,
            flow_rates_l_per_min: vec![4.0, 8.0, 12.0],
            efficiencies: vec![0.5, 0.4, 0.3],
            utilisation_factor: 1.0,
        }
    }

    #[test]
    fn topology_a_only_preheats_shower_feed() {
        let w = sample(WwhrsTopology::A);
        assert!(w.recovered_cold_temp(10.0, 41.0) > 10.0);
        assert_eq!(w.recovered_source_feed_temp(10.0, 41.0), 10.0);
    }

    #[test]
    fn topology_b_only_preheats_source_feed() {
        let w = sample(WwhrsTopology::B);
        assert_eq!(w.recovered_cold_temp(10.0, 41.0), 10.0);
        assert!(w.recovered_source_feed_temp(10.0, 41.0) > 10.0);
    }

    #[test]
    fn topology_c_preheats_both() {
        let w = sample(WwhrsTopology::C);
        assert!(w.recovered_cold_temp(10.0, 41.0) > 10.0);
        assert!(w.recovered_source_feed_temp(10.0, 41.0) > 10.0);
    }
}
