// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

use serde::{Deserialize, Serialize};

use super::NodeChain;

/// Opaque exterior element: 5 interior nodes, absorbs solar, loses
/// long-wave to sky (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpaqueElement {
    pub name: String,
    pub area: f64,
    pub pitch: f64,
    pub orientation: f64,
    pub chain: NodeChain,
    pub solar_absorption_coeff: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjacentConditionedElement {
    pub name: String,
    pub area: f64,
    pub pitch: f64,
    pub chain: NodeChain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjacentUnconditionedElement {
    pub name: String,
    pub area: f64,
    pub pitch: f64,
    pub chain: NodeChain,
    /// Additional resistance (m2K/W) to the unconditioned space, supplied
    /// directly rather than derived (§3).
    pub r_u: f64,
}
