// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Time/setpoint/charge/combination controls (component I).

mod charge_control;
mod combination;
mod time_control;

pub use charge_control::{ChargeControl, ChargeLogic};
pub use combination::{CombinationControl, CombinationOp};
pub use time_control::{OnOffCostMinimisingTimeControl, OnOffTimeControl, SetpointTimeControl};

use crate::error::HemError;

/// Common behaviour of every control kind: whether it is "on" at a given
/// timestep index, and (for setpoint controls) what setpoint it implies.
pub trait Control {
    fn is_on(&self, timestep_idx: usize) -> bool;

    /// Setpoint in degC, if this control carries one (`SetpointTimeControl`);
    /// other control kinds return `None`.
    fn setpoint(&self, _timestep_idx: usize) -> Option<f64> {
        None
    }
}

/// The full set of control variants a named entry in the input's `Control`
/// map may be. Modelled as a sum type per the REDESIGN FLAGS guidance rather
/// than a base class + mixins.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "control_type")]
pub enum AnyControl {
    OnOff(OnOffTimeControl),
    OnOffCostMinimising(OnOffCostMinimisingTimeControl),
    Setpoint(SetpointTimeControl),
    Charge(ChargeControl),
    Combination(CombinationControl),
}

impl Control for AnyControl {
    fn is_on(&self, timestep_idx: usize) -> bool {
        match self {
            AnyControl::OnOff(c) => c.is_on(timestep_idx),
            AnyControl::OnOffCostMinimising(c) => c.is_on(timestep_idx),
            AnyControl::Setpoint(c) => c.is_on(timestep_idx),
            AnyControl::Charge(c) => c.is_on(timestep_idx),
            AnyControl::Combination(c) => c.is_on(timestep_idx),
        }
    }

    fn setpoint(&self, timestep_idx: usize) -> Option<f64> {
        match self {
            AnyControl::Setpoint(c) => c.setpoint(timestep_idx),
            _ => None,
        }
    }
}

/// Named registry of controls, resolved from the input's `Control` map. The
/// `CombinationTimeControl` tree's root entry must be named `main` (§6);
/// that invariant is validated here rather than assumed.
pub struct ControlSet {
    pub controls: indexmap::IndexMap<String, AnyControl>,
}

impl ControlSet {
    pub fn get(&self, name: &str) -> Result<&AnyControl, HemError> {
        self.controls
            .get(name)
            .ok_or_else(|| HemError::config(format!("undefined control reference: {name}")))
    }

    /// Validates that every `CombinationTimeControl` named `main` exists as
    /// a `Combination` if combination controls are present at all, and that
    /// combination children resolve. Configuration error otherwise.
    pub fn validate_main_entries(&self) -> Result<(), HemError> {
        for (name, c) in &self.controls {
            if let AnyControl::Combination(comb) = c {
                if comb.is_root && name != "main" {
                    return Err(HemError::config(format!(
                        "combination control tree root must be named 'main', found '{name}'"
                    )));
                }
                for child in &comb.children {
                    if !self.controls.contains_key(child) {
                        return Err(HemError::config(format!(
                            "combination control '{name}' references undefined child '{child}'"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
