// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! `CombinationTimeControl`: a tree of named controls combined by boolean
//! (and a couple of numeric) operations.

use serde::{Deserialize, Serialize};

use super::{Control, ControlSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinationOp {
    And,
    Or,
    Xor,
    Not,
    Max,
    Min,
    Mean,
}

/// A node of the combination tree. `children` names other entries in the
/// `ControlSet` (which may themselves be combinations). `Not` requires
/// exactly one child; evaluated lazily against the owning `ControlSet`
/// rather than eagerly flattened, since children can be shared across
/// multiple combination nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationControl {
    pub op: CombinationOp,
    pub children: Vec<String>,
    /// Whether this entry is meant to be the tree's root (`name == "main"`
    /// is enforced by `ControlSet::validate_main_entries`).
    pub is_root: bool,
}

impl CombinationControl {
    /// Evaluates the on/off state of this node against the given
    /// `ControlSet`. `Max`/`Min`/`Mean` treat each child's on-state as 1.0/0.0
    /// and threshold the combined value at 0.5 to produce a boolean.
    pub fn evaluate(&self, set: &ControlSet, timestep_idx: usize) -> bool {
        let child_vals: Vec<bool> = self
            .children
            .iter()
            .map(|name| {
                set.controls
                    .get(name)
                    .map(|c| c.is_on(timestep_idx))
                    .unwrap_or(false)
            })
            .collect();

        match self.op {
            CombinationOp::And => child_vals.iter().all(|&v| v),
            CombinationOp::Or => child_vals.iter().any(|&v| v),
            CombinationOp::Xor => child_vals.iter().filter(|&&v| v).count() % 2 == 1,
            CombinationOp::Not => !child_vals.first().copied().unwrap_or(false),
            CombinationOp::Max => child_vals.iter().any(|&v| v),
            CombinationOp::Min => child_vals.iter().all(|&v| v),
            CombinationOp::Mean => {
                let n = child_vals.len().max(1) as f64;
                let on_count = child_vals.iter().filter(|&&v| v).count() as f64;
                on_count / n >= 0.5
            }
        }
    }
}

impl Control for CombinationControl {
    fn is_on(&self, _timestep_idx: usize) -> bool {
        // Standalone evaluation (without a ControlSet) cannot resolve named
        // children; callers reach the real logic through
        // `CombinationControl::evaluate`. This default exists only so
        // `CombinationControl` satisfies `Control` for storage in
        // `AnyControl` without a circular borrow of `ControlSet`.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{AnyControl, OnOffTimeControl};
    use indexmap::IndexMap;

    fn set_with(a: bool, b: bool) -> ControlSet {
        let mut controls = IndexMap::new();
        controls.insert(
            "a".to_string(),
            AnyControl::OnOff(OnOffTimeControl {
                schedule: vec![a],
                start_day: 0,
                time_series_step: 1.0,
            }),
        );
        controls.insert(
            "b".to_string(),
            AnyControl::OnOff(OnOffTimeControl {
                schedule: vec![b],
                start_day: 0,
                time_series_step: 1.0,
            }),
        );
        ControlSet { controls }
    }

    #[test]
    fn and_requires_all_on() {
        let comb = CombinationControl {
            op: CombinationOp::And,
            children: vec!["a".into(), "b".into()],
            is_root: true,
        };
        assert!(!comb.evaluate(&set_with(true, false), 0));
        assert!(comb.evaluate(&set_with(true, true), 0));
    }

    #[test]
    fn xor_true_when_odd_number_on() {
        let comb = CombinationControl {
            op: CombinationOp::Xor,
            children: vec!["a".into(), "b".into()],
            is_root: false,
        };
        assert!(comb.evaluate(&set_with(true, false), 0));
        assert!(!comb.evaluate(&set_with(true, true), 0));
    }

    #[test]
    fn not_inverts_single_child() {
        let comb = CombinationControl {
            op: CombinationOp::Not,
            children: vec!["a".into()],
            is_root: false,
        };
        assert!(comb.evaluate(&set_with(false, false), 0));
        assert!(!comb.evaluate(&set_with(true, false), 0));
    }
}
