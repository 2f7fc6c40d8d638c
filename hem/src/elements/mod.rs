// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Building element library (component B): per-element node layout,
//! U<->R conversion, ground-floor periodic coefficients, solar/shading
//! interactions.
//!
//! Per §9's redesign note, the source's one-base-plus-four-mixins
//! inheritance is replaced with a tagged variant of element kinds, each
//! carrying the through-element node chain and the orthogonal
//! other-side/solar behaviours as plain data rather than virtual dispatch.

mod ground;
mod opaque;
mod transparent;

pub use ground::{EdgeInsulation, FloorType, GroundElement};
pub use opaque::{AdjacentConditionedElement, AdjacentUnconditionedElement, OpaqueElement};
pub use transparent::{TransparentElement, WindowTreatment};

pub use crate::utils::linear_interp;
use crate::error::HemError;

pub const H_CI_UPWARDS: f64 = 5.0;
pub const H_CI_HORIZONTAL: f64 = 2.5;
pub const H_CI_DOWNWARDS: f64 = 0.7;
pub const H_CE: f64 = 20.0;
pub const H_RE: f64 = 4.14;
pub const H_RI: f64 = 5.13;
pub const DELTA_T_SKY: f64 = 11.0;

pub const F_INT_C: f64 = 0.4;
pub const F_HC_C: f64 = 0.4;
pub const F_SOL_C: f64 = 0.1;

/// Ground-layer constants shared by every `Ground` element (§4.D): a 0.5 m
/// slab of soil of fixed capacity and resistance, appended to the
/// 3-node floor construction to make up the "3+2" chain.
pub const K_GR: f64 = 0.5 * 3.0e6; // 0.5 m * 3 MJ/m3K -> J/m2K
pub const R_GR: f64 = 0.5 / 1.5; // 0.5 m / 1.5 W/mK -> m2K/W

/// Convective internal surface coefficient, chosen by pitch class and by
/// the sign of (T_air - T_surface) at the previous iteration (§4.D).
pub fn h_ci_for(pitch_deg: f64, t_air: f64, t_surface: f64) -> f64 {
    let upward_facing = pitch_deg < 60.0; // floor-like (heat flow upward when warmer air above)
    let downward_facing = pitch_deg > 120.0; // ceiling-like
    let heat_flow_up = t_air > t_surface;
    if upward_facing {
        if heat_flow_up {
            H_CI_UPWARDS
        } else {
            H_CI_DOWNWARDS
        }
    } else if downward_facing {
        if heat_flow_up {
            H_CI_DOWNWARDS
        } else {
            H_CI_UPWARDS
        }
    } else {
        H_CI_HORIZONTAL
    }
}

/// Sky view factor for an element of the given pitch, `(1 + cos(pitch)) / 2`.
pub fn sky_view_factor(pitch_deg: f64) -> f64 {
    0.5 * (1.0 + pitch_deg.to_radians().cos())
}

/// Long-wave sky-loss correction term for an exterior node (§4.D):
/// `therm_rad_to_sky = sky_view_factor * H_RE * DELTA_T_SKY`.
pub fn therm_rad_to_sky(pitch_deg: f64) -> f64 {
    sky_view_factor(pitch_deg) * H_RE * DELTA_T_SKY
}

/// Converts a U-value (W/m2K) to the equivalent total resistance (m2K/W),
/// excluding surface resistances, given the supplied surface coefficients.
pub fn u_to_r(u_value: f64, r_si: f64, r_se: f64) -> Result<f64, HemError> {
    let r_total = 1.0 / u_value;
    let r_construction = r_total - r_si - r_se;
    if r_construction <= 0.0 {
        return Err(HemError::physical(
            "u_to_r: implied construction resistance is non-positive; U-value inconsistent with surface resistances",
        ));
    }
    Ok(r_construction)
}

pub fn r_to_u(r_construction: f64, r_si: f64, r_se: f64) -> f64 {
    1.0 / (r_construction + r_si + r_se)
}

/// A node chain: `k_pli` has one capacity per node (J/m2K), `h_pli` has one
/// conductance per inter-node link (W/m2K) and so has length `k_pli.len() - 1`
/// (the through-element-conductance invariant of §3).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeChain {
    pub k_pli: Vec<f64>,
    pub h_pli: Vec<f64>,
}

impl NodeChain {
    pub fn validate(&self) -> Result<(), HemError> {
        if self.k_pli.len() < 2 {
            return Err(HemError::config("node chain must have at least 2 nodes"));
        }
        if self.h_pli.len() + 1 != self.k_pli.len() {
            return Err(HemError::config(
                "node chain: h_pli length must equal k_pli length minus one",
            ));
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.k_pli.len()
    }
}

/// What lies on the other side of an element, i.e. the external boundary
/// condition used to compute the exterior-node heat balance (§4.D).
#[derive(Debug, Clone)]
pub enum OtherSide {
    /// True outdoor air: `h_ce`/`h_re` apply, solar and sky-radiation terms
    /// are active.
    Outside,
    /// Adjacent conditioned space: external heat-transfer coefficients are
    /// zero (§3).
    Conditioned,
    /// Adjacent unconditioned space: external resistance increased by a
    /// supplied `r_u` (§3).
    Unconditioned { r_u: f64, other_side_temp_frac: f64 },
    /// The computed virtual ground temperature (§4.D, component B/ground.rs).
    Ground,
}

/// Variant discriminant for a building element, polymorphic over the four
/// orthogonal behaviours named in §9: through-element node layout,
/// other-side heat transfer, and solar interaction (internal-side behaviour
/// is uniform and lives in the zone solver).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "element_type")]
pub enum BuildingElement {
    Opaque(OpaqueElement),
    Transparent(TransparentElement),
    Ground(GroundElement),
    AdjacentConditioned(AdjacentConditionedElement),
    AdjacentUnconditioned(AdjacentUnconditionedElement),
}

impl BuildingElement {
    pub fn area(&self) -> f64 {
        match self {
            BuildingElement::Opaque(e) => e.area,
            BuildingElement::Transparent(e) => e.area,
            BuildingElement::Ground(e) => e.area,
            BuildingElement::AdjacentConditioned(e) => e.area,
            BuildingElement::AdjacentUnconditioned(e) => e.area,
        }
    }

    pub fn pitch(&self) -> f64 {
        match self {
            BuildingElement::Opaque(e) => e.pitch,
            BuildingElement::Transparent(e) => e.pitch,
            BuildingElement::Ground(e) => e.pitch,
            BuildingElement::AdjacentConditioned(e) => e.pitch,
            BuildingElement::AdjacentUnconditioned(e) => e.pitch,
        }
    }

    pub fn node_chain(&self) -> &NodeChain {
        match self {
            BuildingElement::Opaque(e) => &e.chain,
            BuildingElement::Transparent(e) => &e.chain,
            BuildingElement::Ground(e) => &e.chain,
            BuildingElement::AdjacentConditioned(e) => &e.chain,
            BuildingElement::AdjacentUnconditioned(e) => &e.chain,
        }
    }

    pub fn other_side(&self) -> OtherSide {
        match self {
            BuildingElement::Opaque(_) => OtherSide::Outside,
            BuildingElement::Transparent(_) => OtherSide::Outside,
            BuildingElement::Ground(_) => OtherSide::Ground,
            BuildingElement::AdjacentConditioned(_) => OtherSide::Conditioned,
            BuildingElement::AdjacentUnconditioned(e) => OtherSide::Unconditioned {
                r_u: e.r_u,
                other_side_temp_frac: 1.0,
            },
        }
    }

    /// Exterior surface heat-transfer coefficients `(h_ce, h_re)`, zeroed
    /// for adjacent-conditioned elements per §4.D.
    pub fn exterior_coeffs(&self) -> (f64, f64) {
        match self {
            BuildingElement::AdjacentConditioned(_) => (0.0, 0.0),
            BuildingElement::Ground(_) => (0.0, 0.0), // handled via r_vi instead
            _ => (H_CE, H_RE),
        }
    }

    pub fn validate(&self) -> Result<(), HemError> {
        if self.area() <= 0.0 {
            return Err(HemError::physical("building element area must be > 0"));
        }
        let pitch = self.pitch();
        if !(0.0..=180.0).contains(&pitch) {
            return Err(HemError::config("building element pitch must be in [0, 180]"));
        }
        self.node_chain().validate()?;
        Ok(())
    }

    /// Absorbed solar radiation at the exterior node, or `0.0` for elements
    /// that are not solar-exposed (adjacent elements) or that transmit
    /// rather than absorb (handled separately for `Transparent`).
    pub fn solar_absorption_coeff(&self) -> f64 {
        match self {
            BuildingElement::Opaque(e) => e.solar_absorption_coeff,
            BuildingElement::Ground(_) => 0.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h_ci_picks_upward_when_floor_warmer_than_air_is_false() {
        // floor (pitch 0), air warmer than surface -> convection upward
        assert_eq!(h_ci_for(0.0, 21.0, 19.0), H_CI_UPWARDS);
        assert_eq!(h_ci_for(0.0, 19.0, 21.0), H_CI_DOWNWARDS);
    }

    #[test]
    fn h_ci_wall_is_horizontal_class() {
        assert_eq!(h_ci_for(90.0, 21.0, 19.0), H_CI_HORIZONTAL);
    }

    #[test]
    fn sky_view_factor_is_half_for_vertical_wall() {
        assert!((sky_view_factor(90.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sky_view_factor_is_one_for_horizontal_roof() {
        assert!((sky_view_factor(0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn u_to_r_rejects_inconsistent_u_value() {
        // U so high that even zero construction resistance can't produce it
        assert!(u_to_r(100.0, 0.13, 0.04).is_err());
    }

    #[test]
    fn u_to_r_roundtrips_with_r_to_u() {
        let r = u_to_r(0.3, 0.13, 0.04).unwrap();
        let u = r_to_u(r, 0.13, 0.04);
        assert!((u - 0.3).abs() < 1e-9);
    }
}
