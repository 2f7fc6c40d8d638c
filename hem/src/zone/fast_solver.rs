// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Optimised zone solver: algebraically eliminates each element's interior
//! chain (Thomas-style forward sweep) down to a reduced system of size
//! `(N_elements + 1)`, solves that dense system, then recovers the interior
//! temperatures by back-substitution (§4.D). Intended to be bit-equivalent
//! to `matrix::solve_naive` modulo floating-point operation ordering.

use nalgebra::{DMatrix, DVector};

use super::{Zone, ZoneGains};
use super::matrix::ZoneSolveInputs;
use crate::elements::{h_ci_for, therm_rad_to_sky, BuildingElement, OtherSide, F_HC_C, F_INT_C, F_SOL_C, H_RI};
use crate::error::HemError;
use crate::units::C_AIR;

/// Per-element forward-sweep coefficients, kept to back-substitute once the
/// reduced system has been solved.
struct Elimination {
    /// c'_i for i in 0..=n-2 (coupling of node i to node i+1).
    c_prime: Vec<f64>,
    /// d'_i for i in 0..=n-2.
    d_prime: Vec<f64>,
    /// Adjusted diagonal contribution and rhs contribution at the
    /// interior-surface node, folded in by the elimination of node n-2.
    adj_diag: f64,
    adj_rhs: f64,
}

fn eliminate_chain(
    zone: &Zone,
    inputs: &ZoneSolveInputs,
    element_idx: usize,
    gains: ZoneGains,
    dt_s: f64,
) -> Elimination {
    let zone_elements = &zone.elements;
    let element = &zone_elements[element_idx];
    let chain = element.node_chain();
    let offset = zone.element_offset(element_idx);
    let n_nodes = chain.node_count();
    let t_prev = &zone.temperatures;
    let (h_ce, h_re) = element.exterior_coeffs();
    let other_side = element.other_side();

    // a_i (diagonal), e_i (sub-diagonal magnitude, = h_{i-1}), f_i
    // (super-diagonal magnitude, = h_i), d_i (rhs) for nodes 0..=n-2.
    let m = n_nodes - 1; // number of nodes being eliminated (excludes surface node)
    let mut a = vec![0.0; m];
    let mut e = vec![0.0; m];
    let mut f = vec![0.0; m];
    let mut d = vec![0.0; m];

    // node 0 (exterior)
    {
        let k0 = chain.k_pli[0];
        let h0 = chain.h_pli[0];
        a[0] = k0 / dt_s + h0;
        f[0] = h0;
        d[0] = k0 / dt_s * t_prev[offset];

        match other_side {
            OtherSide::Outside => {
                a[0] += h_ce + h_re;
                let other_t = inputs.other_side_temps[element_idx];
                d[0] += h_ce * other_t + h_re * other_t;
                d[0] += element.solar_absorption_coeff() * inputs.solar_flux_w_m2[element_idx];
                if inputs.sky_temp_depression_active[element_idx] {
                    d[0] -= therm_rad_to_sky(element.pitch());
                }
            }
            OtherSide::Conditioned => {
                a[0] += 1e-6;
                d[0] += 1e-6 * t_prev[zone.air_node_idx()];
            }
            OtherSide::Unconditioned { r_u, .. } => {
                let h_u = 1.0 / r_u.max(1e-6);
                a[0] += h_u;
                d[0] += h_u * inputs.other_side_temps[element_idx];
            }
            OtherSide::Ground => {
                let r_vi = if let BuildingElement::Ground(g) = element {
                    g.r_vi
                } else {
                    0.17
                };
                let h_vi = 1.0 / r_vi;
                a[0] += h_vi;
                d[0] += h_vi * inputs.other_side_temps[element_idx];
            }
        }
    }

    for i in 1..m {
        let idx = offset + i;
        let k_i = chain.k_pli[i];
        let h_prev = chain.h_pli[i - 1];
        let h_next = chain.h_pli[i];
        a[i] = k_i / dt_s + h_prev + h_next;
        e[i] = h_prev;
        f[i] = h_next;
        d[i] = k_i / dt_s * t_prev[idx];
    }

    // Forward sweep.
    let mut c_prime = vec![0.0; m];
    let mut d_prime = vec![0.0; m];
    c_prime[0] = f[0] / a[0];
    d_prime[0] = d[0] / a[0];
    for i in 1..m {
        let denom = a[i] - e[i] * c_prime[i - 1];
        c_prime[i] = f[i] / denom;
        d_prime[i] = (d[i] - e[i] * d_prime[i - 1]) / denom;
    }

    // Surface-node row, adjusted by substituting T_{m-1} = d'_{m-1} - c'_{m-1} T_surface.
    let h_last = chain.h_pli[m - 1];
    let k_surf = chain.k_pli[m];
    let t_air_prev = t_prev[zone.air_node_idx()];
    let t_surf_prev = t_prev[offset + m];
    let h_ci = h_ci_for(element.pitch(), t_air_prev, t_surf_prev);

    let adj_diag = k_surf / dt_s + h_last + h_ci + h_last * c_prime[m - 1];
    let mut adj_rhs = k_surf / dt_s * t_surf_prev + h_last * d_prime[m - 1];

    let total_area: f64 = zone.elements.iter().map(|e| e.area()).sum::<f64>().max(1e-9);
    let area_frac = element.area() / total_area;
    adj_rhs += (1.0 - F_INT_C) * gains.internal_gains_w * area_frac
        + (1.0 - F_HC_C) * gains.heating_cooling_w * area_frac
        + (1.0 - F_SOL_C) * gains.solar_gains_w * area_frac;

    Elimination {
        c_prime,
        d_prime,
        adj_diag,
        adj_rhs,
    }
}

pub fn solve(
    zone: &Zone,
    inputs: &ZoneSolveInputs,
    gains: ZoneGains,
    ach: f64,
    delta_t_h: f64,
) -> Result<Vec<f64>, HemError> {
    let dt_s = delta_t_h * 3600.0;
    let n_elements = zone.elements.len();
    let reduced_n = n_elements + 1;
    let air_row = n_elements;

    let eliminations: Vec<Elimination> = (0..n_elements)
        .map(|ei| eliminate_chain(zone, inputs, ei, gains, dt_s))
        .collect();

    let mut a = DMatrix::<f64>::zeros(reduced_n, reduced_n);
    let mut b = DVector::<f64>::zeros(reduced_n);

    let total_area: f64 = zone.elements.iter().map(|e| e.area()).sum::<f64>().max(1e-9);

    for (ei, elim) in eliminations.iter().enumerate() {
        a[(ei, ei)] += elim.adj_diag;
        b[ei] += elim.adj_rhs;

        let element = &zone.elements[ei];
        let h_ci = h_ci_for(
            element.pitch(),
            zone.temperatures[zone.air_node_idx()],
            zone.temperatures[zone.element_offset(ei) + element.node_chain().node_count() - 1],
        );
        a[(ei, air_row)] -= h_ci;

        for (ej, other) in zone.elements.iter().enumerate() {
            if ej == ei {
                continue;
            }
            let area_frac = other.area() / total_area;
            let h_ri = H_RI * area_frac;
            a[(ei, ei)] += h_ri;
            a[(ei, ej)] -= h_ri;
        }
    }

    // Air row (identical to the naive assembly; it never references
    // eliminated interior nodes).
    {
        let c_int = zone.air_capacitance();
        let rho_cp = zone.air_density() * C_AIR;
        let q_ve_m3s = ach * zone.volume_m3 / 3600.0;
        let h_ve = rho_cp * q_ve_m3s;
        let h_tb = zone.thermal_bridge_coeff_w_per_k;

        a[(air_row, air_row)] += c_int / dt_s + h_ve + h_tb;
        b[air_row] += c_int / dt_s * zone.temperatures[zone.air_node_idx()]
            + h_ve * inputs.t_supply
            + h_tb * inputs.t_ext;

        for (ei, element) in zone.elements.iter().enumerate() {
            let surf_idx = zone.element_offset(ei) + element.node_chain().node_count() - 1;
            let h_ci = h_ci_for(
                element.pitch(),
                zone.temperatures[zone.air_node_idx()],
                zone.temperatures[surf_idx],
            );
            a[(air_row, air_row)] += h_ci;
            a[(air_row, ei)] -= h_ci;
        }

        b[air_row] += F_INT_C * gains.internal_gains_w
            + F_HC_C * gains.heating_cooling_w
            + F_SOL_C * gains.solar_gains_w;
    }

    let decomp = a.clone().lu();
    let reduced_x = decomp
        .solve(&b)
        .ok_or_else(|| HemError::solver("zone fast solver: reduced matrix is singular"))?;

    // Back-substitution: recover full per-node temperatures.
    let mut result = vec![0.0; zone.node_count()];
    result[zone.air_node_idx()] = reduced_x[air_row];
    for (ei, elim) in eliminations.iter().enumerate() {
        let offset = zone.element_offset(ei);
        let m = elim.c_prime.len();
        let t_surface = reduced_x[ei];
        result[offset + m] = t_surface;
        let mut t_next = t_surface;
        for i in (0..m).rev() {
            let t_i = elim.d_prime[i] - elim.c_prime[i] * t_next;
            result[offset + i] = t_i;
            t_next = t_i;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BuildingElement, NodeChain, OpaqueElement};
    use crate::zone::matrix::solve_naive;
    use crate::zone::{SetpointBasis, Zone};

    fn two_element_zone() -> (Zone, ZoneSolveInputs) {
        let wall = BuildingElement::Opaque(OpaqueElement {
            name: "wall".into(),
            area: 10.0,
            pitch: 90.0,
            orientation: 0.0,
            chain: NodeChain {
                k_pli: vec![1.0e4, 5.0e4, 5.0e4, 5.0e4, 1.0e4],
                h_pli: vec![2.0, 2.0, 2.0, 2.0],
            },
            solar_absorption_coeff: 0.6,
        });
        let roof = BuildingElement::Opaque(OpaqueElement {
            name: "roof".into(),
            area: 20.0,
            pitch: 0.0,
            orientation: 0.0,
            chain: NodeChain {
                k_pli: vec![0.8e4, 4.0e4, 4.0e4, 4.0e4, 0.8e4],
                h_pli: vec![1.5, 1.5, 1.5, 1.5],
            },
            solar_absorption_coeff: 0.5,
        });
        let zone = Zone::new(
            "z1".into(),
            vec![wall, roof],
            0.8,
            30.0,
            75.0,
            SetpointBasis::Air,
            0.0,
            15.0,
        )
        .unwrap();
        let inputs = ZoneSolveInputs {
            other_side_temps: vec![2.0, 2.0],
            solar_flux_w_m2: vec![100.0, 50.0],
            sky_temp_depression_active: vec![true, true],
            t_ext: 2.0,
            t_supply: 2.0,
            ach_baseline: 0.5,
            ach_windows_open: 4.0,
            ach_target: 0.5,
        };
        (zone, inputs)
    }

    #[test]
    fn fast_solver_matches_naive_solver() {
        let (zone, inputs) = two_element_zone();
        let gains = ZoneGains {
            internal_gains_w: 150.0,
            solar_gains_w: 0.0,
            heating_cooling_w: 300.0,
        };
        let t_naive = solve_naive(&zone, &inputs, gains, 0.6, 1.0).unwrap();
        let t_fast = solve(&zone, &inputs, gains, 0.6, 1.0).unwrap();
        for (a, b) in t_naive.iter().zip(t_fast.iter()) {
            let rel = (a - b).abs() / a.abs().max(1.0);
            assert!(rel < 1e-6, "naive={a} fast={b}");
        }
    }
}
