// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Five synthetic envelope-leak paths derived from a blower-door (q50)
//! test result (§3: "Leak" airflow path variant).

use super::airflow_path::{AirflowPath, FacadeOrientation};

/// Distribution weights for the five synthetic leak paths: two windward
/// facade, two leeward facade, one roof, per BS EN ISO 52016-1/13829's
/// windward/leeward/roof weighting.
const WEIGHTS: [f64; 5] = [0.25, 0.25, 0.25, 0.25, 0.0 /* roof gets the remainder below */];

pub struct LeakTestResult {
    pub test_pressure_pa: f64,
    pub test_result_m3_h: f64,
    pub envelope_area_m2: f64,
    pub ventilation_zone_height_m: f64,
}

/// Builds the five synthetic leak paths, distributed at 0.25H and 0.75H of
/// the ventilation zone on the windward and leeward facades, and at roof
/// height, each carrying a share of the total leakage coefficient scaled
/// from the q50 result to the reference pressure-exponent law (§4.C).
pub fn synthetic_leak_paths(test: &LeakTestResult) -> Vec<AirflowPath> {
    const N_EXP: f64 = 0.667;
    // Convert the q50 volumetric flow (m3/h at 50 Pa) to a leakage
    // coefficient C such that qv = C * dp^n at the reference pressure.
    let q50_m3_s = test.test_result_m3_h / 3600.0;
    let c_total = q50_m3_s / test.test_pressure_pa.powf(N_EXP);

    let h = test.ventilation_zone_height_m;
    let roof_weight = 1.0 - WEIGHTS[0..4].iter().sum::<f64>();

    let mut paths = vec![
        AirflowPath::Leak {
            name: "leak_windward_low".into(),
            mid_height_m: 0.25 * h,
            leakage_coeff: c_total * WEIGHTS[0],
            orientation: FacadeOrientation::Windward,
        },
        AirflowPath::Leak {
            name: "leak_windward_high".into(),
            mid_height_m: 0.75 * h,
            leakage_coeff: c_total * WEIGHTS[1],
            orientation: FacadeOrientation::Windward,
        },
        AirflowPath::Leak {
            name: "leak_leeward_low".into(),
            mid_height_m: 0.25 * h,
            leakage_coeff: c_total * WEIGHTS[2],
            orientation: FacadeOrientation::Leeward,
        },
        AirflowPath::Leak {
            name: "leak_leeward_high".into(),
            mid_height_m: 0.75 * h,
            leakage_coeff: c_total * WEIGHTS[3],
            orientation: FacadeOrientation::Leeward,
        },
        AirflowPath::Leak {
            name: "leak_roof".into(),
            mid_height_m: h,
            leakage_coeff: c_total * roof_weight,
            orientation: FacadeOrientation::Roof,
        },
    ];
    paths.retain(|_| true);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_paths_sum_to_total_leakage() {
        let test = LeakTestResult {
            test_pressure_pa: 50.0,
            test_result_m3_h: 500.0,
            envelope_area_m2: 250.0,
            ventilation_zone_height_m: 6.0,
        };
        let paths = synthetic_leak_paths(&test);
        assert_eq!(paths.len(), 5);
        let total: f64 = paths
            .iter()
            .map(|p| match p {
                AirflowPath::Leak { leakage_coeff, .. } => *leakage_coeff,
                _ => 0.0,
            })
            .sum();
        let q50_m3_s = test.test_result_m3_h / 3600.0;
        let expected_c = q50_m3_s / test.test_pressure_pa.powf(0.667);
        assert!((total - expected_c).abs() / expected_c < 1e-9);
    }
}
