// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! External conditions: per-timestep weather plus the shading-segment
//! horizon used by solar-obstacle queries.

use serde::{Deserialize, Serialize};

use climate::solar::{
    declination_from_nday, hourangle_from_data, sun_position, Location, SunPosition,
};

/// One entry of the fixed shading-segment partition of the horizon (8-36
/// segments). `obstruction_height_deg` is the supplied elevation angle of
/// whatever obstructs the sky in that segment (0 = no obstruction).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShadingSegment {
    pub start_deg: f64,
    pub end_deg: f64,
    pub obstruction_height_deg: f64,
}

/// Per-hour weather series plus scalars, as read from the JSON input or from
/// an EPW/CIBSE file via `climate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConditions {
    pub air_temperatures: Vec<f64>,
    pub wind_speeds: Vec<f64>,
    pub wind_directions: Vec<f64>,
    pub direct_beam_radiation: Vec<f64>,
    pub diffuse_horizontal_radiation: Vec<f64>,
    pub solar_reflectivity_of_ground: Vec<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub direct_beam_conversion_needed: bool,
    pub shading_segments: Vec<ShadingSegment>,
}

impl ExternalConditions {
    pub fn air_temp(&self, timestep_idx: usize) -> f64 {
        self.air_temperatures[timestep_idx % self.air_temperatures.len()]
    }

    pub fn wind_speed(&self, timestep_idx: usize) -> f64 {
        self.wind_speeds[timestep_idx % self.wind_speeds.len()]
    }

    pub fn wind_direction(&self, timestep_idx: usize) -> f64 {
        self.wind_directions[timestep_idx % self.wind_directions.len()]
    }

    /// Monthly mean air temperature (degC), used by the ground-virtual
    /// temperature calculation in component D.
    pub fn monthly_mean_air_temp(&self, month: usize) -> f64 {
        let (start, end) = crate::clock::MONTH_DAYS
            .iter()
            .take(month)
            .fold((0usize, 0usize), |(_s, acc), &d| (acc, acc + d as usize));
        let days = crate::clock::MONTH_DAYS[month] as usize;
        let start_h = start * 24;
        let end_h = (start + days) * 24;
        let slice = &self.air_temperatures[start_h.min(self.air_temperatures.len())
            ..end_h.min(self.air_temperatures.len())];
        if slice.is_empty() {
            return self.annual_mean_air_temp();
        }
        slice.iter().sum::<f64>() / slice.len() as f64
    }

    pub fn annual_mean_air_temp(&self) -> f64 {
        self.air_temperatures.iter().sum::<f64>() / self.air_temperatures.len() as f64
    }

    /// Sun position at the given hour-of-year, via `climate::solar`.
    pub fn sun_position(&self, hour_of_year: f64) -> SunPosition {
        let day = (hour_of_year / 24.0).floor() as u32 % 365 + 1;
        let hour = hour_of_year.rem_euclid(24.0);
        let loc = Location {
            latitude: self.latitude as f32,
            longitude: self.longitude as f32,
            tz: 0,
        };
        let declination = declination_from_nday(day);
        let hourangle = hourangle_from_data(hour as f32, day, loc);
        sun_position(declination, hourangle, loc)
    }

    /// Fraction of sky visible from a surface of the given pitch accounting
    /// for shading-segment obstructions in the relevant azimuth range,
    /// direct-beam variant (`f_sh_dir`, §4.D).
    pub fn shading_factor_direct(&self, azimuth_deg: f64, sun: &SunPosition) -> f64 {
        if sun.altitude <= 0.0 {
            return 0.0;
        }
        for seg in &self.shading_segments {
            if azimuth_in_segment(azimuth_deg, seg) {
                return if sun.altitude > seg.obstruction_height_deg as f32 {
                    1.0
                } else {
                    0.0
                };
            }
        }
        1.0
    }

    /// Diffuse shading factor (`f_sh_dif`): area-weighted average visible
    /// sky fraction over the shading segments, per BS EN ISO 52016-1's
    /// simplified treatment of sky-diffuse obstruction.
    pub fn shading_factor_diffuse(&self) -> f64 {
        if self.shading_segments.is_empty() {
            return 1.0;
        }
        let sum: f64 = self
            .shading_segments
            .iter()
            .map(|s| (90.0 - s.obstruction_height_deg).max(0.0) / 90.0)
            .sum();
        sum / self.shading_segments.len() as f64
    }
}

impl ExternalConditions {
    /// Builds weather series from an EPW file's hourly rows. EPW direct
    /// radiation is direct-normal, not direct-beam-on-horizontal, so
    /// `direct_beam_conversion_needed` is set and left for the solar-flux
    /// computation to resolve via the sun's altitude each hour.
    pub fn from_epw(epw: &climate::epw::EpwData) -> Self {
        ExternalConditions {
            air_temperatures: epw.data.iter().map(|d| d.dry_bulb_temp as f64).collect(),
            wind_speeds: epw.data.iter().map(|d| d.wind_speed as f64).collect(),
            wind_directions: epw.data.iter().map(|d| d.wind_direction as f64).collect(),
            direct_beam_radiation: epw
                .data
                .iter()
                .map(|d| d.direct_normal_radiation as f64)
                .collect(),
            diffuse_horizontal_radiation: epw
                .data
                .iter()
                .map(|d| d.diffuse_horizontal_radiation as f64)
                .collect(),
            solar_reflectivity_of_ground: vec![0.2; epw.data.len()],
            latitude: epw.meta.latitude as f64,
            longitude: epw.meta.longitude as f64,
            direct_beam_conversion_needed: true,
            shading_segments: vec![ShadingSegment {
                start_deg: 0.0,
                end_deg: 360.0,
                obstruction_height_deg: 0.0,
            }],
        }
    }

    /// Builds weather series from a CIBSE TRY/DSY file's hourly rows. CIBSE
    /// supplies global and diffuse horizontal radiation directly, so the
    /// direct-beam component is the horizontal difference and needs no
    /// normal-to-horizontal conversion.
    pub fn from_cibse(cibse: &climate::cibse::CibseData) -> Self {
        ExternalConditions {
            air_temperatures: cibse.data.iter().map(|d| d.dry_bulb_temp as f64).collect(),
            wind_speeds: cibse.data.iter().map(|d| d.wind_speed as f64).collect(),
            wind_directions: cibse.data.iter().map(|d| d.wind_direction as f64).collect(),
            direct_beam_radiation: cibse
                .data
                .iter()
                .map(|d| (d.global_horizontal_radiation - d.diffuse_horizontal_radiation).max(0.0) as f64)
                .collect(),
            diffuse_horizontal_radiation: cibse
                .data
                .iter()
                .map(|d| d.diffuse_horizontal_radiation as f64)
                .collect(),
            solar_reflectivity_of_ground: vec![0.2; cibse.data.len()],
            latitude: cibse.meta.latitude as f64,
            longitude: cibse.meta.longitude as f64,
            direct_beam_conversion_needed: false,
            shading_segments: vec![ShadingSegment {
                start_deg: 0.0,
                end_deg: 360.0,
                obstruction_height_deg: 0.0,
            }],
        }
    }
}

fn azimuth_in_segment(az: f64, seg: &ShadingSegment) -> bool {
    let az = az.rem_euclid(360.0);
    let start = seg.start_deg.rem_euclid(360.0);
    let end = seg.end_deg.rem_euclid(360.0);
    if start <= end {
        az >= start && az < end
    } else {
        az >= start || az < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExternalConditions {
        ExternalConditions {
            air_temperatures: (0..8760).map(|h| 10.0 + (h % 24) as f64 * 0.1).collect(),
            wind_speeds: vec![4.0; 8760],
            wind_directions: vec![180.0; 8760],
            direct_beam_radiation: vec![0.0; 8760],
            diffuse_horizontal_radiation: vec![0.0; 8760],
            solar_reflectivity_of_ground: vec![0.2; 8760],
            latitude: 51.5,
            longitude: -0.1,
            direct_beam_conversion_needed: false,
            shading_segments: vec![ShadingSegment {
                start_deg: 0.0,
                end_deg: 360.0,
                obstruction_height_deg: 0.0,
            }],
        }
    }

    #[test]
    fn monthly_mean_differs_from_annual_when_seasonal() {
        let ext = sample();
        let jan = ext.monthly_mean_air_temp(0);
        let annual = ext.annual_mean_air_temp();
        assert!((jan - annual).abs() < 1.0);
    }

    #[test]
    fn no_obstruction_gives_full_diffuse_sky() {
        let ext = sample();
        assert!((ext.shading_factor_diffuse() - 1.0).abs() < 1e-9);
    }
}
