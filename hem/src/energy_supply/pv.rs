// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Photovoltaic closed-form output calculator (§3 "Energy supply"):
//! plane-of-array irradiance via `climate::solar`, a simple module
//! temperature model and a linear temperature-coefficient derating.

use climate::solar::{radiation_for_surface, Location, SolarRadiation};

#[derive(Debug, Clone, Copy)]
pub struct PvSystem {
    pub peak_power_kw: f64,
    pub pitch_deg: f32,
    pub orientation_deg: f32,
    pub inverter_efficiency: f64,
    /// Fractional power loss per degree above 25 degC (typically ~0.004).
    pub temp_coeff_per_k: f64,
    /// Nominal operating cell temperature above ambient at 800 W/m2 (NOCT
    /// derived), degC.
    pub noct_rise_k: f64,
}

impl PvSystem {
    /// Instantaneous output (kW) given the direct/diffuse horizontal
    /// irradiance and ambient temperature for one timestep.
    pub fn output_kw(
        &self,
        nday: u32,
        hour: f32,
        horizontal: SolarRadiation,
        location: Location,
        albedo: f32,
        t_ambient_c: f64,
    ) -> f64 {
        let plane = radiation_for_surface(
            nday,
            hour,
            horizontal,
            location.latitude,
            self.pitch_deg,
            self.orientation_deg,
            albedo,
        );
        let total_irradiance_w_m2 = (plane.dir + plane.dif).max(0.0) as f64;
        if total_irradiance_w_m2 <= 0.0 {
            return 0.0;
        }

        let cell_temp_c = t_ambient_c + self.noct_rise_k * (total_irradiance_w_m2 / 800.0);
        let temp_derate = (1.0 - self.temp_coeff_per_k * (cell_temp_c - 25.0)).max(0.0);

        let output_ratio = total_irradiance_w_m2 / 1000.0;
        self.peak_power_kw * output_ratio * temp_derate * self.inverter_efficiency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_system() -> PvSystem {
        PvSystem {
            peak_power_kw: 4.0,
            pitch_deg: 35.0,
            orientation_deg: 0.0,
            inverter_efficiency: 0.96,
            temp_coeff_per_k: 0.004,
            noct_rise_k: 25.0,
        }
    }

    fn location() -> Location {
        Location {
            latitude: 51.5,
            longitude: -0.1,
            tz: 0,
        }
    }

    #[test]
    fn zero_irradiance_gives_zero_output() {
        let pv = sample_system();
        let output = pv.output_kw(
            172,
            0.0,
            SolarRadiation { dir: 0.0, dif: 0.0 },
            location(),
            0.2,
            10.0,
        );
        assert_eq!(output, 0.0);
    }

    #[test]
    fn midday_summer_irradiance_gives_positive_output() {
        let pv = sample_system();
        let output = pv.output_kw(
            172,
            12.0,
            SolarRadiation {
                dir: 700.0,
                dif: 150.0,
            },
            location(),
            0.2,
            20.0,
        );
        assert!(output > 0.0);
        assert!(output <= pv.peak_power_kw);
    }

    #[test]
    fn higher_ambient_temperature_reduces_output() {
        let pv = sample_system();
        let gsol = SolarRadiation {
            dir: 700.0,
            dif: 150.0,
        };
        let cool = pv.output_kw(172, 12.0, gsol, location(), 0.2, 10.0);
        let hot = pv.output_kw(172, 12.0, gsol, location(), 0.2, 40.0);
        assert!(hot < cool);
    }
}
