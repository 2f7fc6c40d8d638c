// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

use serde::{Deserialize, Serialize};

use super::NodeChain;

/// A window treatment (curtains/blinds): modal transmittance reduction and
/// added resistance when closed, with hysteresis on irradiance thresholds
/// and an opening-delay timer for automatic controls (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowTreatment {
    pub trans_red: f64,
    pub delta_r: f64,
    /// Irradiance (W/m2) above which the treatment closes.
    pub close_irradiance: f64,
    /// Irradiance below which it reopens; `open_irradiance < close_irradiance`
    /// gives the hysteresis band.
    pub open_irradiance: f64,
    /// Delay, in timesteps, an automatic opening command takes to act.
    pub opening_delay_steps: u32,

    #[serde(skip)]
    pub is_closed: bool,
    #[serde(skip)]
    pub opening_timer: u32,
}

impl Default for WindowTreatment {
    fn default() -> Self {
        WindowTreatment {
            trans_red: 0.0,
            delta_r: 0.0,
            close_irradiance: f64::INFINITY,
            open_irradiance: 0.0,
            opening_delay_steps: 0,
            is_closed: false,
            opening_timer: 0,
        }
    }
}

impl WindowTreatment {
    /// Advances the treatment's hysteresis state given this timestep's
    /// incident irradiance (W/m2) and returns whether it is closed after
    /// the update. State is mutated unconditionally on each call: per §5's
    /// ordering guarantees, callers only invoke this once per committed
    /// timestep.
    pub fn step(&mut self, irradiance: f64) -> bool {
        if !self.is_closed && irradiance >= self.close_irradiance {
            self.is_closed = true;
            self.opening_timer = 0;
        } else if self.is_closed && irradiance <= self.open_irradiance {
            if self.opening_timer >= self.opening_delay_steps {
                self.is_closed = false;
                self.opening_timer = 0;
            } else {
                self.opening_timer += 1;
            }
        } else {
            self.opening_timer = 0;
        }
        self.is_closed
    }

    /// Effective transmittance multiplier and added resistance for the
    /// current state.
    pub fn effect(&self) -> (f64, f64) {
        if self.is_closed {
            (1.0 - self.trans_red, self.delta_r)
        } else {
            (1.0, 0.0)
        }
    }
}

/// Transparent element: 2 nodes, transmits solar via g-value and frame
/// fraction, optional window treatment (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparentElement {
    pub name: String,
    pub area: f64,
    pub pitch: f64,
    pub orientation: f64,
    pub chain: NodeChain,
    pub g_value: f64,
    pub frame_fraction: f64,
    pub treatment: Option<WindowTreatment>,
}

impl TransparentElement {
    /// Transmitted solar gain (W) given incident total irradiance on the
    /// plane (W/m2) and the current treatment state.
    pub fn transmitted_solar_gain(&self, incident_irradiance: f64, treatment_trans_mult: f64) -> f64 {
        self.area * (1.0 - self.frame_fraction) * self.g_value * incident_irradiance
            * treatment_trans_mult
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treatment_closes_above_threshold_and_reopens_after_delay() {
        let mut t = WindowTreatment {
            trans_red: 0.5,
            delta_r: 0.1,
            close_irradiance: 300.0,
            open_irradiance: 100.0,
            opening_delay_steps: 2,
            is_closed: false,
            opening_timer: 0,
        };
        assert!(!t.step(50.0));
        assert!(t.step(400.0));
        // below open threshold, but delay not yet elapsed
        assert!(t.step(50.0));
        assert!(t.step(50.0));
        assert!(!t.step(50.0));
    }

    #[test]
    fn transmitted_gain_scales_with_area_and_g_value() {
        let w = TransparentElement {
            name: "w1".into(),
            area: 2.0,
            pitch: 90.0,
            orientation: 0.0,
            chain: NodeChain {
                k_pli: vec![0.0, 0.0],
                h_pli: vec![1.0],
            },
            g_value: 0.6,
            frame_fraction: 0.2,
            treatment: None,
        };
        let gain = w.transmitted_solar_gain(500.0, 1.0);
        assert!((gain - 2.0 * 0.8 * 0.6 * 500.0).abs() < 1e-9);
    }
}
