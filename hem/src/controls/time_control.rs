// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

use serde::{Deserialize, Serialize};

use super::Control;

/// A repeating daily on/off schedule: `schedule[h]` is the on-state for hour
/// `h` of a `period_hours`-long repeating period, starting at `start_day`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnOffTimeControl {
    pub schedule: Vec<bool>,
    pub start_day: u32,
    pub time_series_step: f64,
}

impl Control for OnOffTimeControl {
    fn is_on(&self, timestep_idx: usize) -> bool {
        if self.schedule.is_empty() {
            return false;
        }
        self.schedule[timestep_idx % self.schedule.len()]
    }
}

/// Setpoint schedule in degC; `None` entries mean "off" (no demand imposed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetpointTimeControl {
    pub schedule: Vec<Option<f64>>,
    pub start_day: u32,
    pub time_series_step: f64,
    /// Optional absolute bounds the setpoint is clamped to.
    pub setpoint_min: Option<f64>,
    pub setpoint_max: Option<f64>,
}

impl Control for SetpointTimeControl {
    fn is_on(&self, timestep_idx: usize) -> bool {
        self.setpoint(timestep_idx).is_some()
    }

    fn setpoint(&self, timestep_idx: usize) -> Option<f64> {
        let raw = *self.schedule.get(timestep_idx % self.schedule.len().max(1))?;
        raw.map(|v| {
            let v = self.setpoint_min.map_or(v, |m| v.max(m));
            self.setpoint_max.map_or(v, |m| v.min(m))
        })
    }
}

/// Picks the cheapest `control_cap_fraction_on` fraction of hours in each
/// rolling `time_series_step`-sized window of the tariff, per a Python
/// `nsmallest`-style selection. Tie-break ordering among equal-cost hours is
/// left unspecified upstream (§9 Open Questions); this implementation
/// preserves input order among ties (a stable sort), which is the simplest
/// behaviour consistent with "do not guess intent" beyond what's needed to
/// produce a deterministic, testable schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnOffCostMinimisingTimeControl {
    pub schedule_prices: Vec<f64>,
    pub start_day: u32,
    pub time_series_step: f64,
    /// Fraction (0-1) of each day that should be "on", the cheapest hours
    /// first.
    pub time_on_fraction: f64,
}

impl OnOffCostMinimisingTimeControl {
    /// Builds the boolean on/off schedule once, eagerly, the way the
    /// schedule-table controls do.
    pub fn compute_schedule(&self) -> Vec<bool> {
        let n = self.schedule_prices.len();
        if n == 0 {
            return Vec::new();
        }
        let per_day = (24.0 / self.time_series_step).round() as usize;
        let per_day = per_day.max(1);
        let n_on = ((per_day as f64) * self.time_on_fraction).round() as usize;

        let mut schedule = vec![false; n];
        for day_start in (0..n).step_by(per_day) {
            let day_end = (day_start + per_day).min(n);
            let mut idx: Vec<usize> = (day_start..day_end).collect();
            // stable sort by price ascending: ties keep original order
            idx.sort_by(|&a, &b| {
                self.schedule_prices[a]
                    .partial_cmp(&self.schedule_prices[b])
                    .unwrap()
            });
            for &i in idx.iter().take(n_on) {
                schedule[i] = true;
            }
        }
        schedule
    }
}

impl Control for OnOffCostMinimisingTimeControl {
    fn is_on(&self, timestep_idx: usize) -> bool {
        let schedule = self.compute_schedule();
        if schedule.is_empty() {
            return false;
        }
        schedule[timestep_idx % schedule.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onoff_repeats_schedule() {
        let c = OnOffTimeControl {
            schedule: vec![true, false],
            start_day: 0,
            time_series_step: 1.0,
        };
        assert!(c.is_on(0));
        assert!(!c.is_on(1));
        assert!(c.is_on(2));
    }

    #[test]
    fn setpoint_none_means_off() {
        let c = SetpointTimeControl {
            schedule: vec![Some(20.0), None],
            start_day: 0,
            time_series_step: 1.0,
            setpoint_min: None,
            setpoint_max: None,
        };
        assert!(c.is_on(0));
        assert_eq!(c.setpoint(0), Some(20.0));
        assert!(!c.is_on(1));
    }

    #[test]
    fn setpoint_is_clamped() {
        let c = SetpointTimeControl {
            schedule: vec![Some(30.0)],
            start_day: 0,
            time_series_step: 1.0,
            setpoint_min: None,
            setpoint_max: Some(25.0),
        };
        assert_eq!(c.setpoint(0), Some(25.0));
    }

    #[test]
    fn cost_minimising_picks_cheapest_fraction() {
        let c = OnOffCostMinimisingTimeControl {
            schedule_prices: vec![5.0, 1.0, 3.0, 4.0],
            start_day: 0,
            time_series_step: 6.0, // 4 steps/day
            time_on_fraction: 0.5, // 2 of 4 hours
        };
        let sched = c.compute_schedule();
        assert_eq!(sched, vec![false, true, true, false]);
    }
}
