// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Simulation clock: an ordered sequence of uniform-length timesteps.

use serde::{Deserialize, Serialize};

pub const MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// `SimulationTime` from the input document: start/end in hours from the
/// beginning of the year, and the timestep length in hours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationTime {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SimulationTime {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// Total number of timesteps in the run.
    pub fn total_steps(&self) -> usize {
        (((self.end - self.start) / self.step).round() as i64).max(0) as usize
    }

    /// An iterator over the zero-indexed timesteps of the run.
    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator {
            time: *self,
            index: 0,
            total: self.total_steps(),
        }
    }
}

/// One instant on the clock: an index plus the hour-of-year it corresponds
/// to. Provides conversions to day-of-year, month, and hour-of-day used by
/// schedules and monthly aggregates.
#[derive(Debug, Clone, Copy)]
pub struct Timestep {
    pub index: usize,
    pub hour_of_year: f64,
    pub step: f64,
}

impl Timestep {
    /// Hour of the day in [0, 24).
    pub fn hour_of_day(&self) -> f64 {
        self.hour_of_year.rem_euclid(24.0)
    }

    /// Zero-indexed day of the year, in [0, 365).
    pub fn day_of_year(&self) -> u32 {
        ((self.hour_of_year / 24.0).floor() as u32) % 365
    }

    /// Zero-indexed month, in [0, 12).
    pub fn month(&self) -> usize {
        let mut day = self.day_of_year();
        for (i, &days) in MONTH_DAYS.iter().enumerate() {
            if day < days {
                return i;
            }
            day -= days;
        }
        11
    }

    /// Timestep length in hours, for converting a power (kW) to energy (kWh).
    pub fn delta_t_h(&self) -> f64 {
        self.step
    }
}

pub struct SimulationTimeIterator {
    time: SimulationTime,
    index: usize,
    total: usize,
}

impl Iterator for SimulationTimeIterator {
    type Item = Timestep;

    fn next(&mut self) -> Option<Timestep> {
        if self.index >= self.total {
            return None;
        }
        let hour_of_year = self.time.start + self.index as f64 * self.time.step;
        let ts = Timestep {
            index: self.index,
            hour_of_year,
            step: self.time.step,
        };
        self.index += 1;
        Some(ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_year_hourly_has_8760_steps() {
        let t = SimulationTime::new(0.0, 8760.0, 1.0);
        assert_eq!(t.total_steps(), 8760);
        assert_eq!(t.iter().count(), 8760);
    }

    #[test]
    fn month_rolls_over_correctly() {
        let t = SimulationTime::new(0.0, 8760.0, 1.0);
        let steps: Vec<_> = t.iter().collect();
        assert_eq!(steps[0].month(), 0);
        assert_eq!(steps[744].month(), 1); // first hour of February
        assert_eq!(steps[8759].month(), 11);
    }

    #[test]
    fn half_hourly_steps_double_count() {
        let t = SimulationTime::new(0.0, 48.0, 0.5);
        assert_eq!(t.total_steps(), 96);
    }
}
