// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Hourly dwelling energy simulation engine: a lumped-node zone thermal
//! solver (BS EN ISO 52016-1), a pressure-balance ventilation network, an
//! ODE-integrated emitter/storage-heater core, hot-water demand and
//! pipework losses, and a per-fuel energy-supply ledger.

pub mod clock;
pub mod controls;
pub mod elements;
pub mod emitters;
pub mod energy_supply;
pub mod error;
pub mod external_conditions;
pub mod heat_source_wet;
pub mod hot_water;
pub mod input;
pub mod numerics;
pub mod output;
pub mod project;
pub mod storage_heater;
pub mod units;
pub mod utils;
pub mod ventilation;
pub mod zone;

pub use error::{HemError, HemResult};
