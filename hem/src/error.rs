// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Fatal error taxonomy for the engine.
//!
//! Every fatal condition in the engine surfaces as one of these variants and
//! propagates with `?` to `run_project`, which maps it to a process exit code.

use thiserror::Error;

/// Fatal error raised by the engine. There is no partial-result recovery
/// inside a timestep: any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum HemError {
    /// Malformed/missing input fields, dangling references, duplicate
    /// end-user registration, invalid enum strings, incompatible control
    /// combinations.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Cooling setpoint below heating setpoint, non-positive thermal mass,
    /// r_vi <= 0 for a ground floor, and similar physically inconsistent
    /// inputs.
    #[error("physical constraint violated: {0}")]
    PhysicalConstraint(String),

    /// A root-finder, ODE integrator or scalar minimiser failed to converge.
    #[error("solver failure: {0}")]
    Solver(String),
}

impl HemError {
    pub fn config(msg: impl Into<String>) -> Self {
        HemError::Configuration(msg.into())
    }

    pub fn physical(msg: impl Into<String>) -> Self {
        HemError::PhysicalConstraint(msg.into())
    }

    pub fn solver(msg: impl Into<String>) -> Self {
        HemError::Solver(msg.into())
    }

    /// Process exit code for the CLI, keyed by error kind.
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            HemError::Configuration(_) => exitcode::CONFIG,
            HemError::PhysicalConstraint(_) => exitcode::DATAERR,
            HemError::Solver(_) => exitcode::SOFTWARE,
        }
    }
}

pub type HemResult<T> = Result<T, HemError>;
