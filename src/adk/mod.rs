// SPDX-License-Identifier: MIT

//! Agent runtime: models, tools, agents, sessions and the runner

pub mod agent;
pub mod context;
pub mod error;
pub mod instruction;
pub mod model;
pub mod runner;
pub mod session;
pub mod state;
pub mod tool;
