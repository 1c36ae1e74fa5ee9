// SPDX-License-Identifier: MIT

//! The content creation studio built on the agent runtime
//!
//! - [analysis] - deterministic text metrics
//! - [tools] - function tools wrapping those metrics and session updates
//! - [prompts] / [agents] - agent roles and the composed pipeline
//! - [pipeline] - the `Studio` facade used by the CLI and the server
//! - [server] - HTTP/SSE API

pub mod agents;
pub mod analysis;
pub mod config;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod tools;
