//! `ChillMCP` - an MCP server that lets AI agents take breaks
//!
//! The core is a small concurrent state machine: a stress level that
//! climbs while the agent works and drops on breaks, and a boss alert level
//! that rises when breaks get noticed and cools down over time. Break tools
//! are served over MCP (JSON-RPC on stdio).

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod server;
pub mod state;
pub mod transport;
