//! Verdict policy: decides whether a line of streamed text passes the governor.

pub mod config;
pub mod policy;

pub use config::{WardsConfig, WardsError, DEFAULT_THRESHOLD};
pub use policy::{trim_line, Decision, PolicyKernel, Tally, Verdict};
