//! Decision engine and guided intake workflows for landlord possession
//! notices across the UK jurisdictions.

pub mod config;
pub mod error;
pub mod facts;
pub mod telemetry;
pub mod workflows;
