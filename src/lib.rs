//! Tailview - live, filterable viewer for growing log files.

pub mod config;
pub mod display;
pub mod session;
pub mod tail;
