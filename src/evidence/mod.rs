//! Behavioral evidence scanners. Both read the marker table from
//! [`crate::config::GateConfig`]; neither keeps its own copy.

pub mod idioms;
pub mod runtime_scan;
pub mod static_scan;
