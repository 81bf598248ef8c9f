//! Concrete adapter implementations for ports, plus the wall-clock driver.

pub mod auto_step;
pub mod csv_adapter;
pub mod file_config_adapter;
