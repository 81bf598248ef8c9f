//! Port traits decoupling the domain from file formats and configuration.

pub mod config_port;
pub mod data_port;
