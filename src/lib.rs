#![cfg_attr(not(test), no_std)]

// must come first so the logging macros are in scope for every module
#[macro_use]
mod fmt;

pub mod ad5201;
pub mod ad7193;
pub mod adt7320;
pub mod config;
pub mod controller;
pub mod device_manager;
pub mod error;
pub mod indicator;
pub mod mcp4725;
pub mod network;
pub mod relay;

pub use config::Config;
pub use controller::{Controller, CycleReport};
pub use device_manager::{DeviceManager, Health};
pub use error::{BusFault, ConfigError, Error, Result};
