//! A platform-neutral contract layer for Bluetooth Low Energy radios.
//!
//! This crate defines the command surface a BLE radio backend must provide
//! ([`CentralRadio`], [`PeripheralRadio`]), the delegate traits through which a
//! backend reports its asynchronous events ([`CentralRadioDelegate`],
//! [`PeripheralRadioDelegate`]), and the GATT data-model types shared by both
//! roles. Radio backends are injected as trait objects, so the same adapter
//! code runs against real hardware and against test doubles.
//!
//! See the `bluecore-async` crate for the future-based adapter built on this
//! contract.

pub mod advertisement_data;
mod central;
mod central_manager;
mod characteristic;
pub mod error;
mod peripheral;
mod peripheral_manager;
mod profile;
mod service;

pub use central::*;
pub use central_manager::*;
pub use characteristic::*;
pub use error::{AttError, Error, Result};
pub use peripheral::*;
pub use peripheral_manager::*;
pub use profile::*;
pub use service::*;
