//! An asynchronous adapter for the `bluecore` radio contract.
//!
//! This crate provides `async` functions and streams on top of any
//! [`CentralRadio`]/[`PeripheralRadio`] backend: scanning, connecting and GATT
//! client operations for the central role, and a published service registry
//! with advertising and notification backpressure for the peripheral role.
//!
//! See the `examples` directory for more complete usage examples.

mod central_manager;
pub mod error;
mod mutable_characteristic;
mod mutable_service;
mod peripheral;
mod peripheral_manager;
mod util;

pub use bluecore::{
    AttError, AttributePermissions, Central, CentralRadio, CentralRadioDelegate,
    CharacteristicInfo, CharacteristicProfile, CharacteristicProperties, CharacteristicWriteType,
    ManagerState, PeripheralId, PeripheralInfo, PeripheralRadio, PeripheralRadioDelegate,
    PeripheralState, ReadRequest, ServiceInfo, ServiceProfile, WriteRequest, advertisement_data,
};
pub use central_manager::*;
pub use mutable_characteristic::*;
pub use mutable_service::*;
pub use peripheral::*;
pub use peripheral_manager::*;
