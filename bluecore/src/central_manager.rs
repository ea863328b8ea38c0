//! The central-role radio contract: scanning, connecting, and GATT client
//! commands on remote peripherals.

use std::any::Any;

use btuuid::BluetoothUuid;

use crate::advertisement_data::AdvertisementData;
use crate::characteristic::{CharacteristicInfo, CharacteristicWriteType};
use crate::error::{Error, Result};
use crate::peripheral::{PeripheralId, PeripheralInfo, PeripheralState};
use crate::service::ServiceInfo;

/// The power state of a radio manager (central or peripheral role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerState {
    Unknown,
    Resetting,
    Unsupported,
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

/// The command surface of a central-role radio backend.
///
/// Every command is fire-and-forget: it must not block, and its outcome is
/// reported through the [`CentralRadioDelegate`] the backend was wired with.
/// Backends must deliver delegate events one at a time, in the order the
/// underlying radio produced them.
pub trait CentralRadio: Send + Sync {
    /// The current power state of the radio.
    fn state(&self) -> ManagerState;

    /// Starts scanning for peripherals.
    ///
    /// If `services` is provided, only peripherals advertising one of those
    /// service UUIDs are reported.
    fn scan(&self, services: Option<&[BluetoothUuid]>, allow_duplicates: bool);

    /// Stops scanning for peripherals.
    fn stop_scan(&self);

    /// Whether the radio is currently scanning.
    fn is_scanning(&self) -> bool;

    /// Initiates a connection to a peripheral.
    fn connect(&self, id: PeripheralId);

    /// Cancels an active or pending connection.
    fn cancel_connection(&self, id: PeripheralId);

    /// The connection state of a peripheral as the radio sees it.
    fn peripheral_state(&self, id: PeripheralId) -> PeripheralState;

    /// Issues a service discovery command on a connected peripheral.
    fn discover_services(&self, id: PeripheralId, filter: Option<&[BluetoothUuid]>);

    /// Issues a characteristic discovery command for one service.
    fn discover_characteristics(&self, id: PeripheralId, service: BluetoothUuid);

    /// Reads the value of a characteristic.
    fn read_characteristic(&self, id: PeripheralId, characteristic: BluetoothUuid);

    /// Writes the value of a characteristic.
    fn write_characteristic(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
        value: &[u8],
        write_type: CharacteristicWriteType,
    );

    /// Enables or disables notifications for a characteristic.
    fn set_notify(&self, id: PeripheralId, characteristic: BluetoothUuid, enabled: bool);
}

/// Events emitted by a central-role radio backend.
///
/// This is the push half of the boundary: the backend calls these methods from
/// its event source and the adapter layer resolves the matching pending
/// operation.
#[allow(unused_variables)]
pub trait CentralRadioDelegate: Any + Send + Sync {
    /// The radio's power state changed.
    fn did_update_state(&self, state: ManagerState);

    /// A scan reported a peripheral.
    fn did_discover(
        &self,
        peripheral: PeripheralInfo,
        advertisement_data: AdvertisementData,
        rssi: i16,
    ) {
    }

    /// A connection attempt completed.
    fn did_connect(&self, id: PeripheralId) {}

    /// A connection attempt failed.
    fn did_fail_to_connect(&self, id: PeripheralId, error: Error) {}

    /// An established connection ended.
    fn did_disconnect(&self, id: PeripheralId, error: Option<Error>) {}

    /// A `discover_services` command finished.
    fn did_discover_services(&self, id: PeripheralId, result: Result<Vec<ServiceInfo>>) {}

    /// A `discover_characteristics` command finished.
    fn did_discover_characteristics(
        &self,
        id: PeripheralId,
        service: BluetoothUuid,
        result: Result<Vec<CharacteristicInfo>>,
    ) {
    }

    /// A characteristic value arrived, either for a pending read or as a
    /// notification.
    fn did_update_value(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
        result: Result<Vec<u8>>,
    ) {
    }

    /// A `write_characteristic` command with response finished.
    fn did_write_value(&self, id: PeripheralId, characteristic: BluetoothUuid, result: Result<()>) {
    }

    /// A `set_notify` command finished; on success carries the new state.
    fn did_update_notification_state(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
        result: Result<bool>,
    ) {
    }
}
