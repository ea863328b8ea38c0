use btuuid::BluetoothUuid;

use crate::characteristic::CharacteristicDefinition;

/// A service discovered on a remote peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceInfo {
    pub uuid: BluetoothUuid,
    pub is_primary: bool,
}

/// A service as published to the radio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub uuid: BluetoothUuid,
    pub is_primary: bool,
    pub characteristics: Vec<CharacteristicDefinition>,
}
