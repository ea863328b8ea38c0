//! Read-only GATT profile descriptors.
//!
//! A profile names a service and declares its characteristics; the peripheral
//! role consumes it once, when constructing the mutable service it publishes.

use btuuid::BluetoothUuid;

use crate::characteristic::{AttributePermissions, CharacteristicProperties};

/// Describes a service: its UUID, a human-readable name, and the
/// characteristics it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProfile {
    pub uuid: BluetoothUuid,
    pub name: String,
    pub characteristics: Vec<CharacteristicProfile>,
}

impl ServiceProfile {
    pub fn new(uuid: BluetoothUuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            characteristics: Vec::new(),
        }
    }

    pub fn with_characteristics(mut self, characteristics: Vec<CharacteristicProfile>) -> Self {
        self.characteristics = characteristics;
        self
    }
}

/// Describes one characteristic within a [`ServiceProfile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicProfile {
    pub uuid: BluetoothUuid,
    pub name: String,
    pub properties: CharacteristicProperties,
    pub permissions: AttributePermissions,
    pub initial_value: Option<Vec<u8>>,
}

impl CharacteristicProfile {
    pub fn new(uuid: BluetoothUuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            properties: CharacteristicProperties::READ
                | CharacteristicProperties::WRITE
                | CharacteristicProperties::NOTIFY,
            permissions: AttributePermissions::READABLE | AttributePermissions::WRITEABLE,
            initial_value: None,
        }
    }

    pub fn with_properties(mut self, properties: CharacteristicProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_permissions(mut self, permissions: AttributePermissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_initial_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.initial_value = Some(value.into());
        self
    }
}
