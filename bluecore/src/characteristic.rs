use std::ops::{BitOr, BitOrAssign};

use btuuid::BluetoothUuid;

/// Properties of a characteristic, as a bitmask matching the GATT
/// characteristic declaration (Bluetooth Core Specification Vol 3, Part G
/// §3.3.1.1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CharacteristicProperties(u16);

impl CharacteristicProperties {
    pub const BROADCAST: Self = Self(0x0001);
    pub const READ: Self = Self(0x0002);
    pub const WRITE_WITHOUT_RESPONSE: Self = Self(0x0004);
    pub const WRITE: Self = Self(0x0008);
    pub const NOTIFY: Self = Self(0x0010);
    pub const INDICATE: Self = Self(0x0020);
    pub const AUTHENTICATED_SIGNED_WRITES: Self = Self(0x0040);
    pub const EXTENDED_PROPERTIES: Self = Self(0x0080);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CharacteristicProperties {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CharacteristicProperties {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Permissions of a locally published characteristic's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AttributePermissions(u8);

impl AttributePermissions {
    pub const READABLE: Self = Self(0x01);
    pub const WRITEABLE: Self = Self(0x02);
    pub const READ_ENCRYPTION_REQUIRED: Self = Self(0x04);
    pub const WRITE_ENCRYPTION_REQUIRED: Self = Self(0x08);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AttributePermissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AttributePermissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// How a characteristic value write is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacteristicWriteType {
    WithResponse,
    WithoutResponse,
}

/// A characteristic discovered on a remote peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacteristicInfo {
    pub uuid: BluetoothUuid,
    pub properties: CharacteristicProperties,
}

/// A characteristic as published to the radio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicDefinition {
    pub uuid: BluetoothUuid,
    pub properties: CharacteristicProperties,
    pub permissions: AttributePermissions,
    pub value: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_combine_and_contain() {
        let properties = CharacteristicProperties::READ | CharacteristicProperties::NOTIFY;
        assert!(properties.contains(CharacteristicProperties::READ));
        assert!(properties.contains(CharacteristicProperties::NOTIFY));
        assert!(!properties.contains(CharacteristicProperties::WRITE));
        assert_eq!(properties.bits(), 0x0012);
        assert_eq!(CharacteristicProperties::from_bits(0x0012), properties);
    }

    #[test]
    fn empty_properties_contain_nothing_but_empty() {
        let empty = CharacteristicProperties::empty();
        assert!(empty.contains(CharacteristicProperties::empty()));
        assert!(!empty.contains(CharacteristicProperties::READ));
    }

    #[test]
    fn permissions_combine_and_contain() {
        let mut permissions = AttributePermissions::READABLE;
        permissions |= AttributePermissions::WRITEABLE;
        assert!(permissions.contains(AttributePermissions::READABLE));
        assert!(!permissions.contains(AttributePermissions::READ_ENCRYPTION_REQUIRED));
    }
}
