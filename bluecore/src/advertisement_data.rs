use std::collections::HashMap;

use btuuid::BluetoothUuid;

/// Data included in a Bluetooth advertisement or scan response.
///
/// Used in both directions: scan results report it, and the peripheral role
/// builds one to advertise with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvertisementData {
    /// The (possibly shortened) local name of the device (CSS §A.1.2)
    pub local_name: Option<String>,
    /// Manufacturer specific data (CSS §A.1.4)
    pub manufacturer_data: Option<ManufacturerData>,
    /// Service associated data (CSS §A.1.11)
    pub service_data: HashMap<BluetoothUuid, Vec<u8>>,
    /// Advertised GATT service UUIDs (CSS §A.1.1)
    pub service_uuids: Vec<BluetoothUuid>,
    /// Transmitted power level (CSS §A.1.5)
    pub tx_power_level: Option<i16>,
    /// Set to true for connectable advertising packets
    pub is_connectable: bool,
}

/// Manufacturer specific data included in Bluetooth advertisements. See the
/// Bluetooth Core Specification Supplement §A.1.4 for details.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ManufacturerData {
    /// Company identifier (defined [here](https://www.bluetooth.com/specifications/assigned-numbers/company-identifiers/))
    pub company_id: u16,
    /// Manufacturer specific data
    pub data: Vec<u8>,
}

impl AdvertisementData {
    /// An advertising payload carrying a local name and service UUIDs, the
    /// shape the peripheral role advertises with.
    pub fn with_local_name(name: impl Into<String>, service_uuids: &[BluetoothUuid]) -> Self {
        AdvertisementData {
            local_name: Some(name.into()),
            service_uuids: service_uuids.to_vec(),
            is_connectable: true,
            ..Default::default()
        }
    }
}
