use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bluecore::{CentralRadio, CharacteristicInfo, CharacteristicWriteType, PeripheralId};
use btuuid::BluetoothUuid;

use crate::central_manager::CentralAsyncDelegate;
use crate::error::Result;
use crate::util::{BroadcastReceiver, defer};

/// How far discovery has progressed for a service's characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryState {
    NotDiscovered,
    Discovering,
    Discovered,
    Failed,
}

/// A service found on a remote peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteService {
    pub uuid: BluetoothUuid,
    pub is_primary: bool,
    pub discovery_state: DiscoveryState,
    pub characteristics: Vec<CharacteristicInfo>,
}

/// A handle for GATT client operations on one remote peripheral.
///
/// Handles are cheap to clone and compare equal when they refer to the same
/// peripheral.
#[derive(Clone)]
pub struct PeripheralAsync {
    id: PeripheralId,
    radio: Arc<dyn CentralRadio>,
    delegate: Arc<CentralAsyncDelegate>,
}

impl fmt::Debug for PeripheralAsync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeripheralAsync")
            .field("id", &self.id)
            .finish()
    }
}

impl PartialEq for PeripheralAsync {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PeripheralAsync {}

impl Hash for PeripheralAsync {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PeripheralAsync {
    pub(crate) fn new(
        id: PeripheralId,
        radio: Arc<dyn CentralRadio>,
        delegate: Arc<CentralAsyncDelegate>,
    ) -> Self {
        Self {
            id,
            radio,
            delegate,
        }
    }

    pub fn id(&self) -> PeripheralId {
        self.id
    }

    /// The peripheral's advertised name, if a scan has reported one.
    pub fn name(&self) -> Option<String> {
        self.delegate.name(self.id)
    }

    pub fn is_connected(&self) -> bool {
        self.delegate.is_connected(self.id)
    }

    /// The discovered attribute tree.
    ///
    /// Empty until [`discover_services`][Self::discover_services] has run; a
    /// new discovery pass replaces the tree.
    pub fn services(&self) -> Vec<RemoteService> {
        self.delegate.services(self.id)
    }

    /// Discovers services and, for each discovered service, its
    /// characteristics.
    ///
    /// If `services` is provided, only services with those UUIDs will be
    /// discovered. The resulting tree is available from
    /// [`services()`][Self::services].
    ///
    /// Only one command is outstanding on the radio at a time; services are
    /// worked through in discovery order. If a step fails, services whose
    /// characteristics were already discovered keep them, and the whole call
    /// fails with the step's error.
    ///
    /// At most one discovery pass may run per peripheral. A second call while
    /// one is in flight fails with `DiscoveryInProgress`.
    pub async fn discover_services(&self, services: Option<&[BluetoothUuid]>) -> Result<()> {
        let receiver = self.delegate.begin_service_discovery(self.id)?;
        let _guard = defer(|| self.delegate.end_discovery(self.id));

        self.radio.discover_services(self.id, services);
        let infos = receiver.await??;
        self.delegate.record_services(self.id, &infos);

        for info in infos {
            let receiver = self
                .delegate
                .begin_characteristic_discovery(self.id, info.uuid)?;
            self.radio.discover_characteristics(self.id, info.uuid);
            match receiver.await? {
                Ok(characteristics) => {
                    self.delegate
                        .record_characteristics(self.id, info.uuid, characteristics)
                }
                Err(error) => {
                    self.delegate.mark_characteristics_failed(self.id, info.uuid);
                    return Err(error);
                }
            }
        }

        Ok(())
    }

    /// Reads the value of a characteristic.
    pub async fn read_characteristic_value(
        &self,
        characteristic: BluetoothUuid,
    ) -> Result<Vec<u8>> {
        let mut receiver = self.delegate.value_updates(self.id, characteristic)?;
        self.radio.read_characteristic(self.id, characteristic);
        receiver.recv().await?
    }

    /// Writes the value of a characteristic.
    ///
    /// A write without response completes as soon as the command is issued.
    pub async fn write_characteristic_value(
        &self,
        characteristic: BluetoothUuid,
        data: Vec<u8>,
        write_type: CharacteristicWriteType,
    ) -> Result<()> {
        match write_type {
            CharacteristicWriteType::WithResponse => {
                let receiver = self.delegate.register_write(self.id, characteristic)?;
                self.radio
                    .write_characteristic(self.id, characteristic, &data, write_type);
                receiver.await?
            }
            CharacteristicWriteType::WithoutResponse => {
                self.radio
                    .write_characteristic(self.id, characteristic, &data, write_type);
                Ok(())
            }
        }
    }

    /// Enables or disables notifications for a characteristic.
    pub async fn set_notify(&self, characteristic: BluetoothUuid, notify: bool) -> Result<bool> {
        let receiver = self
            .delegate
            .register_notification_update(self.id, characteristic)?;
        self.radio.set_notify(self.id, characteristic, notify);
        receiver.await?
    }

    /// Returns a stream of value updates for a characteristic.
    ///
    /// The characteristic value may be updated either as the result of a call
    /// to [`read_characteristic_value()`][Self::read_characteristic_value] or
    /// a notification from the peripheral if notifications have been enabled
    /// by a call to [`set_notify()`][Self::set_notify].
    pub fn characteristic_value_updates(
        &self,
        characteristic: BluetoothUuid,
    ) -> Result<BroadcastReceiver<Result<Vec<u8>>>> {
        self.delegate.value_updates(self.id, characteristic)
    }
}
