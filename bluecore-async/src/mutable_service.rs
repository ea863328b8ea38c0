use std::fmt;
use std::sync::{Arc, Mutex};

use bluecore::{PeripheralRadio, ServiceDefinition, ServiceProfile};
use btuuid::BluetoothUuid;

use crate::mutable_characteristic::MutableCharacteristic;
use crate::util::lock;

/// A service published by the local peripheral.
///
/// Handles are cheap to clone and all refer to the same underlying state.
#[derive(Clone)]
pub struct MutableService {
    inner: Arc<Inner>,
}

struct Inner {
    uuid: BluetoothUuid,
    name: String,
    characteristics: Mutex<Vec<MutableCharacteristic>>,
}

impl fmt::Debug for MutableService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableService")
            .field("uuid", &self.inner.uuid)
            .field("name", &self.inner.name)
            .finish()
    }
}

impl PartialEq for MutableService {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for MutableService {}

impl MutableService {
    /// Builds a service and its characteristics from a profile.
    pub fn new(profile: &ServiceProfile) -> Self {
        let service = Self {
            inner: Arc::new(Inner {
                uuid: profile.uuid,
                name: profile.name.clone(),
                characteristics: Mutex::new(Vec::new()),
            }),
        };
        service.set_characteristics(
            profile
                .characteristics
                .iter()
                .map(MutableCharacteristic::new)
                .collect(),
        );
        service
    }

    pub fn uuid(&self) -> BluetoothUuid {
        self.inner.uuid
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn characteristics(&self) -> Vec<MutableCharacteristic> {
        lock(&self.inner.characteristics).clone()
    }

    pub fn characteristic(&self, uuid: BluetoothUuid) -> Option<MutableCharacteristic> {
        lock(&self.inner.characteristics)
            .iter()
            .find(|c| c.uuid() == uuid)
            .cloned()
    }

    /// Replaces the service's characteristics. Only meaningful before the
    /// service is added to a manager.
    pub fn set_characteristics(&self, characteristics: Vec<MutableCharacteristic>) {
        for characteristic in &characteristics {
            characteristic.set_service(self.inner.uuid);
        }
        *lock(&self.inner.characteristics) = characteristics;
    }

    pub(crate) fn definition(&self) -> ServiceDefinition {
        ServiceDefinition {
            uuid: self.inner.uuid,
            is_primary: true,
            characteristics: lock(&self.inner.characteristics)
                .iter()
                .map(|c| c.definition())
                .collect(),
        }
    }

    pub(crate) fn attach(&self, radio: &Arc<dyn PeripheralRadio>) {
        for characteristic in lock(&self.inner.characteristics).iter() {
            characteristic.attach(radio.clone());
        }
    }
}
