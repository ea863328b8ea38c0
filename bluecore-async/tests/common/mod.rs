//! Call-recording radio doubles for driving the adapters without hardware.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bluecore::advertisement_data::AdvertisementData;
use bluecore::{
    AttError, CentralRadio, CentralRadioDelegate, CharacteristicWriteType, ManagerState,
    PeripheralId, PeripheralRadio, PeripheralRadioDelegate, PeripheralState, ReadRequest,
    ServiceDefinition, WriteRequest,
};
use btuuid::BluetoothUuid;
use uuid::Uuid;

#[derive(Default)]
pub struct CentralCalls {
    pub scans: Vec<(Option<Vec<BluetoothUuid>>, bool)>,
    pub connects: Vec<PeripheralId>,
    pub cancels: Vec<PeripheralId>,
    pub service_discoveries: Vec<(PeripheralId, Option<Vec<BluetoothUuid>>)>,
    pub characteristic_discoveries: Vec<(PeripheralId, BluetoothUuid)>,
    pub reads: Vec<(PeripheralId, BluetoothUuid)>,
    pub writes: Vec<(PeripheralId, BluetoothUuid, Vec<u8>, CharacteristicWriteType)>,
    pub notifies: Vec<(PeripheralId, BluetoothUuid, bool)>,
}

pub struct MockCentralRadio {
    state: Mutex<ManagerState>,
    scanning: AtomicBool,
    peripheral_states: Mutex<HashMap<PeripheralId, PeripheralState>>,
    delegate: Mutex<Option<Arc<dyn CentralRadioDelegate>>>,
    /// Deliver `did_disconnect` from within `cancel_connection`, like a
    /// backend whose event loop runs on the calling thread.
    pub disconnect_on_cancel: AtomicBool,
    calls: Mutex<CentralCalls>,
}

impl MockCentralRadio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ManagerState::PoweredOn),
            scanning: AtomicBool::new(false),
            peripheral_states: Mutex::new(HashMap::new()),
            delegate: Mutex::new(None),
            disconnect_on_cancel: AtomicBool::new(false),
            calls: Mutex::new(CentralCalls::default()),
        })
    }

    pub fn set_delegate(&self, delegate: Arc<dyn CentralRadioDelegate>) {
        *self.delegate.lock().unwrap() = Some(delegate);
    }

    pub fn calls(&self) -> MutexGuard<'_, CentralCalls> {
        self.calls.lock().unwrap()
    }

    pub fn set_state(&self, state: ManagerState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn set_peripheral_state(&self, id: PeripheralId, state: PeripheralState) {
        self.peripheral_states.lock().unwrap().insert(id, state);
    }
}

impl CentralRadio for MockCentralRadio {
    fn state(&self) -> ManagerState {
        *self.state.lock().unwrap()
    }

    fn scan(&self, services: Option<&[BluetoothUuid]>, allow_duplicates: bool) {
        self.scanning.store(true, Ordering::SeqCst);
        self.calls()
            .scans
            .push((services.map(<[_]>::to_vec), allow_duplicates));
    }

    fn stop_scan(&self) {
        self.scanning.store(false, Ordering::SeqCst);
    }

    fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    fn connect(&self, id: PeripheralId) {
        self.set_peripheral_state(id, PeripheralState::Connecting);
        self.calls().connects.push(id);
    }

    fn cancel_connection(&self, id: PeripheralId) {
        self.set_peripheral_state(id, PeripheralState::Disconnected);
        self.calls().cancels.push(id);
        if self.disconnect_on_cancel.load(Ordering::SeqCst) {
            if let Some(delegate) = self.delegate.lock().unwrap().clone() {
                delegate.did_disconnect(id, None);
            }
        }
    }

    fn peripheral_state(&self, id: PeripheralId) -> PeripheralState {
        self.peripheral_states
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or(PeripheralState::Disconnected)
    }

    fn discover_services(&self, id: PeripheralId, filter: Option<&[BluetoothUuid]>) {
        self.calls()
            .service_discoveries
            .push((id, filter.map(<[_]>::to_vec)));
    }

    fn discover_characteristics(&self, id: PeripheralId, service: BluetoothUuid) {
        self.calls().characteristic_discoveries.push((id, service));
    }

    fn read_characteristic(&self, id: PeripheralId, characteristic: BluetoothUuid) {
        self.calls().reads.push((id, characteristic));
    }

    fn write_characteristic(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
        value: &[u8],
        write_type: CharacteristicWriteType,
    ) {
        self.calls()
            .writes
            .push((id, characteristic, value.to_vec(), write_type));
    }

    fn set_notify(&self, id: PeripheralId, characteristic: BluetoothUuid, enabled: bool) {
        self.calls().notifies.push((id, characteristic, enabled));
    }
}

#[derive(Default)]
pub struct PeripheralCalls {
    pub advertisements: Vec<AdvertisementData>,
    pub stopped_advertising: bool,
    pub added_services: Vec<ServiceDefinition>,
    pub removed_services: Vec<BluetoothUuid>,
    pub removed_all: bool,
    pub read_responses: Vec<(ReadRequest, AttError, Option<Vec<u8>>)>,
    pub write_responses: Vec<(WriteRequest, AttError)>,
    pub updates: Vec<(BluetoothUuid, Vec<u8>)>,
}

pub struct MockPeripheralRadio {
    state: Mutex<ManagerState>,
    advertising: AtomicBool,
    delegate: Mutex<Option<Arc<dyn PeripheralRadioDelegate>>>,
    /// Confirm `start_advertising` from within the command, like a backend
    /// whose event loop runs on the calling thread.
    pub confirm_advertising: AtomicBool,
    /// Confirm `add_service` from within the command.
    pub confirm_adds: AtomicBool,
    /// The value `update_value` returns; `false` simulates a full transmit
    /// buffer.
    pub update_value_return: AtomicBool,
    /// Signal `is_ready_to_update_subscribers` from within each accepted
    /// `update_value`.
    pub readiness_on_update: AtomicBool,
    calls: Mutex<PeripheralCalls>,
}

impl MockPeripheralRadio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ManagerState::PoweredOn),
            advertising: AtomicBool::new(false),
            delegate: Mutex::new(None),
            confirm_advertising: AtomicBool::new(false),
            confirm_adds: AtomicBool::new(false),
            update_value_return: AtomicBool::new(true),
            readiness_on_update: AtomicBool::new(false),
            calls: Mutex::new(PeripheralCalls::default()),
        })
    }

    pub fn set_delegate(&self, delegate: Arc<dyn PeripheralRadioDelegate>) {
        *self.delegate.lock().unwrap() = Some(delegate);
    }

    pub fn delegate(&self) -> Arc<dyn PeripheralRadioDelegate> {
        self.delegate.lock().unwrap().clone().unwrap()
    }

    pub fn calls(&self) -> MutexGuard<'_, PeripheralCalls> {
        self.calls.lock().unwrap()
    }
}

impl PeripheralRadio for MockPeripheralRadio {
    fn state(&self) -> ManagerState {
        *self.state.lock().unwrap()
    }

    fn start_advertising(&self, data: &AdvertisementData) {
        self.advertising.store(true, Ordering::SeqCst);
        self.calls().advertisements.push(data.clone());
        if self.confirm_advertising.load(Ordering::SeqCst) {
            self.delegate().did_start_advertising(Ok(()));
        }
    }

    fn stop_advertising(&self) {
        self.advertising.store(false, Ordering::SeqCst);
        self.calls().stopped_advertising = true;
    }

    fn is_advertising(&self) -> bool {
        self.advertising.load(Ordering::SeqCst)
    }

    fn add_service(&self, service: &ServiceDefinition) {
        self.calls().added_services.push(service.clone());
        if self.confirm_adds.load(Ordering::SeqCst) {
            self.delegate().did_add_service(service.uuid, Ok(()));
        }
    }

    fn remove_service(&self, uuid: BluetoothUuid) {
        self.calls().removed_services.push(uuid);
    }

    fn remove_all_services(&self) {
        self.calls().removed_all = true;
    }

    fn respond_to_read_request(
        &self,
        request: &ReadRequest,
        result: AttError,
        value: Option<&[u8]>,
    ) {
        self.calls()
            .read_responses
            .push((request.clone(), result, value.map(<[_]>::to_vec)));
    }

    fn respond_to_write_request(&self, request: &WriteRequest, result: AttError) {
        self.calls().write_responses.push((request.clone(), result));
    }

    fn update_value(
        &self,
        characteristic: BluetoothUuid,
        value: &[u8],
        _centrals: Option<&[Uuid]>,
    ) -> bool {
        if self.update_value_return.load(Ordering::SeqCst) {
            self.calls().updates.push((characteristic, value.to_vec()));
            if self.readiness_on_update.load(Ordering::SeqCst) {
                self.delegate().is_ready_to_update_subscribers();
            }
            true
        } else {
            false
        }
    }
}
