use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use bluecore::advertisement_data::AdvertisementData;
use bluecore::{
    AttError, Central, ManagerState, PeripheralRadio, PeripheralRadioDelegate, ReadRequest,
    WriteRequest,
};
use btuuid::BluetoothUuid;
use futures_channel::oneshot;
use tracing::warn;

use crate::error::{ErrorKind, Result};
use crate::mutable_characteristic::MutableCharacteristic;
use crate::mutable_service::MutableService;
use crate::util::{BroadcastReceiver, BroadcastSender, lock, watch};

/// The peripheral role: publishes GATT services, advertises them, and routes
/// request and subscription traffic to the published characteristics.
///
/// Radio commands go out through the injected [`PeripheralRadio`]; the
/// backend's events must be fed to the delegate returned by
/// [`delegate()`][Self::delegate].
///
/// The service registry may only be changed while not advertising.
#[derive(Clone)]
pub struct PeripheralManagerAsync {
    radio: Arc<dyn PeripheralRadio>,
    delegate: Arc<PeripheralManagerAsyncDelegate>,
}

impl PeripheralManagerAsync {
    pub fn new(radio: Arc<dyn PeripheralRadio>) -> Self {
        let delegate = Arc::new(PeripheralManagerAsyncDelegate::new(radio.clone()));
        Self { radio, delegate }
    }

    /// The delegate to wire into the radio backend's event source.
    pub fn delegate(&self) -> Arc<dyn PeripheralRadioDelegate> {
        self.delegate.clone()
    }

    pub fn state(&self) -> ManagerState {
        self.radio.state()
    }

    pub fn state_updates(&self) -> BroadcastReceiver<ManagerState> {
        self.delegate.state_updated.new_receiver()
    }

    pub fn is_advertising(&self) -> bool {
        lock(&self.delegate.advertising).phase == AdvertisingPhase::Advertising
    }

    /// The currently published services, in the order they were added.
    pub fn services(&self) -> Vec<MutableService> {
        lock(&self.delegate.registry).clone()
    }

    pub fn service(&self, uuid: BluetoothUuid) -> Option<MutableService> {
        lock(&self.delegate.registry)
            .iter()
            .find(|s| s.uuid() == uuid)
            .cloned()
    }

    pub fn characteristics(&self) -> Vec<MutableCharacteristic> {
        lock(&self.delegate.registry)
            .iter()
            .flat_map(|s| s.characteristics())
            .collect()
    }

    /// Publishes a service.
    ///
    /// The radio command is issued immediately; the returned future resolves
    /// when the radio confirms the add. Only one add is in flight at a time,
    /// further adds queue in submission order. Fails with `IsAdvertising` if
    /// advertising is active.
    pub fn add_service(
        &self,
        service: &MutableService,
    ) -> impl Future<Output = Result<()>> + Send + use<> {
        let pending = self.delegate.enqueue_add(service);
        async move { pending?.await? }
    }

    /// Publishes services one at a time, stopping at the first failure.
    pub async fn add_services(&self, services: &[MutableService]) -> Result<()> {
        for service in services {
            self.add_service(service).await?;
        }
        Ok(())
    }

    /// Unpublishes a service. Fails with `IsAdvertising` if advertising is
    /// active.
    pub fn remove_service(&self, service: &MutableService) -> Result<()> {
        if lock(&self.delegate.advertising).phase != AdvertisingPhase::Idle {
            return Err(ErrorKind::IsAdvertising.into());
        }
        lock(&self.delegate.registry).retain(|s| s != service);
        self.radio.remove_service(service.uuid());
        Ok(())
    }

    /// Unpublishes every service and clears their subscription state. Fails
    /// with `IsAdvertising` if advertising is active.
    pub fn remove_all_services(&self) -> Result<()> {
        if lock(&self.delegate.advertising).phase != AdvertisingPhase::Idle {
            return Err(ErrorKind::IsAdvertising.into());
        }
        let services = std::mem::take(&mut *lock(&self.delegate.registry));
        self.radio.remove_all_services();
        for service in services {
            for characteristic in service.characteristics() {
                characteristic.reset();
            }
        }
        Ok(())
    }

    /// Starts advertising the given name and service UUIDs.
    ///
    /// The radio command is issued immediately; the returned future resolves
    /// when the radio confirms. Fails with `IsAdvertising` if advertising is
    /// already starting or active.
    pub fn start_advertising(
        &self,
        name: &str,
        services: &[BluetoothUuid],
    ) -> impl Future<Output = Result<()>> + Send + use<> {
        let pending = self.delegate.begin_advertising(name, services);
        async move { pending?.await? }
    }

    /// Stops advertising. Fails with `IsNotAdvertising` if advertising is not
    /// starting or active.
    pub fn stop_advertising(&self) -> Result<()> {
        {
            let mut advertising = lock(&self.delegate.advertising);
            if advertising.phase == AdvertisingPhase::Idle {
                return Err(ErrorKind::IsNotAdvertising.into());
            }
            advertising.phase = AdvertisingPhase::Idle;
            // A still-pending start resolves as canceled.
            advertising.pending = None;
        }
        self.radio.stop_advertising();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdvertisingPhase {
    Idle,
    Starting,
    Advertising,
}

struct Advertising {
    phase: AdvertisingPhase,
    pending: Option<oneshot::Sender<Result<()>>>,
}

struct PendingAdd {
    service: MutableService,
    sender: oneshot::Sender<Result<()>>,
}

#[derive(Default)]
struct AddQueue {
    in_flight: Option<PendingAdd>,
    queued: VecDeque<PendingAdd>,
}

struct PeripheralManagerAsyncDelegate {
    radio: Arc<dyn PeripheralRadio>,
    state_updated: BroadcastSender<ManagerState>,
    registry: Mutex<Vec<MutableService>>,
    advertising: Mutex<Advertising>,
    adds: Mutex<AddQueue>,
}

impl PeripheralManagerAsyncDelegate {
    fn new(radio: Arc<dyn PeripheralRadio>) -> Self {
        Self {
            radio,
            state_updated: watch(),
            registry: Default::default(),
            advertising: Mutex::new(Advertising {
                phase: AdvertisingPhase::Idle,
                pending: None,
            }),
            adds: Default::default(),
        }
    }

    fn enqueue_add(&self, service: &MutableService) -> Result<oneshot::Receiver<Result<()>>> {
        if lock(&self.advertising).phase != AdvertisingPhase::Idle {
            return Err(ErrorKind::IsAdvertising.into());
        }

        let (sender, receiver) = oneshot::channel();
        let pending = PendingAdd {
            service: service.clone(),
            sender,
        };
        let issue = {
            let mut adds = lock(&self.adds);
            if adds.in_flight.is_some() {
                adds.queued.push_back(pending);
                None
            } else {
                let definition = pending.service.definition();
                adds.in_flight = Some(pending);
                Some(definition)
            }
        };
        if let Some(definition) = issue {
            self.radio.add_service(&definition);
        }
        Ok(receiver)
    }

    fn begin_advertising(
        &self,
        name: &str,
        services: &[BluetoothUuid],
    ) -> Result<oneshot::Receiver<Result<()>>> {
        let (sender, receiver) = oneshot::channel();
        {
            let mut advertising = lock(&self.advertising);
            if advertising.phase != AdvertisingPhase::Idle {
                return Err(ErrorKind::IsAdvertising.into());
            }
            advertising.phase = AdvertisingPhase::Starting;
            advertising.pending = Some(sender);
        }
        self.radio
            .start_advertising(&AdvertisementData::with_local_name(name, services));
        Ok(receiver)
    }

    fn find_characteristic(&self, uuid: BluetoothUuid) -> Option<MutableCharacteristic> {
        lock(&self.registry)
            .iter()
            .find_map(|s| s.characteristic(uuid))
    }
}

impl PeripheralRadioDelegate for PeripheralManagerAsyncDelegate {
    fn did_update_state(&self, state: ManagerState) {
        let _ = self.state_updated.try_broadcast(state);
    }

    fn did_start_advertising(&self, result: bluecore::Result<()>) {
        let mut advertising = lock(&self.advertising);
        let Some(sender) = advertising.pending.take() else {
            warn!("unmatched advertising start event");
            return;
        };
        advertising.phase = if result.is_ok() {
            AdvertisingPhase::Advertising
        } else {
            AdvertisingPhase::Idle
        };
        drop(advertising);
        let _ = sender.send(result.map_err(Into::into));
    }

    fn did_add_service(&self, uuid: BluetoothUuid, result: bluecore::Result<()>) {
        let next = {
            let mut adds = lock(&self.adds);
            let Some(pending) = adds.in_flight.take() else {
                warn!(?uuid, "unmatched service add event");
                return;
            };
            if pending.service.uuid() != uuid {
                warn!(?uuid, expected = ?pending.service.uuid(), "service add event out of order");
            }
            match result {
                Ok(()) => {
                    pending.service.attach(&self.radio);
                    lock(&self.registry).push(pending.service.clone());
                    let _ = pending.sender.send(Ok(()));
                }
                Err(error) => {
                    let _ = pending.sender.send(Err(error.into()));
                }
            }
            adds.queued.pop_front().map(|next| {
                let definition = next.service.definition();
                adds.in_flight = Some(next);
                definition
            })
        };
        if let Some(definition) = next {
            self.radio.add_service(&definition);
        }
    }

    fn did_subscribe(&self, central: Central, characteristic: BluetoothUuid) {
        match self.find_characteristic(characteristic) {
            Some(c) => c.did_subscribe(central),
            None => warn!(?characteristic, "subscribe for an unknown characteristic"),
        }
    }

    fn did_unsubscribe(&self, central: Central, characteristic: BluetoothUuid) {
        match self.find_characteristic(characteristic) {
            Some(c) => c.did_unsubscribe(central),
            None => warn!(?characteristic, "unsubscribe for an unknown characteristic"),
        }
    }

    fn did_receive_read_request(&self, request: ReadRequest) {
        match self.find_characteristic(request.characteristic) {
            Some(c) => c.did_receive_read_request(&request),
            None => self
                .radio
                .respond_to_read_request(&request, AttError::UnlikelyError, None),
        }
    }

    fn did_receive_write_request(&self, request: WriteRequest) {
        match self.find_characteristic(request.characteristic) {
            Some(c) => c.did_receive_write_request(request),
            None => self
                .radio
                .respond_to_write_request(&request, AttError::UnlikelyError),
        }
    }

    fn is_ready_to_update_subscribers(&self) {
        let services = lock(&self.registry).clone();
        for service in services {
            for characteristic in service.characteristics() {
                characteristic.resume_updates();
            }
        }
    }
}
