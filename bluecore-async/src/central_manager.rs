use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bluecore::advertisement_data::AdvertisementData;
use bluecore::{
    CentralRadio, CentralRadioDelegate, CharacteristicInfo, ManagerState, PeripheralId,
    PeripheralInfo, PeripheralState, ServiceInfo,
};
use btuuid::BluetoothUuid;
use futures_channel::{mpsc, oneshot};
use tracing::warn;

use crate::error::{Error, ErrorKind, Result};
use crate::peripheral::{DiscoveryState, PeripheralAsync, RemoteService};
use crate::util::{BroadcastReceiver, BroadcastSender, broadcast, defer, lock, watch};

/// The central role: scans for peripherals, connects to them, and hands out
/// [`PeripheralAsync`] handles for GATT client operations.
///
/// Radio commands go out through the injected [`CentralRadio`]; the backend's
/// events must be fed to the delegate returned by [`delegate()`][Self::delegate].
#[derive(Clone)]
pub struct CentralManagerAsync {
    radio: Arc<dyn CentralRadio>,
    delegate: Arc<CentralAsyncDelegate>,
}

impl CentralManagerAsync {
    pub fn new(radio: Arc<dyn CentralRadio>) -> Self {
        let delegate = Arc::new(CentralAsyncDelegate::new(radio.clone()));
        Self { radio, delegate }
    }

    /// The delegate to wire into the radio backend's event source.
    pub fn delegate(&self) -> Arc<dyn CentralRadioDelegate> {
        self.delegate.clone()
    }

    pub fn state(&self) -> ManagerState {
        self.radio.state()
    }

    pub fn state_updates(&self) -> BroadcastReceiver<ManagerState> {
        self.delegate.state_updated()
    }

    pub fn is_scanning(&self) -> bool {
        self.radio.is_scanning()
    }

    /// Returns a handle for a peripheral previously reported by a scan.
    pub fn peripheral(&self, id: PeripheralId) -> PeripheralAsync {
        PeripheralAsync::new(id, self.radio.clone(), self.delegate.clone())
    }

    /// Starts scanning for peripherals and returns the stream of discoveries.
    ///
    /// Dropping the receiver stops the scan on the next discovery.
    ///
    /// # Panics
    ///
    /// Panics if a scan is already in progress (e.g. `is_scanning()` returns true).
    pub fn scan(
        &self,
        services: Option<&[BluetoothUuid]>,
        allow_duplicates: bool,
    ) -> mpsc::UnboundedReceiver<DidDiscover> {
        if self.radio.is_scanning() {
            panic!("CentralManagerAsync::scan called while already scanning")
        }

        self.radio.scan(services, allow_duplicates);

        self.delegate.discoveries()
    }

    pub fn stop_scan(&self) {
        self.radio.stop_scan()
    }

    /// Connects to a peripheral.
    ///
    /// If the returned future is dropped while the connection is still
    /// pending, the connection attempt is canceled.
    pub async fn connect(&self, peripheral: &PeripheralAsync) -> Result<()> {
        let receiver = self.delegate.register_connecting(peripheral.id());
        self.radio.connect(peripheral.id());

        let guard = defer(|| {
            if self.radio.peripheral_state(peripheral.id()) == PeripheralState::Connecting {
                self.radio.cancel_connection(peripheral.id());
            }
        });

        let res = receiver.await?;
        guard.defuse();
        res
    }

    /// Cancels an active or pending connection.
    ///
    /// If the peripheral was connected, waits for and returns the resulting
    /// disconnection event.
    pub async fn cancel_peripheral_connection(
        &self,
        peripheral: &PeripheralAsync,
    ) -> Option<DidDisconnect> {
        let state = self.radio.peripheral_state(peripheral.id());
        // Subscribe before issuing the cancel so a synchronously delivered
        // disconnection is not missed.
        let receiver =
            (state == PeripheralState::Connected).then(|| self.delegate.disconnects());
        if state == PeripheralState::Connecting || state == PeripheralState::Connected {
            self.radio.cancel_connection(peripheral.id());
        }

        let mut disconnects = receiver?;
        while let Ok(disconnect) = disconnects.recv().await {
            if disconnect.id == peripheral.id() {
                return Some(disconnect);
            }
        }

        unreachable!()
    }

    pub fn disconnections(&self) -> BroadcastReceiver<DidDisconnect> {
        self.delegate.disconnects()
    }
}

type OneshotMap<K, V> = HashMap<K, oneshot::Sender<Result<V>>>;

/// Per-connection state: the discovered attribute tree and the pending
/// operations awaiting a delegate event.
///
/// A session exists exactly while the peripheral is connected. Dropping it
/// fails every pending operation with `Disconnected`.
#[derive(Default)]
struct Session {
    services: Vec<RemoteService>,
    discovering: bool,
    service_discovery: Option<oneshot::Sender<Result<Vec<ServiceInfo>>>>,
    characteristic_discovery: OneshotMap<BluetoothUuid, Vec<CharacteristicInfo>>,
    value_updates: HashMap<BluetoothUuid, BroadcastSender<Result<Vec<u8>>>>,
    writes: OneshotMap<BluetoothUuid, ()>,
    notification_updates: OneshotMap<BluetoothUuid, bool>,
}

impl Session {
    fn fail_pending(&mut self) {
        let error = || Error::from(ErrorKind::Disconnected);
        if let Some(sender) = self.service_discovery.take() {
            let _ = sender.send(Err(error()));
        }
        for (_, sender) in self.characteristic_discovery.drain() {
            let _ = sender.send(Err(error()));
        }
        for (_, sender) in self.writes.drain() {
            let _ = sender.send(Err(error()));
        }
        for (_, sender) in self.notification_updates.drain() {
            let _ = sender.send(Err(error()));
        }
        for (_, sender) in self.value_updates.drain() {
            let _ = sender.try_broadcast(Err(error()));
        }
    }
}

pub(crate) struct CentralAsyncDelegate {
    radio: Arc<dyn CentralRadio>,
    state_updated: BroadcastSender<ManagerState>,
    discoveries: Mutex<Option<mpsc::UnboundedSender<DidDiscover>>>,
    disconnects: BroadcastSender<DidDisconnect>,
    connecting: Mutex<HashMap<PeripheralId, oneshot::Sender<Result<()>>>>,
    sessions: Mutex<HashMap<PeripheralId, Session>>,
    names: Mutex<HashMap<PeripheralId, String>>,
}

impl CentralRadioDelegate for CentralAsyncDelegate {
    fn did_update_state(&self, state: ManagerState) {
        let _ = self.state_updated.try_broadcast(state);
    }

    fn did_discover(
        &self,
        peripheral: PeripheralInfo,
        advertisement_data: AdvertisementData,
        rssi: i16,
    ) {
        if let Some(name) = &peripheral.name {
            lock(&self.names).insert(peripheral.id, name.clone());
        }

        let mut discoveries = lock(&self.discoveries);
        if let Some(sender) = discoveries.take() {
            if sender
                .unbounded_send(DidDiscover {
                    peripheral,
                    advertisement_data,
                    rssi,
                })
                .is_ok()
            {
                *discoveries = Some(sender);
            } else {
                self.radio.stop_scan();
            }
        }
    }

    fn did_connect(&self, id: PeripheralId) {
        lock(&self.sessions).insert(id, Session::default());
        if let Some(sender) = lock(&self.connecting).remove(&id) {
            let _ = sender.send(Ok(()));
        }
    }

    fn did_fail_to_connect(&self, id: PeripheralId, error: bluecore::Error) {
        if let Some(sender) = lock(&self.connecting).remove(&id) {
            let _ = sender.send(Err(error.into()));
        }
    }

    fn did_disconnect(&self, id: PeripheralId, error: Option<bluecore::Error>) {
        if let Some(mut session) = lock(&self.sessions).remove(&id) {
            session.fail_pending();
        }

        let _ = self.disconnects.try_broadcast(DidDisconnect {
            id,
            error: error.map(Error::from),
        });
    }

    fn did_discover_services(&self, id: PeripheralId, result: bluecore::Result<Vec<ServiceInfo>>) {
        let mut sessions = lock(&self.sessions);
        let Some(sender) = sessions
            .get_mut(&id)
            .and_then(|session| session.service_discovery.take())
        else {
            warn!(%id, "unmatched service discovery event");
            return;
        };
        let _ = sender.send(result.map_err(Into::into));
    }

    fn did_discover_characteristics(
        &self,
        id: PeripheralId,
        service: BluetoothUuid,
        result: bluecore::Result<Vec<CharacteristicInfo>>,
    ) {
        let mut sessions = lock(&self.sessions);
        let Some(sender) = sessions
            .get_mut(&id)
            .and_then(|session| session.characteristic_discovery.remove(&service))
        else {
            warn!(%id, ?service, "unmatched characteristic discovery event");
            return;
        };
        let _ = sender.send(result.map_err(Into::into));
    }

    fn did_update_value(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
        result: bluecore::Result<Vec<u8>>,
    ) {
        let mut sessions = lock(&self.sessions);
        let Some(session) = sessions.get_mut(&id) else {
            return;
        };
        if let Some(sender) = session.value_updates.get(&characteristic) {
            if sender.receiver_count() == 0 {
                session.value_updates.remove(&characteristic);
            } else {
                let _ = sender.try_broadcast(result.map_err(Into::into));
            }
        }
    }

    fn did_write_value(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
        result: bluecore::Result<()>,
    ) {
        let mut sessions = lock(&self.sessions);
        if let Some(sender) = sessions
            .get_mut(&id)
            .and_then(|session| session.writes.remove(&characteristic))
        {
            let _ = sender.send(result.map_err(Into::into));
        }
    }

    fn did_update_notification_state(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
        result: bluecore::Result<bool>,
    ) {
        let mut sessions = lock(&self.sessions);
        if let Some(sender) = sessions
            .get_mut(&id)
            .and_then(|session| session.notification_updates.remove(&characteristic))
        {
            let _ = sender.send(result.map_err(Into::into));
        }
    }
}

impl CentralAsyncDelegate {
    pub fn new(radio: Arc<dyn CentralRadio>) -> Self {
        Self {
            radio,
            state_updated: watch(),
            discoveries: Mutex::new(None),
            disconnects: broadcast(16),
            connecting: Default::default(),
            sessions: Default::default(),
            names: Default::default(),
        }
    }

    pub fn register_connecting(&self, id: PeripheralId) -> oneshot::Receiver<Result<()>> {
        let (sender, receiver) = oneshot::channel();
        lock(&self.connecting).insert(id, sender);
        receiver
    }

    pub fn state_updated(&self) -> BroadcastReceiver<ManagerState> {
        self.state_updated.new_receiver()
    }

    pub fn disconnects(&self) -> BroadcastReceiver<DidDisconnect> {
        self.disconnects.new_receiver()
    }

    pub fn discoveries(&self) -> mpsc::UnboundedReceiver<DidDiscover> {
        let (sender, receiver) = mpsc::unbounded();
        *lock(&self.discoveries) = Some(sender);
        receiver
    }

    pub fn name(&self, id: PeripheralId) -> Option<String> {
        lock(&self.names).get(&id).cloned()
    }

    pub fn is_connected(&self, id: PeripheralId) -> bool {
        lock(&self.sessions).contains_key(&id)
    }

    pub fn services(&self, id: PeripheralId) -> Vec<RemoteService> {
        lock(&self.sessions)
            .get(&id)
            .map(|session| session.services.clone())
            .unwrap_or_default()
    }

    /// Claims the peripheral's single discovery slot and registers the
    /// receiver for the service discovery result.
    pub fn begin_service_discovery(
        &self,
        id: PeripheralId,
    ) -> Result<oneshot::Receiver<Result<Vec<ServiceInfo>>>> {
        let mut sessions = lock(&self.sessions);
        let session = sessions.get_mut(&id).ok_or(ErrorKind::Disconnected)?;
        if session.discovering {
            return Err(ErrorKind::DiscoveryInProgress.into());
        }
        session.discovering = true;
        let (sender, receiver) = oneshot::channel();
        session.service_discovery = Some(sender);
        Ok(receiver)
    }

    /// Releases the discovery slot and drops any receivers still registered,
    /// so a late event from an abandoned pass is ignored.
    pub fn end_discovery(&self, id: PeripheralId) {
        if let Some(session) = lock(&self.sessions).get_mut(&id) {
            session.discovering = false;
            session.service_discovery = None;
            session.characteristic_discovery.clear();
        }
    }

    /// Replaces the attribute tree with freshly discovered services, none of
    /// which have had their characteristics discovered yet.
    pub fn record_services(&self, id: PeripheralId, services: &[ServiceInfo]) {
        if let Some(session) = lock(&self.sessions).get_mut(&id) {
            session.services = services
                .iter()
                .map(|info| RemoteService {
                    uuid: info.uuid,
                    is_primary: info.is_primary,
                    discovery_state: DiscoveryState::NotDiscovered,
                    characteristics: Vec::new(),
                })
                .collect();
        }
    }

    pub fn begin_characteristic_discovery(
        &self,
        id: PeripheralId,
        service: BluetoothUuid,
    ) -> Result<oneshot::Receiver<Result<Vec<CharacteristicInfo>>>> {
        let mut sessions = lock(&self.sessions);
        let session = sessions.get_mut(&id).ok_or(ErrorKind::Disconnected)?;
        if let Some(entry) = session.services.iter_mut().find(|s| s.uuid == service) {
            entry.discovery_state = DiscoveryState::Discovering;
        }
        let (sender, receiver) = oneshot::channel();
        session.characteristic_discovery.insert(service, sender);
        Ok(receiver)
    }

    pub fn record_characteristics(
        &self,
        id: PeripheralId,
        service: BluetoothUuid,
        characteristics: Vec<CharacteristicInfo>,
    ) {
        let mut sessions = lock(&self.sessions);
        if let Some(entry) = sessions
            .get_mut(&id)
            .and_then(|session| session.services.iter_mut().find(|s| s.uuid == service))
        {
            entry.characteristics = characteristics;
            entry.discovery_state = DiscoveryState::Discovered;
        }
    }

    pub fn mark_characteristics_failed(&self, id: PeripheralId, service: BluetoothUuid) {
        let mut sessions = lock(&self.sessions);
        if let Some(entry) = sessions
            .get_mut(&id)
            .and_then(|session| session.services.iter_mut().find(|s| s.uuid == service))
        {
            entry.discovery_state = DiscoveryState::Failed;
        }
    }

    pub fn value_updates(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
    ) -> Result<BroadcastReceiver<Result<Vec<u8>>>> {
        use std::collections::hash_map::Entry::*;

        let mut sessions = lock(&self.sessions);
        let session = sessions.get_mut(&id).ok_or(ErrorKind::Disconnected)?;
        Ok(match session.value_updates.entry(characteristic) {
            Occupied(entry) => entry.get().new_receiver(),
            Vacant(entry) => entry.insert(broadcast(16)).new_receiver(),
        })
    }

    pub fn register_write(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
    ) -> Result<oneshot::Receiver<Result<()>>> {
        let mut sessions = lock(&self.sessions);
        let session = sessions.get_mut(&id).ok_or(ErrorKind::Disconnected)?;
        let (sender, receiver) = oneshot::channel();
        session.writes.insert(characteristic, sender);
        Ok(receiver)
    }

    pub fn register_notification_update(
        &self,
        id: PeripheralId,
        characteristic: BluetoothUuid,
    ) -> Result<oneshot::Receiver<Result<bool>>> {
        let mut sessions = lock(&self.sessions);
        let session = sessions.get_mut(&id).ok_or(ErrorKind::Disconnected)?;
        let (sender, receiver) = oneshot::channel();
        session.notification_updates.insert(characteristic, sender);
        Ok(receiver)
    }
}

/// An established connection ended.
#[derive(Debug, Clone)]
pub struct DidDisconnect {
    pub id: PeripheralId,
    pub error: Option<Error>,
}

/// A scan reported a peripheral.
#[derive(Debug, Clone)]
pub struct DidDiscover {
    pub peripheral: PeripheralInfo,
    pub advertisement_data: AdvertisementData,
    pub rssi: i16,
}
