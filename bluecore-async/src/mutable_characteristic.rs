use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use bluecore::{
    AttError, AttributePermissions, Central, CharacteristicDefinition, CharacteristicProfile,
    CharacteristicProperties, PeripheralRadio, ReadRequest, WriteRequest,
};
use btuuid::BluetoothUuid;
use futures_channel::mpsc;
use tracing::warn;

use crate::util::lock;

/// A characteristic published by the local peripheral.
///
/// Handles are cheap to clone and all refer to the same underlying state.
///
/// Notifications sent with [`update_value`][Self::update_value] are subject to
/// radio backpressure: when the radio's transmit buffer is full, values queue
/// up and are flushed in order once the radio reports it is ready again.
#[derive(Clone)]
pub struct MutableCharacteristic {
    inner: Arc<Inner>,
}

struct Inner {
    uuid: BluetoothUuid,
    name: String,
    properties: CharacteristicProperties,
    permissions: AttributePermissions,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    value: Option<Vec<u8>>,
    service: Option<BluetoothUuid>,
    radio: Option<Arc<dyn PeripheralRadio>>,
    subscribers: Vec<Central>,
    pending_updates: VecDeque<Vec<u8>>,
    is_updating: bool,
    write_requests: Option<mpsc::UnboundedSender<WriteRequest>>,
}

impl fmt::Debug for MutableCharacteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableCharacteristic")
            .field("uuid", &self.inner.uuid)
            .field("name", &self.inner.name)
            .finish()
    }
}

impl PartialEq for MutableCharacteristic {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for MutableCharacteristic {}

impl MutableCharacteristic {
    pub fn new(profile: &CharacteristicProfile) -> Self {
        Self {
            inner: Arc::new(Inner {
                uuid: profile.uuid,
                name: profile.name.clone(),
                properties: profile.properties,
                permissions: profile.permissions,
                state: Mutex::new(State {
                    value: profile.initial_value.clone(),
                    ..Default::default()
                }),
            }),
        }
    }

    pub fn uuid(&self) -> BluetoothUuid {
        self.inner.uuid
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn properties(&self) -> CharacteristicProperties {
        self.inner.properties
    }

    pub fn permissions(&self) -> AttributePermissions {
        self.inner.permissions
    }

    /// The UUID of the service this characteristic belongs to.
    pub fn service(&self) -> Option<BluetoothUuid> {
        lock(&self.inner.state).service
    }

    /// The last value written locally or by a remote central.
    pub fn value(&self) -> Option<Vec<u8>> {
        lock(&self.inner.state).value.clone()
    }

    pub fn subscribers(&self) -> Vec<Central> {
        lock(&self.inner.state).subscribers.clone()
    }

    pub fn has_subscriber(&self) -> bool {
        !lock(&self.inner.state).subscribers.is_empty()
    }

    /// Whether notifications are currently flowing, i.e. at least one central
    /// is subscribed and the radio has not pushed back.
    pub fn is_updating(&self) -> bool {
        lock(&self.inner.state).is_updating
    }

    pub fn pending_update_count(&self) -> usize {
        lock(&self.inner.state).pending_updates.len()
    }

    /// Sets the characteristic value and notifies subscribed centrals.
    ///
    /// Returns `true` if the value was handed to the radio. Returns `false`
    /// if there are no subscribers (the value is stored but nothing is
    /// queued), or if the radio pushed back (the value is queued and will be
    /// flushed when the radio signals readiness).
    pub fn update_value(&self, value: impl Into<Vec<u8>>) -> bool {
        let value = value.into();
        let radio = {
            let mut state = lock(&self.inner.state);
            state.value = Some(value.clone());

            if state.subscribers.is_empty() {
                return false;
            }
            if !state.is_updating {
                state.pending_updates.push_back(value);
                return false;
            }
            match state.radio.clone() {
                Some(radio) => radio,
                None => {
                    state.is_updating = false;
                    state.pending_updates.push_back(value);
                    return false;
                }
            }
        };
        // The radio may call back into the delegate; the state lock is
        // released before the command goes out.
        if radio.update_value(self.inner.uuid, &value, None) {
            true
        } else {
            let mut state = lock(&self.inner.state);
            state.is_updating = false;
            state.pending_updates.push_back(value);
            false
        }
    }

    /// Returns the stream of write requests from remote centrals.
    ///
    /// Each request must be answered with
    /// [`respond_to_request`][Self::respond_to_request]. While no stream is
    /// taken (or after the receiver is dropped), write requests are rejected
    /// with [`AttError::RequestNotSupported`].
    pub fn start_responding_to_write_requests(&self) -> mpsc::UnboundedReceiver<WriteRequest> {
        let (sender, receiver) = mpsc::unbounded();
        lock(&self.inner.state).write_requests = Some(sender);
        receiver
    }

    pub fn stop_responding_to_write_requests(&self) {
        lock(&self.inner.state).write_requests = None;
    }

    /// Answers a write request received from
    /// [`start_responding_to_write_requests`][Self::start_responding_to_write_requests].
    pub fn respond_to_request(&self, request: &WriteRequest, result: AttError) {
        let radio = lock(&self.inner.state).radio.clone();
        match radio {
            Some(radio) => {
                if result.is_success() {
                    lock(&self.inner.state).value = Some(request.value.clone());
                }
                radio.respond_to_write_request(request, result);
            }
            None => warn!(
                characteristic = ?self.inner.uuid,
                "response for a characteristic that is not published"
            ),
        }
    }

    pub(crate) fn definition(&self) -> CharacteristicDefinition {
        CharacteristicDefinition {
            uuid: self.inner.uuid,
            properties: self.inner.properties,
            permissions: self.inner.permissions,
            value: self.value(),
        }
    }

    pub(crate) fn set_service(&self, service: BluetoothUuid) {
        lock(&self.inner.state).service = Some(service);
    }

    pub(crate) fn attach(&self, radio: Arc<dyn PeripheralRadio>) {
        lock(&self.inner.state).radio = Some(radio);
    }

    pub(crate) fn did_subscribe(&self, central: Central) {
        let first = {
            let mut state = lock(&self.inner.state);
            if state
                .subscribers
                .iter()
                .any(|c| c.identifier() == central.identifier())
            {
                return;
            }
            state.subscribers.push(central);
            if state.subscribers.len() == 1 {
                state.is_updating = true;
                true
            } else {
                false
            }
        };
        if first {
            self.flush_pending();
        }
    }

    pub(crate) fn did_unsubscribe(&self, central: Central) {
        let mut state = lock(&self.inner.state);
        state
            .subscribers
            .retain(|c| c.identifier() != central.identifier());
        // Queued updates are kept for the next subscriber.
        if state.subscribers.is_empty() {
            state.is_updating = false;
        }
    }

    /// Flushes queued updates after the radio reported its transmit buffer
    /// drained.
    pub(crate) fn resume_updates(&self) {
        if lock(&self.inner.state).subscribers.is_empty() {
            return;
        }
        self.flush_pending();
    }

    /// Sends queued updates oldest first until the queue is empty or the
    /// radio pushes back again. The state lock is released around each send
    /// so the radio can call back into the delegate.
    fn flush_pending(&self) {
        loop {
            let (radio, value) = {
                let mut state = lock(&self.inner.state);
                let Some(radio) = state.radio.clone() else {
                    return;
                };
                match state.pending_updates.pop_front() {
                    Some(value) => (radio, value),
                    None => {
                        state.is_updating = true;
                        return;
                    }
                }
            };
            if !radio.update_value(self.inner.uuid, &value, None) {
                let mut state = lock(&self.inner.state);
                state.pending_updates.push_front(value);
                state.is_updating = false;
                return;
            }
        }
    }

    pub(crate) fn did_receive_read_request(&self, request: &ReadRequest) {
        let (radio, result, value) = {
            let state = lock(&self.inner.state);
            let Some(radio) = state.radio.clone() else {
                return;
            };
            if !self
                .inner
                .properties
                .contains(CharacteristicProperties::READ)
                || !self
                    .inner
                    .permissions
                    .contains(AttributePermissions::READABLE)
            {
                (radio, AttError::RequestNotSupported, None)
            } else {
                let value = state.value.clone().unwrap_or_default();
                if request.offset > value.len() {
                    (radio, AttError::InvalidOffset, None)
                } else {
                    let value = value[request.offset..].to_vec();
                    (radio, AttError::Success, Some(value))
                }
            }
        };
        radio.respond_to_read_request(request, result, value.as_deref());
    }

    pub(crate) fn did_receive_write_request(&self, request: WriteRequest) {
        let radio = {
            let mut state = lock(&self.inner.state);
            if let Some(sender) = &state.write_requests {
                if sender.unbounded_send(request.clone()).is_ok() {
                    return;
                }
                state.write_requests = None;
            }
            state.radio.clone()
        };
        if let Some(radio) = radio {
            radio.respond_to_write_request(&request, AttError::RequestNotSupported);
        }
    }

    /// Clears subscription and backpressure state when the characteristic is
    /// unpublished.
    pub(crate) fn reset(&self) {
        let mut state = lock(&self.inner.state);
        state.subscribers.clear();
        state.pending_updates.clear();
        state.is_updating = false;
    }
}
