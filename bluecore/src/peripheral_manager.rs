//! The peripheral-role radio contract: advertising, the published GATT
//! database, and request/notification traffic with subscribed centrals.

use std::any::Any;

use btuuid::BluetoothUuid;
use uuid::Uuid;

use crate::advertisement_data::AdvertisementData;
use crate::central::Central;
use crate::central_manager::ManagerState;
use crate::error::{AttError, Result};
use crate::service::ServiceDefinition;

/// A read request received from a remote central.
///
/// Every request must be answered exactly once via
/// [`PeripheralRadio::respond_to_read_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub central: Central,
    pub characteristic: BluetoothUuid,
    pub offset: usize,
}

/// A write request received from a remote central.
///
/// Every request must be answered exactly once via
/// [`PeripheralRadio::respond_to_write_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub central: Central,
    pub characteristic: BluetoothUuid,
    pub offset: usize,
    pub value: Vec<u8>,
}

/// The command surface of a peripheral-role radio backend.
///
/// Commands are fire-and-forget except [`update_value`][Self::update_value],
/// whose boolean return signals transmit-buffer backpressure: `false` means
/// the send was not accepted and the backend will emit
/// [`PeripheralRadioDelegate::is_ready_to_update_subscribers`] once capacity
/// returns.
pub trait PeripheralRadio: Send + Sync {
    /// The current power state of the radio.
    fn state(&self) -> ManagerState;

    /// Starts advertising with the given payload. Completion is reported via
    /// [`PeripheralRadioDelegate::did_start_advertising`].
    fn start_advertising(&self, data: &AdvertisementData);

    /// Stops advertising. Takes effect synchronously.
    fn stop_advertising(&self);

    /// Whether the radio is currently advertising.
    fn is_advertising(&self) -> bool;

    /// Publishes a service. Completion is reported via
    /// [`PeripheralRadioDelegate::did_add_service`].
    fn add_service(&self, service: &ServiceDefinition);

    /// Unpublishes a single service.
    fn remove_service(&self, uuid: BluetoothUuid);

    /// Unpublishes every service.
    fn remove_all_services(&self);

    /// Answers a read request, supplying the value bytes on success.
    fn respond_to_read_request(
        &self,
        request: &ReadRequest,
        result: AttError,
        value: Option<&[u8]>,
    );

    /// Answers a write request.
    fn respond_to_write_request(&self, request: &WriteRequest, result: AttError);

    /// Sends a notification value to subscribed centrals, or to the subset in
    /// `centrals` when given.
    ///
    /// Returns `false` when the transmit buffer is full and the value was not
    /// sent.
    fn update_value(
        &self,
        characteristic: BluetoothUuid,
        value: &[u8],
        centrals: Option<&[Uuid]>,
    ) -> bool;
}

/// Events emitted by a peripheral-role radio backend.
#[allow(unused_variables)]
pub trait PeripheralRadioDelegate: Any + Send + Sync {
    /// The radio's power state changed.
    fn did_update_state(&self, state: ManagerState);

    /// A `start_advertising` command finished.
    fn did_start_advertising(&self, result: Result<()>) {}

    /// An `add_service` command finished.
    fn did_add_service(&self, uuid: BluetoothUuid, result: Result<()>) {}

    /// A central subscribed to a characteristic's notifications.
    fn did_subscribe(&self, central: Central, characteristic: BluetoothUuid) {}

    /// A central unsubscribed from a characteristic's notifications.
    fn did_unsubscribe(&self, central: Central, characteristic: BluetoothUuid) {}

    /// A central asked to read a characteristic value.
    fn did_receive_read_request(&self, request: ReadRequest) {}

    /// A central asked to write a characteristic value.
    fn did_receive_write_request(&self, request: WriteRequest) {}

    /// The transmit buffer drained after a rejected
    /// [`PeripheralRadio::update_value`]; queued notifications may be retried.
    fn is_ready_to_update_subscribers(&self) {}
}
