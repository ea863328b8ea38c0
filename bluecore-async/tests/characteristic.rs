//! Notification backpressure behavior of published characteristics.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use bluecore_async::{
    Central, CharacteristicProfile, MutableCharacteristic, MutableService,
    PeripheralManagerAsync, ServiceProfile,
};
use btuuid::{BluetoothUuid, BluetoothUuid16};
use common::MockPeripheralRadio;
use uuid::Uuid;

const SERVICE_UUID: BluetoothUuid = BluetoothUuid::Uuid16(BluetoothUuid16::new(0x180d));
const CHARACTERISTIC_UUID: BluetoothUuid = BluetoothUuid::Uuid16(BluetoothUuid16::new(0x2a37));

async fn make_characteristic() -> (
    Arc<MockPeripheralRadio>,
    PeripheralManagerAsync,
    MutableCharacteristic,
) {
    let radio = MockPeripheralRadio::new();
    let manager = PeripheralManagerAsync::new(radio.clone());
    radio.set_delegate(manager.delegate());
    radio.confirm_adds.store(true, Ordering::SeqCst);

    let profile = ServiceProfile::new(SERVICE_UUID, "Heart Rate").with_characteristics(vec![
        CharacteristicProfile::new(CHARACTERISTIC_UUID, "Heart Rate Measurement"),
    ]);
    let service = MutableService::new(&profile);
    manager.add_service(&service).await.unwrap();
    let characteristic = service.characteristic(CHARACTERISTIC_UUID).unwrap();
    (radio, manager, characteristic)
}

fn central() -> Central {
    Central::new(Uuid::new_v4(), 20)
}

#[tokio::test]
async fn update_without_subscribers_stores_but_does_not_queue() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    assert!(!characteristic.update_value([1u8]));
    assert_eq!(characteristic.value(), Some(vec![1]));
    assert_eq!(characteristic.pending_update_count(), 0);
    assert!(radio.calls().updates.is_empty());
}

#[tokio::test]
async fn update_with_subscriber_notifies_the_radio() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    radio.delegate().did_subscribe(central(), CHARACTERISTIC_UUID);
    assert!(characteristic.has_subscriber());
    assert!(characteristic.is_updating());

    assert!(characteristic.update_value([1u8]));
    assert_eq!(
        radio.calls().updates,
        vec![(CHARACTERISTIC_UUID, vec![1u8])]
    );
}

#[tokio::test]
async fn subscribing_twice_adds_one_subscriber() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    let central = central();
    radio
        .delegate()
        .did_subscribe(central.clone(), CHARACTERISTIC_UUID);
    radio.delegate().did_subscribe(central, CHARACTERISTIC_UUID);
    assert_eq!(characteristic.subscribers().len(), 1);
}

#[tokio::test]
async fn radio_pushback_queues_updates() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    radio.delegate().did_subscribe(central(), CHARACTERISTIC_UUID);
    radio.update_value_return.store(false, Ordering::SeqCst);

    assert!(!characteristic.update_value([1u8]));
    assert!(!characteristic.is_updating());
    assert_eq!(characteristic.pending_update_count(), 1);

    // Further updates queue without touching the radio.
    assert!(!characteristic.update_value([2u8]));
    assert_eq!(characteristic.pending_update_count(), 2);
    assert!(radio.calls().updates.is_empty());
}

#[tokio::test]
async fn radio_readiness_flushes_the_queue_in_order() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    radio.delegate().did_subscribe(central(), CHARACTERISTIC_UUID);
    radio.update_value_return.store(false, Ordering::SeqCst);
    characteristic.update_value([1u8]);
    characteristic.update_value([2u8]);

    radio.update_value_return.store(true, Ordering::SeqCst);
    radio.delegate().is_ready_to_update_subscribers();

    assert_eq!(
        radio.calls().updates,
        vec![
            (CHARACTERISTIC_UUID, vec![1u8]),
            (CHARACTERISTIC_UUID, vec![2u8]),
        ]
    );
    assert_eq!(characteristic.pending_update_count(), 0);
    assert!(characteristic.is_updating());
}

#[tokio::test]
async fn partial_flush_stops_at_the_first_rejection() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    radio.delegate().did_subscribe(central(), CHARACTERISTIC_UUID);
    radio.update_value_return.store(false, Ordering::SeqCst);
    characteristic.update_value([1u8]);
    characteristic.update_value([2u8]);

    // Still rejecting; the flush attempt leaves the queue intact.
    radio.delegate().is_ready_to_update_subscribers();
    assert_eq!(characteristic.pending_update_count(), 2);
    assert!(!characteristic.is_updating());
}

#[tokio::test]
async fn handles_readiness_signaled_from_within_an_update() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    radio.delegate().did_subscribe(central(), CHARACTERISTIC_UUID);
    radio.update_value_return.store(false, Ordering::SeqCst);
    characteristic.update_value([1u8]);
    characteristic.update_value([2u8]);

    // The radio reports readiness from inside each accepted send.
    radio.update_value_return.store(true, Ordering::SeqCst);
    radio.readiness_on_update.store(true, Ordering::SeqCst);
    radio.delegate().is_ready_to_update_subscribers();

    assert_eq!(
        radio.calls().updates,
        vec![
            (CHARACTERISTIC_UUID, vec![1u8]),
            (CHARACTERISTIC_UUID, vec![2u8]),
        ]
    );
    assert_eq!(characteristic.pending_update_count(), 0);
    assert!(characteristic.is_updating());
}

#[tokio::test]
async fn unsubscribing_keeps_the_queue_for_the_next_subscriber() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    let first = central();
    radio
        .delegate()
        .did_subscribe(first.clone(), CHARACTERISTIC_UUID);
    radio.update_value_return.store(false, Ordering::SeqCst);
    characteristic.update_value([1u8]);

    radio.delegate().did_unsubscribe(first, CHARACTERISTIC_UUID);
    assert!(!characteristic.has_subscriber());
    assert!(!characteristic.is_updating());
    assert_eq!(characteristic.pending_update_count(), 1);

    // A new subscriber receives the queued value.
    radio.update_value_return.store(true, Ordering::SeqCst);
    radio.delegate().did_subscribe(central(), CHARACTERISTIC_UUID);
    assert_eq!(
        radio.calls().updates,
        vec![(CHARACTERISTIC_UUID, vec![1u8])]
    );
    assert!(characteristic.is_updating());
    assert_eq!(characteristic.pending_update_count(), 0);
}

#[tokio::test]
async fn unsubscribing_one_of_two_centrals_keeps_updating() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    let first = central();
    let second = central();
    radio
        .delegate()
        .did_subscribe(first.clone(), CHARACTERISTIC_UUID);
    radio.delegate().did_subscribe(second, CHARACTERISTIC_UUID);
    assert_eq!(characteristic.subscribers().len(), 2);

    radio.delegate().did_unsubscribe(first, CHARACTERISTIC_UUID);
    assert_eq!(characteristic.subscribers().len(), 1);
    assert!(characteristic.is_updating());
}

#[tokio::test]
async fn readiness_without_subscribers_does_not_resume() {
    let (radio, _manager, characteristic) = make_characteristic().await;

    radio.delegate().did_subscribe(central(), CHARACTERISTIC_UUID);
    radio.update_value_return.store(false, Ordering::SeqCst);
    characteristic.update_value([1u8]);
    radio
        .delegate()
        .did_unsubscribe(characteristic.subscribers()[0].clone(), CHARACTERISTIC_UUID);

    radio.update_value_return.store(true, Ordering::SeqCst);
    radio.delegate().is_ready_to_update_subscribers();

    assert!(radio.calls().updates.is_empty());
    assert!(!characteristic.is_updating());
    assert_eq!(characteristic.pending_update_count(), 1);
}
