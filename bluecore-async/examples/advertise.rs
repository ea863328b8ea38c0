use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bluecore::advertisement_data::AdvertisementData;
use bluecore::{
    AttError, Central, ManagerState, PeripheralRadio, PeripheralRadioDelegate, ReadRequest,
    ServiceDefinition, WriteRequest,
};
use bluecore_async::{CharacteristicProfile, MutableService, PeripheralManagerAsync, ServiceProfile};
use btuuid::{BluetoothUuid, BluetoothUuid16};
use tracing::info;
use tracing::metadata::LevelFilter;
use uuid::Uuid;

const HEART_RATE: BluetoothUuid = BluetoothUuid::Uuid16(BluetoothUuid16::new(0x180d));
const MEASUREMENT: BluetoothUuid = BluetoothUuid::Uuid16(BluetoothUuid16::new(0x2a37));

/// A stand-in radio that confirms every command as soon as it is issued.
struct SimulatedRadio {
    advertising: AtomicBool,
    delegate: Mutex<Option<Arc<dyn PeripheralRadioDelegate>>>,
}

impl SimulatedRadio {
    fn delegate(&self) -> Arc<dyn PeripheralRadioDelegate> {
        self.delegate.lock().unwrap().clone().unwrap()
    }
}

impl PeripheralRadio for SimulatedRadio {
    fn state(&self) -> ManagerState {
        ManagerState::PoweredOn
    }

    fn start_advertising(&self, _data: &AdvertisementData) {
        self.advertising.store(true, Ordering::SeqCst);
        self.delegate().did_start_advertising(Ok(()));
    }

    fn stop_advertising(&self) {
        self.advertising.store(false, Ordering::SeqCst);
    }

    fn is_advertising(&self) -> bool {
        self.advertising.load(Ordering::SeqCst)
    }

    fn add_service(&self, service: &ServiceDefinition) {
        self.delegate().did_add_service(service.uuid, Ok(()));
    }

    fn remove_service(&self, _uuid: BluetoothUuid) {}

    fn remove_all_services(&self) {}

    fn respond_to_read_request(
        &self,
        request: &ReadRequest,
        result: AttError,
        value: Option<&[u8]>,
    ) {
        info!(?request, %result, ?value, "read response");
    }

    fn respond_to_write_request(&self, request: &WriteRequest, result: AttError) {
        info!(?request, %result, "write response");
    }

    fn update_value(
        &self,
        _characteristic: BluetoothUuid,
        value: &[u8],
        _centrals: Option<&[Uuid]>,
    ) -> bool {
        info!(?value, "notification sent");
        true
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let radio = Arc::new(SimulatedRadio {
        advertising: AtomicBool::new(false),
        delegate: Mutex::new(None),
    });
    let manager = PeripheralManagerAsync::new(radio.clone());
    *radio.delegate.lock().unwrap() = Some(manager.delegate());

    let profile = ServiceProfile::new(HEART_RATE, "Heart Rate").with_characteristics(vec![
        CharacteristicProfile::new(MEASUREMENT, "Heart Rate Measurement"),
    ]);
    let service = MutableService::new(&profile);
    manager.add_service(&service).await?;

    manager.start_advertising("bluecore demo", &[HEART_RATE]).await?;
    info!("advertising started");

    // Simulate a central subscribing, then notify it.
    let characteristic = service.characteristic(MEASUREMENT).unwrap();
    manager
        .delegate()
        .did_subscribe(Central::new(Uuid::new_v4(), 20), MEASUREMENT);
    characteristic.update_value([0x00, 72]);

    manager.stop_advertising()?;
    info!("advertising stopped");
    Ok(())
}
