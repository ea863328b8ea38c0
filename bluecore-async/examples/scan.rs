use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bluecore::advertisement_data::AdvertisementData;
use bluecore::{
    CentralRadio, CharacteristicWriteType, ManagerState, PeripheralId, PeripheralInfo,
    PeripheralState,
};
use bluecore_async::CentralManagerAsync;
use btuuid::{BluetoothUuid, BluetoothUuid16};
use futures_lite::StreamExt;
use tracing::info;
use tracing::metadata::LevelFilter;
use uuid::Uuid;

const HEART_RATE: BluetoothUuid = BluetoothUuid::Uuid16(BluetoothUuid16::new(0x180d));

/// A stand-in radio that accepts commands and lets the example feed delegate
/// events by hand. A real backend would translate these calls to its HCI
/// transport or OS Bluetooth API.
struct SimulatedRadio {
    scanning: AtomicBool,
}

impl CentralRadio for SimulatedRadio {
    fn state(&self) -> ManagerState {
        ManagerState::PoweredOn
    }

    fn scan(&self, _services: Option<&[BluetoothUuid]>, _allow_duplicates: bool) {
        self.scanning.store(true, Ordering::SeqCst);
    }

    fn stop_scan(&self) {
        self.scanning.store(false, Ordering::SeqCst);
    }

    fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    fn connect(&self, _id: PeripheralId) {}

    fn cancel_connection(&self, _id: PeripheralId) {}

    fn peripheral_state(&self, _id: PeripheralId) -> PeripheralState {
        PeripheralState::Disconnected
    }

    fn discover_services(&self, _id: PeripheralId, _filter: Option<&[BluetoothUuid]>) {}

    fn discover_characteristics(&self, _id: PeripheralId, _service: BluetoothUuid) {}

    fn read_characteristic(&self, _id: PeripheralId, _characteristic: BluetoothUuid) {}

    fn write_characteristic(
        &self,
        _id: PeripheralId,
        _characteristic: BluetoothUuid,
        _value: &[u8],
        _write_type: CharacteristicWriteType,
    ) {
    }

    fn set_notify(&self, _id: PeripheralId, _characteristic: BluetoothUuid, _enabled: bool) {}
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

    let central = CentralManagerAsync::new(Arc::new(SimulatedRadio {
        scanning: AtomicBool::new(false),
    }));

    info!("starting scan");
    let mut scan = central.scan(Some(&[HEART_RATE]), false);

    let delegate = central.delegate();
    tokio::spawn(async move {
        for (name, rssi) in [("Polar H10", -48), ("Wahoo TICKR", -71)] {
            delegate.did_discover(
                PeripheralInfo {
                    id: PeripheralId::new(Uuid::new_v4()),
                    name: Some(name.into()),
                },
                AdvertisementData::with_local_name(name, &[HEART_RATE]),
                rssi,
            );
        }
    });

    let mut seen = 0;
    while let Some(did_discover) = scan.next().await {
        info!(
            "{}{}: {:?}",
            did_discover.peripheral.name.as_deref().unwrap_or("(unknown)"),
            format!(" ({}dBm)", did_discover.rssi),
            did_discover.advertisement_data
        );
        seen += 1;
        if seen == 2 {
            central.stop_scan();
            break;
        }
    }

    Ok(())
}
