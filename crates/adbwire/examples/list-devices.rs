//! Print attached devices, then follow changes for ten seconds.
//!
//! Run with:
//!   cargo run --example list-devices

use std::time::Duration;

use adbwire::client::{AdbServicesClient, CancellationToken};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = AdbServicesClient::new();
    eprintln!("adb server version {}", client.host_version().await?);

    for device in client.devices().await? {
        println!("{}\t{}", device.serial, device.state);
    }

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        stopper.cancel();
    });

    let mut tracker = client.track_devices(cancel).await?;
    while let Some(devices) = tracker.next_update().await? {
        eprintln!("update: {} device(s)", devices.len());
        for device in devices {
            println!("{}\t{}", device.serial, device.state);
        }
    }
    Ok(())
}
