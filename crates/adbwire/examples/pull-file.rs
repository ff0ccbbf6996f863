//! Stat a remote file, pull it to the current directory, and print `uname -a`.
//!
//! Run with:
//!   cargo run --example pull-file -- <serial> /sdcard/some/file

use adbwire::client::{AdbServicesClient, CancellationToken, ExecIo};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(serial), Some(remote)) = (args.next(), args.next()) else {
        eprintln!("usage: pull-file <serial> <remote-path>");
        std::process::exit(64);
    };

    let client = AdbServicesClient::new();

    let mut uname = Vec::new();
    let code = client
        .execute(
            &serial,
            "uname",
            &["-a"],
            ExecIo::new().stdout(&mut uname),
            CancellationToken::new(),
        )
        .await?;
    eprintln!("uname exited {code}: {}", String::from_utf8_lossy(&uname).trim());

    let sync = client.sync_client(&serial).await?;
    let entry = sync.stat_v2(&remote, false).await?;
    eprintln!("{} {} bytes, mtime {}", entry.mode, entry.size, entry.mtime);

    let name = remote.rsplit('/').next().unwrap_or("pulled");
    let mut file = tokio::fs::File::create(name).await?;
    let bytes = sync.pull(&remote, &mut file).await?;
    eprintln!("pulled {bytes} bytes into {name}");
    sync.close().await?;
    Ok(())
}
