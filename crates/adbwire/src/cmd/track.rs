use adbwire_client::CancellationToken;
use tracing::info;

use crate::cmd::{parse_duration, ServerArgs, TrackArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_devices, OutputFormat};

pub async fn run(args: TrackArgs, server: &ServerArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let client = server.client()?;

    let cancel = CancellationToken::new();
    let mut tracker = client
        .track_devices(cancel.clone())
        .await
        .map_err(|err| client_error("tracking devices failed", err))?;

    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("interrupted"),
            _ = tokio::time::sleep(timeout) => info!(?timeout, "tracking timeout reached"),
            _ = stopper.cancelled() => {}
        }
        stopper.cancel();
    });

    while let Some(devices) = tracker
        .next_update()
        .await
        .map_err(|err| client_error("tracking devices failed", err))?
    {
        print_devices(&devices, format);
    }
    cancel.cancel();

    Ok(SUCCESS)
}
