use std::time::SystemTime;

use crate::cmd::{PushArgs, ServerArgs};
use crate::exit::{client_error, io_error, CliResult, SUCCESS};
use crate::output::{print_transfer, OutputFormat, TransferOutput};

pub async fn run(args: PushArgs, server: &ServerArgs, format: OutputFormat) -> CliResult<i32> {
    let local = args.local.display().to_string();
    let mut file = tokio::fs::File::open(&args.local)
        .await
        .map_err(|err| io_error(&format!("failed opening {local}"), err))?;
    let mtime = file
        .metadata()
        .await
        .and_then(|meta| meta.modified())
        .unwrap_or_else(|_| SystemTime::now());

    let client = server.client()?;
    let sync = client
        .sync_client(&args.serial)
        .await
        .map_err(|err| client_error("opening sync session failed", err))?;
    let bytes = sync
        .push(&args.remote, &mut file, mtime, args.mode)
        .await
        .map_err(|err| client_error("push failed", err))?;

    print_transfer(
        &TransferOutput {
            direction: "push",
            serial: &args.serial,
            remote: &args.remote,
            local: &local,
            bytes,
        },
        format,
    );
    Ok(SUCCESS)
}
