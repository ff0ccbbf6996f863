use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::cmd::{PullArgs, ServerArgs};
use crate::exit::{client_error, io_error, CliResult, SUCCESS};
use crate::output::{print_transfer, OutputFormat, TransferOutput};

pub async fn run(args: PullArgs, server: &ServerArgs, format: OutputFormat) -> CliResult<i32> {
    let client = server.client()?;
    let sync = client
        .sync_client(&args.serial)
        .await
        .map_err(|err| client_error("opening sync session failed", err))?;

    if args.local == Path::new("-") {
        let mut stdout = tokio::io::stdout();
        sync.pull(&args.remote, &mut stdout)
            .await
            .map_err(|err| client_error("pull failed", err))?;
        return Ok(SUCCESS);
    }

    let mut file = tokio::fs::File::create(&args.local)
        .await
        .map_err(|err| io_error(&format!("failed creating {}", args.local.display()), err))?;
    let bytes = sync
        .pull(&args.remote, &mut file)
        .await
        .map_err(|err| client_error("pull failed", err))?;
    file.sync_all()
        .await
        .map_err(|err| io_error(&format!("failed writing {}", args.local.display()), err))?;
    file.shutdown()
        .await
        .map_err(|err| io_error(&format!("failed writing {}", args.local.display()), err))?;

    let local = args.local.display().to_string();
    print_transfer(
        &TransferOutput {
            direction: "pull",
            serial: &args.serial,
            remote: &args.remote,
            local: &local,
            bytes,
        },
        format,
    );
    Ok(SUCCESS)
}
