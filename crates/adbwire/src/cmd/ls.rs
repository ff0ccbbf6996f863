use crate::cmd::{LsArgs, ServerArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_stat_legacy, print_stat_v2, OutputFormat};

pub async fn run(args: LsArgs, server: &ServerArgs, format: OutputFormat) -> CliResult<i32> {
    let client = server.client()?;
    let sync = client
        .sync_client(&args.serial)
        .await
        .map_err(|err| client_error("opening sync session failed", err))?;

    if args.legacy {
        let entries = sync
            .list(&args.path)
            .await
            .map_err(|err| client_error("list failed", err))?;
        print_stat_legacy(&entries, format);
    } else {
        let entries = sync
            .list_v2(&args.path)
            .await
            .map_err(|err| client_error("list failed", err))?;
        print_stat_v2(&entries, format);
    }
    Ok(SUCCESS)
}
