use crate::cmd::{ServerArgs, StatArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_stat_legacy, print_stat_v2, OutputFormat};

pub async fn run(args: StatArgs, server: &ServerArgs, format: OutputFormat) -> CliResult<i32> {
    let client = server.client()?;
    let sync = client
        .sync_client(&args.serial)
        .await
        .map_err(|err| client_error("opening sync session failed", err))?;

    if args.legacy {
        let entry = sync
            .stat(&args.path)
            .await
            .map_err(|err| client_error("stat failed", err))?;
        print_stat_legacy(std::slice::from_ref(&entry), format);
    } else {
        let entry = sync
            .stat_v2(&args.path, !args.follow)
            .await
            .map_err(|err| client_error("stat failed", err))?;
        print_stat_v2(std::slice::from_ref(&entry), format);
    }
    Ok(SUCCESS)
}
