use crate::cmd::{DevicesArgs, ServerArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_devices, OutputFormat};

pub async fn run(_args: DevicesArgs, server: &ServerArgs, format: OutputFormat) -> CliResult<i32> {
    let client = server.client()?;
    let devices = client
        .devices()
        .await
        .map_err(|err| client_error("listing devices failed", err))?;
    print_devices(&devices, format);
    Ok(SUCCESS)
}
