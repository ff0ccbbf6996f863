use crate::cmd::{ScreencapArgs, ServerArgs};
use crate::exit::{client_error, io_error, CliResult, SUCCESS};
use crate::output::{print_framebuffer, OutputFormat};

pub async fn run(args: ScreencapArgs, server: &ServerArgs, format: OutputFormat) -> CliResult<i32> {
    let client = server.client()?;
    let fb = client
        .capture_screen(&args.serial)
        .await
        .map_err(|err| client_error("screen capture failed", err))?;

    let out = args.out.display().to_string();
    let pixels = if args.rgba {
        fb.to_rgba8()
    } else {
        fb.data.to_vec()
    };
    tokio::fs::write(&args.out, &pixels)
        .await
        .map_err(|err| io_error(&format!("failed writing {out}"), err))?;

    print_framebuffer(&fb.summary(), &out, format);
    Ok(SUCCESS)
}
