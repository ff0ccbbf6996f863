use adbwire_client::{CancellationToken, ExecIo};
use tracing::debug;

use crate::cmd::{ServerArgs, ShellArgs};
use crate::exit::{client_error, CliResult};

/// Exit with the remote command's own exit code.
pub async fn run(args: ShellArgs, server: &ServerArgs) -> CliResult<i32> {
    let client = server.client()?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();
    let mut io = ExecIo::new().stdout(&mut stdout).stderr(&mut stderr);
    if args.stdin {
        io = io.stdin(tokio::io::stdin());
    }

    let code = client
        .execute(&args.serial, &args.command, &args.args, io, cancel)
        .await
        .map_err(|err| client_error("shell failed", err))?;
    debug!(code, "shell finished");
    Ok(i32::from(code))
}
