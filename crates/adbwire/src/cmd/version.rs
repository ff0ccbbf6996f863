use crate::cmd::{ServerArgs, VersionArgs};
use crate::exit::{CliResult, SUCCESS};

pub async fn run(args: VersionArgs, server: &ServerArgs) -> CliResult<i32> {
    if !args.extended {
        println!("adbwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: adbwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("ADBWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("server: {}:{}", server.host, server.port);

    let client = server.client()?;
    match client.host_version().await {
        Ok(version) => println!("server_version: {version}"),
        Err(err) => {
            tracing::warn!(error = %err, "adb server version unavailable");
            println!("server_version: unavailable");
        }
    }

    Ok(SUCCESS)
}
