use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use adbwire_client::{AdbServicesClient, ClientConfig};
use adbwire_transport::{ServerAddr, DEFAULT_PORT};
use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod devices;
pub mod ls;
pub mod pull;
pub mod push;
pub mod screencap;
pub mod shell;
pub mod stat;
pub mod track;
pub mod version;

/// How to reach the ADB server.
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// ADB server host address.
    #[arg(long, default_value = "127.0.0.1", global = true)]
    pub host: IpAddr,

    /// ADB server port.
    #[arg(long, env = "ANDROID_ADB_SERVER_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Connection timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub connect_timeout: String,
}

impl ServerArgs {
    pub fn client(&self) -> CliResult<AdbServicesClient> {
        let timeout = parse_duration(&self.connect_timeout)?;
        let config = ClientConfig::default()
            .with_server(ServerAddr::new(self.host, self.port))
            .with_connect_timeout(Some(timeout));
        Ok(AdbServicesClient::with_config(config))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show version information.
    Version(VersionArgs),
    /// List attached devices.
    Devices(DevicesArgs),
    /// Print the device list every time it changes.
    Track(TrackArgs),
    /// Run a command on a device.
    Shell(ShellArgs),
    /// Copy a file from a device.
    Pull(PullArgs),
    /// Copy a file to a device.
    Push(PushArgs),
    /// List a directory on a device.
    Ls(LsArgs),
    /// Show metadata for a path on a device.
    Stat(StatArgs),
    /// Capture the device screen.
    Screencap(ScreencapArgs),
}

pub async fn run(command: Command, server: &ServerArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Version(args) => version::run(args, server).await,
        Command::Devices(args) => devices::run(args, server, format).await,
        Command::Track(args) => track::run(args, server, format).await,
        Command::Shell(args) => shell::run(args, server).await,
        Command::Pull(args) => pull::run(args, server, format).await,
        Command::Push(args) => push::run(args, server, format).await,
        Command::Ls(args) => ls::run(args, server, format).await,
        Command::Stat(args) => stat::run(args, server, format).await,
        Command::Screencap(args) => screencap::run(args, server, format).await,
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Also query the ADB server's protocol version.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct DevicesArgs {}

#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Stop after this long (e.g. 60s, 500ms).
    #[arg(long, default_value = "60s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ShellArgs {
    /// Device serial.
    pub serial: String,
    /// Command to run.
    pub command: String,
    /// Arguments, each passed to the remote shell as one word.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
    /// Forward this process's stdin to the command.
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Args, Debug)]
pub struct PullArgs {
    /// Device serial.
    pub serial: String,
    /// Remote file path.
    pub remote: String,
    /// Local destination; `-` writes to stdout.
    pub local: PathBuf,
}

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Device serial.
    pub serial: String,
    /// Local source file.
    pub local: PathBuf,
    /// Remote destination path.
    pub remote: String,
    /// Permission bits, octal.
    #[arg(long, default_value = "644", value_parser = parse_mode)]
    pub mode: u32,
}

#[derive(Args, Debug)]
pub struct LsArgs {
    /// Device serial.
    pub serial: String,
    /// Remote directory.
    pub path: String,
    /// Use the legacy LIST request (32-bit sizes, no owner).
    #[arg(long)]
    pub legacy: bool,
}

#[derive(Args, Debug)]
pub struct StatArgs {
    /// Device serial.
    pub serial: String,
    /// Remote path.
    pub path: String,
    /// Use the legacy STAT request.
    #[arg(long, conflicts_with = "follow")]
    pub legacy: bool,
    /// Follow a symlink instead of describing it.
    #[arg(long)]
    pub follow: bool,
}

#[derive(Args, Debug)]
pub struct ScreencapArgs {
    /// Device serial.
    pub serial: String,
    /// Where to write the pixel buffer.
    pub out: PathBuf,
    /// Convert pixels to RGBA before writing.
    #[arg(long)]
    pub rgba: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

fn parse_mode(input: &str) -> Result<u32, String> {
    let digits = input.trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8).map_err(|_| format!("not an octal mode: {input}"))?;
    if mode > 0o7777 {
        return Err(format!("mode out of range: {input}"));
    }
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_mode_is_octal() {
        assert_eq!(parse_mode("644").unwrap(), 0o644);
        assert_eq!(parse_mode("0755").unwrap(), 0o755);
        assert_eq!(parse_mode("0o600").unwrap(), 0o600);
        assert!(parse_mode("999").is_err());
        assert!(parse_mode("17777").is_err());
    }
}
