mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, ServerArgs};
use crate::exit::{CliError, INTERNAL, SUCCESS, USAGE};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "adbwire", version, about = "ADB server wire protocol client")]
struct Cli {
    #[command(flatten)]
    server: ServerArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum level for adbwire events on stderr. `ADBWIRE_LOG` overrides it.
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version come through here too.
            let code = if err.use_stderr() { USAGE } else { SUCCESS };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("failed to start runtime: {err}")))
        .and_then(|runtime| runtime.block_on(cmd::run(cli.command, &cli.server, format)));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shell_with_hyphenated_args() {
        let cli = Cli::try_parse_from(["adbwire", "shell", "emulator-5554", "ls", "-l", "/sdcard"])
            .expect("shell args should parse");
        match cli.command {
            Command::Shell(args) => {
                assert_eq!(args.serial, "emulator-5554");
                assert_eq!(args.command, "ls");
                assert_eq!(args.args, vec!["-l", "/sdcard"]);
                assert!(!args.stdin);
            }
            other => panic!("expected shell, got {other:?}"),
        }
    }

    #[test]
    fn server_flags_are_global() {
        let cli = Cli::try_parse_from(["adbwire", "devices", "--port", "5038", "--host", "10.0.0.2"])
            .expect("server flags should parse after subcommand");
        assert_eq!(cli.server.port, 5038);
        assert_eq!(cli.server.host.to_string(), "10.0.0.2");
    }

    #[test]
    fn push_mode_is_octal() {
        let cli = Cli::try_parse_from(["adbwire", "push", "emu", "a.txt", "/sdcard/a.txt", "--mode", "755"])
            .expect("push args should parse");
        assert!(matches!(cli.command, Command::Push(ref args) if args.mode == 0o755));
    }

    #[test]
    fn stat_rejects_legacy_with_follow() {
        let err = Cli::try_parse_from(["adbwire", "stat", "emu", "/x", "--legacy", "--follow"])
            .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
