use std::io::{IsTerminal, Write};

use adbwire_client::{Device, FramebufferSummary, StatEntry, StatV2Entry};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn print_devices(devices: &[Device], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(devices),
        OutputFormat::Table => {
            let mut t = table(vec!["SERIAL", "STATE"]);
            for device in devices {
                t.add_row(vec![device.serial.clone(), device.state.to_string()]);
            }
            println!("{t}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for device in devices {
                println!("{}\t{}", device.serial, device.state);
            }
        }
    }
}

pub fn print_stat_v2(entries: &[StatV2Entry], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Table => {
            let mut t = table(vec!["MODE", "UID", "GID", "SIZE", "MTIME", "PATH"]);
            for e in entries {
                t.add_row(vec![
                    e.mode.to_string(),
                    e.uid.to_string(),
                    e.gid.to_string(),
                    e.size.to_string(),
                    e.mtime.to_string(),
                    e.path.clone(),
                ]);
            }
            println!("{t}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for e in entries {
                println!(
                    "{} {:>5} {:>5} {:>10} {} {}",
                    e.mode, e.uid, e.gid, e.size, e.mtime, e.path
                );
            }
        }
    }
}

pub fn print_stat_legacy(entries: &[StatEntry], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Table => {
            let mut t = table(vec!["MODE", "SIZE", "MTIME", "PATH"]);
            for e in entries {
                t.add_row(vec![
                    e.mode.to_string(),
                    e.size.to_string(),
                    e.mtime.to_string(),
                    e.path.clone(),
                ]);
            }
            println!("{t}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for e in entries {
                println!("{} {:>10} {} {}", e.mode, e.size, e.mtime, e.path);
            }
        }
    }
}

#[derive(Serialize)]
pub struct TransferOutput<'a> {
    pub direction: &'static str,
    pub serial: &'a str,
    pub remote: &'a str,
    pub local: &'a str,
    pub bytes: u64,
}

pub fn print_transfer(out: &TransferOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut t = table(vec!["DIRECTION", "SERIAL", "REMOTE", "LOCAL", "BYTES"]);
            t.add_row(vec![
                out.direction.to_string(),
                out.serial.to_string(),
                out.remote.to_string(),
                out.local.to_string(),
                out.bytes.to_string(),
            ]);
            println!("{t}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "{} {} {} bytes ({} <-> {})",
                out.direction, out.serial, out.bytes, out.remote, out.local
            );
        }
    }
}

pub fn print_framebuffer(summary: &FramebufferSummary, out: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Output<'a> {
                #[serde(flatten)]
                summary: &'a FramebufferSummary,
                output: &'a str,
            }
            print_json(&Output {
                summary,
                output: out,
            });
        }
        OutputFormat::Table => {
            let mut t = table(vec!["WIDTH", "HEIGHT", "BPP", "LAYOUT", "BYTES", "OUTPUT"]);
            t.add_row(vec![
                summary.width.to_string(),
                summary.height.to_string(),
                summary.bpp.to_string(),
                summary.layout.to_string(),
                summary.size.to_string(),
                out.to_string(),
            ]);
            println!("{t}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "{}x{} {} ({} bpp, {} bytes) -> {}",
                summary.width, summary.height, summary.layout, summary.bpp, summary.size, out
            );
        }
    }
}
