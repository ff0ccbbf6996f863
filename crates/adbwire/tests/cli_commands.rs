#![cfg(all(unix, feature = "cli"))]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};

/// One-connection scripted ADB server on a free loopback port.
fn mock_server<F>(script: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("mock server should bind");
    let port = listener.local_addr().expect("bound address").port();
    let handle = thread::spawn(move || {
        let (socket, _) = listener.accept().expect("mock server should accept");
        script(socket);
    });
    (port, handle)
}

fn read_command(s: &mut TcpStream) -> String {
    let mut len = [0u8; 4];
    s.read_exact(&mut len).expect("length prefix");
    let len = usize::from_str_radix(std::str::from_utf8(&len).expect("ascii"), 16).expect("hex");
    let mut body = vec![0u8; len];
    s.read_exact(&mut body).expect("command body");
    String::from_utf8(body).expect("utf-8 command")
}

fn expect_command(s: &mut TcpStream, expected: &str) {
    assert_eq!(read_command(s), expected);
    s.write_all(b"OKAY").expect("write OKAY");
}

fn write_hex_string(s: &mut TcpStream, body: &str) {
    s.write_all(format!("{:04X}{body}", body.len()).as_bytes())
        .expect("write string");
}

fn write_shell_frame(s: &mut TcpStream, kind: u8, payload: &[u8]) {
    s.write_all(&[kind]).expect("frame type");
    s.write_all(&(payload.len() as u32).to_le_bytes())
        .expect("frame length");
    s.write_all(payload).expect("frame payload");
}

fn adbwire(port: u16, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_adbwire"))
        .arg("--port")
        .arg(port.to_string())
        .arg("--connect-timeout")
        .arg("2s")
        .arg("--log-level")
        .arg("error")
        .args(args)
        .env_remove("ANDROID_ADB_SERVER_PORT")
        .env_remove("ADBWIRE_LOG")
        .output()
        .expect("adbwire should run")
}

fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    port
}

#[test]
fn devices_prints_json_snapshot() {
    let (port, server) = mock_server(|mut s| {
        expect_command(&mut s, "host:devices");
        write_hex_string(&mut s, "emulator-5554\tdevice\nR58M\tunauthorized\n");
    });

    let output = adbwire(port, &["--format", "json", "devices"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(parsed[0]["serial"], "emulator-5554");
    assert_eq!(parsed[0]["state"], "device");
    assert_eq!(parsed[1]["state"], "unauthorized");
    server.join().expect("mock server thread");
}

#[test]
fn shell_relays_output_and_exit_code() {
    let (port, server) = mock_server(|mut s| {
        expect_command(&mut s, "host:transport:emu");
        expect_command(&mut s, "shell,v2,raw:sh '-c' 'exit 7'");
        write_shell_frame(&mut s, 1, b"out\n");
        write_shell_frame(&mut s, 2, b"err\n");
        write_shell_frame(&mut s, 3, &[7]);
    });

    let output = adbwire(port, &["shell", "emu", "sh", "-c", "exit 7"]);
    assert_eq!(output.status.code(), Some(7));
    assert_eq!(output.stdout, b"out\n");
    assert_eq!(output.stderr, b"err\n");
    server.join().expect("mock server thread");
}

#[test]
fn server_fail_exits_one() {
    let (port, server) = mock_server(|mut s| {
        read_command(&mut s);
        s.write_all(b"FAIL").expect("write FAIL");
        write_hex_string(&mut s, "device 'ghost' not found");
    });

    let output = adbwire(port, &["screencap", "ghost", "/tmp/adbwire-never-written.raw"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("device 'ghost' not found"), "stderr: {stderr}");
    server.join().expect("mock server thread");
}

#[test]
fn stat_sync_error_exits_two() {
    let (port, server) = mock_server(|mut s| {
        expect_command(&mut s, "host:transport:emu");
        expect_command(&mut s, "sync:");
        let mut header = [0u8; 8];
        s.read_exact(&mut header).expect("stat request header");
        assert_eq!(&header[..4], b"LST2");
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let mut path = vec![0u8; len];
        s.read_exact(&mut path).expect("stat path");
        assert_eq!(path, b"/missing");

        let mut record = vec![0u8; 68];
        record[..4].copy_from_slice(&2u32.to_le_bytes());
        s.write_all(b"LST2").expect("reply id");
        s.write_all(&record).expect("reply record");
    });

    let output = adbwire(port, &["stat", "emu", "/missing"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ENOENT"));
    server.join().expect("mock server thread");
}

#[test]
fn unreachable_server_exits_three() {
    let output = adbwire(unused_port(), &["devices"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn bad_duration_is_usage_error() {
    let output = adbwire(unused_port(), &["track", "--timeout", "soon"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = adbwire(unused_port(), &["reboot-bootloader"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_without_server() {
    let output = adbwire(unused_port(), &["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("adbwire "), "stdout: {stdout}");
}
