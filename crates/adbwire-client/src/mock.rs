//! Scripted in-process ADB server for unit tests.

use std::future::Future;
use std::time::Duration;

use adbwire_transport::ServerAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::config::ClientConfig;

/// Accept one connection and run `script` against it.
pub(crate) async fn serve<F, Fut>(script: F) -> (ClientConfig, JoinHandle<()>)
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = ServerAddr::from(listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        script(socket).await;
    });
    let config = ClientConfig::default()
        .with_server(addr)
        .with_connect_timeout(Some(Duration::from_secs(2)));
    (config, handle)
}

/// Read one host request and return its text.
pub(crate) async fn read_command(socket: &mut TcpStream) -> String {
    let mut len = [0u8; 4];
    socket.read_exact(&mut len).await.unwrap();
    let len = usize::from_str_radix(std::str::from_utf8(&len).unwrap(), 16).unwrap();
    let mut body = vec![0u8; len];
    socket.read_exact(&mut body).await.unwrap();
    String::from_utf8(body).unwrap()
}

/// Read one host request, assert its text, and answer `OKAY`.
pub(crate) async fn expect_command(socket: &mut TcpStream, expected: &str) {
    assert_eq!(read_command(socket).await, expected);
    socket.write_all(b"OKAY").await.unwrap();
}

/// Write a hex-length-prefixed string.
pub(crate) async fn write_hex_string(socket: &mut TcpStream, body: &str) {
    let framed = format!("{:04X}{body}", body.len());
    socket.write_all(framed.as_bytes()).await.unwrap();
}

/// Read a sync request: id and its `u32` value.
pub(crate) async fn read_sync_header(socket: &mut TcpStream) -> ([u8; 4], u32) {
    let mut id = [0u8; 4];
    socket.read_exact(&mut id).await.unwrap();
    let value = socket.read_u32_le().await.unwrap();
    (id, value)
}

/// Read a sync request with a string payload.
pub(crate) async fn read_sync_request(socket: &mut TcpStream) -> ([u8; 4], String) {
    let (id, len) = read_sync_header(socket).await;
    let mut body = vec![0u8; len as usize];
    socket.read_exact(&mut body).await.unwrap();
    (id, String::from_utf8(body).unwrap())
}
