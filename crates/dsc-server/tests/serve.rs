//! Raw HTTP/1 exchanges against a listening server.

use dsc_server::{Manager, Server, ServerConfig, ShutdownSignal};
use dsc_store::{MemoryNodeStatus, MemoryReportServer, StaticConfigurationRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const AGENT: &str = "B1F28971-2CEB-46D5-9DCB-79C044395F81";

async fn start(max_body_bytes: u64) -> (SocketAddr, ShutdownSignal, JoinHandle<Result<(), dsc_server::ServerError>>) {
    let manager = Manager::builder(
        Arc::new(StaticConfigurationRepository::new(&b"configuration"[..], [])),
        Arc::new(MemoryReportServer::new()),
        Arc::new(MemoryNodeStatus::new()),
    )
    .max_body_bytes(max_body_bytes)
    .build()
    .unwrap();

    let config = ServerConfig::builder()
        .max_body_bytes(max_body_bytes)
        .shutdown_timeout(Duration::from_secs(2))
        .build();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let handle = tokio::spawn(Server::new(config, manager).serve(listener, shutdown.clone()));
    (addr, shutdown, handle)
}

async fn exchange(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("response within timeout")
        .unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_serves_configuration_over_tcp() {
    let (addr, shutdown, handle) = start(1 << 20).await;

    let response = exchange(
        addr,
        &format!(
            "GET /Nodes(AgentId='{AGENT}')/Configurations(ConfigurationName='Web')/ConfigurationContent HTTP/1.1\r\n\
             Host: localhost\r\n\
             ProtocolVersion: 2.0\r\n\
             Connection: close\r\n\r\n"
        ),
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    let lower = response.to_lowercase();
    assert!(lower.contains("protocolversion: 2.0"));
    assert!(lower.contains("checksumalgorithm: sha-256"));
    assert!(response.ends_with("configuration"));

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    tokio_test::assert_ok!(result);
}

#[tokio::test]
async fn test_download_headers_are_written_lower_case() {
    let (addr, shutdown, _handle) = start(1 << 20).await;

    let response = exchange(
        addr,
        &format!(
            "GET /Nodes(AgentId='{AGENT}')/Configurations(ConfigurationName='Web')/ConfigurationContent HTTP/1.1\r\n\
             Host: localhost\r\n\
             ProtocolVersion: 2.0\r\n\
             Connection: close\r\n\r\n"
        ),
    )
    .await;

    // Agents match header names case-insensitively.
    assert!(response.contains("\r\nprotocolversion: 2.0\r\n"), "{response}");
    assert!(response.contains("\r\nchecksum: "), "{response}");
    assert!(response.contains("\r\nchecksumalgorithm: SHA-256\r\n"), "{response}");
    assert!(!response.contains("ChecksumAlgorithm"), "{response}");
    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (addr, shutdown, _handle) = start(16).await;

    let body = "x".repeat(64);
    let response = exchange(
        addr,
        &format!(
            "POST /Nodes(AgentId='{AGENT}')/SendReport HTTP/1.1\r\n\
             Host: localhost\r\n\
             ProtocolVersion: 2.0\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        ),
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
    assert!(response.ends_with("request body too large"));
    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_protocol_version_is_not_implemented() {
    let (addr, shutdown, _handle) = start(1 << 20).await;

    let response = exchange(
        addr,
        "GET /anything HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 501 Not Implemented\r\n"), "{response}");
    assert!(response.ends_with(r#"protocol version "" not supported"#));
    shutdown.trigger();
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();

    let manager = Manager::builder(
        Arc::new(StaticConfigurationRepository::new(&b""[..], [])),
        Arc::new(MemoryReportServer::new()),
        Arc::new(MemoryNodeStatus::new()),
    )
    .build()
    .unwrap();
    let config = ServerConfig::builder().http_addr(addr.to_string()).build();

    let result = Server::new(config, manager)
        .run_with_shutdown(ShutdownSignal::new())
        .await;
    assert!(matches!(result, Err(dsc_server::ServerError::Bind { .. })));
}
