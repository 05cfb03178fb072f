use anyhow::{Context, Result};
use listenfd::ListenFd;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

use ams_types::AmsConfig;

/// Listener for the AMS API: a socket handed over by systemd if present,
/// otherwise a fresh `SO_REUSEPORT` bind on the configured address.
pub async fn create_listener(config: &AmsConfig) -> Result<tokio::net::TcpListener> {
    let mut listenfd = ListenFd::from_env();

    if let Some(listener) = listenfd.take_tcp_listener(0)? {
        info!("Using systemd socket activation (fd=3)");
        listener.set_nonblocking(true)?;
        return Ok(tokio::net::TcpListener::from_std(listener)?);
    }

    let socket_addr = config.get_socket_addr();
    let addr: SocketAddr = socket_addr
        .parse()
        .with_context(|| format!("Invalid bind address '{socket_addr}'"))?;
    let listener = bind_reuse_port(addr, config.listen_backlog)
        .with_context(|| format!("Failed to bind AMS API to {addr}"))?;

    info!(
        addr = %addr,
        backlog = config.listen_backlog,
        lan = config.allow_lan_access,
        "AMS API socket bound with SO_REUSEPORT"
    );
    Ok(tokio::net::TcpListener::from_std(listener)?)
}

/// Non-blocking listener that a restarted instance can bind alongside this one.
fn bind_reuse_port(addr: SocketAddr, backlog: i32) -> std::io::Result<std::net::TcpListener> {
    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;
    Ok(socket.into())
}

#[allow(
    clippy::expect_used,
    reason = "Signal handlers are critical infrastructure, panic is appropriate on failure"
)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, draining requests and pending store writes"),
        () = terminate => info!("Received SIGTERM, draining requests and pending store writes"),
    }
}
