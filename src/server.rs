// src/server.rs
use std::io::ErrorKind;

use tokio::net::TcpListener;

/// Retries after the first attempt when the port is taken.
pub const MAX_PORT_RETRIES: u16 = 3;

/// Bind `host:port`, walking to the next port while the address is in use.
pub async fn bind_with_fallback(host: &str, port: u16, max_retries: u16) -> std::io::Result<TcpListener> {
    let mut attempt = port;
    let mut retries = 0;
    loop {
        match TcpListener::bind((host, attempt)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == ErrorKind::AddrInUse && retries < max_retries => {
                let next = attempt.checked_add(1).ok_or(e)?;
                tracing::warn!("port {attempt} is in use, trying port {next}...");
                attempt = next;
                retries += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to start server");
                return Err(e);
            }
        }
    }
}

pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn skips_a_taken_port() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        // the neighbour might be taken too, so allow the full retry budget
        match bind_with_fallback("127.0.0.1", port, MAX_PORT_RETRIES).await {
            Ok(listener) => assert_ne!(listener.local_addr().unwrap().port(), port),
            Err(e) => assert_eq!(e.kind(), ErrorKind::AddrInUse),
        }
    }

    #[tokio::test]
    async fn no_retries_surfaces_addr_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let err = bind_with_fallback("127.0.0.1", port, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AddrInUse);
    }
}
