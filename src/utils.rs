use std::future;
use std::io;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, warn};

/// Bind the listening socket for a `host:port` address.
///
/// The host may be an IP literal or a name such as `localhost`; names are
/// resolved and the first address that binds wins.
pub async fn bind(addr: &str) -> io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

/// Resolve when the process is asked to stop (Ctrl+C or SIGTERM).
///
/// If one handler cannot be installed the other still works; the failure is
/// logged instead of aborting a server that is already serving traffic.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => warn!("Received Ctrl+C, draining connections"),
        () = terminate => warn!("Received SIGTERM, draining connections"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_bind_resolves_hostname() {
        let config = Config {
            host: "localhost".to_string(),
            port: 0,
            ..Config::default()
        };

        let listener = bind(&config.server_addr()).await.unwrap();

        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_bind_ip_literal() {
        let listener = bind("127.0.0.1:0").await.unwrap();

        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
