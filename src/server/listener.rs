use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::files::Router;
use crate::http::connection::Connection;

const LISTEN_BACKLOG: u32 = 1024;

/// Pause after an accept failure that is likely to repeat, e.g. EMFILE.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound listening socket plus the configuration every connection shares.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    shutdown: Arc<watch::Sender<bool>>,
}

/// Stops a server from another task.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

/// A server whose accept loop runs on its own task.
pub struct RunningServer {
    local_addr: SocketAddr,
    handle: ServerHandle,
    task: JoinHandle<anyhow::Result<()>>,
}

impl Server {
    /// Canonicalizes the document root and binds `host:port` with
    /// `SO_REUSEADDR` set.
    pub async fn bind(mut cfg: Config) -> anyhow::Result<Self> {
        cfg.document_root = tokio::fs::canonicalize(&cfg.document_root)
            .await
            .with_context(|| format!("document root {} is not accessible", cfg.document_root.display()))?;

        let meta = tokio::fs::metadata(&cfg.document_root)
            .await
            .with_context(|| format!("failed to stat document root {}", cfg.document_root.display()))?;
        if !meta.is_dir() {
            anyhow::bail!("document root {} is not a directory", cfg.document_root.display());
        }

        let addr = tokio::net::lookup_host(cfg.listen_addr())
            .await
            .with_context(|| format!("failed to resolve {}", cfg.listen_addr()))?
            .next()
            .with_context(|| format!("{} resolved to no addresses", cfg.listen_addr()))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr).with_context(|| format!("failed to bind {}", addr))?;

        let listener = socket.listen(LISTEN_BACKLOG)?;
        let local_addr = listener.local_addr()?;
        let (shutdown, _) = watch::channel(false);

        info!(
            "Listening on {}, serving {}",
            local_addr,
            cfg.document_root.display()
        );

        Ok(Self {
            listener,
            local_addr,
            router: Router::new(Arc::new(cfg)),
            shutdown: Arc::new(shutdown),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Spawns the accept loop.
    pub fn start(self) -> RunningServer {
        let local_addr = self.local_addr;
        let handle = self.handle();
        let task = tokio::spawn(self.run());

        RunningServer {
            local_addr,
            handle,
            task,
        }
    }

    /// Accepts connections until stopped, handing each to its own task.
    ///
    /// Connections already in flight keep running after this returns.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut stopped = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = async { let _ = stopped.wait_for(|stop| *stop).await; } => {
                    break;
                }

                accepted = self.listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");

                            if let Some(delay) = accept_backoff(&e) {
                                tokio::select! {
                                    _ = stopped.wait_for(|stop| *stop) => break,
                                    _ = tokio::time::sleep(delay) => {}
                                }
                            }
                            continue;
                        }
                    };
                    info!("Accepted connection from {}", peer);

                    let router = self.router.clone();
                    tokio::spawn(async move {
                        let mut conn = Connection::new(socket, router);
                        if let Err(e) = conn.run().await {
                            tracing::warn!(%peer, error = %e, "Connection closed without response");
                        }
                    });
                }
            }
        }

        info!("Stopped accepting connections on {}", self.local_addr);
        Ok(())
    }
}

/// How long to wait before calling `accept` again after `e`.
///
/// Errors tied to the one connection being accepted are retried at once;
/// anything else (descriptor or memory exhaustion) backs off.
pub fn accept_backoff(e: &io::Error) -> Option<Duration> {
    match e.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}

impl ServerHandle {
    /// Stops the accept loop. Safe to call more than once.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    /// Stops accepting and waits for the accept loop to exit.
    pub async fn stop(self) -> anyhow::Result<()> {
        self.handle.stop();
        self.task.await?
    }
}
