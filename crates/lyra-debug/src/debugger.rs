use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lyra_host::ScriptHost;

use crate::config::DebugConfig;
use crate::error::DebugError;
use crate::service::{DebugService, SERVICE_PACKAGE};
use crate::session::serve_session;

/// Debug service lifecycle manager.
///
/// Owns the channel server and brings the whole debug surface online:
/// [`start`](Self::start) registers the command package with the host and
/// begins accepting sessions, [`stop`](Self::stop) tears both down. Each
/// accepted connection is served by an independent task, so sessions do not
/// block one another.
pub struct Debugger {
    host: Arc<dyn ScriptHost>,
    config: DebugConfig,
    server: Mutex<Option<ServerState>>,
}

struct ServerState {
    addr: SocketAddr,
    cancel: CancellationToken,
    accept_task: JoinHandle<()>,
}

impl Debugger {
    pub fn new(host: Arc<dyn ScriptHost>, config: DebugConfig) -> Self {
        Self {
            host,
            config,
            server: Mutex::new(None),
        }
    }

    /// Bring the debug service online.
    ///
    /// Registers the command dispatcher under [`SERVICE_PACKAGE`] — making it
    /// reachable from arbitrary hosted scripts, not only from the transport —
    /// then binds the channel server and starts accepting sessions. A bind
    /// failure is returned to the caller; the hosting process keeps running.
    /// Starting a debugger that is already running is a warn-logged no-op.
    pub async fn start(&self) -> Result<(), DebugError> {
        let mut server = self.server.lock().await;
        if server.is_some() {
            tracing::warn!("debugger already started");
            return Ok(());
        }

        let service = DebugService::new(self.host.clone(), self.config.command_timeout());
        self.host.register_package(SERVICE_PACKAGE, Arc::new(service));

        let listener = TcpListener::bind(self.config.listen)
            .await
            .map_err(|source| DebugError::Bind {
                addr: self.config.listen,
                source,
            })?;
        let addr = listener.local_addr()?;
        let cancel = CancellationToken::new();
        let accept_task = tokio::spawn(accept_loop(
            listener,
            self.host.clone(),
            self.config.recv_buffer_size,
            cancel.clone(),
        ));

        tracing::info!(%addr, "debug channel server started");
        *server = Some(ServerState {
            addr,
            cancel,
            accept_task,
        });
        Ok(())
    }

    /// Take the debug service offline.
    ///
    /// Stops accepting sessions, cancels the ones in flight, and releases
    /// the listener. Idempotent: stopping a debugger that is not running is
    /// a no-op, not an error.
    pub async fn stop(&self) {
        let Some(state) = self.server.lock().await.take() else {
            return;
        };
        state.cancel.cancel();
        if let Err(err) = state.accept_task.await {
            tracing::debug!(%err, "accept loop ended abnormally");
        }
        tracing::info!("debug channel server stopped");
    }

    /// Address the channel server is listening on, when started.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.server.lock().await.as_ref().map(|state| state.addr)
    }
}

async fn accept_loop(
    listener: TcpListener,
    host: Arc<dyn ScriptHost>,
    recv_buffer_size: usize,
    cancel: CancellationToken,
) {
    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => accepted,
        };
        match accepted {
            Ok((stream, peer)) => {
                tracing::debug!(%peer, "debug session connected");
                tokio::spawn(serve_session(
                    stream,
                    host.clone(),
                    recv_buffer_size,
                    cancel.child_token(),
                ));
            }
            Err(err) => {
                tracing::warn!(%err, "failed to accept debug session");
            }
        }
    }
}
