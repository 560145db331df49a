use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use lyra_host::ScriptHost;

/// Entry module every raw-script request is executed as.
pub const DEBUGGER_MODULE: &str = "debugger.ly";

/// Ack sent when the engine could not run the received script.
pub const FAILED_ACK: &str = "Failed";

/// Prefix of every successful raw-script ack.
pub const OK_ACK_PREFIX: &str = "OK";

/// Serve one debug session over any reliable, ordered byte channel.
///
/// Each received buffer is one request: the whole buffer is script source
/// addressed to the [`DEBUGGER_MODULE`] entry module. Every inbound message
/// triggers exactly one engine execution and exactly one reply on the same
/// channel — no batching, no pipelining, no cross-session routing. The loop
/// ends on peer disconnect, an I/O error, or cancellation.
pub async fn serve_session<S>(
    mut stream: S,
    host: Arc<dyn ScriptHost>,
    recv_buffer_size: usize,
    cancel: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; recv_buffer_size];
    loop {
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            read = stream.read(&mut buf) => read,
        };
        let received = match read {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                tracing::debug!(%err, "debug session read failed");
                break;
            }
        };

        tracing::debug!(bytes = received, "debug request received");
        let ack = execute(host.clone(), buf[..received].to_vec()).await;
        if let Err(err) = stream.write_all(ack.as_bytes()).await {
            tracing::debug!(%err, "debug session write failed");
            break;
        }
        if let Err(err) = stream.flush().await {
            tracing::debug!(%err, "debug session flush failed");
            break;
        }
    }
}

/// Run one request through the engine and encode the acknowledgement.
///
/// The engine runs scripts on its own single thread, so the blocking
/// `ScriptHost::run` call is bridged off the async runtime.
async fn execute(host: Arc<dyn ScriptHost>, source: Vec<u8>) -> String {
    let outcome = tokio::task::spawn_blocking(move || host.run(DEBUGGER_MODULE, &source)).await;
    match outcome {
        Ok(Ok(value)) => format!("{OK_ACK_PREFIX}{}", render_value(&value)),
        Ok(Err(err)) => {
            tracing::debug!(%err, "debug script failed");
            FAILED_ACK.to_string()
        }
        Err(err) => {
            tracing::error!(%err, "engine execution task failed");
            FAILED_ACK.to_string()
        }
    }
}

/// Text form of a script value for the wire.
///
/// Strings render as their raw contents so clients can parse numeric and
/// string returns without unquoting; everything else is compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
