use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Receive-buffer size used when none is configured: 32 KiB, enough for any
/// script a debugger front end sends in one message.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 32 * 1024;

/// Default upper bound on one engine rendezvous.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;

/// Default loopback port of the debug channel server.
pub const DEFAULT_LISTEN_PORT: u16 = 9320;

/// Debug service configuration.
///
/// All fields are optional in the TOML source; omitted fields take the
/// defaults above.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    /// Address the channel server listens on.
    pub listen: SocketAddr,

    /// Largest inbound message, in bytes.
    pub recv_buffer_size: usize,

    /// Upper bound on the engine rendezvous for one debug command, in
    /// milliseconds. A command the engine has not serviced by then answers
    /// with the pending sentinel instead of hanging the session.
    pub command_timeout_ms: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], DEFAULT_LISTEN_PORT)),
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

impl DebugConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&text)?)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse toml config: {0}")]
    Toml(#[from] toml::de::Error),
}
