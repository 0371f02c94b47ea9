//! Device command sink
//!
//! Best-effort notification to the household actuator endpoint (an ESP board
//! in the reference deployment). Failures are logged and swallowed; callers
//! may inspect the returned outcome but never need to branch on it.

use crate::config::DeviceConfig;

/// Result of a single best-effort notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The endpoint acknowledged the command
    Sent,
    /// The notification failed (timeout, refused, non-2xx); already logged
    Failed(String),
}

impl NotifyOutcome {
    /// Whether the endpoint acknowledged the command
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Fire-and-forget sender for device commands
pub struct DeviceCommandSink {
    client: reqwest::Client,
    host: String,
}

impl DeviceCommandSink {
    /// Create a sink for the configured endpoint
    #[must_use]
    pub fn new(config: &DeviceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            host: config.host.clone(),
        }
    }

    /// Send a command to the device endpoint
    ///
    /// Accepts arbitrary command strings; the value is URL-encoded into the
    /// query. Never retries and never propagates the failure.
    pub async fn notify(&self, command: &str) -> NotifyOutcome {
        let url = format!(
            "http://{}/command?msg={}",
            self.host,
            urlencoding::encode(command)
        );

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(command = %command, "device command sent");
                NotifyOutcome::Sent
            }
            Ok(response) => {
                let status = response.status();
                tracing::warn!(command = %command, status = %status, "device rejected command");
                NotifyOutcome::Failed(format!("device returned {status}"))
            }
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "could not reach device");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}
