//! Command request/response multiplexing, correlated by `command_id` (§4.5)

use crate::channel::Channel;
use dashmap::DashMap;
use fleet_errors::{Error, TransportError};
use fleet_types::{CommandRequest, CommandResponse, CommandStatus, CommandType};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Routes outbound commands to per-agent [`Channel`]s and correlates
/// inbound [`CommandResponse`]s back to the caller awaiting them.
///
/// Responses for the same `command_id` are expected in non-decreasing
/// progress; duplicates are tolerated (a repeated watch notification is
/// simply a no-op observation).
pub struct CommandTransport {
    channels: DashMap<String, Arc<dyn Channel>>,
    pending: DashMap<String, watch::Sender<CommandResponse>>,
}

impl Default for CommandTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            pending: DashMap::new(),
        }
    }

    pub fn register_channel(&self, agent_id: &str, channel: Arc<dyn Channel>) {
        self.channels.insert(agent_id.to_string(), channel);
    }

    pub fn unregister_channel(&self, agent_id: &str) {
        self.channels.remove(agent_id);
    }

    /// Dispatches a command without waiting for completion, returning
    /// its `command_id` immediately.
    ///
    /// # Errors
    /// Returns `TransportError::ChannelClosed` if no channel is
    /// registered for `agent_id`.
    pub async fn send_async(
        &self,
        agent_id: &str,
        command_type: CommandType,
        params: HashMap<String, String>,
        timeout_s: u64,
    ) -> Result<String, Error> {
        let channel = self
            .channels
            .get(agent_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| TransportError::ChannelClosed {
                agent_id: agent_id.to_string(),
            })?;

        let command_id = uuid::Uuid::new_v4().to_string();
        let request = CommandRequest {
            command_id: command_id.clone(),
            command_type,
            params,
            timeout_s,
        };

        let (tx, _rx) = watch::channel(CommandResponse::running(command_id.clone(), 0, ""));
        self.pending.insert(command_id.clone(), tx);

        channel.send_request(&request).await?;
        Ok(command_id)
    }

    /// Dispatches a command and blocks until it reaches a terminal
    /// status or `timeout_s` elapses.
    ///
    /// # Errors
    /// Returns `TransportError::Timeout` if no terminal response
    /// arrives in time; the Agent may still be executing, since no
    /// cancellation is sent automatically.
    pub async fn send_sync(
        &self,
        agent_id: &str,
        command_type: CommandType,
        params: HashMap<String, String>,
        timeout_s: u64,
    ) -> Result<CommandResponse, Error> {
        let command_id = self
            .send_async(agent_id, command_type, params, timeout_s)
            .await?;

        let mut rx = self
            .pending
            .get(&command_id)
            .map(|e| e.value().subscribe())
            .ok_or_else(|| TransportError::UnknownCommand(command_id.clone()))?;

        let wait = async {
            loop {
                {
                    let response = rx.borrow();
                    if response.status != CommandStatus::Running {
                        return response.clone();
                    }
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
            rx.borrow().clone()
        };

        match tokio::time::timeout(Duration::from_secs(timeout_s), wait).await {
            Ok(response) => Ok(response),
            Err(_) => Err(TransportError::Timeout {
                command_id,
                timeout_s,
            }
            .into()),
        }
    }

    /// Returns the latest known response for `command_id`.
    ///
    /// # Errors
    /// Returns `TransportError::UnknownCommand` if no command with
    /// this id was ever dispatched.
    pub fn get_status(&self, command_id: &str) -> Result<CommandResponse, Error> {
        self.pending
            .get(command_id)
            .map(|e| e.value().borrow().clone())
            .ok_or_else(|| TransportError::UnknownCommand(command_id.to_string()).into())
    }

    /// Feeds an inbound response (from the Agent, over the wire) into
    /// the correlation table, waking any `send_sync` waiter.
    pub fn handle_response(&self, response: CommandResponse) {
        if let Some(entry) = self.pending.get(&response.command_id) {
            let _ = entry.value().send(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoChannel {
        transport: std::sync::Weak<CommandTransport>,
        sent: Mutex<Vec<CommandRequest>>,
    }

    #[async_trait]
    impl Channel for EchoChannel {
        async fn send_request(&self, request: &CommandRequest) -> Result<(), Error> {
            self.sent.lock().unwrap().push(request.clone());
            if let Some(transport) = self.transport.upgrade() {
                transport.handle_response(CommandResponse::success(request.command_id.clone(), "done"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn send_sync_resolves_on_echoed_success() {
        let transport = Arc::new(CommandTransport::new());
        let channel = Arc::new(EchoChannel {
            transport: Arc::downgrade(&transport),
            sent: Mutex::new(Vec::new()),
        });
        transport.register_channel("agent-1", channel);

        let response = transport
            .send_sync("agent-1", CommandType::Status, HashMap::new(), 5)
            .await
            .unwrap();
        assert_eq!(response.status, CommandStatus::Success);
    }

    #[tokio::test]
    async fn send_async_returns_unknown_channel_error() {
        let transport = CommandTransport::new();
        let err = transport
            .send_async("ghost", CommandType::Status, HashMap::new(), 5)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::ChannelClosed { .. })
        ));
    }

    #[tokio::test]
    async fn get_status_for_unknown_command_errors() {
        let transport = CommandTransport::new();
        let err = transport.get_status("nope").unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::UnknownCommand(_))
        ));
    }
}
