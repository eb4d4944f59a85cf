//! In-process `Channel` implementation for tests and single-binary demos
//!
//! Bypasses the wire entirely: requests are handed directly to a
//! handler closure running on a spawned task, which replies by calling
//! [`CommandTransport::handle_response`] itself. Used where a real
//! Agent process is not available (unit tests, the `apps/agent`
//! in-process demo mode).

use crate::channel::Channel;
use async_trait::async_trait;
use fleet_errors::Error;
use fleet_types::CommandRequest;
use tokio::sync::mpsc;

pub struct InProcessChannel {
    sender: mpsc::UnboundedSender<CommandRequest>,
}

impl InProcessChannel {
    /// Returns a channel paired with the receiving half a test harness
    /// or in-process Agent loop can drive.
    #[must_use]
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<CommandRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: tx }, rx)
    }
}

#[async_trait]
impl Channel for InProcessChannel {
    async fn send_request(&self, request: &CommandRequest) -> Result<(), Error> {
        self.sender
            .send(request.clone())
            .map_err(|_| Error::internal("in-process channel receiver dropped"))
    }
}
