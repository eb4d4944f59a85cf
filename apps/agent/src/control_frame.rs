//! First-frame discriminator for a freshly opened Controller<->Agent
//! socket (§6.1). `fleet-transport`'s `Channel`/`TcpChannel` only know
//! how to carry `CommandRequest`/`CommandResponse` once a connection has
//! been claimed as the long-lived command channel for an agent; this
//! tiny tagged enum lets the Controller's accept loop tell that case
//! apart from a one-shot heartbeat ping before handing the socket off.

use fleet_types::{AgentHello, Heartbeat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlFrame {
    Hello(AgentHello),
    Heartbeat(Heartbeat),
}
