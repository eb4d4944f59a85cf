//! Inbound Agent connection handling (§6.1)
//!
//! An Agent dials in and sends exactly one [`ControlFrame`] before
//! either being promoted to a long-lived command channel (`Hello`) or
//! having its heartbeat recorded and the socket closed (`Heartbeat`).
//! Only `Hello` connections survive past this function.

use crate::control_frame::ControlFrame;
use fleet_registry::AgentRegistry;
use fleet_transport::{read_frame, CommandTransport, TcpChannel};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

pub async fn run(
    bind_addr: &str,
    registry: Arc<AgentRegistry>,
    transport: Arc<CommandTransport>,
) -> Result<(), fleet_errors::Error> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| fleet_errors::Error::io_with_path(&e, bind_addr))?;
    tracing::info!(bind_addr, "controller listening for agents");

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "accept failed");
                continue;
            }
        };

        let registry = Arc::clone(&registry);
        let transport = Arc::clone(&transport);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, peer_addr.ip().to_string(), registry, transport).await {
                tracing::warn!(error = %err, %peer_addr, "agent connection closed with error");
            }
        });
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer_ip: String,
    registry: Arc<AgentRegistry>,
    transport: Arc<CommandTransport>,
) -> Result<(), fleet_errors::Error> {
    let Some(frame) = read_frame::<_, ControlFrame>(&mut stream)
        .await
        .map_err(|e| fleet_errors::Error::io_with_path(&e, "agent control frame"))?
    else {
        return Ok(());
    };

    match frame {
        ControlFrame::Hello(hello) => {
            let agent_id = hello.agent_id.clone();
            registry.register(
                Some(hello.agent_id.clone()),
                &hello.agent_id,
                &peer_ip,
                &hello.version,
                hello.system_info,
            );

            let channel = TcpChannel::spawn(stream, Arc::clone(&transport));
            transport.register_channel(&agent_id, channel);
            tracing::info!(agent_id, ip = %peer_ip, "agent registered as command channel");
        }
        ControlFrame::Heartbeat(hb) => {
            if let Err(err) = registry.heartbeat(&hb.agent_id, hb.cpu_pct, hb.mem_pct, hb.disk_pct) {
                tracing::warn!(agent_id = %hb.agent_id, error = %err, "heartbeat from unknown agent");
            }
        }
    }

    Ok(())
}
