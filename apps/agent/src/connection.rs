//! Outbound link to the Controller (§6.1)
//!
//! Unlike the Controller side, the Agent is the dialing party, so it
//! cannot reuse [`fleet_transport::TcpChannel`] (hardcoded to the
//! opposite direction). It hand-rolls the same framing directly on top
//! of [`fleet_transport::{read_frame, write_frame}`]: one long-lived
//! socket carries a `Hello` handshake followed by a `CommandRequest`/
//! `CommandResponse` loop, while a second, short-lived socket is opened
//! periodically just to report a heartbeat.

use crate::control_frame::ControlFrame;
use crate::dispatch::{self, AgentContext};
use fleet_transport::{read_frame, write_frame};
use fleet_types::{AgentHello, CommandRequest, CommandResponse, Heartbeat};
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{Disks, System};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

fn gather_system_info() -> fleet_types::SystemInfo {
    let mut sys = System::new_all();
    sys.refresh_all();
    let disks = Disks::new_with_refreshed_list();
    let total_disk = disks.iter().map(|d| d.total_space()).max().unwrap_or(0);

    fleet_types::SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu_cores: u32::try_from(sys.cpus().len()).unwrap_or(0),
        total_memory: sys.total_memory(),
        total_disk,
    }
}

fn sample_resources() -> (f32, f32, f32) {
    let mut sys = System::new_all();
    sys.refresh_all();
    let disks = Disks::new_with_refreshed_list();

    let cpu_pct = sys.global_cpu_usage();
    let mem_pct = if sys.total_memory() == 0 {
        0.0
    } else {
        (sys.used_memory() as f64 / sys.total_memory() as f64 * 100.0) as f32
    };
    let disk_pct = disks
        .iter()
        .max_by_key(|d| d.total_space())
        .filter(|d| d.total_space() > 0)
        .map(|d| ((d.total_space() - d.available_space()) as f64 / d.total_space() as f64 * 100.0) as f32)
        .unwrap_or(0.0);

    (cpu_pct, mem_pct, disk_pct)
}

/// Dials the Controller forever, reconnecting with a fixed delay after
/// every disconnect, and in parallel reports a heartbeat on its own
/// schedule regardless of whether the command channel is currently up.
pub async fn run(controller_addr: String, heartbeat_interval_s: u64, ctx: Arc<AgentContext>) {
    let heartbeat_ctx = Arc::clone(&ctx);
    let heartbeat_addr = controller_addr.clone();
    tokio::spawn(async move {
        heartbeat_loop(heartbeat_addr, heartbeat_interval_s, heartbeat_ctx).await;
    });

    loop {
        if let Err(err) = serve_once(&controller_addr, &ctx).await {
            tracing::warn!(error = %err, "lost connection to controller, reconnecting");
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn serve_once(controller_addr: &str, ctx: &Arc<AgentContext>) -> Result<(), fleet_errors::Error> {
    let mut stream = TcpStream::connect(controller_addr)
        .await
        .map_err(|e| fleet_errors::Error::io_with_path(&e, controller_addr))?;

    let hello = ControlFrame::Hello(AgentHello {
        agent_id: ctx.host_id.clone(),
        ip: local_ip(&stream),
        version: env!("CARGO_PKG_VERSION").to_string(),
        system_info: gather_system_info(),
    });
    write_frame(&mut stream, &hello)
        .await
        .map_err(|e| fleet_errors::Error::io_with_path(&e, "agent hello"))?;
    tracing::info!(host_id = %ctx.host_id, controller_addr, "connected to controller");

    let (tx, mut rx) = mpsc::unbounded_channel::<CommandResponse>();
    let (mut read_half, mut write_half) = stream.into_split();

    let writer = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            if write_frame(&mut write_half, &response).await.is_err() {
                break;
            }
        }
    });

    loop {
        let frame = read_frame::<_, CommandRequest>(&mut read_half)
            .await
            .map_err(|e| fleet_errors::Error::io_with_path(&e, "command request"))?;
        let Some(request) = frame else {
            break;
        };

        let ctx = Arc::clone(ctx);
        let tx = tx.clone();
        tokio::spawn(async move {
            dispatch::dispatch(&ctx, request, tx).await;
        });
    }

    drop(tx);
    let _ = writer.await;
    Ok(())
}

async fn heartbeat_loop(controller_addr: String, interval_s: u64, ctx: Arc<AgentContext>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_s.max(1)));
    loop {
        ticker.tick().await;
        let (cpu_pct, mem_pct, disk_pct) = sample_resources();
        let heartbeat = ControlFrame::Heartbeat(Heartbeat {
            agent_id: ctx.host_id.clone(),
            cpu_pct,
            mem_pct,
            disk_pct,
            ts: chrono::Utc::now(),
        });

        match TcpStream::connect(&controller_addr).await {
            Ok(mut stream) => {
                if let Err(err) = write_frame(&mut stream, &heartbeat).await {
                    tracing::warn!(error = %err, "failed to send heartbeat");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to dial controller for heartbeat"),
        }
    }
}

fn local_ip(stream: &TcpStream) -> String {
    stream
        .local_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "0.0.0.0".to_string())
}
