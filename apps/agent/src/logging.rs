//! Bridges the domain event bus onto `tracing`: structured fields for
//! the events an operator cares about, a `Debug`-dump fallback for the
//! rest.

use fleet_events::{AppEvent, EventLevel, InstallEvent, PrecheckEvent, SupervisorEvent};

pub fn init_tracing(config: &fleet_config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("info,fleetd={}", config.level)));

    if config.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Drains domain events onto `tracing` until the channel closes.
pub async fn run_event_bridge(mut events: fleet_events::EventReceiver) {
    while let Some(event) = events.recv().await {
        log_event(&event);
    }
}

fn log_event(event: &AppEvent) {
    let target = event.log_target();
    match event {
        AppEvent::Install(InstallEvent::StepProgress { installation_id, step, progress, message }) => {
            tracing::info!(target: target, installation_id, step = step.name(), progress, message, "install step progress");
        }
        AppEvent::Precheck(PrecheckEvent::Completed { host_id, overall_status }) => {
            tracing::info!(target: target, host_id, overall_status, "precheck completed");
        }
        AppEvent::Supervisor(SupervisorEvent::ProcessCrashed { name }) => {
            tracing::error!(target: target, process = name, "process crashed");
        }
        AppEvent::Supervisor(SupervisorEvent::RestartScheduled { name, attempt }) => {
            tracing::warn!(target: target, process = name, attempt, "restart scheduled");
        }
        _ => match event.log_level() {
            EventLevel::Trace => tracing::trace!(target: target, ?event, "event"),
            EventLevel::Debug => tracing::debug!(target: target, ?event, "event"),
            EventLevel::Info => tracing::info!(target: target, ?event, "event"),
            EventLevel::Warn => tracing::warn!(target: target, ?event, "event"),
            EventLevel::Error => tracing::error!(target: target, ?event, "event"),
        },
    }
}
