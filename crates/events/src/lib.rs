#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication between fleetd components
//!
//! All output goes through events; no component below the CLI layer
//! prints or logs directly. A [`tokio::sync::mpsc`] channel carries
//! [`AppEvent`]s from producers (downloader, orchestrator, supervisor...)
//! to a sink, typically the tracing bridge in the binary crates.

pub mod events;
pub mod meta;
pub mod progress;

pub use events::{
    AppEvent, DownloadEvent, GeneralEvent, InstallEvent, PluginEvent, PrecheckEvent,
    RegistryEvent, SupervisorEvent, TransferEvent,
};
pub use meta::{EventLevel, EventMeta, EventSource};
pub use progress::{ProgressSample, ProgressTracker};

use tokio::sync::mpsc;

#[derive(Clone)]
pub struct EventSender(mpsc::UnboundedSender<AppEvent>);

pub struct EventReceiver(mpsc::UnboundedReceiver<AppEvent>);

#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender(tx), EventReceiver(rx))
}

impl EventSender {
    /// Sends an event, silently dropping it if the receiver has gone away.
    /// Event delivery is best-effort observability, never load-bearing.
    pub fn send(&self, event: AppEvent) {
        let _ = self.0.send(event);
    }
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.0.recv().await
    }
}

/// Ergonomic per-domain emission helpers, so call sites read as
/// `tx.emit_download(DownloadEvent::Started { .. })` instead of
/// constructing the `AppEvent` wrapper by hand.
pub trait EventEmitter {
    fn emit_download(&self, event: DownloadEvent);
    fn emit_transfer(&self, event: TransferEvent);
    fn emit_install(&self, event: InstallEvent);
    fn emit_precheck(&self, event: PrecheckEvent);
    fn emit_supervisor(&self, event: SupervisorEvent);
    fn emit_registry(&self, event: RegistryEvent);
    fn emit_plugin(&self, event: PluginEvent);
    fn emit_warning(&self, message: impl Into<String>);
    fn emit_error(&self, message: impl Into<String>);
}

impl EventEmitter for EventSender {
    fn emit_download(&self, event: DownloadEvent) {
        self.send(AppEvent::Download(event));
    }

    fn emit_transfer(&self, event: TransferEvent) {
        self.send(AppEvent::Transfer(event));
    }

    fn emit_install(&self, event: InstallEvent) {
        self.send(AppEvent::Install(event));
    }

    fn emit_precheck(&self, event: PrecheckEvent) {
        self.send(AppEvent::Precheck(event));
    }

    fn emit_supervisor(&self, event: SupervisorEvent) {
        self.send(AppEvent::Supervisor(event));
    }

    fn emit_registry(&self, event: RegistryEvent) {
        self.send(AppEvent::Registry(event));
    }

    fn emit_plugin(&self, event: PluginEvent) {
        self.send(AppEvent::Plugin(event));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.send(AppEvent::General(GeneralEvent::Warning {
            message: message.into(),
        }));
    }

    fn emit_error(&self, message: impl Into<String>) {
        self.send(AppEvent::General(GeneralEvent::Error {
            message: message.into(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_are_delivered_in_order() {
        let (tx, mut rx) = channel();
        tx.emit_warning("first");
        tx.emit_error("second");
        let e1 = rx.recv().await.unwrap();
        let e2 = rx.recv().await.unwrap();
        assert!(matches!(e1, AppEvent::General(GeneralEvent::Warning { .. })));
        assert!(matches!(e2, AppEvent::General(GeneralEvent::Error { .. })));
    }
}
