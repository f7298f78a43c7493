use daprctl_common::{info_message, Colorize};
use serde_json::Value;
use tracing::info;

/// Receives every event the endpoint managed to decode.
pub trait EventSink: Send + Sync + 'static {
    fn deliver(&self, route: &str, event: Value);
}

/// Shows events to the operator on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleEventSink;

impl EventSink for ConsoleEventSink {
    fn deliver(&self, route: &str, event: Value) {
        info!(route, "event received");

        let rendered = serde_json::to_string_pretty(&event).unwrap_or_else(|_| event.to_string());
        info_message!("Event received on {}:\n{}", route, rendered);
    }
}
