//! Best-effort publication of order events to NATS.

use tracing::{debug, warn};

use crate::domain::events::OrderEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        Self { nats }
    }

    pub fn disabled() -> Self {
        Self { nats: None }
    }

    /// Publish failures are logged and swallowed; the write they describe already happened.
    pub async fn publish(&self, event: OrderEvent) {
        let Some(client) = &self.nats else {
            debug!(subject = event.subject(), "event bus not configured, skipping");
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => {
                warn!(subject = event.subject(), error = %e, "could not serialize event");
                return;
            }
        };
        if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
            warn!(subject = event.subject(), error = %e, "event publish failed");
        }
    }
}
