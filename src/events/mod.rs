use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Events emitted by the workflows after a successful state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Customer events
    CustomerRegistered { customer_id: i64 },

    // Cart events
    CartCreated { cart_id: i64, customer_id: i64 },
    CartItemsMerged { cart_id: i64, item_count: usize },
    CartItemRemoved { cart_item_id: i64 },

    // Checkout events
    TransactionCreated { transaction_id: i64, cart_id: i64 },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the processor
    /// has shut down. Event delivery is never allowed to fail a request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Event processing loop, spawned once at startup.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::CustomerRegistered { customer_id } => {
                info!(customer_id, "customer registered");
            }
            Event::CartCreated {
                cart_id,
                customer_id,
            } => {
                info!(cart_id, customer_id, "cart created");
            }
            Event::CartItemsMerged {
                cart_id,
                item_count,
            } => {
                info!(cart_id, item_count, "cart items merged");
            }
            Event::CartItemRemoved { cart_item_id } => {
                info!(cart_item_id, "cart item removed");
            }
            Event::TransactionCreated {
                transaction_id,
                cart_id,
            } => {
                info!(transaction_id, cart_id, "transaction created");
            }
        }

        if let Err(e) = audit(&event) {
            error!("Failed to serialize event for audit log: {}", e);
        }
    }

    info!("Event processing loop stopped");
}

fn audit(event: &Event) -> Result<(), serde_json::Error> {
    let payload = serde_json::to_string(event)?;
    info!(target: "audit", %payload, "event");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_does_not_fail_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sender = EventSender::new(tx);
        // Must not panic or return an error path to the caller
        sender
            .send_or_log(Event::CartCreated {
                cart_id: 1,
                customer_id: 1,
            })
            .await;
    }

    #[tokio::test]
    async fn events_round_trip_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::TransactionCreated {
                transaction_id: 7,
                cart_id: 3,
            })
            .await
            .expect("send event");

        match rx.recv().await {
            Some(Event::TransactionCreated {
                transaction_id,
                cart_id,
            }) => {
                assert_eq!(transaction_id, 7);
                assert_eq!(cart_id, 3);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
