use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Domain events emitted after a unit of work commits. Consumers are
/// observability-only; publishing failures never fail the request.
#[derive(Clone, Debug, Serialize)]
pub enum Event {
    AppointmentCreated {
        appointment_id: i64,
    },
    AppointmentStatusChanged {
        appointment_id: i64,
        old_status: String,
        new_status: String,
    },
    AppointmentConfirmed {
        appointment_id: i64,
        receipt_id: i64,
        total_amount: Decimal,
    },
    AppointmentDeleted {
        appointment_id: i64,
    },
    InventoryDeducted {
        item_id: i64,
        quantity: i32,
    },
    InventoryRestocked {
        item_id: i64,
        quantity: i32,
    },
    SlotReleased {
        slot_id: i64,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing the failure to the caller. Callers treat a
    /// failed send as a warning, not an error.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }

    /// Fire-and-forget publish that logs instead of returning the failure.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("{e}");
        }
    }
}

/// Drains the event channel, logging each event. Runs until every
/// `EventSender` clone is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::AppointmentStatusChanged {
                appointment_id,
                old_status,
                new_status,
            } => info!(
                appointment_id,
                %old_status,
                %new_status,
                "appointment status changed"
            ),
            Event::AppointmentConfirmed {
                appointment_id,
                receipt_id,
                total_amount,
            } => info!(
                appointment_id,
                receipt_id,
                %total_amount,
                "appointment confirmed"
            ),
            other => info!(event = ?other, "domain event"),
        }
    }
}
