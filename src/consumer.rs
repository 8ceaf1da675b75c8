//! NATS consumer for incoming application records
//!
//! Owns the wire boundary on the inbound side: subscribes to the
//! application subject and decodes each payload into an
//! [`ApplicationRecord`]. A malformed payload surfaces as an `Err` item on
//! the stream, not a dropped message, so the processing loop can count and
//! log it.

use crate::types::ApplicationRecord;
use anyhow::{Context, Result};
use async_nats::Client;
use futures::{Stream, StreamExt};
use tracing::info;

/// Consumer yielding decoded application records from NATS
pub struct ApplicationConsumer {
    client: Client,
    subject: String,
}

impl ApplicationConsumer {
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Subscribe and decode incoming applications.
    ///
    /// Each stream item is one decoded record or the decode error for that
    /// message.
    pub async fn records(&self) -> Result<impl Stream<Item = Result<ApplicationRecord>>> {
        let subscriber = self.client.subscribe(self.subject.clone()).await?;
        info!(subject = %self.subject, "Subscribed to application subject");
        Ok(subscriber.map(|message| decode_record(&message.payload)))
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

fn decode_record(payload: &[u8]) -> Result<ApplicationRecord> {
    serde_json::from_slice(payload).context("Invalid application record payload")
}
