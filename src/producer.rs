//! NATS message producer for fused decisions

use crate::types::decision::{DecisionEnvelope, FusedDecision};
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Producer for publishing fused decisions to NATS
#[derive(Clone)]
pub struct DecisionProducer {
    client: Client,
    subject: String,
}

impl DecisionProducer {
    /// Create a new decision producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a fused decision.
    ///
    /// The decision id and emission timestamp are stamped here, on the wire
    /// envelope; the decision itself stays a pure function of its inputs.
    pub async fn publish(&self, decision: &FusedDecision) -> Result<()> {
        let envelope = DecisionEnvelope::new(decision.clone());
        let payload = serde_json::to_vec(&envelope)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            decision_id = %envelope.decision_id,
            case_id = %envelope.decision.case_id,
            final_decision = ?envelope.decision.final_decision,
            "Published fused decision"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
