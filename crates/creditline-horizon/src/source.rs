use async_trait::async_trait;
use tracing::debug;

use crate::error::HorizonError;
use crate::event::HorizonEvent;

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events for `contract_ids` newer than `cursor` (the last processed
    /// ledger), or from the network tip when `cursor` is `None`.
    async fn fetch(
        &self,
        cursor: Option<u64>,
        contract_ids: &[String],
    ) -> Result<Vec<HorizonEvent>, HorizonError>;
}

/// Stand-in for the Horizon REST API. Performs no I/O and never yields
/// events.
#[derive(Debug, Clone)]
pub struct SimulatedEventSource {
    horizon_url: String,
}

impl SimulatedEventSource {
    pub fn new(horizon_url: impl Into<String>) -> Self {
        Self {
            horizon_url: horizon_url.into(),
        }
    }
}

#[async_trait]
impl EventSource for SimulatedEventSource {
    async fn fetch(
        &self,
        cursor: Option<u64>,
        contract_ids: &[String],
    ) -> Result<Vec<HorizonEvent>, HorizonError> {
        debug!(
            horizon_url = %self.horizon_url,
            ?cursor,
            contracts = contract_ids.len(),
            "simulated horizon poll"
        );
        Ok(Vec::new())
    }
}
