use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A contract event as reported by Horizon. `id` is the paging token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HorizonEvent {
    pub id: String,
    pub ledger: u64,
    pub contract_id: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub payload: Value,
}
