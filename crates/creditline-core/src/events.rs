use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TransitionAction;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Created,
    Suspended,
    Closed,
}

impl From<TransitionAction> for EventAction {
    fn from(action: TransitionAction) -> Self {
        match action {
            TransitionAction::Suspend => Self::Suspended,
            TransitionAction::Close => Self::Closed,
        }
    }
}

/// One entry of a credit line's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreditLineEvent {
    pub action: EventAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}
