use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistryError;
use crate::events::{CreditLineEvent, EventAction};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    #[default]
    Active,
    Suspended,
    Closed,
}

impl CreditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Closed => "closed",
        }
    }

    /// Status reached by applying `action`, or `None` when the edge is not
    /// in the transition table.
    pub fn apply(self, action: TransitionAction) -> Option<CreditStatus> {
        match (self, action) {
            (Self::Active, TransitionAction::Suspend) => Some(Self::Suspended),
            (Self::Active, TransitionAction::Close) => Some(Self::Closed),
            (Self::Suspended, TransitionAction::Close) => Some(Self::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransitionAction {
    Suspend,
    Close,
}

impl TransitionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Suspend => "suspend",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreditLine {
    pub id: String,
    pub status: CreditStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub events: Vec<CreditLineEvent>,
}

impl CreditLine {
    pub fn open(input: NewCreditLine, now: DateTime<Utc>) -> Result<Self, RegistryError> {
        let id = match input.id {
            Some(id) => {
                let id = id.trim();
                if id.is_empty() {
                    return Err(RegistryError::InvalidId);
                }
                id.to_string()
            }
            None => Uuid::new_v4().to_string(),
        };

        Ok(Self {
            id,
            status: input.status,
            created_at: now,
            updated_at: now,
            events: vec![CreditLineEvent {
                action: EventAction::Created,
                timestamp: now,
                actor: input.actor,
            }],
        })
    }

    /// Applies `action` in place. On error the line is left untouched.
    pub fn transition(
        &mut self,
        action: TransitionAction,
        actor: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let next = self
            .status
            .apply(action)
            .ok_or(RegistryError::InvalidTransition {
                current: self.status,
                action,
            })?;

        // Wall clock can step backwards; the audit trail must not.
        let timestamp = now.max(self.updated_at);

        self.status = next;
        self.updated_at = timestamp;
        self.events.push(CreditLineEvent {
            action: action.into(),
            timestamp,
            actor,
        });

        Ok(())
    }

    pub fn last_action(&self) -> Option<EventAction> {
        self.events.last().map(|event| event.action)
    }
}

/// Input for creating a credit line. Build with [`NewCreditLine::with_id`]
/// or [`NewCreditLine::generated`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCreditLine {
    id: Option<String>,
    status: CreditStatus,
    actor: Option<String>,
}

impl NewCreditLine {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn generated() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: CreditStatus) -> Self {
        self.status = status;
        self
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}
