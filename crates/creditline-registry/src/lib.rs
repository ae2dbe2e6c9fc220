use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use creditline_core::{
    CreditLine, CreditLineRegistry, NewCreditLine, RegistryError, RegistryResult,
    TransitionAction,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

#[derive(Default)]
struct Table {
    order: Vec<String>,
    lines: HashMap<String, Arc<Mutex<CreditLine>>>,
}

/// Volatile registry. Each record has its own lock so transitions on
/// different ids do not wait on each other.
#[derive(Default)]
pub struct InMemoryCreditLineRegistry {
    table: RwLock<Table>,
}

impl InMemoryCreditLineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn entry(&self, id: &str) -> RegistryResult<Arc<Mutex<CreditLine>>> {
        let table = self.table.read().await;
        table
            .lines
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }

    async fn apply(
        &self,
        id: &str,
        action: TransitionAction,
        actor: Option<&str>,
    ) -> RegistryResult<CreditLine> {
        let entry = self.entry(id).await?;
        let mut line = entry.lock().await;

        line.transition(action, actor.map(str::to_string), Utc::now())?;
        info!(credit_line_id = %line.id, status = %line.status, "credit line {action} applied");

        Ok(line.clone())
    }
}

#[async_trait]
impl CreditLineRegistry for InMemoryCreditLineRegistry {
    async fn create(&self, input: NewCreditLine) -> RegistryResult<CreditLine> {
        let line = CreditLine::open(input, Utc::now())?;

        let mut table = self.table.write().await;
        if table.lines.contains_key(&line.id) {
            return Err(RegistryError::AlreadyExists { id: line.id });
        }

        table.order.push(line.id.clone());
        table
            .lines
            .insert(line.id.clone(), Arc::new(Mutex::new(line.clone())));

        info!(credit_line_id = %line.id, status = %line.status, "credit line created");
        Ok(line)
    }

    async fn get(&self, id: &str) -> RegistryResult<CreditLine> {
        let entry = self.entry(id).await?;
        let line = entry.lock().await;
        Ok(line.clone())
    }

    async fn list(&self) -> Vec<CreditLine> {
        let entries: Vec<Arc<Mutex<CreditLine>>> = {
            let table = self.table.read().await;
            table
                .order
                .iter()
                .filter_map(|id| table.lines.get(id).cloned())
                .collect()
        };

        let mut lines = Vec::with_capacity(entries.len());
        for entry in entries {
            lines.push(entry.lock().await.clone());
        }

        debug!(count = lines.len(), "listed credit lines");
        lines
    }

    async fn suspend(&self, id: &str, actor: Option<&str>) -> RegistryResult<CreditLine> {
        self.apply(id, TransitionAction::Suspend, actor).await
    }

    async fn close(&self, id: &str, actor: Option<&str>) -> RegistryResult<CreditLine> {
        self.apply(id, TransitionAction::Close, actor).await
    }
}
