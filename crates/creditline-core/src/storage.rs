use async_trait::async_trait;

use crate::error::RegistryResult;
use crate::models::{CreditLine, NewCreditLine};

/// Owner of all credit line records.
///
/// Implementations must make `suspend` and `close` linearizable per id: the
/// transition check and the mutation happen as one step. Operations on
/// different ids are independent.
#[async_trait]
pub trait CreditLineRegistry: Send + Sync {
    /// Stores a new line with a single `created` event. Duplicate ids are
    /// rejected with `AlreadyExists`.
    async fn create(&self, input: NewCreditLine) -> RegistryResult<CreditLine>;

    async fn get(&self, id: &str) -> RegistryResult<CreditLine>;

    /// All lines in insertion order.
    async fn list(&self) -> Vec<CreditLine>;

    async fn suspend(&self, id: &str, actor: Option<&str>) -> RegistryResult<CreditLine>;

    async fn close(&self, id: &str, actor: Option<&str>) -> RegistryResult<CreditLine>;
}
