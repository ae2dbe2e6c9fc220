pub mod error;
pub mod events;
pub mod models;
pub mod storage;

pub use error::{RegistryError, RegistryResult};
pub use events::{CreditLineEvent, EventAction};
pub use models::{CreditLine, CreditStatus, NewCreditLine, TransitionAction};
pub use storage::CreditLineRegistry;
