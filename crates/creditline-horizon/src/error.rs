use thiserror::Error;

#[derive(Debug, Error)]
pub enum HorizonError {
    #[error("event source failed: {0}")]
    Source(String),
}
