pub mod config;
pub mod contracts;
pub mod db;
pub mod migrations;

pub use config::ServiceConfig;
pub use contracts::{CreateCreditLineRequest, DataResponse, ErrorBody, EvaluateRiskRequest};
pub use db::{REQUIRED_TABLES, connect_database, validate_schema};
pub use migrations::{Migration, MigrationError, discover_migrations, run_migrations};
