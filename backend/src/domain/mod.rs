pub mod billing_service;
pub mod commands;
pub mod error;
pub mod export_service;
pub mod herd_service;
pub mod lineage;
pub mod models;
pub mod ranch_service;
pub mod search;
pub mod team_service;

pub use billing_service::BillingService;
pub use error::{DomainError, DomainResult};
pub use export_service::ExportService;
pub use herd_service::HerdService;
pub use ranch_service::RanchService;
pub use team_service::TeamService;
