//! # RanchBook backend
//!
//! Record keeping for small livestock ranches: ranches, herds, tags,
//! team membership, billing tiers, and spreadsheet export, over a
//! file-backed record store.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use domain::{BillingService, ExportService, HerdService, RanchService, TeamService};
use io::rest::AppState;
use storage::csv::{CsvConnection, PastureRepository};

/// Main backend struct that wires all services over one explicitly
/// constructed connection.
pub struct Backend {
    pub herd_service: HerdService<CsvConnection>,
    pub team_service: TeamService,
    pub ranch_service: RanchService,
    pub billing_service: BillingService,
    pub export_service: ExportService,
}

impl Backend {
    /// Create a new backend instance rooted at the given data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let csv_conn = Arc::new(CsvConnection::new(data_dir)?);

        let billing_service = BillingService::new(csv_conn.clone());
        let herd_service = HerdService::new(
            csv_conn.as_ref().clone(),
            billing_service.clone(),
            PastureRepository::new(csv_conn.clone()),
        );
        let team_service = TeamService::new(csv_conn.clone());
        let ranch_service = RanchService::new(csv_conn.clone());
        let export_service = ExportService::new();

        Ok(Backend {
            herd_service,
            team_service,
            ranch_service,
            billing_service,
            export_service,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            herd_service: self.herd_service.clone(),
            team_service: self.team_service.clone(),
            ranch_service: self.ranch_service.clone(),
            billing_service: self.billing_service.clone(),
            export_service: self.export_service.clone(),
        }
    }
}
