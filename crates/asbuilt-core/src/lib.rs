//! # asbuilt-core
//!
//! Domain model and metrics for as-built installation reports of wind-turbine
//! projects.
//!
//! This crate provides:
//! - Input types: [`ReportRequest`], typed per-phase records, crane events
//! - Tolerant parsers for durations, percentages and dates
//! - Report metrics: turbine status, phase completion, weekly timeline,
//!   crane utilization, planned-vs-actual deviations
//! - Translations for the report labels
//! - The [`Renderer`] trait and error types
//!
//! ## Example
//!
//! ```rust
//! use asbuilt_core::{Report, ReportRequest};
//!
//! let request = ReportRequest::from_json(r#"{
//!     "projectName": "Parque Eólico Serra Alta",
//!     "dataByPhase": {
//!         "recepcao": [{"turbinaId": "T01", "status": "Concluído", "dataDescarga": "2024-01-15"}]
//!     },
//!     "selectedPhases": ["recepcao"],
//!     "outputPath": "serra_alta.xlsx"
//! }"#).unwrap();
//!
//! let report = Report::from_request(request);
//! assert_eq!(report.metrics.turbines.completed, 1);
//! ```

pub mod crane;
pub mod i18n;
pub mod metrics;
pub mod parse;
pub mod phase;
pub mod record;
pub mod report;

pub use crane::{ActivityType, CraneEvent};
pub use i18n::{translate, Language};
pub use metrics::{
    CraneEfficiency, CraneUtilization, Deviation, DeviationClass, DeviationReport, Observation,
    ObservationKind, PhaseCompletion, ReportMetrics, StoppageReason, TurbineStatusSummary,
    WeeklyBucket, WeeklyTimeline,
};
pub use phase::{PhaseData, PhaseId, PhaseRecords, ProjectData};
pub use record::{DateField, InstallationRecord, RecordDetail, StatusClass};
pub use report::{Report, ReportFormat, ReportRequest, TargetStatus, Targets};

use thiserror::Error;

// ============================================================================
// Traits
// ============================================================================

/// Output renderer for an assembled report
pub trait Renderer {
    type Output;

    /// Render the report to the output format
    fn render(&self, report: &Report) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Report request error
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid report request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    Missing(&'static str),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
