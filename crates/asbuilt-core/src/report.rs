//! Report request and the assembled report
//!
//! A [`ReportRequest`] is the JSON payload as received. [`Report`] is what the
//! renderers consume: typed records, the resolved phase selection and every
//! metric, computed once.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::i18n::Language;
use crate::metrics::ReportMetrics;
use crate::phase::{PhaseData, PhaseId, ProjectData};
use crate::InputError;

/// Output artifact kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Multi-sheet workbook
    #[serde(alias = "excel")]
    Xlsx,
    /// Paginated document
    Pdf,
}

impl ReportFormat {
    /// `.pdf` paths produce a document, everything else a workbook.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => ReportFormat::Pdf,
            _ => ReportFormat::Xlsx,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Pdf => "pdf",
        }
    }
}

fn default_complete() -> bool {
    true
}

/// The report request as read from the input stream.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub project_name: String,
    pub data_by_phase: Map<String, Value>,
    pub selected_phases: Vec<String>,
    pub output_path: PathBuf,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_complete")]
    pub complete_report: bool,
    #[serde(default)]
    pub format: Option<ReportFormat>,
}

impl ReportRequest {
    pub fn from_reader(reader: impl Read) -> Result<Self, InputError> {
        let request: Self = serde_json::from_reader(reader)?;
        request.validate()
    }

    pub fn from_json(text: &str) -> Result<Self, InputError> {
        let request: Self = serde_json::from_str(text)?;
        request.validate()
    }

    fn validate(self) -> Result<Self, InputError> {
        if self.output_path.as_os_str().is_empty() {
            return Err(InputError::Missing("outputPath"));
        }
        Ok(self)
    }

    /// Requested format, or the one implied by the output path.
    pub fn resolved_format(&self) -> ReportFormat {
        self.format
            .unwrap_or_else(|| ReportFormat::from_path(&self.output_path))
    }
}

/// Goal constants the report compares its figures against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Targets {
    /// Crane efficiency goal, percent
    pub crane_efficiency: f64,
    /// Phase completion goal, percent
    pub completion: f64,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            crane_efficiency: 85.0,
            completion: 100.0,
        }
    }
}

/// Whether a figure reaches its goal. Reaching it exactly counts as met.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetStatus {
    Met,
    Attention,
}

impl TargetStatus {
    pub fn of(value: f64, target: f64) -> Self {
        if value >= target {
            TargetStatus::Met
        } else {
            TargetStatus::Attention
        }
    }

    /// Translation key of the label.
    pub fn label_key(self) -> &'static str {
        match self {
            TargetStatus::Met => "target.met",
            TargetStatus::Attention => "target.attention",
        }
    }
}

/// A report ready to render.
#[derive(Clone, Debug)]
pub struct Report {
    pub project_name: String,
    pub language: Language,
    /// Include cover, summary, dashboard and analysis sections
    pub complete: bool,
    pub data: ProjectData,
    /// Selected phases, deduplicated, in request order
    pub selected: Vec<PhaseId>,
    pub metrics: ReportMetrics,
    pub targets: Targets,
    pub generated_at: NaiveDateTime,
}

impl Report {
    pub fn from_request(request: ReportRequest) -> Self {
        let data = ProjectData::from_raw(request.data_by_phase);
        let metrics = ReportMetrics::compute(&data);

        let mut selected: Vec<PhaseId> = Vec::new();
        for key in &request.selected_phases {
            let id = PhaseId::from_key(key);
            if !selected.contains(&id) {
                selected.push(id);
            }
        }

        Self {
            project_name: request.project_name,
            language: request.language,
            complete: request.complete_report,
            data,
            selected,
            metrics,
            targets: Targets::default(),
            generated_at: Local::now().naive_local(),
        }
    }

    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.targets = targets;
        self
    }

    /// Pin the generation timestamp (reproducible output).
    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = at;
        self
    }

    /// Selected phases that exist in the data and have at least one record.
    ///
    /// Selected phases missing from the data are skipped, never rendered empty.
    pub fn rendered_phases(&self) -> impl Iterator<Item = &PhaseData> {
        self.selected.iter().filter_map(|id| {
            let phase = self.data.phase(id);
            if phase.is_none() {
                tracing::debug!(phase = %id, "selected phase not present in data; skipping");
            }
            phase.filter(|p| !p.records.is_empty())
        })
    }

    /// Translate a key into the report language.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        crate::i18n::translate(key, self.language)
    }

    /// Display title of a phase.
    pub fn phase_title(&self, phase: &PhaseId) -> String {
        match phase.title_key() {
            Some(key) => self.t(key).to_string(),
            None => phase.key().to_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "projectName": "Parque Eólico",
        "dataByPhase": {"recepcao": [{"turbina": "T1"}]},
        "selectedPhases": ["recepcao", "assemblagem", "recepcao"],
        "outputPath": "/tmp/report.xlsx"
    }"#;

    #[test]
    fn target_boundary_counts_as_met() {
        let targets = Targets::default();
        assert_eq!(TargetStatus::of(85.0, targets.crane_efficiency), TargetStatus::Met);
        assert_eq!(TargetStatus::of(84.9, targets.crane_efficiency), TargetStatus::Attention);
        assert_eq!(TargetStatus::of(100.0, targets.completion), TargetStatus::Met);
        assert_eq!(TargetStatus::of(99.99, targets.completion), TargetStatus::Attention);
        assert_eq!(TargetStatus::Met.label_key(), "target.met");
    }

    #[test]
    fn defaults_applied() {
        let request = ReportRequest::from_json(MINIMAL).unwrap();
        assert_eq!(request.language, Language::Pt);
        assert!(request.complete_report);
        assert_eq!(request.resolved_format(), ReportFormat::Xlsx);
    }

    #[test]
    fn missing_required_key_is_fatal() {
        let err = ReportRequest::from_json(r#"{"projectName": "X", "dataByPhase": {}, "selectedPhases": []}"#)
            .unwrap_err();
        assert!(err.to_string().contains("outputPath"), "{err}");
    }

    #[test]
    fn empty_output_path_is_fatal() {
        let err = ReportRequest::from_json(
            r#"{"projectName": "X", "dataByPhase": {}, "selectedPhases": [], "outputPath": ""}"#,
        )
        .unwrap_err();
        assert!(matches!(err, InputError::Missing("outputPath")));
    }

    #[test]
    fn format_from_extension_or_field() {
        assert_eq!(ReportFormat::from_path(Path::new("a/b.PDF")), ReportFormat::Pdf);
        assert_eq!(ReportFormat::from_path(Path::new("a/b.xlsx")), ReportFormat::Xlsx);
        assert_eq!(ReportFormat::from_path(Path::new("noext")), ReportFormat::Xlsx);

        let request = ReportRequest::from_json(
            r#"{"projectName": "X", "dataByPhase": {}, "selectedPhases": [], "outputPath": "r.xlsx", "format": "pdf"}"#,
        )
        .unwrap();
        assert_eq!(request.resolved_format(), ReportFormat::Pdf);
    }

    #[test]
    fn selection_deduplicated_and_filtered() {
        let report = Report::from_request(ReportRequest::from_json(MINIMAL).unwrap());
        assert_eq!(report.selected, vec![PhaseId::Reception, PhaseId::Assembly]);

        let rendered: Vec<_> = report.rendered_phases().map(|p| p.id.clone()).collect();
        assert_eq!(rendered, vec![PhaseId::Reception]);
    }
}
