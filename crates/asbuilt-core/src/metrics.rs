//! Report metrics
//!
//! Every figure in the report is derived here from a [`ProjectData`] in a
//! single pass per aggregate. Nothing is cached between runs.
//!
//! - [`TurbineStatusSummary`]: distinct turbines by their last seen status
//! - [`PhaseCompletion`]: completed vs total records per installation phase
//! - [`WeeklyTimeline`]: records per ISO week
//! - [`CraneUtilization`]: work/stoppage hours, per-crane efficiency, stoppage reasons
//! - [`DeviationReport`]: planned vs actual dates
//! - [`Observation`]: items worth a stakeholder's attention

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::crane::{ActivityType, CraneEvent};
use crate::phase::{PhaseId, ProjectData};
use crate::record::{normalize_status, StatusClass};

/// How many items an aggregate looked at and how many it could use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub examined: usize,
    pub included: usize,
}

impl Coverage {
    pub fn excluded(&self) -> usize {
        self.examined - self.included
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

// ============================================================================
// Turbine status
// ============================================================================

/// Distinct turbines tallied by status.
///
/// A turbine's status is the one on the last record seen for it while walking
/// the phases in input order. Later phases overwrite earlier ones regardless
/// of dates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TurbineStatusSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub planned: usize,
    /// Final normalized status per turbine
    pub statuses: BTreeMap<String, String>,
}

impl TurbineStatusSummary {
    pub fn compute(data: &ProjectData) -> Self {
        let mut statuses = BTreeMap::new();
        for (_, record) in data.installation_records() {
            if record.turbine.trim().is_empty() {
                continue;
            }
            statuses.insert(record.turbine.clone(), normalize_status(&record.status));
        }

        let mut summary = Self {
            total: statuses.len(),
            ..Self::default()
        };
        for status in statuses.values() {
            match StatusClass::classify(status) {
                StatusClass::Completed => summary.completed += 1,
                StatusClass::InProgress => summary.in_progress += 1,
                StatusClass::Planned => summary.planned += 1,
            }
        }
        summary.statuses = statuses;
        summary
    }

    pub fn status_of(&self, turbine: &str) -> Option<&str> {
        self.statuses.get(turbine).map(String::as_str)
    }

    pub fn completion_percent(&self) -> f64 {
        percent(self.completed as f64, self.total as f64)
    }
}

// ============================================================================
// Phase completion
// ============================================================================

/// Completion of one installation phase.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhaseCompletion {
    pub phase: PhaseId,
    pub total: usize,
    pub completed: usize,
    pub percent: f64,
}

impl PhaseCompletion {
    /// One entry per installation phase, in installation order.
    ///
    /// Phases absent from the data report zero records.
    pub fn compute_all(data: &ProjectData) -> Vec<Self> {
        PhaseId::INSTALLATION
            .into_iter()
            .map(|phase| {
                let records = data.phase(&phase).map(|p| p.installation()).unwrap_or(&[]);
                let completed = records
                    .iter()
                    .filter(|record| StatusClass::classify(&record.status) == StatusClass::Completed)
                    .count();
                Self {
                    total: records.len(),
                    completed,
                    percent: percent(completed as f64, records.len() as f64),
                    phase,
                }
            })
            .collect()
    }
}

// ============================================================================
// Weekly timeline
// ============================================================================

/// Records dated within one ISO week.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeeklyBucket {
    /// `YYYY-Www`
    pub label: String,
    pub year: i32,
    pub week: u32,
    pub count: usize,
}

impl WeeklyBucket {
    /// Stand-in bucket emitted when no record carries a usable date.
    pub fn placeholder() -> Self {
        Self {
            label: "W00".into(),
            year: 0,
            week: 0,
            count: 0,
        }
    }
}

/// Records of every phase, crane logs included, bucketed by ISO week. Never empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeeklyTimeline {
    pub buckets: Vec<WeeklyBucket>,
    pub coverage: Coverage,
}

impl WeeklyTimeline {
    pub fn compute(data: &ProjectData) -> Self {
        let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        let mut coverage = Coverage::default();

        let dates = data
            .installation_records()
            .map(|(_, record)| record.timeline_date)
            .chain(data.crane_events().map(|event| event.timeline_date));
        for date in dates {
            coverage.examined += 1;
            if let Some(date) = date {
                let iso = date.iso_week();
                *counts.entry((iso.year(), iso.week())).or_default() += 1;
                coverage.included += 1;
            }
        }

        let mut buckets: Vec<WeeklyBucket> = counts
            .into_iter()
            .map(|((year, week), count)| WeeklyBucket {
                label: format!("{year}-W{week:02}"),
                year,
                week,
                count,
            })
            .collect();
        buckets.sort_by_key(|bucket| (bucket.week, bucket.year));

        if buckets.is_empty() {
            buckets.push(WeeklyBucket::placeholder());
        }

        Self { buckets, coverage }
    }
}

// ============================================================================
// Crane utilization
// ============================================================================

/// Hours and efficiency of one crane.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CraneEfficiency {
    pub crane: String,
    pub events: usize,
    pub work_hours: f64,
    pub mobilization_hours: f64,
    pub stoppage_hours: f64,
}

impl CraneEfficiency {
    /// work / (work + mobilization + stoppage) × 100, zero without hours.
    pub fn efficiency(&self) -> f64 {
        percent(
            self.work_hours,
            self.work_hours + self.mobilization_hours + self.stoppage_hours,
        )
    }

    pub fn total_hours(&self) -> f64 {
        self.work_hours + self.mobilization_hours + self.stoppage_hours
    }
}

/// Frequency and duration of one stoppage reason.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoppageReason {
    /// Reason code as entered; empty when none was given
    pub reason: String,
    pub count: usize,
    pub hours: f64,
    /// Share of all stoppage hours
    pub share: f64,
}

/// Crane work and stoppage across both crane logs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CraneUtilization {
    pub work_hours: f64,
    pub stoppage_hours: f64,
    /// Per crane, ordered by crane name
    pub cranes: Vec<CraneEfficiency>,
    /// Ordered by hours, longest first
    pub stoppage_reasons: Vec<StoppageReason>,
    /// Events examined vs events with a measurable duration
    pub coverage: Coverage,
}

impl CraneUtilization {
    pub fn compute(data: &ProjectData) -> Self {
        Self::from_events(data.crane_events())
    }

    /// Aggregate any set of crane events, e.g. a single crane log.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a CraneEvent>) -> Self {
        let mut utilization = Self::default();
        let mut cranes: BTreeMap<String, CraneEfficiency> = BTreeMap::new();
        let mut reasons: BTreeMap<String, (usize, f64)> = BTreeMap::new();

        for event in events {
            let hours = event.hours();
            utilization.coverage.examined += 1;
            if hours != 0.0 {
                utilization.coverage.included += 1;
            }

            let crane = cranes
                .entry(event.crane.trim().to_string())
                .or_insert_with(|| CraneEfficiency {
                    crane: event.crane.trim().to_string(),
                    ..CraneEfficiency::default()
                });
            crane.events += 1;

            match event.activity {
                ActivityType::Work => {
                    utilization.work_hours += hours;
                    crane.work_hours += hours;
                }
                ActivityType::Stoppage => {
                    utilization.stoppage_hours += hours;
                    crane.stoppage_hours += hours;
                    let entry = reasons.entry(event.reason.trim().to_string()).or_default();
                    entry.0 += 1;
                    entry.1 += hours;
                }
                ActivityType::Mobilization => crane.mobilization_hours += hours,
                ActivityType::Transfer | ActivityType::Demobilization | ActivityType::Other => {}
            }
        }

        let total_stoppage = utilization.stoppage_hours;
        let mut stoppage_reasons: Vec<StoppageReason> = reasons
            .into_iter()
            .map(|(reason, (count, hours))| StoppageReason {
                reason,
                count,
                hours,
                share: percent(hours, total_stoppage),
            })
            .collect();
        stoppage_reasons.sort_by(|a, b| b.hours.total_cmp(&a.hours).then_with(|| a.reason.cmp(&b.reason)));

        utilization.cranes = cranes.into_values().collect();
        utilization.stoppage_reasons = stoppage_reasons;
        utilization
    }

    /// Fleet efficiency over all cranes.
    pub fn overall_efficiency(&self) -> f64 {
        let mobilization: f64 = self.cranes.iter().map(|c| c.mobilization_hours).sum();
        percent(
            self.work_hours,
            self.work_hours + mobilization + self.stoppage_hours,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.coverage.examined == 0
    }
}

// ============================================================================
// Deviations
// ============================================================================

/// Classification of a planned-vs-actual difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DeviationClass {
    OnSchedule,
    Ahead,
    Delayed,
}

impl DeviationClass {
    pub fn from_days(days: i64) -> Self {
        match days {
            0 => DeviationClass::OnSchedule,
            d if d < 0 => DeviationClass::Ahead,
            _ => DeviationClass::Delayed,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            DeviationClass::OnSchedule => "deviation.on_schedule",
            DeviationClass::Ahead => "deviation.ahead",
            DeviationClass::Delayed => "deviation.delayed",
        }
    }
}

/// Planned vs actual date of one record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Deviation {
    pub phase: PhaseId,
    pub turbine: String,
    pub subject: String,
    pub planned: NaiveDate,
    pub actual: NaiveDate,
    /// actual − planned, in days
    pub days: i64,
    pub class: DeviationClass,
}

/// All deviations, plus how many records could not be compared.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DeviationReport {
    pub entries: Vec<Deviation>,
    pub coverage: Coverage,
}

impl DeviationReport {
    pub fn compute(data: &ProjectData) -> Self {
        let mut report = Self::default();
        for (phase, record) in data.installation_records() {
            report.coverage.examined += 1;
            let (Some(planned), Some(actual)) = (record.planned_date, record.actual_date) else {
                continue;
            };
            let days = (actual - planned).num_days();
            report.entries.push(Deviation {
                phase: phase.clone(),
                turbine: record.turbine.clone(),
                subject: record.subject().to_string(),
                planned,
                actual,
                days,
                class: DeviationClass::from_days(days),
            });
            report.coverage.included += 1;
        }
        report
    }

    pub fn count(&self, class: DeviationClass) -> usize {
        self.entries.iter().filter(|d| d.class == class).count()
    }

    pub fn average_days(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.entries.iter().map(|d| d.days as f64).sum::<f64>() / self.entries.len() as f64
    }

    pub fn max_delay(&self) -> i64 {
        self.entries.iter().map(|d| d.days).max().unwrap_or(0).max(0)
    }
}

// ============================================================================
// Critical observations
// ============================================================================

/// Why an item made it to the critical observations list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ObservationKind {
    /// Free-text note on an installation record
    Note,
    /// Record finished after its planned date
    Delay { days: i64 },
    /// Crane stoppage
    Stoppage { hours: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Observation {
    pub phase: PhaseId,
    /// Turbine or crane the observation is about
    pub subject: String,
    pub date: Option<NaiveDate>,
    pub kind: ObservationKind,
    pub text: String,
}

/// Collect notes, delays and crane stoppages, in input order per category.
pub fn collect_observations(data: &ProjectData, deviations: &DeviationReport) -> Vec<Observation> {
    let mut observations = Vec::new();

    for (phase, record) in data.installation_records() {
        if record.observations.trim().is_empty() {
            continue;
        }
        observations.push(Observation {
            phase: phase.clone(),
            subject: record.turbine.clone(),
            date: record.actual_date.or(record.timeline_date),
            kind: ObservationKind::Note,
            text: record.observations.clone(),
        });
    }

    for deviation in deviations.entries.iter().filter(|d| d.class == DeviationClass::Delayed) {
        observations.push(Observation {
            phase: deviation.phase.clone(),
            subject: deviation.turbine.clone(),
            date: Some(deviation.actual),
            kind: ObservationKind::Delay { days: deviation.days },
            text: deviation.subject.clone(),
        });
    }

    for phase in data.phases().iter().filter(|p| p.id.is_crane()) {
        for event in phase.crane().iter().filter(|e| e.activity == ActivityType::Stoppage) {
            let text = [event.reason.trim(), event.notes.trim()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" - ");
            observations.push(Observation {
                phase: phase.id.clone(),
                subject: event.crane.clone(),
                date: event.start.date(),
                kind: ObservationKind::Stoppage { hours: event.hours() },
                text,
            });
        }
    }

    observations
}

// ============================================================================
// All metrics
// ============================================================================

/// Every aggregate the report needs, computed once per run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportMetrics {
    pub turbines: TurbineStatusSummary,
    pub phases: Vec<PhaseCompletion>,
    pub timeline: WeeklyTimeline,
    pub cranes: CraneUtilization,
    pub deviations: DeviationReport,
    pub observations: Vec<Observation>,
}

impl ReportMetrics {
    pub fn compute(data: &ProjectData) -> Self {
        let deviations = DeviationReport::compute(data);
        let metrics = Self {
            turbines: TurbineStatusSummary::compute(data),
            phases: PhaseCompletion::compute_all(data),
            timeline: WeeklyTimeline::compute(data),
            cranes: CraneUtilization::compute(data),
            observations: collect_observations(data, &deviations),
            deviations,
        };

        tracing::debug!(
            turbines = metrics.turbines.total,
            weeks = metrics.timeline.buckets.len(),
            crane_events = metrics.cranes.coverage.examined,
            deviations = metrics.deviations.entries.len(),
            "metrics computed"
        );
        if metrics.deviations.coverage.excluded() > 0 {
            tracing::info!(
                excluded = metrics.deviations.coverage.excluded(),
                "records without both planned and actual dates left out of deviation analysis"
            );
        }
        if metrics.cranes.coverage.excluded() > 0 {
            tracing::info!(
                excluded = metrics.cranes.coverage.excluded(),
                "crane events without a measurable duration"
            );
        }

        metrics
    }

    /// Completed records over all installation records, pooled across phases.
    pub fn overall_completion(&self) -> f64 {
        let total: usize = self.phases.iter().map(|p| p.total).sum();
        let completed: usize = self.phases.iter().map(|p| p.completed).sum();
        percent(completed as f64, total as f64)
    }
}
