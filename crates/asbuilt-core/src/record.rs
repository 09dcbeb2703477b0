//! Typed installation records
//!
//! Input records are schema-free JSON objects. They are normalized here, once,
//! into a tagged [`RecordDetail`] per phase kind so that the metrics and the
//! renderers never probe raw maps. A missing field is an empty string or
//! `None`, never an error.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde_json::{Map, Value};

use crate::parse::{parse_date, parse_datetime, parse_percentage};
use crate::phase::PhaseId;

/// Turbine identifier fields, in priority order.
pub const TURBINE_KEYS: &[&str] = &["turbinaId", "turbina", "numero", "id"];

/// Fields tried for the representative date of a record (weekly timeline).
pub const TIMELINE_DATE_KEYS: &[&str] = &[
    "dataReal",
    "dataFim",
    "dataInicio",
    "dataDescarga",
    "dataExecucao",
    "data",
];

/// Fields tried for the planned date of a record.
pub const PLANNED_DATE_KEYS: &[&str] = &["dataPlaneada", "dataPlanejada", "dataPrevista", "plannedDate"];

/// Fields tried for the actual date of a record.
pub const ACTUAL_DATE_KEYS: &[&str] = &["dataReal", "dataConclusao", "actualDate"];

const STATUS_KEYS: &[&str] = &["status", "estado"];
const PROGRESS_KEYS: &[&str] = &["progresso", "progress", "percentagem"];
const OBSERVATION_KEYS: &[&str] = &["observacoes", "observacao", "observations", "notes"];

// ============================================================================
// Raw field access
// ============================================================================

/// One raw JSON record with text-normalizing lookups.
#[derive(Clone, Debug, Default)]
pub struct FieldBag {
    fields: Map<String, Value>,
}

impl FieldBag {
    /// Wrap a raw record. Non-object values become an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            Value::Null => Self::default(),
            other => {
                tracing::warn!(record = %other, "record is not a JSON object; treating it as empty");
                Self::default()
            }
        }
    }

    /// Text of a field, empty when absent or null.
    ///
    /// Numbers and booleans are rendered in their JSON form.
    pub fn text(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Text of the first field in `keys` that is non-empty.
    pub fn first_text(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|key| self.text(key))
            .find(|value| !value.trim().is_empty())
            .unwrap_or_default()
    }

    /// First field in `keys` whose text parses as a date.
    pub fn first_date(&self, keys: &[&str]) -> Option<NaiveDate> {
        keys.iter().find_map(|key| parse_date(&self.text(key)))
    }

    /// A displayable date field, with an optional companion time field.
    pub fn date_field(&self, date_key: &str, time_key: &str) -> DateField {
        DateField::new(self.text(date_key), &self.text(time_key))
    }

    pub fn has(&self, key: &str) -> bool {
        !self.text(key).trim().is_empty()
    }
}

/// A date cell: the raw text plus its parsed value, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DateField {
    pub raw: String,
    pub value: Option<NaiveDateTime>,
}

impl DateField {
    pub fn new(raw: String, time: &str) -> Self {
        let value = parse_datetime(&raw, time);
        Self { raw, value }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.raw.trim().is_empty()
    }

    /// Whether the parsed value carries a time of day.
    pub fn has_time(&self) -> bool {
        self.value
            .map(|v| v.hour() != 0 || v.minute() != 0 || v.second() != 0)
            .unwrap_or(false)
    }

    /// Day-first display text; falls back to the raw text when unparseable.
    pub fn display(&self) -> String {
        match self.value {
            Some(v) if self.has_time() => v.format("%d/%m/%Y %H:%M").to_string(),
            Some(v) => v.format("%d/%m/%Y").to_string(),
            None => self.raw.clone(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.value.map(|v| v.date())
    }
}

// ============================================================================
// Typed records
// ============================================================================

/// Component identity shared by the reception and assembly-line phases.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentIdentity {
    pub component_id: String,
    pub vui: String,
    pub serial_number: String,
    pub item_number: String,
}

impl ComponentIdentity {
    fn from_bag(bag: &FieldBag) -> Self {
        Self {
            component_id: bag.first_text(&["componentId", "componente", "component"]),
            vui: bag.text("vui"),
            serial_number: bag.first_text(&["serialNumber", "numeroSerie"]),
            item_number: bag.first_text(&["itemNumber", "numeroItem"]),
        }
    }
}

/// Phase-specific fields.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordDetail {
    /// Reception / unloading
    Reception {
        component: ComponentIdentity,
        unloaded: DateField,
    },
    /// Preparation, pre-assembly and assembly
    Component {
        component: ComponentIdentity,
        start: DateField,
        end: DateField,
    },
    /// Torque and tensioning of bolted connections
    Torque {
        connection: String,
        torque_value: String,
        torque_unit: String,
        tensioning_value: String,
        tensioning_unit: String,
        executed: DateField,
    },
    /// Final phases (commissioning, inspections, ...)
    FinalPhase {
        phase_name: String,
        start: DateField,
        end: DateField,
    },
    /// Records of phases this tool does not know
    Other { component: String, date: DateField },
}

/// One installation record, normalized.
#[derive(Clone, Debug, PartialEq)]
pub struct InstallationRecord {
    /// Resolved turbine identifier (empty when none of the fields is set)
    pub turbine: String,
    pub status: String,
    /// Reported progress, when the record carries one
    pub progress: Option<i64>,
    pub planned_date: Option<NaiveDate>,
    pub actual_date: Option<NaiveDate>,
    /// Representative date used for weekly bucketing
    pub timeline_date: Option<NaiveDate>,
    pub observations: String,
    pub detail: RecordDetail,
}

impl InstallationRecord {
    /// Build a typed record for `phase` from a raw JSON value.
    pub fn from_value(phase: &PhaseId, value: Value) -> Self {
        Self::from_bag(phase, &FieldBag::from_value(value))
    }

    pub fn from_bag(phase: &PhaseId, bag: &FieldBag) -> Self {
        let detail = match phase {
            PhaseId::Reception => RecordDetail::Reception {
                component: ComponentIdentity::from_bag(bag),
                unloaded: bag.date_field("dataDescarga", "horaDescarga"),
            },
            PhaseId::Preparation | PhaseId::PreAssembly | PhaseId::Assembly => RecordDetail::Component {
                component: ComponentIdentity::from_bag(bag),
                start: bag.date_field("dataInicio", "horaInicio"),
                end: bag.date_field("dataFim", "horaFim"),
            },
            PhaseId::TorqueTensioning => RecordDetail::Torque {
                connection: bag.first_text(&["conexao", "connection"]),
                torque_value: bag.text("torqueValue"),
                torque_unit: bag.text("torqueUnit"),
                tensioning_value: bag.text("tensioningValue"),
                tensioning_unit: bag.text("tensioningUnit"),
                executed: bag.date_field("dataExecucao", "horaExecucao"),
            },
            PhaseId::FinalPhases => RecordDetail::FinalPhase {
                phase_name: bag.first_text(&["faseName", "fase", "nome"]),
                start: bag.date_field("dataInicio", "horaInicio"),
                end: bag.date_field("dataFim", "horaFim"),
            },
            PhaseId::CranesPads | PhaseId::CranesGeneral | PhaseId::Other(_) => {
                let date_key = TIMELINE_DATE_KEYS
                    .iter()
                    .copied()
                    .find(|key| bag.has(key))
                    .unwrap_or("data");
                RecordDetail::Other {
                    component: bag.first_text(&["componentId", "componente", "component"]),
                    date: bag.date_field(date_key, ""),
                }
            }
        };

        let progress = PROGRESS_KEYS
            .iter()
            .find(|key| bag.has(key))
            .map(|key| parse_percentage(&bag.text(key)));

        Self {
            turbine: bag.first_text(TURBINE_KEYS),
            status: bag.first_text(STATUS_KEYS),
            progress,
            planned_date: bag.first_date(PLANNED_DATE_KEYS),
            actual_date: bag.first_date(ACTUAL_DATE_KEYS),
            timeline_date: bag.first_date(TIMELINE_DATE_KEYS),
            observations: bag.first_text(OBSERVATION_KEYS),
            detail,
        }
    }

    /// Short label naming what the record is about (component, connection, phase).
    pub fn subject(&self) -> &str {
        match &self.detail {
            RecordDetail::Reception { component, .. } | RecordDetail::Component { component, .. } => {
                &component.component_id
            }
            RecordDetail::Torque { connection, .. } => connection,
            RecordDetail::FinalPhase { phase_name, .. } => phase_name,
            RecordDetail::Other { component, .. } => component,
        }
    }
}

/// Normalized status string: trimmed and lowercased.
pub fn normalize_status(status: &str) -> String {
    status.trim().to_lowercase()
}

/// Fold Portuguese accents so spelling variants compare equal.
pub(crate) fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Status bucket for tallies and cell coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Completed,
    InProgress,
    Planned,
}

const COMPLETED_STATUSES: &[&str] = &[
    "concluido",
    "completo",
    "completed",
    "complete",
    "done",
    "finalizado",
    "terminado",
];

const IN_PROGRESS_STATUSES: &[&str] = &[
    "em progresso",
    "em curso",
    "em andamento",
    "iniciado",
    "in progress",
    "ongoing",
    "started",
];

impl StatusClass {
    /// Classify a free-text status. Anything unrecognized is planned.
    pub fn classify(status: &str) -> Self {
        let folded = fold_accents(&normalize_status(status));
        if COMPLETED_STATUSES.contains(&folded.as_str()) {
            StatusClass::Completed
        } else if IN_PROGRESS_STATUSES.contains(&folded.as_str()) {
            StatusClass::InProgress
        } else {
            StatusClass::Planned
        }
    }

    /// Translation key for this class.
    pub fn key(&self) -> &'static str {
        match self {
            StatusClass::Completed => "status.completed",
            StatusClass::InProgress => "status.in_progress",
            StatusClass::Planned => "status.planned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn turbine_resolution_first_non_empty_wins() {
        let bag = FieldBag::from_value(json!({"turbinaId": "", "turbina": "T7", "numero": "9", "id": "x"}));
        assert_eq!(bag.first_text(TURBINE_KEYS), "T7");

        let bag = FieldBag::from_value(json!({"numero": 12, "id": "x"}));
        assert_eq!(bag.first_text(TURBINE_KEYS), "12");

        let bag = FieldBag::from_value(json!({"other": "x"}));
        assert_eq!(bag.first_text(TURBINE_KEYS), "");
    }

    #[test]
    fn non_object_record_is_empty() {
        let record = InstallationRecord::from_value(&PhaseId::Reception, json!("garbage"));
        assert_eq!(record.turbine, "");
        assert_eq!(record.status, "");
        assert!(matches!(record.detail, RecordDetail::Reception { .. }));
    }

    #[test]
    fn reception_record_fields() {
        let record = InstallationRecord::from_value(
            &PhaseId::Reception,
            json!({
                "turbinaId": "WTG-01",
                "componentId": "Blade A",
                "vui": "V123",
                "serialNumber": "SN-9",
                "itemNumber": 42,
                "dataDescarga": "2024-01-15T09:30:00",
                "status": "Concluído"
            }),
        );

        assert_eq!(record.turbine, "WTG-01");
        match &record.detail {
            RecordDetail::Reception { component, unloaded } => {
                assert_eq!(component.component_id, "Blade A");
                assert_eq!(component.item_number, "42");
                assert_eq!(unloaded.display(), "15/01/2024 09:30");
            }
            other => panic!("unexpected detail {other:?}"),
        }
        assert_eq!(StatusClass::classify(&record.status), StatusClass::Completed);
        assert_eq!(record.timeline_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn unparseable_date_keeps_raw_text() {
        let field = DateField::new("next week".into(), "");
        assert_eq!(field.value, None);
        assert_eq!(field.display(), "next week");
        assert!(!field.is_empty());
        assert!(DateField::default().is_empty());
    }

    #[test]
    fn progress_only_when_present() {
        let with = InstallationRecord::from_value(&PhaseId::FinalPhases, json!({"progresso": "75%"}));
        assert_eq!(with.progress, Some(75));

        let without = InstallationRecord::from_value(&PhaseId::FinalPhases, json!({}));
        assert_eq!(without.progress, None);
    }

    #[test]
    fn status_classes() {
        assert_eq!(StatusClass::classify("Concluído"), StatusClass::Completed);
        assert_eq!(StatusClass::classify(" concluido "), StatusClass::Completed);
        assert_eq!(StatusClass::classify("Completed"), StatusClass::Completed);
        assert_eq!(StatusClass::classify("Em Progresso"), StatusClass::InProgress);
        assert_eq!(StatusClass::classify("in progress"), StatusClass::InProgress);
        assert_eq!(StatusClass::classify("Planeado"), StatusClass::Planned);
        assert_eq!(StatusClass::classify(""), StatusClass::Planned);
    }
}
