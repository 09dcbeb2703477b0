//! Tabular layouts shared by the workbook and document renderers
//!
//! Each phase kind maps to a fixed column set. Building the table once here
//! keeps the spreadsheet and the PDF showing the same columns in the same
//! order.

use chrono::NaiveDateTime;

use asbuilt_core::{
    CraneEvent, DateField, InstallationRecord, PhaseData, PhaseId, PhaseRecords, RecordDetail, Report,
    StatusClass,
};

/// One table cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    /// Date or date-time; the flag tells whether a time of day is shown
    Date(NaiveDateTime, bool),
    Number(f64),
    /// Whole percentage (0-100)
    Percent(i64),
    /// Status text with its class, for colored cells
    Status(String, StatusClass),
}

impl CellValue {
    pub fn text(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }

    pub fn date(field: &DateField) -> Self {
        match field.value {
            Some(value) => CellValue::Date(value, field.has_time()),
            None => CellValue::text(&field.raw),
        }
    }

    pub fn status(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Status(value.to_string(), StatusClass::classify(value))
        }
    }

    /// Plain-text rendering, as shown in the PDF.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) | CellValue::Status(text, _) => text.clone(),
            CellValue::Date(value, true) => value.format("%d/%m/%Y %H:%M").to_string(),
            CellValue::Date(value, false) => value.format("%d/%m/%Y").to_string(),
            CellValue::Number(value) => format_number(*value),
            CellValue::Percent(value) => format!("{value}%"),
        }
    }
}

/// Numbers with at most one decimal, no trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Column header and a width hint in characters.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub header: String,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    fn new(title: String, columns: Vec<Column>) -> Self {
        Self {
            title,
            columns,
            rows: Vec::new(),
        }
    }

    /// Index of the column with this header.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.header == header)
    }
}

fn columns(report: &Report, defs: &[(&str, f64)]) -> Vec<Column> {
    defs.iter()
        .map(|(key, width)| Column {
            header: report.t(key).to_string(),
            width: *width,
        })
        .collect()
}

const RECEPTION_COLUMNS: &[(&str, f64)] = &[
    ("col.turbine", 12.0),
    ("col.component", 22.0),
    ("col.vui", 14.0),
    ("col.serial_number", 18.0),
    ("col.item_number", 14.0),
    ("col.unload_date", 17.0),
    ("col.status", 14.0),
    ("col.observations", 30.0),
];

const COMPONENT_COLUMNS: &[(&str, f64)] = &[
    ("col.turbine", 12.0),
    ("col.component", 22.0),
    ("col.vui", 14.0),
    ("col.serial_number", 18.0),
    ("col.item_number", 14.0),
    ("col.start_date", 17.0),
    ("col.end_date", 17.0),
    ("col.status", 14.0),
    ("col.observations", 30.0),
];

const TORQUE_COLUMNS: &[(&str, f64)] = &[
    ("col.turbine", 12.0),
    ("col.connection", 20.0),
    ("col.torque_value", 13.0),
    ("col.torque_unit", 11.0),
    ("col.tensioning_value", 15.0),
    ("col.tensioning_unit", 13.0),
    ("col.date", 17.0),
    ("col.status", 14.0),
    ("col.observations", 30.0),
];

const FINAL_COLUMNS: &[(&str, f64)] = &[
    ("col.turbine", 12.0),
    ("col.phase", 24.0),
    ("col.start_date", 17.0),
    ("col.end_date", 17.0),
    ("col.status", 14.0),
    ("col.progress", 11.0),
    ("col.observations", 30.0),
];

const OTHER_COLUMNS: &[(&str, f64)] = &[
    ("col.turbine", 12.0),
    ("col.component", 22.0),
    ("col.date", 17.0),
    ("col.status", 14.0),
    ("col.observations", 30.0),
];

const CRANE_COLUMNS: &[(&str, f64)] = &[
    ("col.crane", 18.0),
    ("col.activity", 16.0),
    ("col.start", 17.0),
    ("col.end", 17.0),
    ("col.duration", 11.0),
    ("col.hours", 9.0),
    ("col.reason", 18.0),
    ("col.notes", 30.0),
];

fn column_defs(phase: &PhaseId) -> &'static [(&'static str, f64)] {
    match phase {
        PhaseId::Reception => RECEPTION_COLUMNS,
        PhaseId::Preparation | PhaseId::PreAssembly | PhaseId::Assembly => COMPONENT_COLUMNS,
        PhaseId::TorqueTensioning => TORQUE_COLUMNS,
        PhaseId::FinalPhases => FINAL_COLUMNS,
        PhaseId::CranesPads | PhaseId::CranesGeneral => CRANE_COLUMNS,
        PhaseId::Other(_) => OTHER_COLUMNS,
    }
}

/// Table for one phase: installation records or crane events.
pub fn phase_table(report: &Report, phase: &PhaseData) -> Table {
    let mut table = Table::new(
        report.phase_title(&phase.id),
        columns(report, column_defs(&phase.id)),
    );
    match &phase.records {
        PhaseRecords::Installation(records) => {
            table.rows = records.iter().map(installation_row).collect();
        }
        PhaseRecords::Crane(events) => {
            table.rows = events.iter().map(crane_row).collect();
        }
    }
    table
}

fn installation_row(record: &InstallationRecord) -> Vec<CellValue> {
    let turbine = CellValue::text(&record.turbine);
    let status = CellValue::status(&record.status);
    let observations = CellValue::text(&record.observations);

    match &record.detail {
        RecordDetail::Reception { component, unloaded } => vec![
            turbine,
            CellValue::text(&component.component_id),
            CellValue::text(&component.vui),
            CellValue::text(&component.serial_number),
            CellValue::text(&component.item_number),
            CellValue::date(unloaded),
            status,
            observations,
        ],
        RecordDetail::Component { component, start, end } => vec![
            turbine,
            CellValue::text(&component.component_id),
            CellValue::text(&component.vui),
            CellValue::text(&component.serial_number),
            CellValue::text(&component.item_number),
            CellValue::date(start),
            CellValue::date(end),
            status,
            observations,
        ],
        RecordDetail::Torque {
            connection,
            torque_value,
            torque_unit,
            tensioning_value,
            tensioning_unit,
            executed,
        } => vec![
            turbine,
            CellValue::text(connection),
            CellValue::text(torque_value),
            CellValue::text(torque_unit),
            CellValue::text(tensioning_value),
            CellValue::text(tensioning_unit),
            CellValue::date(executed),
            status,
            observations,
        ],
        RecordDetail::FinalPhase { phase_name, start, end } => vec![
            turbine,
            CellValue::text(phase_name),
            CellValue::date(start),
            CellValue::date(end),
            status,
            record.progress.map(CellValue::Percent).unwrap_or(CellValue::Empty),
            observations,
        ],
        RecordDetail::Other { component, date } => vec![
            turbine,
            CellValue::text(component),
            CellValue::date(date),
            status,
            observations,
        ],
    }
}

fn crane_row(event: &CraneEvent) -> Vec<CellValue> {
    let hours = event.hours();
    vec![
        CellValue::text(&event.crane),
        CellValue::text(&event.activity_label),
        CellValue::date(&event.start),
        CellValue::date(&event.end),
        CellValue::text(&event.duration),
        if hours == 0.0 && event.duration.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Number(hours)
        },
        CellValue::text(&event.reason),
        CellValue::text(&event.notes),
    ]
}
