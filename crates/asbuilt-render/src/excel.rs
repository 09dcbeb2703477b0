//! Excel as-built report renderer
//!
//! Generates XLSX workbooks with one sheet per report section:
//! - Cover: project, generation time, table of contents
//! - Executive Summary: KPIs against their targets, phase completion, data coverage
//! - Dashboard: KPI cards plus bar, pie, line and column charts over in-sheet data
//! - Deviation Analysis: planned vs actual dates with a color scale on the day column
//! - Crane Analysis: per-crane efficiency (icon set vs target) and stoppage reasons
//! - Critical Observations: notes, delays and crane stoppages
//! - One sheet per selected phase with records
//!
//! Only the phase sheets are written when the report is not complete.
//!
//! ## Phase Sheet Layout
//!
//! ```text
//! Row 1 | Project name (merged)
//! Row 2 | Sheet title (merged)
//! Row 4 | Turbine | Component | VUI | Serial Number | ... | Status | Observations   <- frozen, filtered
//! Row 5 | WTG-01  | Blade A   | V12 | SN-0042       | ... | Done   |
//! ...
//! Row N | Generated: 2024-02-01 10:15
//! ```
//!
//! Rows are banded from a fixed palette by row index; status cells are colored
//! by status class; date cells are real Excel dates.

use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{
    Chart, ChartLegendPosition, ChartType, ConditionalFormat3ColorScale, ConditionalFormatCell,
    ConditionalFormatCellRule, ConditionalFormatIconSet, ConditionalFormatIconType, ExcelDateTime,
    Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};

use asbuilt_core::{
    DeviationClass, ObservationKind, PhaseData, PhaseId, RenderError, Renderer, Report, StatusClass,
    TargetStatus,
};

use crate::tables::{format_number, phase_table, CellValue, Table};

type RowNum = u32;
type ColNum = u16;

const PRIMARY: u32 = 0x1F4E78;
const SECONDARY: u32 = 0x4472C4;
const MUTED: u32 = 0x666666;

/// Row banding, cycled by row index.
const BAND_PALETTE: [u32; 2] = [0xFFFFFF, 0xF5F5F5];

/// Accent colors for entity rows (phases, cranes, reasons), cycled by row index.
const ACCENT_PALETTE: [u32; 6] = [0xDDEBF7, 0xFCE4D6, 0xEDEDED, 0xFFF2CC, 0xDEEBF7, 0xE2EFDA];

const COMPLETED_FILL: u32 = 0xC6EFCE;
const IN_PROGRESS_FILL: u32 = 0xFFEB9C;
const PLANNED_FILL: u32 = 0xF2F2F2;

/// Excel limits sheet names to 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// Sections of the workbook, in sheet order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetKind {
    Cover,
    ExecutiveSummary,
    Dashboard,
    Deviations,
    Cranes,
    Observations,
    Phase(PhaseId),
}

/// Excel as-built report renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Whether to embed charts in the Dashboard and Crane Analysis sheets
    pub include_charts: bool,
    /// Chart width in pixels
    pub chart_width: u32,
    /// Chart height in pixels
    pub chart_height: u32,
    /// Number format for date cells
    pub date_format: String,
    /// Number format for date-time cells
    pub datetime_format: String,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            include_charts: true,
            chart_width: 480,
            chart_height: 288,
            date_format: "dd/mm/yyyy".into(),
            datetime_format: "dd/mm/yyyy hh:mm".into(),
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave charts out (data tables only)
    pub fn no_charts(mut self) -> Self {
        self.include_charts = false;
        self
    }

    /// Set chart size in pixels
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = width;
        self.chart_height = height;
        self
    }

    /// Set the number format used for date cells
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Sheets this report produces, in order.
    ///
    /// Selected phases that are absent from the data, or have no records,
    /// get no sheet.
    pub fn sheet_plan(&self, report: &Report) -> Vec<SheetKind> {
        let mut plan = Vec::new();
        if report.complete {
            plan.extend([
                SheetKind::Cover,
                SheetKind::ExecutiveSummary,
                SheetKind::Dashboard,
                SheetKind::Deviations,
                SheetKind::Cranes,
                SheetKind::Observations,
            ]);
        }
        plan.extend(report.rendered_phases().map(|phase| SheetKind::Phase(phase.id.clone())));

        // A workbook needs at least one sheet
        if plan.is_empty() {
            plan.push(SheetKind::Cover);
        }
        plan
    }

    /// Sheet names for a plan: translated, sanitized and unique.
    pub fn sheet_names(&self, report: &Report, plan: &[SheetKind]) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(plan.len());
        for kind in plan {
            let base = match kind {
                SheetKind::Cover => report.t("sheet.cover").to_string(),
                SheetKind::ExecutiveSummary => report.t("sheet.summary").to_string(),
                SheetKind::Dashboard => report.t("sheet.dashboard").to_string(),
                SheetKind::Deviations => report.t("sheet.deviations").to_string(),
                SheetKind::Cranes => report.t("sheet.cranes").to_string(),
                SheetKind::Observations => report.t("sheet.observations").to_string(),
                SheetKind::Phase(id) => match id.title_key() {
                    Some(key) => report.t(&format!("sheet.{}", key)).to_string(),
                    None => id.key().to_string(),
                },
            };
            let base = sanitize_sheet_name(&base);

            let mut name = base.clone();
            let mut n = 2;
            while names.iter().any(|existing| same_sheet_name(existing, &name)) {
                let suffix = format!(" ({n})");
                let keep = MAX_SHEET_NAME - suffix.chars().count();
                name = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
                n += 1;
            }
            names.push(name);
        }
        names
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        let plan = self.sheet_plan(report);
        let names = self.sheet_names(report, &plan);
        tracing::debug!(sheets = ?names, "writing workbook");

        for (kind, name) in plan.iter().zip(&names) {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name).map_err(xl)?;

            match kind {
                SheetKind::Cover => self.add_cover_sheet(sheet, report, &names, &formats)?,
                SheetKind::ExecutiveSummary => self.add_summary_sheet(sheet, report, &formats)?,
                SheetKind::Dashboard => self.add_dashboard_sheet(sheet, name, report, &formats)?,
                SheetKind::Deviations => self.add_deviation_sheet(sheet, report, &formats)?,
                SheetKind::Cranes => self.add_crane_sheet(sheet, name, report, &formats)?,
                SheetKind::Observations => self.add_observations_sheet(sheet, report, &formats)?,
                SheetKind::Phase(id) => {
                    let phase = report
                        .data
                        .phase(id)
                        .ok_or_else(|| RenderError::InvalidData(format!("phase {id} not in data")))?;
                    self.add_phase_sheet(sheet, name, report, phase, &formats)?;
                }
            }
        }

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        Ok(buffer)
    }

    /// Create reusable formats
    fn create_formats(&self) -> ExcelFormats {
        let title = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_font_color(PRIMARY)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let subtitle = Format::new()
            .set_font_size(11)
            .set_font_color(SECONDARY)
            .set_bold()
            .set_align(FormatAlign::Center);

        let section = Format::new()
            .set_bold()
            .set_font_size(11)
            .set_font_color(0xFFFFFF)
            .set_background_color(SECONDARY)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);

        let header = Format::new()
            .set_bold()
            .set_font_color(0xFFFFFF)
            .set_background_color(PRIMARY)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        let label = Format::new().set_bold().set_border(FormatBorder::Thin);
        let text = Format::new().set_border(FormatBorder::Thin);
        let integer = Format::new().set_num_format("#,##0").set_border(FormatBorder::Thin);
        let number = Format::new().set_num_format("#,##0.0").set_border(FormatBorder::Thin);
        let percent = Format::new()
            .set_num_format("0.0\"%\"")
            .set_border(FormatBorder::Thin);

        let kpi_label = Format::new()
            .set_bold()
            .set_font_color(0xFFFFFF)
            .set_background_color(SECONDARY)
            .set_align(FormatAlign::Center)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        let kpi_value = Format::new()
            .set_bold()
            .set_font_size(14)
            .set_font_color(PRIMARY)
            .set_num_format("#,##0.#")
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);

        let bands = BAND_PALETTE
            .iter()
            .map(|&color| BandFormats {
                text: Format::new().set_background_color(color).set_border(FormatBorder::Thin),
                date: Format::new()
                    .set_background_color(color)
                    .set_num_format(&self.date_format)
                    .set_align(FormatAlign::Left)
                    .set_border(FormatBorder::Thin),
                datetime: Format::new()
                    .set_background_color(color)
                    .set_num_format(&self.datetime_format)
                    .set_align(FormatAlign::Left)
                    .set_border(FormatBorder::Thin),
                number: Format::new()
                    .set_background_color(color)
                    .set_num_format("#,##0.0")
                    .set_border(FormatBorder::Thin),
                percent: Format::new()
                    .set_background_color(color)
                    .set_num_format("0\"%\"")
                    .set_border(FormatBorder::Thin),
            })
            .collect();

        let accents = ACCENT_PALETTE
            .iter()
            .map(|&color| {
                Format::new()
                    .set_bold()
                    .set_background_color(color)
                    .set_border(FormatBorder::Thin)
            })
            .collect();

        let status_fill = |color: u32| {
            Format::new()
                .set_background_color(color)
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
        };

        let good = Format::new()
            .set_bold()
            .set_font_color(0x006100)
            .set_background_color(COMPLETED_FILL)
            .set_border(FormatBorder::Thin);

        let attention = Format::new()
            .set_bold()
            .set_font_color(0x9C5700)
            .set_background_color(IN_PROGRESS_FILL)
            .set_border(FormatBorder::Thin);

        let footer = Format::new().set_italic().set_font_size(9).set_font_color(MUTED);

        ExcelFormats {
            title,
            subtitle,
            section,
            header,
            label,
            text,
            integer,
            number,
            percent,
            kpi_label,
            kpi_value,
            bands,
            accents,
            status_completed: status_fill(COMPLETED_FILL),
            status_in_progress: status_fill(IN_PROGRESS_FILL),
            status_planned: status_fill(PLANNED_FILL),
            good,
            attention,
            footer,
        }
    }

    /// Project name and sheet title across the first two rows
    fn write_title_block(
        &self,
        sheet: &mut Worksheet,
        report: &Report,
        title: &str,
        last_col: ColNum,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let last_col = last_col.max(1);
        sheet
            .merge_range(0, 0, 0, last_col, &report.project_name, &formats.title)
            .map_err(xl)?;
        sheet
            .merge_range(1, 0, 1, last_col, title, &formats.subtitle)
            .map_err(xl)?;
        sheet.set_row_height(0, 28).map_err(xl)?;
        Ok(())
    }

    fn write_header_row(
        &self,
        sheet: &mut Worksheet,
        row: RowNum,
        headers: &[&str],
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_with_format(row, col as ColNum, *header, &formats.header)
                .map_err(xl)?;
        }
        Ok(())
    }

    /// Threshold glyph against a goal
    fn write_target_status(
        &self,
        sheet: &mut Worksheet,
        row: RowNum,
        col: ColNum,
        report: &Report,
        value: f64,
        target: f64,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let status = TargetStatus::of(value, target);
        let (glyph, format) = match status {
            TargetStatus::Met => ("✔", &formats.good),
            TargetStatus::Attention => ("⚠", &formats.attention),
        };
        let text = format!("{} {}", glyph, report.t(status.label_key()));
        sheet.write_with_format(row, col, text.as_str(), format).map_err(xl)?;
        Ok(())
    }

    fn write_timestamp(
        &self,
        sheet: &mut Worksheet,
        row: RowNum,
        report: &Report,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let stamp = format!(
            "{}: {}",
            report.t("label.generated"),
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        sheet.write_with_format(row, 0, stamp.as_str(), &formats.footer).map_err(xl)?;
        Ok(())
    }

    fn write_cell(
        &self,
        sheet: &mut Worksheet,
        row: RowNum,
        col: ColNum,
        cell: &CellValue,
        band: &BandFormats,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        match cell {
            CellValue::Empty => {
                sheet.write_blank(row, col, &band.text).map_err(xl)?;
            }
            CellValue::Text(text) => {
                sheet.write_with_format(row, col, text.as_str(), &band.text).map_err(xl)?;
            }
            CellValue::Date(value, has_time) => {
                let format = if *has_time { &band.datetime } else { &band.date };
                match excel_datetime(value) {
                    Ok(datetime) => {
                        sheet.write_with_format(row, col, &datetime, format).map_err(xl)?;
                    }
                    // Outside Excel's date range; keep the text
                    Err(_) => {
                        sheet
                            .write_with_format(row, col, cell.display().as_str(), &band.text)
                            .map_err(xl)?;
                    }
                }
            }
            CellValue::Number(value) => {
                sheet.write_with_format(row, col, *value, &band.number).map_err(xl)?;
            }
            CellValue::Percent(value) => {
                sheet
                    .write_with_format(row, col, *value as f64, &band.percent)
                    .map_err(xl)?;
            }
            CellValue::Status(text, class) => {
                let format = match class {
                    StatusClass::Completed => &formats.status_completed,
                    StatusClass::InProgress => &formats.status_in_progress,
                    StatusClass::Planned => &formats.status_planned,
                };
                sheet.write_with_format(row, col, text.as_str(), format).map_err(xl)?;
            }
        }
        Ok(())
    }

    /// Add Cover sheet with a table of contents
    fn add_cover_sheet(
        &self,
        sheet: &mut Worksheet,
        report: &Report,
        sheet_names: &[String],
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        self.write_title_block(sheet, report, report.t("report.title"), 5, formats)?;

        let rows = [
            (report.t("label.project"), report.project_name.clone()),
            (
                report.t("label.generated"),
                report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
            (report.t("label.language"), report.language.code().to_uppercase()),
            (
                report.t("label.report_type"),
                if report.complete {
                    report.t("report.complete").to_string()
                } else {
                    report.t("report.tables_only").to_string()
                },
            ),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let row = 3 + i as RowNum;
            sheet.write_with_format(row, 0, *label, &formats.label).map_err(xl)?;
            sheet.merge_range(row, 1, row, 5, value, &formats.text).map_err(xl)?;
        }

        let mut row = 3 + rows.len() as RowNum + 1;
        sheet
            .merge_range(row, 0, row, 5, report.t("label.contents"), &formats.section)
            .map_err(xl)?;
        row += 1;
        for (i, name) in sheet_names.iter().enumerate() {
            sheet
                .write_with_format(row, 0, (i + 1) as f64, &formats.integer)
                .map_err(xl)?;
            sheet.merge_range(row, 1, row, 5, name, &formats.text).map_err(xl)?;
            row += 1;
        }

        if report.rendered_phases().next().is_none() {
            row += 1;
            sheet
                .write_with_format(row, 0, report.t("label.no_phase_data"), &formats.footer)
                .map_err(xl)?;
        }

        sheet.set_column_width(0, 22).map_err(xl)?;
        for col in 1..=5 {
            sheet.set_column_width(col, 16).map_err(xl)?;
        }

        Ok(())
    }

    /// Add Executive Summary sheet
    fn add_summary_sheet(
        &self,
        sheet: &mut Worksheet,
        report: &Report,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let metrics = &report.metrics;
        self.write_title_block(sheet, report, report.t("sheet.summary"), 5, formats)?;

        let mut row: RowNum = 3;
        sheet
            .merge_range(row, 0, row, 5, report.t("section.kpis"), &formats.section)
            .map_err(xl)?;
        row += 1;
        self.write_header_row(
            sheet,
            row,
            &[
                report.t("col.indicator"),
                report.t("col.value"),
                report.t("col.target"),
                report.t("col.status"),
            ],
            formats,
        )?;
        row += 1;

        let completion = metrics.overall_completion();
        let efficiency = metrics.cranes.overall_efficiency();
        let kpis: [(&str, f64, Option<f64>); 8] = [
            ("kpi.turbines", metrics.turbines.total as f64, None),
            ("kpi.turbines_completed", metrics.turbines.completed as f64, None),
            ("kpi.turbines_in_progress", metrics.turbines.in_progress as f64, None),
            ("kpi.turbines_planned", metrics.turbines.planned as f64, None),
            ("kpi.completion", completion, Some(report.targets.completion)),
            ("kpi.crane_work_hours", metrics.cranes.work_hours, None),
            ("kpi.crane_stoppage_hours", metrics.cranes.stoppage_hours, None),
            ("kpi.crane_efficiency", efficiency, Some(report.targets.crane_efficiency)),
        ];
        for (key, value, target) in kpis {
            sheet.write_with_format(row, 0, report.t(key), &formats.label).map_err(xl)?;
            match target {
                Some(target) => {
                    sheet.write_with_format(row, 1, value, &formats.percent).map_err(xl)?;
                    sheet.write_with_format(row, 2, target, &formats.percent).map_err(xl)?;
                    self.write_target_status(sheet, row, 3, report, value, target, formats)?;
                }
                None => {
                    sheet.write_with_format(row, 1, value, &formats.number).map_err(xl)?;
                    sheet.write_blank(row, 2, &formats.text).map_err(xl)?;
                    sheet.write_blank(row, 3, &formats.text).map_err(xl)?;
                }
            }
            row += 1;
        }

        // Deviation summary
        row += 1;
        sheet
            .merge_range(row, 0, row, 5, report.t("section.deviations"), &formats.section)
            .map_err(xl)?;
        row += 1;
        let deviations = &metrics.deviations;
        let deviation_rows: [(&str, f64); 6] = [
            ("kpi.records_compared", deviations.entries.len() as f64),
            ("deviation.delayed", deviations.count(DeviationClass::Delayed) as f64),
            ("deviation.ahead", deviations.count(DeviationClass::Ahead) as f64),
            ("deviation.on_schedule", deviations.count(DeviationClass::OnSchedule) as f64),
            ("kpi.average_deviation", deviations.average_days()),
            ("kpi.max_delay", deviations.max_delay() as f64),
        ];
        for (key, value) in deviation_rows {
            sheet.write_with_format(row, 0, report.t(key), &formats.label).map_err(xl)?;
            sheet.write_with_format(row, 1, value, &formats.number).map_err(xl)?;
            row += 1;
        }

        // Phase completion
        row += 1;
        sheet
            .merge_range(row, 0, row, 5, report.t("section.phase_completion"), &formats.section)
            .map_err(xl)?;
        row += 1;
        self.write_header_row(
            sheet,
            row,
            &[
                report.t("col.phase"),
                report.t("col.total"),
                report.t("col.completed"),
                report.t("col.completion"),
                report.t("col.target"),
                report.t("col.status"),
            ],
            formats,
        )?;
        row += 1;
        let first_phase_row = row;
        for (i, phase) in metrics.phases.iter().enumerate() {
            let accent = &formats.accents[i % formats.accents.len()];
            sheet
                .write_with_format(row, 0, report.phase_title(&phase.phase).as_str(), accent)
                .map_err(xl)?;
            sheet
                .write_with_format(row, 1, phase.total as f64, &formats.integer)
                .map_err(xl)?;
            sheet
                .write_with_format(row, 2, phase.completed as f64, &formats.integer)
                .map_err(xl)?;
            sheet.write_with_format(row, 3, phase.percent, &formats.percent).map_err(xl)?;
            sheet
                .write_with_format(row, 4, report.targets.completion, &formats.percent)
                .map_err(xl)?;
            self.write_target_status(sheet, row, 5, report, phase.percent, report.targets.completion, formats)?;
            row += 1;
        }
        let color_scale = ConditionalFormat3ColorScale::new()
            .set_minimum_color(0xF8696B)
            .set_midpoint_color(0xFFEB84)
            .set_maximum_color(0x63BE7B);
        sheet
            .add_conditional_format(first_phase_row, 3, row - 1, 3, &color_scale)
            .map_err(xl)?;

        // Data coverage
        row += 1;
        sheet
            .merge_range(row, 0, row, 5, report.t("section.coverage"), &formats.section)
            .map_err(xl)?;
        row += 1;
        let coverage_rows = [
            ("coverage.deviation_excluded", deviations.coverage.excluded()),
            ("coverage.crane_unmeasured", metrics.cranes.coverage.excluded()),
            ("coverage.undated", metrics.timeline.coverage.excluded()),
        ];
        for (key, value) in coverage_rows {
            sheet.write_with_format(row, 0, report.t(key), &formats.label).map_err(xl)?;
            sheet
                .write_with_format(row, 1, value as f64, &formats.integer)
                .map_err(xl)?;
            row += 1;
        }

        self.write_timestamp(sheet, row + 1, report, formats)?;

        sheet.set_column_width(0, 38).map_err(xl)?;
        sheet.set_column_width(1, 14).map_err(xl)?;
        sheet.set_column_width(2, 14).map_err(xl)?;
        sheet.set_column_width(3, 20).map_err(xl)?;
        sheet.set_column_width(4, 12).map_err(xl)?;
        sheet.set_column_width(5, 24).map_err(xl)?;

        Ok(())
    }

    /// Add Dashboard sheet: KPI cards plus charts over in-sheet ranges
    fn add_dashboard_sheet(
        &self,
        sheet: &mut Worksheet,
        sheet_name: &str,
        report: &Report,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let metrics = &report.metrics;
        self.write_title_block(sheet, report, report.t("sheet.dashboard"), 11, formats)?;

        // KPI cards
        let cards: [(&str, f64); 6] = [
            ("kpi.turbines", metrics.turbines.total as f64),
            ("kpi.turbines_completed", metrics.turbines.completed as f64),
            ("kpi.turbines_in_progress", metrics.turbines.in_progress as f64),
            ("kpi.turbines_planned", metrics.turbines.planned as f64),
            ("kpi.completion", metrics.overall_completion()),
            ("kpi.crane_efficiency", metrics.cranes.overall_efficiency()),
        ];
        for (i, (key, value)) in cards.iter().enumerate() {
            let col = (i * 2) as ColNum;
            sheet
                .merge_range(3, col, 3, col + 1, report.t(key), &formats.kpi_label)
                .map_err(xl)?;
            sheet
                .merge_range(4, col, 4, col + 1, &format_number(*value), &formats.kpi_value)
                .map_err(xl)?;
        }
        sheet.set_row_height(3, 30).map_err(xl)?;
        sheet.set_row_height(4, 26).map_err(xl)?;

        let chart_rows = (self.chart_height / 20 + 2) as RowNum;
        let chart_col: ColNum = 5;
        let mut row: RowNum = 7;

        // Phase completion
        let block = row;
        self.write_header_row(
            sheet,
            row,
            &[
                report.t("col.phase"),
                report.t("col.total"),
                report.t("col.completed"),
                report.t("col.completion"),
            ],
            formats,
        )?;
        row += 1;
        let first = row;
        for (i, phase) in metrics.phases.iter().enumerate() {
            let accent = &formats.accents[i % formats.accents.len()];
            sheet
                .write_with_format(row, 0, report.phase_title(&phase.phase).as_str(), accent)
                .map_err(xl)?;
            sheet
                .write_with_format(row, 1, phase.total as f64, &formats.integer)
                .map_err(xl)?;
            sheet
                .write_with_format(row, 2, phase.completed as f64, &formats.integer)
                .map_err(xl)?;
            sheet.write_with_format(row, 3, phase.percent, &formats.percent).map_err(xl)?;
            row += 1;
        }
        let last = row - 1;
        if self.include_charts {
            let mut chart = Chart::new(ChartType::Bar);
            chart
                .add_series()
                .set_name(report.t("col.completion"))
                .set_categories((sheet_name, first, 0, last, 0))
                .set_values((sheet_name, first, 3, last, 3));
            chart.title().set_name(report.t("chart.phase_completion"));
            chart.legend().set_hidden();
            chart.set_width(self.chart_width).set_height(self.chart_height);
            sheet.insert_chart(block, chart_col, &chart).map_err(xl)?;
        }
        row = row.max(block + chart_rows) + 1;

        // Turbine status
        let block = row;
        self.write_header_row(sheet, row, &[report.t("col.status"), report.t("col.count")], formats)?;
        row += 1;
        let first = row;
        let tally = [
            (StatusClass::Completed, metrics.turbines.completed),
            (StatusClass::InProgress, metrics.turbines.in_progress),
            (StatusClass::Planned, metrics.turbines.planned),
        ];
        for (class, count) in tally {
            let format = match class {
                StatusClass::Completed => &formats.status_completed,
                StatusClass::InProgress => &formats.status_in_progress,
                StatusClass::Planned => &formats.status_planned,
            };
            sheet.write_with_format(row, 0, report.t(class.key()), format).map_err(xl)?;
            sheet.write_with_format(row, 1, count as f64, &formats.integer).map_err(xl)?;
            row += 1;
        }
        let last = row - 1;
        if self.include_charts {
            let mut chart = Chart::new(ChartType::Pie);
            chart
                .add_series()
                .set_name(report.t("chart.turbine_status"))
                .set_categories((sheet_name, first, 0, last, 0))
                .set_values((sheet_name, first, 1, last, 1));
            chart.title().set_name(report.t("chart.turbine_status"));
            chart.legend().set_position(ChartLegendPosition::Right);
            chart.set_width(self.chart_width).set_height(self.chart_height);
            sheet.insert_chart(block, chart_col, &chart).map_err(xl)?;
        }
        row = row.max(block + chart_rows) + 1;

        // Weekly timeline
        let block = row;
        self.write_header_row(sheet, row, &[report.t("col.week"), report.t("col.count")], formats)?;
        row += 1;
        let first = row;
        for (i, bucket) in metrics.timeline.buckets.iter().enumerate() {
            let band = &formats.bands[i % formats.bands.len()];
            let label = if bucket.week == 0 {
                report.t("label.no_dates").to_string()
            } else {
                bucket.label.clone()
            };
            sheet.write_with_format(row, 0, label.as_str(), &band.text).map_err(xl)?;
            sheet
                .write_with_format(row, 1, bucket.count as f64, &formats.integer)
                .map_err(xl)?;
            row += 1;
        }
        let last = row - 1;
        if self.include_charts {
            let mut chart = Chart::new(ChartType::Line);
            chart
                .add_series()
                .set_name(report.t("chart.weekly_installations"))
                .set_categories((sheet_name, first, 0, last, 0))
                .set_values((sheet_name, first, 1, last, 1));
            chart.title().set_name(report.t("chart.weekly_installations"));
            chart.legend().set_hidden();
            chart.x_axis().set_name(report.t("col.week"));
            chart.set_width(self.chart_width).set_height(self.chart_height);
            sheet.insert_chart(block, chart_col, &chart).map_err(xl)?;
        }
        row = row.max(block + chart_rows) + 1;

        // Crane hours
        if !metrics.cranes.cranes.is_empty() {
            let block = row;
            self.write_header_row(
                sheet,
                row,
                &[
                    report.t("col.crane"),
                    report.t("col.work_hours"),
                    report.t("col.stoppage_hours"),
                    report.t("col.efficiency"),
                ],
                formats,
            )?;
            row += 1;
            let first = row;
            for (i, crane) in metrics.cranes.cranes.iter().enumerate() {
                let accent = &formats.accents[i % formats.accents.len()];
                sheet
                    .write_with_format(row, 0, crane_label(report, &crane.crane), accent)
                    .map_err(xl)?;
                sheet.write_with_format(row, 1, crane.work_hours, &formats.number).map_err(xl)?;
                sheet
                    .write_with_format(row, 2, crane.stoppage_hours, &formats.number)
                    .map_err(xl)?;
                sheet
                    .write_with_format(row, 3, crane.efficiency(), &formats.percent)
                    .map_err(xl)?;
                row += 1;
            }
            let last = row - 1;
            if self.include_charts {
                let mut chart = Chart::new(ChartType::Column);
                chart
                    .add_series()
                    .set_name(report.t("col.work_hours"))
                    .set_categories((sheet_name, first, 0, last, 0))
                    .set_values((sheet_name, first, 1, last, 1));
                chart
                    .add_series()
                    .set_name(report.t("col.stoppage_hours"))
                    .set_categories((sheet_name, first, 0, last, 0))
                    .set_values((sheet_name, first, 2, last, 2));
                chart.title().set_name(report.t("chart.crane_hours"));
                chart.legend().set_position(ChartLegendPosition::Bottom);
                chart.set_width(self.chart_width).set_height(self.chart_height);
                sheet.insert_chart(block, chart_col, &chart).map_err(xl)?;
            }
            row = row.max(block + chart_rows) + 1;
        }

        self.write_timestamp(sheet, row, report, formats)?;

        sheet.set_column_width(0, 26).map_err(xl)?;
        for col in 1..=3 {
            sheet.set_column_width(col, 13).map_err(xl)?;
        }
        for col in 4..=11 {
            sheet.set_column_width(col, 11).map_err(xl)?;
        }

        Ok(())
    }

    /// Add Deviation Analysis sheet
    fn add_deviation_sheet(
        &self,
        sheet: &mut Worksheet,
        report: &Report,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let deviations = &report.metrics.deviations;
        let headers = [
            report.t("col.phase"),
            report.t("col.turbine"),
            report.t("col.item"),
            report.t("col.planned_date"),
            report.t("col.actual_date"),
            report.t("col.deviation_days"),
            report.t("col.classification"),
        ];
        let last_col = (headers.len() - 1) as ColNum;
        self.write_title_block(sheet, report, report.t("sheet.deviations"), last_col, formats)?;

        let header_row: RowNum = 3;
        self.write_header_row(sheet, header_row, &headers, formats)?;
        let mut row = header_row + 1;

        for (i, deviation) in deviations.entries.iter().enumerate() {
            let band = &formats.bands[i % formats.bands.len()];
            sheet
                .write_with_format(row, 0, report.phase_title(&deviation.phase).as_str(), &band.text)
                .map_err(xl)?;
            self.write_cell(sheet, row, 1, &CellValue::text(&deviation.turbine), band, formats)?;
            self.write_cell(sheet, row, 2, &CellValue::text(&deviation.subject), band, formats)?;
            for (col, date) in [(3, deviation.planned), (4, deviation.actual)] {
                let cell = date
                    .and_hms_opt(0, 0, 0)
                    .map(|at| CellValue::Date(at, false))
                    .unwrap_or(CellValue::Empty);
                self.write_cell(sheet, row, col, &cell, band, formats)?;
            }
            sheet
                .write_with_format(row, 5, deviation.days as f64, &formats.integer)
                .map_err(xl)?;
            let class_format = match deviation.class {
                DeviationClass::OnSchedule => &formats.status_completed,
                DeviationClass::Ahead => &formats.status_planned,
                DeviationClass::Delayed => &formats.status_in_progress,
            };
            sheet
                .write_with_format(row, 6, report.t(deviation.class.key()), class_format)
                .map_err(xl)?;
            row += 1;
        }

        if deviations.entries.is_empty() {
            sheet
                .merge_range(row, 0, row, last_col, report.t("label.no_deviation_data"), &formats.footer)
                .map_err(xl)?;
            row += 1;
        } else {
            let last_row = row - 1;
            let scale = ConditionalFormat3ColorScale::new()
                .set_minimum_color(0x63BE7B)
                .set_midpoint_color(0xFFFFFF)
                .set_maximum_color(0xF8696B);
            sheet
                .add_conditional_format(header_row + 1, 5, last_row, 5, &scale)
                .map_err(xl)?;

            let late = Format::new().set_bold().set_font_color(0x9C0006);
            let early = Format::new().set_bold().set_font_color(0x006100);
            sheet
                .add_conditional_format(
                    header_row + 1,
                    5,
                    last_row,
                    5,
                    &ConditionalFormatCell::new()
                        .set_rule(ConditionalFormatCellRule::GreaterThan(0))
                        .set_format(late),
                )
                .map_err(xl)?;
            sheet
                .add_conditional_format(
                    header_row + 1,
                    5,
                    last_row,
                    5,
                    &ConditionalFormatCell::new()
                        .set_rule(ConditionalFormatCellRule::LessThan(0))
                        .set_format(early),
                )
                .map_err(xl)?;

            sheet.autofilter(header_row, 0, last_row, last_col).map_err(xl)?;
        }
        sheet.set_freeze_panes(header_row + 1, 0).map_err(xl)?;

        row += 1;
        let summary = [
            ("kpi.records_compared", deviations.coverage.included),
            ("coverage.deviation_excluded", deviations.coverage.excluded()),
            ("deviation.delayed", deviations.count(DeviationClass::Delayed)),
            ("deviation.ahead", deviations.count(DeviationClass::Ahead)),
            ("deviation.on_schedule", deviations.count(DeviationClass::OnSchedule)),
        ];
        for (key, value) in summary {
            sheet.write_with_format(row, 0, report.t(key), &formats.label).map_err(xl)?;
            sheet
                .write_with_format(row, 1, value as f64, &formats.integer)
                .map_err(xl)?;
            row += 1;
        }

        self.write_timestamp(sheet, row + 1, report, formats)?;

        let widths = [24, 14, 24, 14, 14, 16, 20];
        for (col, width) in widths.iter().enumerate() {
            sheet.set_column_width(col as ColNum, *width).map_err(xl)?;
        }

        Ok(())
    }

    /// Add Crane Analysis sheet
    fn add_crane_sheet(
        &self,
        sheet: &mut Worksheet,
        sheet_name: &str,
        report: &Report,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let cranes = &report.metrics.cranes;
        let headers = [
            report.t("col.crane"),
            report.t("col.events"),
            report.t("col.work_hours"),
            report.t("col.mobilization_hours"),
            report.t("col.stoppage_hours"),
            report.t("col.total_hours"),
            report.t("col.efficiency"),
            report.t("col.target"),
            report.t("col.status"),
        ];
        let last_col = (headers.len() - 1) as ColNum;
        self.write_title_block(sheet, report, report.t("sheet.cranes"), last_col, formats)?;

        if cranes.is_empty() {
            sheet
                .merge_range(3, 0, 3, last_col, report.t("label.no_crane_data"), &formats.footer)
                .map_err(xl)?;
            self.write_timestamp(sheet, 5, report, formats)?;
            sheet.set_column_width(0, 22).map_err(xl)?;
            return Ok(());
        }

        let mut row: RowNum = 3;
        sheet
            .merge_range(row, 0, row, last_col, report.t("section.crane_efficiency"), &formats.section)
            .map_err(xl)?;
        row += 1;
        self.write_header_row(sheet, row, &headers, formats)?;
        row += 1;
        let first = row;
        for (i, crane) in cranes.cranes.iter().enumerate() {
            let accent = &formats.accents[i % formats.accents.len()];
            sheet
                .write_with_format(row, 0, crane_label(report, &crane.crane), accent)
                .map_err(xl)?;
            sheet
                .write_with_format(row, 1, crane.events as f64, &formats.integer)
                .map_err(xl)?;
            sheet.write_with_format(row, 2, crane.work_hours, &formats.number).map_err(xl)?;
            sheet
                .write_with_format(row, 3, crane.mobilization_hours, &formats.number)
                .map_err(xl)?;
            sheet
                .write_with_format(row, 4, crane.stoppage_hours, &formats.number)
                .map_err(xl)?;
            sheet.write_with_format(row, 5, crane.total_hours(), &formats.number).map_err(xl)?;
            sheet
                .write_with_format(row, 6, crane.efficiency(), &formats.percent)
                .map_err(xl)?;
            sheet
                .write_with_format(row, 7, report.targets.crane_efficiency, &formats.percent)
                .map_err(xl)?;
            self.write_target_status(
                sheet,
                row,
                8,
                report,
                crane.efficiency(),
                report.targets.crane_efficiency,
                formats,
            )?;
            row += 1;
        }
        let icons = ConditionalFormatIconSet::new().set_icon_type(ConditionalFormatIconType::ThreeTrafficLights);
        sheet
            .add_conditional_format(first, 6, row - 1, 6, &icons)
            .map_err(xl)?;

        // Totals
        let mobilization: f64 = cranes.cranes.iter().map(|c| c.mobilization_hours).sum();
        let events: usize = cranes.cranes.iter().map(|c| c.events).sum();
        sheet.write_with_format(row, 0, report.t("label.total"), &formats.label).map_err(xl)?;
        sheet.write_with_format(row, 1, events as f64, &formats.integer).map_err(xl)?;
        sheet.write_with_format(row, 2, cranes.work_hours, &formats.number).map_err(xl)?;
        sheet.write_with_format(row, 3, mobilization, &formats.number).map_err(xl)?;
        sheet.write_with_format(row, 4, cranes.stoppage_hours, &formats.number).map_err(xl)?;
        sheet
            .write_with_format(row, 5, cranes.work_hours + mobilization + cranes.stoppage_hours, &formats.number)
            .map_err(xl)?;
        sheet
            .write_with_format(row, 6, cranes.overall_efficiency(), &formats.percent)
            .map_err(xl)?;
        sheet
            .write_with_format(row, 7, report.targets.crane_efficiency, &formats.percent)
            .map_err(xl)?;
        self.write_target_status(
            sheet,
            row,
            8,
            report,
            cranes.overall_efficiency(),
            report.targets.crane_efficiency,
            formats,
        )?;
        row += 2;

        // Stoppage reasons
        sheet
            .merge_range(row, 0, row, 3, report.t("section.stoppage_reasons"), &formats.section)
            .map_err(xl)?;
        row += 1;
        let block = row;
        self.write_header_row(
            sheet,
            row,
            &[
                report.t("col.reason"),
                report.t("col.occurrences"),
                report.t("col.hours"),
                report.t("col.share"),
            ],
            formats,
        )?;
        row += 1;
        let first = row;
        for (i, reason) in cranes.stoppage_reasons.iter().enumerate() {
            let accent = &formats.accents[i % formats.accents.len()];
            let label = if reason.reason.is_empty() {
                report.t("label.unspecified")
            } else {
                reason.reason.as_str()
            };
            sheet.write_with_format(row, 0, label, accent).map_err(xl)?;
            sheet.write_with_format(row, 1, reason.count as f64, &formats.integer).map_err(xl)?;
            sheet.write_with_format(row, 2, reason.hours, &formats.number).map_err(xl)?;
            sheet.write_with_format(row, 3, reason.share, &formats.percent).map_err(xl)?;
            row += 1;
        }
        if cranes.stoppage_reasons.is_empty() {
            sheet
                .merge_range(row, 0, row, 3, report.t("label.no_stoppages"), &formats.footer)
                .map_err(xl)?;
            row += 1;
        } else if self.include_charts {
            let last = row - 1;
            let mut chart = Chart::new(ChartType::Pie);
            chart
                .add_series()
                .set_name(report.t("section.stoppage_reasons"))
                .set_categories((sheet_name, first, 0, last, 0))
                .set_values((sheet_name, first, 2, last, 2));
            chart.title().set_name(report.t("section.stoppage_reasons"));
            chart.legend().set_position(ChartLegendPosition::Right);
            chart.set_width(self.chart_width).set_height(self.chart_height);
            sheet.insert_chart(block, 5, &chart).map_err(xl)?;
            row = row.max(block + (self.chart_height / 20 + 2) as RowNum);
        }

        row += 1;
        sheet
            .write_with_format(row, 0, report.t("coverage.crane_unmeasured"), &formats.label)
            .map_err(xl)?;
        sheet
            .write_with_format(row, 1, cranes.coverage.excluded() as f64, &formats.integer)
            .map_err(xl)?;

        self.write_timestamp(sheet, row + 2, report, formats)?;

        let widths = [24, 10, 12, 14, 12, 12, 13, 10, 22];
        for (col, width) in widths.iter().enumerate() {
            sheet.set_column_width(col as ColNum, *width).map_err(xl)?;
        }

        Ok(())
    }

    /// Add Critical Observations sheet
    fn add_observations_sheet(
        &self,
        sheet: &mut Worksheet,
        report: &Report,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let observations = &report.metrics.observations;
        let headers = [
            report.t("col.phase"),
            report.t("col.subject"),
            report.t("col.date"),
            report.t("col.type"),
            report.t("col.detail"),
            report.t("col.description"),
        ];
        let last_col = (headers.len() - 1) as ColNum;
        self.write_title_block(sheet, report, report.t("sheet.observations"), last_col, formats)?;

        let header_row: RowNum = 3;
        self.write_header_row(sheet, header_row, &headers, formats)?;
        let mut row = header_row + 1;

        for (i, observation) in observations.iter().enumerate() {
            let band = &formats.bands[i % formats.bands.len()];
            let (kind, detail, kind_format) = match &observation.kind {
                ObservationKind::Note => (report.t("observation.note"), String::new(), &band.text),
                ObservationKind::Delay { days } => (
                    report.t("observation.delay"),
                    format!("+{days} {}", report.t("unit.days")),
                    &formats.status_in_progress,
                ),
                ObservationKind::Stoppage { hours } => (
                    report.t("observation.stoppage"),
                    format!("{} h", format_number(*hours)),
                    &formats.attention,
                ),
            };
            sheet
                .write_with_format(row, 0, report.phase_title(&observation.phase).as_str(), &band.text)
                .map_err(xl)?;
            self.write_cell(sheet, row, 1, &CellValue::text(&observation.subject), band, formats)?;
            let date = observation
                .date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|at| CellValue::Date(at, false))
                .unwrap_or(CellValue::Empty);
            self.write_cell(sheet, row, 2, &date, band, formats)?;
            sheet.write_with_format(row, 3, kind, kind_format).map_err(xl)?;
            self.write_cell(sheet, row, 4, &CellValue::text(&detail), band, formats)?;
            self.write_cell(sheet, row, 5, &CellValue::text(&observation.text), band, formats)?;
            row += 1;
        }

        if observations.is_empty() {
            sheet
                .merge_range(row, 0, row, last_col, report.t("label.no_observations"), &formats.footer)
                .map_err(xl)?;
            row += 1;
        } else {
            sheet.autofilter(header_row, 0, row - 1, last_col).map_err(xl)?;
        }
        sheet.set_freeze_panes(header_row + 1, 0).map_err(xl)?;

        self.write_timestamp(sheet, row + 1, report, formats)?;

        let widths = [24, 16, 13, 16, 12, 50];
        for (col, width) in widths.iter().enumerate() {
            sheet.set_column_width(col as ColNum, *width).map_err(xl)?;
        }

        Ok(())
    }

    /// Add one phase sheet
    fn add_phase_sheet(
        &self,
        sheet: &mut Worksheet,
        sheet_name: &str,
        report: &Report,
        phase: &PhaseData,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let table: Table = phase_table(report, phase);
        let last_col = (table.columns.len() - 1) as ColNum;
        self.write_title_block(sheet, report, &table.title, last_col, formats)?;

        let header_row: RowNum = 3;
        let headers: Vec<&str> = table.columns.iter().map(|c| c.header.as_str()).collect();
        self.write_header_row(sheet, header_row, &headers, formats)?;
        sheet.set_row_height(header_row, 30).map_err(xl)?;

        let mut row = header_row + 1;
        for (i, cells) in table.rows.iter().enumerate() {
            let band = &formats.bands[i % formats.bands.len()];
            for (col, cell) in cells.iter().enumerate() {
                self.write_cell(sheet, row, col as ColNum, cell, band, formats)?;
            }
            row += 1;
        }
        let last_row = row - 1;

        // Progress icons
        if let Some(col) = table.column_index(report.t("col.progress")) {
            let icons = ConditionalFormatIconSet::new().set_icon_type(ConditionalFormatIconType::ThreeArrows);
            sheet
                .add_conditional_format(header_row + 1, col as ColNum, last_row, col as ColNum, &icons)
                .map_err(xl)?;
        }

        sheet.set_freeze_panes(header_row + 1, 0).map_err(xl)?;
        sheet.autofilter(header_row, 0, last_row, last_col).map_err(xl)?;
        sheet.set_repeat_rows(header_row, header_row).map_err(xl)?;
        sheet.set_landscape();
        sheet.set_footer(&format!(
            "&L{}&C{}&R&P / &N",
            escape_header_text(&report.project_name),
            escape_header_text(sheet_name)
        ));

        self.write_timestamp(sheet, last_row + 2, report, formats)?;

        for (col, column) in table.columns.iter().enumerate() {
            sheet.set_column_width(col as ColNum, column.width).map_err(xl)?;
        }

        Ok(())
    }
}

/// Reusable Excel formats
struct ExcelFormats {
    title: Format,
    subtitle: Format,
    section: Format,
    header: Format,
    label: Format,
    text: Format,
    integer: Format,
    number: Format,
    percent: Format,
    kpi_label: Format,
    kpi_value: Format,
    // Row banding, cycled by row index
    bands: Vec<BandFormats>,
    // Entity accent colors, cycled by row index
    accents: Vec<Format>,
    status_completed: Format,
    status_in_progress: Format,
    status_planned: Format,
    // Target glyphs
    good: Format,
    attention: Format,
    footer: Format,
}

/// Cell formats sharing one band color
struct BandFormats {
    text: Format,
    date: Format,
    datetime: Format,
    number: Format,
    percent: Format,
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(report)
    }
}

fn xl(e: XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

fn excel_datetime(value: &NaiveDateTime) -> Result<ExcelDateTime, XlsxError> {
    // Out-of-range years are rejected by from_ymd
    let year = value.year().clamp(0, i32::from(u16::MAX)) as u16;
    ExcelDateTime::from_ymd(year, value.month() as u8, value.day() as u8)?.and_hms(
        value.hour() as u16,
        value.minute() as u8,
        value.second(),
    )
}

fn crane_label<'a>(report: &'a Report, crane: &'a str) -> &'a str {
    if crane.is_empty() {
        report.t("label.unspecified")
    } else {
        crane
    }
}

/// Strip characters Excel rejects in sheet names and cap the length.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '-',
            other => other,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('\'');
    let capped: String = trimmed.chars().take(MAX_SHEET_NAME).collect();
    // Truncation can expose a trailing apostrophe again
    let capped = capped.trim_end().trim_end_matches('\'').trim_end();
    if capped.is_empty() {
        "Sheet".to_string()
    } else {
        capped.to_string()
    }
}

/// Excel compares sheet names case-insensitively over all of Unicode.
fn same_sheet_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// `&` starts a control code in Excel headers and footers.
fn escape_header_text(text: &str) -> String {
    text.replace('&', "&&")
}
