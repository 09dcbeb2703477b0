//! PDF as-built report renderer
//!
//! A4 landscape document built from the same tables as the workbook:
//! title page (with a KPI summary for complete reports), one section per
//! selected phase, and per-crane summaries after each crane log. Tables
//! repeat their header row after a page break. Every page carries the
//! project name and a "page n of N" footer.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Rect, Rgb,
};

use asbuilt_core::{
    CraneUtilization, DeviationClass, PhaseData, PhaseId, RenderError, Renderer, Report, StatusClass,
    TargetStatus,
};

use crate::tables::{format_number, phase_table, CellValue, Table};

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 20.0;
const FOOTER_HEIGHT: f32 = 8.0;
const USABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const ROW_HEIGHT: f32 = 6.5;
const HEADER_ROW_HEIGHT: f32 = 8.0;
const CELL_PADDING: f32 = 1.5;
const BODY_SIZE: f32 = 8.0;
const HEADER_SIZE: f32 = 9.0;

/// Points to millimetres
const PT: f32 = 0.3528;
/// Average Helvetica glyph width relative to the font size
const GLYPH_WIDTH: f32 = 0.5;

const PRIMARY: u32 = 0x1F4E78;
const SECONDARY: u32 = 0x4472C4;
const MUTED: u32 = 0x666666;
const GRID: u32 = 0x808080;
const WHITE: u32 = 0xFFFFFF;
const BLACK: u32 = 0x000000;
const BAND_PALETTE: [u32; 2] = [0xFFFFFF, 0xF5F5F5];
const COMPLETED_FILL: u32 = 0xC6EFCE;
const IN_PROGRESS_FILL: u32 = 0xFFEB9C;
const PLANNED_FILL: u32 = 0xF2F2F2;

/// Document sections, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionKind {
    TitlePage,
    Phase(PhaseId),
}

/// PDF as-built report renderer
#[derive(Clone, Debug)]
pub struct PdfRenderer {
    /// Start each phase section on a new page
    pub page_per_phase: bool,
    /// Body font size in points
    pub font_size: f32,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            page_per_phase: false,
            font_size: BODY_SIZE,
        }
    }
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start each phase section on a new page
    pub fn page_per_phase(mut self) -> Self {
        self.page_per_phase = true;
        self
    }

    /// Set the body font size in points
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Sections this report produces, in order.
    pub fn section_plan(&self, report: &Report) -> Vec<SectionKind> {
        let mut plan = vec![SectionKind::TitlePage];
        plan.extend(report.rendered_phases().map(|phase| SectionKind::Phase(phase.id.clone())));
        plan
    }

    /// Generate PDF document bytes
    pub fn render_to_bytes(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        let title = format!("{} - {}", report.t("report.title"), report.project_name);
        let mut writer = DocumentWriter::new(&title, self.font_size)?;

        let plan = self.section_plan(report);
        tracing::debug!(sections = plan.len(), "writing document");

        for (i, section) in plan.iter().enumerate() {
            match section {
                SectionKind::TitlePage => self.write_title_page(&mut writer, report),
                SectionKind::Phase(id) => {
                    let phase = report
                        .data
                        .phase(id)
                        .ok_or_else(|| RenderError::InvalidData(format!("phase {id} not in data")))?;
                    // Complete reports keep the title page to itself
                    let after_title = i == 1 && report.complete;
                    if (self.page_per_phase && i > 0) || after_title {
                        writer.new_page();
                    }
                    self.write_phase_section(&mut writer, report, phase);
                }
            }
        }

        let footer = format!(
            "{}  |  {}: {}",
            report.project_name,
            report.t("label.generated"),
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        writer.finish(&footer, report.t("label.page"), report.t("label.of"))
    }

    fn write_title_page(&self, writer: &mut DocumentWriter, report: &Report) {
        writer.spacer(10.0);
        writer.centered(report.t("report.title"), 24.0, true, PRIMARY);
        writer.centered(&report.project_name, 18.0, true, PRIMARY);
        let stamp = format!(
            "{}: {}",
            report.t("label.generated"),
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        writer.centered(&stamp, 10.0, false, MUTED);
        writer.spacer(8.0);

        if !report.complete {
            return;
        }

        let metrics = &report.metrics;
        let completion = metrics.overall_completion();
        let efficiency = metrics.cranes.overall_efficiency();

        writer.heading(report.t("section.kpis"), 14.0, SECONDARY);
        let plain = |key: &str, value: f64| {
            vec![
                PdfCell::text(report.t(key)),
                PdfCell::text(&format_number(value)),
                PdfCell::empty(),
                PdfCell::empty(),
            ]
        };
        let rows = vec![
            plain("kpi.turbines", metrics.turbines.total as f64),
            plain("kpi.turbines_completed", metrics.turbines.completed as f64),
            plain("kpi.turbines_in_progress", metrics.turbines.in_progress as f64),
            plain("kpi.turbines_planned", metrics.turbines.planned as f64),
            vec![
                PdfCell::text(report.t("kpi.completion")),
                PdfCell::text(&format!("{}%", format_number(completion))),
                PdfCell::text(&format!("{}%", format_number(report.targets.completion))),
                target_cell(report, completion, report.targets.completion),
            ],
            plain("kpi.crane_work_hours", metrics.cranes.work_hours),
            plain("kpi.crane_stoppage_hours", metrics.cranes.stoppage_hours),
            vec![
                PdfCell::text(report.t("kpi.crane_efficiency")),
                PdfCell::text(&format!("{}%", format_number(efficiency))),
                PdfCell::text(&format!("{}%", format_number(report.targets.crane_efficiency))),
                target_cell(report, efficiency, report.targets.crane_efficiency),
            ],
            plain("kpi.records_compared", metrics.deviations.entries.len() as f64),
            plain("deviation.delayed", metrics.deviations.count(DeviationClass::Delayed) as f64),
            plain("deviation.ahead", metrics.deviations.count(DeviationClass::Ahead) as f64),
            plain("kpi.max_delay", metrics.deviations.max_delay() as f64),
        ];
        let headers = [
            report.t("col.indicator"),
            report.t("col.value"),
            report.t("col.target"),
            report.t("col.status"),
        ];
        writer.table(&headers, &[80.0, 35.0, 35.0, 50.0], &rows);
        writer.spacer(4.0);

        let coverage = [
            ("coverage.deviation_excluded", metrics.deviations.coverage.excluded()),
            ("coverage.crane_unmeasured", metrics.cranes.coverage.excluded()),
            ("coverage.undated", metrics.timeline.coverage.excluded()),
        ];
        for (key, count) in coverage {
            writer.line(&format!("{}: {}", report.t(key), count), 9.0, false, MUTED);
        }

        if report.rendered_phases().next().is_none() {
            writer.spacer(4.0);
            writer.line(report.t("label.no_phase_data"), 10.0, false, MUTED);
        }
    }

    fn write_phase_section(&self, writer: &mut DocumentWriter, report: &Report, phase: &PhaseData) {
        let table = phase_table(report, phase);
        writer.heading(&table.title, 16.0, SECONDARY);
        let (headers, widths, rows) = pdf_table(&table);
        let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
        writer.table(&headers, &widths, &rows);
        writer.spacer(5.0);

        if phase.id.is_crane() {
            self.write_crane_summary(writer, report, &CraneUtilization::from_events(phase.crane()));
        }
    }

    fn write_crane_summary(&self, writer: &mut DocumentWriter, report: &Report, cranes: &CraneUtilization) {
        if cranes.cranes.is_empty() {
            return;
        }
        writer.heading(report.t("section.crane_activity"), 12.0, PRIMARY);

        let target = report.targets.crane_efficiency;
        let mut rows: Vec<Vec<PdfCell>> = cranes
            .cranes
            .iter()
            .map(|crane| {
                let efficiency = crane.efficiency();
                let name = if crane.crane.is_empty() {
                    report.t("label.unspecified")
                } else {
                    crane.crane.as_str()
                };
                vec![
                    PdfCell::text(name),
                    PdfCell::text(&crane.events.to_string()),
                    PdfCell::text(&format_number(crane.work_hours)),
                    PdfCell::text(&format_number(crane.mobilization_hours)),
                    PdfCell::text(&format_number(crane.stoppage_hours)),
                    PdfCell::text(&format!("{}%", format_number(efficiency))),
                    target_cell(report, efficiency, target),
                ]
            })
            .collect();

        let overall = cranes.overall_efficiency();
        let mobilization: f64 = cranes.cranes.iter().map(|c| c.mobilization_hours).sum();
        let events: usize = cranes.cranes.iter().map(|c| c.events).sum();
        rows.push(vec![
            PdfCell::bold(report.t("label.total")),
            PdfCell::bold(&events.to_string()),
            PdfCell::bold(&format_number(cranes.work_hours)),
            PdfCell::bold(&format_number(mobilization)),
            PdfCell::bold(&format_number(cranes.stoppage_hours)),
            PdfCell::bold(&format!("{}%", format_number(overall))),
            target_cell(report, overall, target),
        ]);

        let headers = [
            report.t("col.crane"),
            report.t("col.events"),
            report.t("col.work_hours"),
            report.t("col.mobilization_hours"),
            report.t("col.stoppage_hours"),
            report.t("col.efficiency"),
            report.t("col.status"),
        ];
        writer.table(&headers, &[50.0, 22.0, 32.0, 38.0, 32.0, 30.0, 40.0], &rows);
        writer.spacer(5.0);
    }
}

impl Renderer for PdfRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(report)
    }
}

/// Threshold label against a goal
fn target_cell(report: &Report, value: f64, target: f64) -> PdfCell {
    let status = TargetStatus::of(value, target);
    let fill = match status {
        TargetStatus::Met => COMPLETED_FILL,
        TargetStatus::Attention => IN_PROGRESS_FILL,
    };
    PdfCell::filled(report.t(status.label_key()), fill)
}

/// Scale a shared table to the page width and flatten its cells to text.
fn pdf_table(table: &Table) -> (Vec<String>, Vec<f32>, Vec<Vec<PdfCell>>) {
    let headers = table.columns.iter().map(|c| c.header.clone()).collect();
    let hint_total: f64 = table.columns.iter().map(|c| c.width).sum();
    let widths = table
        .columns
        .iter()
        .map(|c| (c.width / hint_total) as f32 * USABLE_WIDTH)
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    CellValue::Status(text, class) => PdfCell::filled(text, status_fill(*class)),
                    other => PdfCell::text(&other.display()),
                })
                .collect()
        })
        .collect();
    (headers, widths, rows)
}

fn status_fill(class: StatusClass) -> u32 {
    match class {
        StatusClass::Completed => COMPLETED_FILL,
        StatusClass::InProgress => IN_PROGRESS_FILL,
        StatusClass::Planned => PLANNED_FILL,
    }
}

// ============================================================================
// Page layout
// ============================================================================

/// One table cell as drawn.
#[derive(Clone, Debug, Default, PartialEq)]
struct PdfCell {
    text: String,
    fill: Option<u32>,
    bold: bool,
}

impl PdfCell {
    fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    fn bold(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: true,
            ..Self::default()
        }
    }

    fn filled(text: &str, fill: u32) -> Self {
        Self {
            text: text.to_string(),
            fill: Some(fill),
            ..Self::default()
        }
    }

    fn empty() -> Self {
        Self::default()
    }
}

/// Flowing writer over a printpdf document: tracks the vertical cursor and
/// breaks pages when content would run into the footer.
struct DocumentWriter {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    layer: PdfLayerReference,
    /// Cursor, millimetres from the bottom edge
    y: f32,
    body_size: f32,
}

impl DocumentWriter {
    fn new(title: &str, body_size: f32) -> Result<Self, RenderError> {
        let (doc, page, layer_index) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer_index);

        Ok(Self {
            doc,
            regular,
            bold,
            pages: vec![(page, layer_index)],
            layer,
            y: PAGE_HEIGHT - MARGIN,
            body_size,
        })
    }

    fn new_page(&mut self) {
        let (page, layer_index) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer_index);
        self.pages.push((page, layer_index));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Break the page unless `height` still fits above the footer.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y - height < MARGIN + FOOTER_HEIGHT {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn spacer(&mut self, height: f32) {
        self.y -= height;
    }

    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    fn draw_text(&self, text: &str, size: f32, x: f32, baseline: f32, bold: bool, color: u32) {
        self.layer.set_fill_color(rgb(color));
        self.layer.use_text(text, size, Mm(x), Mm(baseline), self.font(bold));
    }

    fn draw_rect(&self, x: f32, top: f32, width: f32, height: f32, fill: u32) {
        self.layer.set_fill_color(rgb(fill));
        self.layer.set_outline_color(rgb(GRID));
        self.layer.set_outline_thickness(0.3);
        let rect = Rect::new(Mm(x), Mm(top - height), Mm(x + width), Mm(top)).with_mode(PaintMode::FillStroke);
        self.layer.add_rect(rect);
    }

    fn line(&mut self, text: &str, size: f32, bold: bool, color: u32) {
        let height = size * PT * 1.5;
        self.ensure_space(height);
        self.y -= height;
        self.draw_text(text, size, MARGIN, self.y, bold, color);
    }

    fn centered(&mut self, text: &str, size: f32, bold: bool, color: u32) {
        let height = size * PT * 1.6;
        self.ensure_space(height);
        self.y -= height;
        let width = text_width(text, size).min(USABLE_WIDTH);
        let x = (PAGE_WIDTH - width) / 2.0;
        self.draw_text(&fit_text(text, USABLE_WIDTH, size), size, x, self.y, bold, color);
    }

    /// Section heading; moves to a new page when no table row would fit under it.
    fn heading(&mut self, text: &str, size: f32, color: u32) {
        let height = size * PT * 1.8;
        self.ensure_space(height + HEADER_ROW_HEIGHT + ROW_HEIGHT);
        self.y -= height;
        self.draw_text(text, size, MARGIN, self.y + size * PT * 0.4, true, color);
    }

    fn header_row(&mut self, headers: &[&str], widths: &[f32]) {
        let top = self.y;
        let mut x = MARGIN;
        for (header, width) in headers.iter().zip(widths) {
            self.draw_rect(x, top, *width, HEADER_ROW_HEIGHT, PRIMARY);
            let text = fit_text(header, *width - 2.0 * CELL_PADDING, HEADER_SIZE);
            self.draw_text(&text, HEADER_SIZE, x + CELL_PADDING, top - HEADER_ROW_HEIGHT + 2.5, true, WHITE);
            x += width;
        }
        self.y -= HEADER_ROW_HEIGHT;
    }

    /// Grid table with a header row repeated after every page break and
    /// rows banded by index.
    fn table(&mut self, headers: &[&str], widths: &[f32], rows: &[Vec<PdfCell>]) {
        self.ensure_space(HEADER_ROW_HEIGHT + ROW_HEIGHT);
        self.header_row(headers, widths);

        for (i, row) in rows.iter().enumerate() {
            if self.ensure_space(ROW_HEIGHT) {
                self.header_row(headers, widths);
            }
            let band = BAND_PALETTE[i % BAND_PALETTE.len()];
            let top = self.y;
            let mut x = MARGIN;
            for (cell, width) in row.iter().zip(widths) {
                self.draw_rect(x, top, *width, ROW_HEIGHT, cell.fill.unwrap_or(band));
                let text = fit_text(&cell.text, *width - 2.0 * CELL_PADDING, self.body_size);
                if !text.is_empty() {
                    self.draw_text(&text, self.body_size, x + CELL_PADDING, top - ROW_HEIGHT + 2.0, cell.bold, BLACK);
                }
                x += width;
            }
            self.y -= ROW_HEIGHT;
        }
    }

    /// Stamp footers with page numbers and serialize.
    fn finish(self, footer: &str, page_label: &str, of_label: &str) -> Result<Vec<u8>, RenderError> {
        let total = self.pages.len();
        for (n, (page, layer_index)) in self.pages.iter().enumerate() {
            let layer = self.doc.get_page(*page).get_layer(*layer_index);
            layer.set_fill_color(rgb(MUTED));
            let footer = fit_text(footer, USABLE_WIDTH * 0.75, 8.0);
            layer.use_text(footer, 8.0, Mm(MARGIN), Mm(MARGIN / 2.0), &self.regular);

            let number = format!("{} {} {} {}", page_label, n + 1, of_label, total);
            let x = PAGE_WIDTH - MARGIN - text_width(&number, 8.0);
            layer.use_text(number, 8.0, Mm(x), Mm(MARGIN / 2.0), &self.regular);
        }
        tracing::debug!(pages = total, "document laid out");

        self.doc.save_to_bytes().map_err(pdf_err)
    }
}

fn pdf_err(e: printpdf::Error) -> RenderError {
    RenderError::Format(format!("Failed to create PDF: {e}"))
}

fn rgb(hex: u32) -> Color {
    let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
    Color::Rgb(Rgb::new(channel(16), channel(8), channel(0), None))
}

/// Estimated rendered width in millimetres.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * PT * GLYPH_WIDTH
}

/// Truncate with an ellipsis so `text` fits in `width` millimetres.
fn fit_text(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * PT * GLYPH_WIDTH)).floor().max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut fitted: String = text.chars().take(max_chars - 3).collect();
    fitted.push_str("...");
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use asbuilt_core::ReportRequest;
    use pretty_assertions::assert_eq;

    fn report(json: &str) -> Report {
        Report::from_request(ReportRequest::from_json(json).unwrap())
    }

    #[test]
    fn fit_text_truncates_with_ellipsis() {
        assert_eq!(fit_text("short", 50.0, 8.0), "short");
        // 8pt glyph is ~1.41mm wide: 10mm holds 7 characters
        assert_eq!(fit_text("a much longer cell value", 10.0, 8.0), "a mu...");
        assert_eq!(fit_text("abcdef", 3.0, 8.0), "ab");
    }

    #[test]
    fn section_plan_skips_missing_phases() {
        let report = report(
            r#"{"projectName": "P", "selectedPhases": ["assemblagem", "recepcao", "gruasPads"], "outputPath": "x.pdf",
                "dataByPhase": {"recepcao": [{"turbina": "T1"}], "gruasPads": []}}"#,
        );
        assert_eq!(
            PdfRenderer::new().section_plan(&report),
            vec![SectionKind::TitlePage, SectionKind::Phase(PhaseId::Reception)]
        );
    }

    #[test]
    fn table_widths_fill_page() {
        let report = report(
            r#"{"projectName": "P", "selectedPhases": ["recepcao"], "outputPath": "x.pdf",
                "dataByPhase": {"recepcao": [{"turbina": "T1", "status": "Concluído"}]}}"#,
        );
        let table = phase_table(&report, &report.data.phases()[0]);
        let (headers, widths, rows) = pdf_table(&table);
        assert_eq!(headers.len(), widths.len());
        let total: f32 = widths.iter().sum();
        assert!((total - USABLE_WIDTH).abs() < 0.01, "{total}");
        assert_eq!(rows[0][0].text, "T1");
        assert_eq!(rows[0][6].fill, Some(COMPLETED_FILL));
    }

    #[test]
    fn rgb_channels() {
        let Color::Rgb(color) = rgb(0xFF0000) else {
            panic!("expected rgb");
        };
        assert_eq!((color.r, color.g, color.b), (1.0, 0.0, 0.0));
    }
}
