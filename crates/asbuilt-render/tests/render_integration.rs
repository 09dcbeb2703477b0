//! Integration tests for Excel and PDF rendering

use asbuilt_core::{Renderer, Report, ReportRequest, Targets};
use asbuilt_render::{phase_table, CellValue, ExcelRenderer, PdfRenderer, SectionKind, SheetKind};
use asbuilt_core::PhaseId;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

/// A wind farm with every phase kind and both crane logs
const SERRA_ALTA: &str = r#"{
    "projectName": "Parque Eólico Serra Alta",
    "language": "pt",
    "selectedPhases": ["recepcao", "preparacao", "assemblagem", "torqueTensionamento", "fasesFinais", "gruasPads", "gruasGerais"],
    "outputPath": "serra_alta.xlsx",
    "dataByPhase": {
        "recepcao": [
            {"turbinaId": "WTG-01", "componentId": "Blade A", "vui": "V-100", "serialNumber": "SN-0042",
             "itemNumber": "IT-7", "dataDescarga": "2024-01-15", "status": "Concluído",
             "dataPlaneada": "2024-01-10", "dataReal": "2024-01-15", "observacoes": "Descarga com vento forte"},
            {"turbinaId": "WTG-02", "componentId": "Nacelle", "dataDescarga": "16/01/2024", "status": "Em progresso"}
        ],
        "preparacao": [
            {"turbinaId": "WTG-01", "componentId": "Tower base", "dataInicio": "2024-01-20", "dataFim": "2024-01-22",
             "status": "Concluído", "dataPlaneada": "2024-01-25", "dataReal": "2024-01-20"}
        ],
        "assemblagem": [
            {"turbinaId": "WTG-01", "componentId": "Hub", "dataInicio": "2024-02-01T08:30:00", "dataFim": "2024-02-02",
             "status": "Concluído"}
        ],
        "torqueTensionamento": [
            {"turbinaId": "WTG-01", "conexao": "T1-T2", "torqueValue": 2500, "torqueUnit": "Nm",
             "tensioningValue": "1200", "tensioningUnit": "kN", "dataExecucao": "2024-02-05", "status": "Concluído"}
        ],
        "fasesFinais": [
            {"turbinaId": "WTG-01", "faseName": "Comissionamento", "dataInicio": "2024-02-10", "dataFim": "2024-02-12",
             "status": "Em curso", "progresso": "60%"}
        ],
        "gruasPads": [
            {"grua": "LR 1750", "tipo": "Trabalho", "dataInicio": "2024-02-01", "horaInicio": "08:00",
             "dataFim": "2024-02-01", "horaFim": "16:00", "duracao": "8h"},
            {"grua": "LR 1750", "tipo": "Paragem", "duracao": "4 horas", "motivo": "Vento", "observacoes": "Rajadas acima do limite"},
            {"grua": "LR 1750", "tipo": "Mobilização", "duracao": "2h"}
        ],
        "gruasGerais": [
            {"grua": "AC 100", "tipo": "Trabalho", "dataInicio": "2024-02-03", "horaInicio": "07:00",
             "dataFim": "2024-02-03", "horaFim": "12:30"}
        ]
    }
}"#;

fn report(json: &str) -> Report {
    let at = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(10, 15, 0)
        .unwrap();
    Report::from_request(ReportRequest::from_json(json).unwrap()).generated_at(at)
}

fn serra_alta() -> Report {
    report(SERRA_ALTA)
}

#[test]
fn render_complete_workbook() {
    let xlsx = ExcelRenderer::new().render(&serra_alta()).unwrap();

    // Valid XLSX (zip signature)
    assert!(xlsx.len() > 100);
    assert_eq!(&xlsx[0..2], b"PK");
}

#[test]
fn render_workbook_without_charts() {
    let xlsx = ExcelRenderer::new().no_charts().render(&serra_alta()).unwrap();
    assert_eq!(&xlsx[0..2], b"PK");
}

#[test]
fn render_workbook_in_english() {
    let json = SERRA_ALTA.replace(r#""language": "pt""#, r#""language": "en""#);
    let report = report(&json);
    let renderer = ExcelRenderer::new();

    let names = renderer.sheet_names(&report, &renderer.sheet_plan(&report));
    assert_eq!(names[0], "Cover");
    assert_eq!(names[1], "Executive Summary");
    assert!(names.contains(&"Reception - Unloading".to_string()), "{names:?}");

    let xlsx = renderer.render(&report).unwrap();
    assert_eq!(&xlsx[0..2], b"PK");
}

#[test]
fn workbook_sheet_plan_follows_selection() {
    let report = serra_alta();
    let plan = ExcelRenderer::new().sheet_plan(&report);

    assert_eq!(plan.len(), 6 + 7);
    assert_eq!(plan[6], SheetKind::Phase(PhaseId::Reception));
    assert_eq!(plan[12], SheetKind::Phase(PhaseId::CranesGeneral));
}

#[test]
fn tables_only_workbook() {
    let json = SERRA_ALTA.replace(r#""language": "pt""#, r#""language": "pt", "completeReport": false"#);
    let report = report(&json);
    let plan = ExcelRenderer::new().sheet_plan(&report);

    assert_eq!(plan.len(), 7);
    assert!(plan.iter().all(|kind| matches!(kind, SheetKind::Phase(_))));
    assert_eq!(&ExcelRenderer::new().render(&report).unwrap()[0..2], b"PK");
}

#[test]
fn missing_selected_phase_is_skipped() {
    let report = report(
        r#"{"projectName": "P", "selectedPhases": ["preAssemblagem", "recepcao"], "outputPath": "x.xlsx",
            "dataByPhase": {"recepcao": [{"turbinaId": "T1", "status": "Concluído"}]}}"#,
    );

    let sheets = ExcelRenderer::new().sheet_plan(&report);
    assert!(!sheets.contains(&SheetKind::Phase(PhaseId::PreAssembly)));
    assert!(sheets.contains(&SheetKind::Phase(PhaseId::Reception)));

    let sections = PdfRenderer::new().section_plan(&report);
    assert_eq!(
        sections,
        vec![SectionKind::TitlePage, SectionKind::Phase(PhaseId::Reception)]
    );

    assert_eq!(&ExcelRenderer::new().render(&report).unwrap()[0..2], b"PK");
    assert_eq!(&PdfRenderer::new().render(&report).unwrap()[0..4], b"%PDF");
}

#[test]
fn empty_data_still_renders() {
    let report = report(
        r#"{"projectName": "Vazio", "selectedPhases": ["recepcao"], "outputPath": "x.xlsx", "dataByPhase": {}}"#,
    );
    assert_eq!(report.metrics.timeline.buckets.len(), 1);
    assert_eq!(&ExcelRenderer::new().render(&report).unwrap()[0..2], b"PK");
    assert_eq!(&PdfRenderer::new().render(&report).unwrap()[0..4], b"%PDF");
}

#[test]
fn render_complete_document() {
    let pdf = PdfRenderer::new().render(&serra_alta()).unwrap();
    assert!(pdf.len() > 100);
    assert_eq!(&pdf[0..4], b"%PDF");
}

#[test]
fn render_document_page_per_phase() {
    let pdf = PdfRenderer::new().page_per_phase().render(&serra_alta()).unwrap();
    assert_eq!(&pdf[0..4], b"%PDF");
}

#[test]
fn long_tables_break_across_pages() {
    let records: Vec<String> = (1..=250)
        .map(|i| {
            format!(
                r#"{{"turbinaId": "WTG-{i:03}", "componentId": "Blade {i}", "dataDescarga": "2024-01-15", "status": "Planeado"}}"#
            )
        })
        .collect();
    let json = format!(
        r#"{{"projectName": "Grande", "selectedPhases": ["recepcao"], "outputPath": "x.pdf",
            "dataByPhase": {{"recepcao": [{}]}}}}"#,
        records.join(",")
    );
    let report = report(&json);

    let single = PdfRenderer::new().render(&report).unwrap();
    assert_eq!(&single[0..4], b"%PDF");

    let xlsx = ExcelRenderer::new().render(&report).unwrap();
    assert_eq!(&xlsx[0..2], b"PK");
}

#[test]
fn targets_change_nothing_structural() {
    let report = serra_alta().with_targets(Targets {
        crane_efficiency: 50.0,
        completion: 80.0,
    });
    assert_eq!(&ExcelRenderer::new().render(&report).unwrap()[0..2], b"PK");
    assert_eq!(&PdfRenderer::new().render(&report).unwrap()[0..4], b"%PDF");
}

#[test]
fn field_values_land_in_their_columns() {
    let report = serra_alta();

    let reception = phase_table(&report, report.data.phase(&PhaseId::Reception).unwrap());
    let row = &reception.rows[0];
    assert_eq!(row[0], CellValue::Text("WTG-01".into()));
    assert_eq!(row[1], CellValue::Text("Blade A".into()));
    assert_eq!(row[2], CellValue::Text("V-100".into()));
    assert_eq!(row[3], CellValue::Text("SN-0042".into()));
    assert_eq!(row[4], CellValue::Text("IT-7".into()));
    assert_eq!(row[5].display(), "15/01/2024");
    assert_eq!(row[6].display(), "Concluído");
    assert_eq!(row[7], CellValue::Text("Descarga com vento forte".into()));

    // Day-first input is normalized too
    assert_eq!(reception.rows[1][5].display(), "16/01/2024");

    let assembly = phase_table(&report, report.data.phase(&PhaseId::Assembly).unwrap());
    assert_eq!(assembly.rows[0][5].display(), "01/02/2024 08:30");

    let torque = phase_table(&report, report.data.phase(&PhaseId::TorqueTensioning).unwrap());
    assert_eq!(torque.rows[0][1], CellValue::Text("T1-T2".into()));
    assert_eq!(torque.rows[0][2], CellValue::Text("2500".into()));
    assert_eq!(torque.rows[0][5], CellValue::Text("kN".into()));

    let finals = phase_table(&report, report.data.phase(&PhaseId::FinalPhases).unwrap());
    assert_eq!(finals.rows[0][1], CellValue::Text("Comissionamento".into()));
    assert_eq!(finals.rows[0][5], CellValue::Percent(60));

    let cranes = phase_table(&report, report.data.phase(&PhaseId::CranesPads).unwrap());
    assert_eq!(cranes.rows[0][0], CellValue::Text("LR 1750".into()));
    assert_eq!(cranes.rows[0][2].display(), "01/02/2024 08:00");
    assert_eq!(cranes.rows[1][6], CellValue::Text("Vento".into()));

    // Interval fallback: 07:00 to 12:30
    let general = phase_table(&report, report.data.phase(&PhaseId::CranesGeneral).unwrap());
    assert_eq!(general.rows[0][5], CellValue::Number(5.5));
}

#[test]
fn workbook_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("serra_alta.xlsx");

    let xlsx = ExcelRenderer::new().render(&serra_alta()).unwrap();
    std::fs::write(&path, &xlsx).unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written.len(), xlsx.len());
}
