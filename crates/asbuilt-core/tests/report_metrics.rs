//! Integration tests: report metrics from full JSON requests

use asbuilt_core::parse::{parse_duration, parse_percentage};
use asbuilt_core::{DeviationClass, PhaseId, Report, ReportRequest};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn report(data_by_phase: &str) -> Report {
    let json = format!(
        r#"{{"projectName": "Teste", "selectedPhases": [], "outputPath": "t.xlsx", "dataByPhase": {data_by_phase}}}"#
    );
    Report::from_request(ReportRequest::from_json(&json).unwrap())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn turbine_status_last_write_wins() {
    let report = report(
        r#"{
            "recepcao": [{"turbinaId": "T1", "status": "Concluído"}],
            "assemblagem": [{"turbinaId": "T1", "status": "Em progresso"}]
        }"#,
    );
    let turbines = &report.metrics.turbines;
    assert_eq!(turbines.total, 1);
    assert_eq!(turbines.completed, 0);
    assert_eq!(turbines.in_progress, 1);
    assert_eq!(turbines.status_of("T1"), Some("em progresso"));
}

#[test]
fn turbine_status_follows_input_order_not_phase_order() {
    let report = report(
        r#"{
            "assemblagem": [{"turbinaId": "T1", "status": "Em progresso"}],
            "recepcao": [{"turbinaId": "T1", "status": "Concluído"}]
        }"#,
    );
    assert_eq!(report.metrics.turbines.completed, 1);
}

#[test]
fn deviation_delayed_and_ahead() {
    let report = report(
        r#"{
            "recepcao": [
                {"turbinaId": "T1", "plannedDate": "2024-01-10", "actualDate": "2024-01-15"},
                {"turbinaId": "T2", "dataPlaneada": "2024-01-10", "dataReal": "2024-01-05"},
                {"turbinaId": "T3", "dataPlaneada": "10/01/2024", "dataReal": "2024-01-10"},
                {"turbinaId": "T4", "dataPlaneada": "2024-01-10"}
            ]
        }"#,
    );
    let deviations = &report.metrics.deviations;
    assert_eq!(deviations.entries.len(), 3);

    assert_eq!(deviations.entries[0].days, 5);
    assert_eq!(deviations.entries[0].class, DeviationClass::Delayed);
    assert_eq!(deviations.entries[0].planned, date(2024, 1, 10));
    assert_eq!(deviations.entries[1].days, -5);
    assert_eq!(deviations.entries[1].class, DeviationClass::Ahead);
    assert_eq!(deviations.entries[2].class, DeviationClass::OnSchedule);

    assert_eq!(deviations.coverage.examined, 4);
    assert_eq!(deviations.coverage.excluded(), 1);
    assert_eq!(deviations.max_delay(), 5);
}

#[test]
fn timeline_without_dates_has_one_empty_bucket() {
    let report = report(r#"{"recepcao": [{"turbinaId": "T1", "dataDescarga": "amanhã"}]}"#);
    let timeline = &report.metrics.timeline;
    assert_eq!(timeline.buckets.len(), 1);
    assert_eq!(timeline.buckets[0].count, 0);
    assert_eq!(timeline.coverage.excluded(), 1);
}

#[test]
fn timeline_buckets_by_iso_week() {
    let report = report(
        r#"{
            "recepcao": [
                {"turbinaId": "T1", "dataDescarga": "2024-01-15"},
                {"turbinaId": "T2", "dataDescarga": "2024-01-17"},
                {"turbinaId": "T3", "dataDescarga": "2024-01-02"}
            ]
        }"#,
    );
    let labels: Vec<_> = report
        .metrics
        .timeline
        .buckets
        .iter()
        .map(|b| (b.label.as_str(), b.count))
        .collect();
    assert_eq!(labels, vec![("2024-W01", 1), ("2024-W03", 2)]);
}

#[test]
fn timeline_includes_crane_events() {
    let report = report(
        r#"{
            "recepcao": [{"turbinaId": "T1", "dataDescarga": "2024-01-02"}],
            "gruasPads": [
                {"grua": "G1", "tipo": "Trabalho", "dataInicio": "2024-01-15"},
                {"grua": "G1", "tipo": "Paragem", "dataInicio": "2024-01-16", "dataFim": "2024-01-17"},
                {"grua": "G1", "tipo": "Trabalho"}
            ]
        }"#,
    );
    let timeline = &report.metrics.timeline;
    let labels: Vec<_> = timeline.buckets.iter().map(|b| (b.label.as_str(), b.count)).collect();
    assert_eq!(labels, vec![("2024-W01", 1), ("2024-W03", 2)]);
    assert_eq!(timeline.coverage.examined, 4);
    assert_eq!(timeline.coverage.excluded(), 1);
}

#[test]
fn crane_only_timeline_is_not_a_placeholder() {
    let report = report(r#"{"gruasPads": [{"grua": "G1", "tipo": "Trabalho", "dataInicio": "2024-01-15"}]}"#);
    let buckets = &report.metrics.timeline.buckets;
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].label, "2024-W03");
    assert_eq!(buckets[0].count, 1);
}

#[test]
fn completion_of_empty_phase_is_zero() {
    let report = report(r#"{"recepcao": [{"turbinaId": "T1", "status": "Concluído"}]}"#);
    let phases = &report.metrics.phases;
    assert_eq!(phases.len(), 6);

    let reception = phases.iter().find(|p| p.phase == PhaseId::Reception).unwrap();
    assert_eq!(reception.percent, 100.0);

    let assembly = phases.iter().find(|p| p.phase == PhaseId::Assembly).unwrap();
    assert_eq!(assembly.total, 0);
    assert_eq!(assembly.percent, 0.0);
}

#[test]
fn overall_completion_pools_records() {
    let report = report(
        r#"{
            "recepcao": [{"turbinaId": "T1", "status": "Concluído"}],
            "assemblagem": [
                {"turbinaId": "T2", "status": "Planeado"},
                {"turbinaId": "T3", "status": "Planeado"},
                {"turbinaId": "T4", "status": "Planeado"}
            ]
        }"#,
    );
    // 1 of 4 records, not the 50% mean of the two phase percentages
    assert_eq!(report.metrics.overall_completion(), 25.0);
}

#[test]
fn crane_efficiency_without_hours_is_zero() {
    let report = report(r#"{"gruasPads": [{"grua": "G1", "tipo": "Trabalho"}]}"#);
    let cranes = &report.metrics.cranes;
    assert_eq!(cranes.cranes.len(), 1);
    assert_eq!(cranes.cranes[0].efficiency(), 0.0);
    assert_eq!(cranes.overall_efficiency(), 0.0);
    assert_eq!(cranes.coverage.excluded(), 1);
}

#[test]
fn crane_logs_are_combined() {
    let report = report(
        r#"{
            "gruasPads": [
                {"grua": "G1", "tipo": "Trabalho", "duracao": "6h"},
                {"grua": "G1", "tipo": "Paragem", "duracao": "2h", "motivo": "Vento"}
            ],
            "gruasGerais": [
                {"grua": "G2", "tipo": "Trabalho", "duracao": "4 Horas"},
                {"grua": "G2", "tipo": "Transferência", "duracao": "3h"}
            ]
        }"#,
    );
    let cranes = &report.metrics.cranes;
    assert_eq!(cranes.work_hours, 10.0);
    assert_eq!(cranes.stoppage_hours, 2.0);
    assert_eq!(cranes.cranes[0].crane, "G1");
    assert_eq!(cranes.cranes[0].efficiency(), 75.0);
    assert_eq!(cranes.cranes[1].efficiency(), 100.0);
    assert_eq!(cranes.stoppage_reasons[0].reason, "Vento");
    assert_eq!(cranes.stoppage_reasons[0].share, 100.0);
}

#[test]
fn observations_collected() {
    let report = report(
        r#"{
            "recepcao": [
                {"turbinaId": "T1", "componentId": "Hub", "observacoes": "Dano na pintura"},
                {"turbinaId": "T2", "dataPlaneada": "2024-01-10", "dataReal": "2024-01-12"}
            ],
            "gruasPads": [{"grua": "G1", "tipo": "Paragem", "duracao": "3h", "motivo": "Avaria"}]
        }"#,
    );
    assert_eq!(report.metrics.observations.len(), 3);
    assert_eq!(report.metrics.observations[0].text, "Dano na pintura");
}

#[test]
fn tolerant_parsers() {
    assert_eq!(parse_duration("2.5h"), 2.5);
    assert_eq!(parse_duration(" 3 HORA "), 3.0);
    assert_eq!(parse_duration("1,5 horas"), 1.5);
    assert_eq!(parse_duration("lots"), 0.0);
    assert_eq!(parse_duration(""), 0.0);

    assert_eq!(parse_percentage("45%"), 45);
    assert_eq!(parse_percentage("72.9"), 72);
    assert_eq!(parse_percentage("n/a"), 0);
}

#[test]
fn unknown_language_falls_back() {
    let request = ReportRequest::from_json(
        r#"{"projectName": "X", "language": "de", "selectedPhases": [], "outputPath": "x.xlsx", "dataByPhase": {}}"#,
    )
    .unwrap();
    assert_eq!(request.language, asbuilt_core::Language::Pt);
}

#[test]
fn malformed_json_is_an_error() {
    assert!(ReportRequest::from_json("{not json").is_err());
    assert!(ReportRequest::from_json(r#"{"projectName": "X"}"#).is_err());
}
