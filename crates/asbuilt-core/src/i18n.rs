//! Report labels in Portuguese and English
//!
//! Labels are looked up by a dotted key (`col.turbine`, `sheet.summary`).
//! A key with no entry is returned unchanged, so a missing translation shows
//! up in the output instead of failing the report.

use serde::Deserialize;

/// Report language. Unknown codes fall back to Portuguese.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Language {
    #[default]
    Pt,
    En,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Language::En,
            "pt" | "pt-pt" | "pt-br" | "portuguese" => Language::Pt,
            other => {
                tracing::warn!(language = other, "unknown language; using pt");
                Language::Pt
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
        }
    }
}

impl From<Option<String>> for Language {
    fn from(code: Option<String>) -> Self {
        code.as_deref().map(Language::from_code).unwrap_or_default()
    }
}

/// Label for `key` in `lang`, or `key` itself when there is none.
pub fn translate<'a>(key: &'a str, lang: Language) -> &'a str {
    let table = match lang {
        Language::Pt => PT,
        Language::En => EN,
    };
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

const PT: &[(&str, &str)] = &[
    // Report
    ("report.title", "Relatório de Instalação"),
    ("report.complete", "Relatório completo"),
    ("report.tables_only", "Apenas tabelas de fases"),
    // Phases
    ("phase.reception", "RECEÇÃO / DESCARGA"),
    ("phase.preparation", "PREPARAÇÃO"),
    ("phase.pre_assembly", "PRÉ-ASSEMBLAGEM"),
    ("phase.assembly", "ASSEMBLAGEM"),
    ("phase.torque", "TORQUE & TENSIONING"),
    ("phase.final", "FASES FINAIS"),
    ("phase.cranes_pads", "GRUAS - PADS"),
    ("phase.cranes_general", "GRUAS - GERAIS"),
    // Sheets
    ("sheet.cover", "Capa"),
    ("sheet.summary", "Resumo Executivo"),
    ("sheet.dashboard", "Dashboard"),
    ("sheet.deviations", "Análise de Desvios"),
    ("sheet.cranes", "Análise de Gruas"),
    ("sheet.observations", "Observações Críticas"),
    ("sheet.phase.reception", "Receção - Descarga"),
    ("sheet.phase.preparation", "Preparação"),
    ("sheet.phase.pre_assembly", "Pré-Assemblagem"),
    ("sheet.phase.assembly", "Assemblagem"),
    ("sheet.phase.torque", "Torque & Tensioning"),
    ("sheet.phase.final", "Fases Finais"),
    ("sheet.phase.cranes_pads", "Gruas Pads"),
    ("sheet.phase.cranes_general", "Gruas Gerais"),
    // Sections
    ("section.kpis", "Indicadores-Chave"),
    ("section.deviations", "Desvios de Calendário"),
    ("section.phase_completion", "Conclusão por Fase"),
    ("section.coverage", "Cobertura dos Dados"),
    ("section.crane_efficiency", "Eficiência por Grua"),
    ("section.stoppage_reasons", "Motivos de Paragem"),
    ("section.crane_activity", "Atividade de Gruas"),
    // Status
    ("status.completed", "Concluído"),
    ("status.in_progress", "Em Progresso"),
    ("status.planned", "Planeado"),
    // Crane activity
    ("crane.mobilization", "Mobilização"),
    ("crane.work", "Trabalho"),
    ("crane.stoppage", "Paragem"),
    ("crane.transfer", "Transferência"),
    ("crane.demobilization", "Desmobilização"),
    ("crane.other", "Outro"),
    // Deviations
    ("deviation.on_schedule", "No prazo"),
    ("deviation.ahead", "Adiantado"),
    ("deviation.delayed", "Atrasado"),
    // Observations
    ("observation.note", "Nota"),
    ("observation.delay", "Atraso"),
    ("observation.stoppage", "Paragem de grua"),
    // KPIs
    ("kpi.turbines", "Turbinas"),
    ("kpi.turbines_completed", "Turbinas concluídas"),
    ("kpi.turbines_in_progress", "Turbinas em progresso"),
    ("kpi.turbines_planned", "Turbinas planeadas"),
    ("kpi.completion", "Conclusão global (%)"),
    ("kpi.crane_work_hours", "Horas de trabalho de gruas"),
    ("kpi.crane_stoppage_hours", "Horas de paragem de gruas"),
    ("kpi.crane_efficiency", "Eficiência de gruas (%)"),
    ("kpi.records_compared", "Registos comparados"),
    ("kpi.average_deviation", "Desvio médio (dias)"),
    ("kpi.max_delay", "Maior atraso (dias)"),
    // Coverage
    ("coverage.deviation_excluded", "Registos sem datas planeada e real"),
    ("coverage.crane_unmeasured", "Eventos de grua sem duração"),
    ("coverage.undated", "Registos sem data"),
    // Targets
    ("target.met", "Objetivo cumprido"),
    ("target.attention", "Requer atenção"),
    // Charts
    ("chart.phase_completion", "Conclusão por Fase (%)"),
    ("chart.turbine_status", "Estado das Turbinas"),
    ("chart.weekly_installations", "Instalações por Semana"),
    ("chart.crane_hours", "Horas por Grua"),
    // Labels
    ("label.project", "Projeto"),
    ("label.generated", "Gerado em"),
    ("label.language", "Idioma"),
    ("label.report_type", "Tipo de relatório"),
    ("label.contents", "Conteúdo"),
    ("label.total", "Total"),
    ("label.unspecified", "Não especificado"),
    ("label.no_dates", "Sem datas"),
    ("label.no_phase_data", "Nenhuma fase selecionada tem registos."),
    ("label.no_deviation_data", "Sem registos com datas planeada e real."),
    ("label.no_crane_data", "Sem eventos de gruas."),
    ("label.no_stoppages", "Sem paragens registadas."),
    ("label.no_observations", "Sem observações críticas."),
    ("label.page", "Página"),
    ("label.of", "de"),
    ("unit.days", "dias"),
    // Columns
    ("col.turbine", "Turbina"),
    ("col.component", "Componente"),
    ("col.vui", "VUI"),
    ("col.serial_number", "Número de Série"),
    ("col.item_number", "Número de Item"),
    ("col.unload_date", "Data Descarga"),
    ("col.start_date", "Data Início"),
    ("col.end_date", "Data Fim"),
    ("col.status", "Estado"),
    ("col.observations", "Observações"),
    ("col.connection", "Conexão"),
    ("col.torque_value", "Valor Torque"),
    ("col.torque_unit", "Unidade Torque"),
    ("col.tensioning_value", "Valor Tensioning"),
    ("col.tensioning_unit", "Unidade Tensioning"),
    ("col.date", "Data"),
    ("col.phase", "Fase"),
    ("col.progress", "Progresso"),
    ("col.crane", "Grua"),
    ("col.activity", "Atividade"),
    ("col.start", "Início"),
    ("col.end", "Fim"),
    ("col.duration", "Duração"),
    ("col.hours", "Horas"),
    ("col.reason", "Motivo"),
    ("col.notes", "Notas"),
    ("col.indicator", "Indicador"),
    ("col.value", "Valor"),
    ("col.target", "Objetivo"),
    ("col.total", "Total"),
    ("col.completed", "Concluídos"),
    ("col.completion", "Conclusão (%)"),
    ("col.count", "Quantidade"),
    ("col.week", "Semana"),
    ("col.work_hours", "Horas Trabalho"),
    ("col.stoppage_hours", "Horas Paragem"),
    ("col.mobilization_hours", "Horas Mobilização"),
    ("col.total_hours", "Horas Totais"),
    ("col.efficiency", "Eficiência (%)"),
    ("col.events", "Eventos"),
    ("col.occurrences", "Ocorrências"),
    ("col.share", "Peso (%)"),
    ("col.item", "Item"),
    ("col.planned_date", "Data Planeada"),
    ("col.actual_date", "Data Real"),
    ("col.deviation_days", "Desvio (dias)"),
    ("col.classification", "Classificação"),
    ("col.subject", "Referência"),
    ("col.type", "Tipo"),
    ("col.detail", "Detalhe"),
    ("col.description", "Descrição"),
];

const EN: &[(&str, &str)] = &[
    // Report
    ("report.title", "Installation Report"),
    ("report.complete", "Complete report"),
    ("report.tables_only", "Phase tables only"),
    // Phases
    ("phase.reception", "RECEPTION / UNLOADING"),
    ("phase.preparation", "PREPARATION"),
    ("phase.pre_assembly", "PRE-ASSEMBLY"),
    ("phase.assembly", "ASSEMBLY"),
    ("phase.torque", "TORQUE & TENSIONING"),
    ("phase.final", "FINAL PHASES"),
    ("phase.cranes_pads", "CRANES - PADS"),
    ("phase.cranes_general", "CRANES - GENERAL"),
    // Sheets
    ("sheet.cover", "Cover"),
    ("sheet.summary", "Executive Summary"),
    ("sheet.dashboard", "Dashboard"),
    ("sheet.deviations", "Deviation Analysis"),
    ("sheet.cranes", "Crane Analysis"),
    ("sheet.observations", "Critical Observations"),
    ("sheet.phase.reception", "Reception - Unloading"),
    ("sheet.phase.preparation", "Preparation"),
    ("sheet.phase.pre_assembly", "Pre-Assembly"),
    ("sheet.phase.assembly", "Assembly"),
    ("sheet.phase.torque", "Torque & Tensioning"),
    ("sheet.phase.final", "Final Phases"),
    ("sheet.phase.cranes_pads", "Cranes Pads"),
    ("sheet.phase.cranes_general", "Cranes General"),
    // Sections
    ("section.kpis", "Key Indicators"),
    ("section.deviations", "Schedule Deviations"),
    ("section.phase_completion", "Completion by Phase"),
    ("section.coverage", "Data Coverage"),
    ("section.crane_efficiency", "Efficiency by Crane"),
    ("section.stoppage_reasons", "Stoppage Reasons"),
    ("section.crane_activity", "Crane Activity"),
    // Status
    ("status.completed", "Completed"),
    ("status.in_progress", "In Progress"),
    ("status.planned", "Planned"),
    // Crane activity
    ("crane.mobilization", "Mobilization"),
    ("crane.work", "Work"),
    ("crane.stoppage", "Stoppage"),
    ("crane.transfer", "Transfer"),
    ("crane.demobilization", "Demobilization"),
    ("crane.other", "Other"),
    // Deviations
    ("deviation.on_schedule", "On schedule"),
    ("deviation.ahead", "Ahead"),
    ("deviation.delayed", "Delayed"),
    // Observations
    ("observation.note", "Note"),
    ("observation.delay", "Delay"),
    ("observation.stoppage", "Crane stoppage"),
    // KPIs
    ("kpi.turbines", "Turbines"),
    ("kpi.turbines_completed", "Turbines completed"),
    ("kpi.turbines_in_progress", "Turbines in progress"),
    ("kpi.turbines_planned", "Turbines planned"),
    ("kpi.completion", "Overall completion (%)"),
    ("kpi.crane_work_hours", "Crane work hours"),
    ("kpi.crane_stoppage_hours", "Crane stoppage hours"),
    ("kpi.crane_efficiency", "Crane efficiency (%)"),
    ("kpi.records_compared", "Records compared"),
    ("kpi.average_deviation", "Average deviation (days)"),
    ("kpi.max_delay", "Longest delay (days)"),
    // Coverage
    ("coverage.deviation_excluded", "Records without planned and actual dates"),
    ("coverage.crane_unmeasured", "Crane events without duration"),
    ("coverage.undated", "Records without a date"),
    // Targets
    ("target.met", "On target"),
    ("target.attention", "Needs attention"),
    // Charts
    ("chart.phase_completion", "Completion by Phase (%)"),
    ("chart.turbine_status", "Turbine Status"),
    ("chart.weekly_installations", "Installations per Week"),
    ("chart.crane_hours", "Hours by Crane"),
    // Labels
    ("label.project", "Project"),
    ("label.generated", "Generated"),
    ("label.language", "Language"),
    ("label.report_type", "Report type"),
    ("label.contents", "Contents"),
    ("label.total", "Total"),
    ("label.unspecified", "Unspecified"),
    ("label.no_dates", "No dates"),
    ("label.no_phase_data", "No selected phase has records."),
    ("label.no_deviation_data", "No records with both planned and actual dates."),
    ("label.no_crane_data", "No crane events."),
    ("label.no_stoppages", "No stoppages recorded."),
    ("label.no_observations", "No critical observations."),
    ("label.page", "Page"),
    ("label.of", "of"),
    ("unit.days", "days"),
    // Columns
    ("col.turbine", "Turbine"),
    ("col.component", "Component"),
    ("col.vui", "VUI"),
    ("col.serial_number", "Serial Number"),
    ("col.item_number", "Item Number"),
    ("col.unload_date", "Unload Date"),
    ("col.start_date", "Start Date"),
    ("col.end_date", "End Date"),
    ("col.status", "Status"),
    ("col.observations", "Observations"),
    ("col.connection", "Connection"),
    ("col.torque_value", "Torque Value"),
    ("col.torque_unit", "Torque Unit"),
    ("col.tensioning_value", "Tensioning Value"),
    ("col.tensioning_unit", "Tensioning Unit"),
    ("col.date", "Date"),
    ("col.phase", "Phase"),
    ("col.progress", "Progress"),
    ("col.crane", "Crane"),
    ("col.activity", "Activity"),
    ("col.start", "Start"),
    ("col.end", "End"),
    ("col.duration", "Duration"),
    ("col.hours", "Hours"),
    ("col.reason", "Reason"),
    ("col.notes", "Notes"),
    ("col.indicator", "Indicator"),
    ("col.value", "Value"),
    ("col.target", "Target"),
    ("col.total", "Total"),
    ("col.completed", "Completed"),
    ("col.completion", "Completion (%)"),
    ("col.count", "Count"),
    ("col.week", "Week"),
    ("col.work_hours", "Work Hours"),
    ("col.stoppage_hours", "Stoppage Hours"),
    ("col.mobilization_hours", "Mobilization Hours"),
    ("col.total_hours", "Total Hours"),
    ("col.efficiency", "Efficiency (%)"),
    ("col.events", "Events"),
    ("col.occurrences", "Occurrences"),
    ("col.share", "Share (%)"),
    ("col.item", "Item"),
    ("col.planned_date", "Planned Date"),
    ("col.actual_date", "Actual Date"),
    ("col.deviation_days", "Deviation (days)"),
    ("col.classification", "Classification"),
    ("col.subject", "Reference"),
    ("col.type", "Type"),
    ("col.detail", "Detail"),
    ("col.description", "Description"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn tables_cover_same_keys() {
        let pt: BTreeSet<_> = PT.iter().map(|(k, _)| *k).collect();
        let en: BTreeSet<_> = EN.iter().map(|(k, _)| *k).collect();
        assert_eq!(pt.len(), PT.len(), "duplicate key in PT");
        assert_eq!(en.len(), EN.len(), "duplicate key in EN");
        assert_eq!(pt, en);
    }

    #[test]
    fn missing_key_falls_through() {
        assert_eq!(translate("col.turbine", Language::Pt), "Turbina");
        assert_eq!(translate("col.turbine", Language::En), "Turbine");
        assert_eq!(translate("no.such.key", Language::En), "no.such.key");
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code("EN"), Language::En);
        assert_eq!(Language::from_code("pt-BR"), Language::Pt);
        assert_eq!(Language::from_code("fr"), Language::Pt);
        assert_eq!(Language::from(None), Language::Pt);

        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::En);
        let lang: Language = serde_json::from_str("null").unwrap();
        assert_eq!(lang, Language::Pt);
    }
}
