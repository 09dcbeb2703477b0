//! Crane activity log entries

use chrono::NaiveDate;
use serde_json::Value;

use crate::parse::parse_duration;
use crate::record::{fold_accents, DateField, FieldBag, TIMELINE_DATE_KEYS};

/// Kind of crane activity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Mobilization,
    Work,
    Stoppage,
    Transfer,
    Demobilization,
    /// Unrecognized activity; contributes to no hour total
    Other,
}

impl ActivityType {
    /// Classify a free-text activity label ("Trabalho", "Paragem", "Mobilização", ...).
    pub fn classify(label: &str) -> Self {
        let folded = fold_accents(&label.trim().to_lowercase());
        if folded.is_empty() {
            ActivityType::Other
        } else if folded.contains("desmobiliz") || folded.contains("demobiliz") {
            ActivityType::Demobilization
        } else if folded.contains("mobiliz") {
            ActivityType::Mobilization
        } else if ["paragem", "parada", "stoppage", "downtime", "stop"]
            .iter()
            .any(|word| folded.contains(word))
        {
            ActivityType::Stoppage
        } else if folded.contains("transf") {
            ActivityType::Transfer
        } else if ["trabalho", "work", "operacao", "operation", "icamento", "lifting"]
            .iter()
            .any(|word| folded.contains(word))
        {
            ActivityType::Work
        } else {
            ActivityType::Other
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ActivityType::Mobilization => "crane.mobilization",
            ActivityType::Work => "crane.work",
            ActivityType::Stoppage => "crane.stoppage",
            ActivityType::Transfer => "crane.transfer",
            ActivityType::Demobilization => "crane.demobilization",
            ActivityType::Other => "crane.other",
        }
    }
}

/// One timed crane activity.
#[derive(Clone, Debug, PartialEq)]
pub struct CraneEvent {
    /// Crane model or asset name
    pub crane: String,
    pub activity: ActivityType,
    /// Activity label as entered
    pub activity_label: String,
    pub start: DateField,
    pub end: DateField,
    /// Duration as entered ("2h", "2.5", ...)
    pub duration: String,
    /// Stoppage reason code
    pub reason: String,
    pub notes: String,
    /// Representative date used for weekly bucketing
    pub timeline_date: Option<NaiveDate>,
}

impl CraneEvent {
    pub fn from_value(value: Value) -> Self {
        Self::from_bag(&FieldBag::from_value(value))
    }

    pub fn from_bag(bag: &FieldBag) -> Self {
        let activity_label = bag.first_text(&["tipo", "tipoAtividade", "atividade", "activityType", "type"]);
        Self {
            crane: bag.first_text(&["grua", "modelo", "gruaModelo", "crane", "model"]),
            activity: ActivityType::classify(&activity_label),
            activity_label,
            start: bag.date_field("dataInicio", "horaInicio"),
            end: bag.date_field("dataFim", "horaFim"),
            duration: bag.first_text(&["duracao", "duração", "duration", "horas"]),
            reason: bag.first_text(&["motivo", "motivoParagem", "reason", "reasonCode"]),
            notes: bag.first_text(&["observacoes", "observacao", "notas", "notes"]),
            timeline_date: bag.first_date(TIMELINE_DATE_KEYS),
        }
    }

    /// Duration in hours.
    ///
    /// The entered duration wins; when it is missing or zero, the interval
    /// between start and end is used if both parse and end is after start.
    pub fn hours(&self) -> f64 {
        let entered = parse_duration(&self.duration);
        if entered != 0.0 {
            return entered;
        }
        match (self.start.value, self.end.value) {
            (Some(start), Some(end)) if end > start => (end - start).num_minutes() as f64 / 60.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_activities() {
        assert_eq!(ActivityType::classify("Trabalho"), ActivityType::Work);
        assert_eq!(ActivityType::classify("work"), ActivityType::Work);
        assert_eq!(ActivityType::classify("Paragem"), ActivityType::Stoppage);
        assert_eq!(ActivityType::classify("Mobilização"), ActivityType::Mobilization);
        assert_eq!(ActivityType::classify("Desmobilização"), ActivityType::Demobilization);
        assert_eq!(ActivityType::classify("Transferência"), ActivityType::Transfer);
        assert_eq!(ActivityType::classify("Almoço"), ActivityType::Other);
        assert_eq!(ActivityType::classify(""), ActivityType::Other);
    }

    #[test]
    fn entered_duration_wins() {
        let event = CraneEvent::from_value(json!({
            "grua": "LTM 1500",
            "tipo": "Trabalho",
            "duracao": "2.5h",
            "dataInicio": "2024-01-15",
            "horaInicio": "08:00",
            "dataFim": "2024-01-15",
            "horaFim": "18:00"
        }));
        assert_eq!(event.hours(), 2.5);
    }

    #[test]
    fn interval_used_when_duration_missing() {
        let event = CraneEvent::from_value(json!({
            "grua": "LTM 1500",
            "tipo": "Paragem",
            "dataInicio": "2024-01-15",
            "horaInicio": "08:00",
            "dataFim": "2024-01-15",
            "horaFim": "11:30"
        }));
        assert_eq!(event.hours(), 3.5);
    }

    #[test]
    fn no_duration_no_interval_is_zero() {
        let event = CraneEvent::from_value(json!({"grua": "G1", "tipo": "Paragem", "duracao": "?"}));
        assert_eq!(event.hours(), 0.0);

        let backwards = CraneEvent::from_value(json!({
            "dataInicio": "2024-01-15T10:00",
            "dataFim": "2024-01-15T09:00"
        }));
        assert_eq!(backwards.hours(), 0.0);
    }

    #[test]
    fn numeric_duration_accepted() {
        let event = CraneEvent::from_value(json!({"tipo": "Trabalho", "duracao": 4}));
        assert_eq!(event.duration, "4");
        assert_eq!(event.hours(), 4.0);
    }
}
