//! Phase identifiers and the phase-keyed record collection

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::crane::CraneEvent;
use crate::record::InstallationRecord;

/// A named stage of the installation, or a crane log.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhaseId {
    Reception,
    Preparation,
    PreAssembly,
    Assembly,
    TorqueTensioning,
    FinalPhases,
    /// Crane log for the turbine pads
    CranesPads,
    /// Crane log for general site work
    CranesGeneral,
    /// A phase key this tool does not know
    Other(String),
}

impl PhaseId {
    /// The six installation phases, in installation order.
    pub const INSTALLATION: [PhaseId; 6] = [
        PhaseId::Reception,
        PhaseId::Preparation,
        PhaseId::PreAssembly,
        PhaseId::Assembly,
        PhaseId::TorqueTensioning,
        PhaseId::FinalPhases,
    ];

    pub fn from_key(key: &str) -> Self {
        match key {
            "recepcao" => PhaseId::Reception,
            "preparacao" => PhaseId::Preparation,
            "preAssemblagem" => PhaseId::PreAssembly,
            "assemblagem" => PhaseId::Assembly,
            "torqueTensionamento" => PhaseId::TorqueTensioning,
            "fasesFinais" | "fasesFinal" => PhaseId::FinalPhases,
            "gruasPads" => PhaseId::CranesPads,
            "gruasGerais" => PhaseId::CranesGeneral,
            other => PhaseId::Other(other.to_string()),
        }
    }

    /// Canonical input key.
    pub fn key(&self) -> &str {
        match self {
            PhaseId::Reception => "recepcao",
            PhaseId::Preparation => "preparacao",
            PhaseId::PreAssembly => "preAssemblagem",
            PhaseId::Assembly => "assemblagem",
            PhaseId::TorqueTensioning => "torqueTensionamento",
            PhaseId::FinalPhases => "fasesFinais",
            PhaseId::CranesPads => "gruasPads",
            PhaseId::CranesGeneral => "gruasGerais",
            PhaseId::Other(key) => key,
        }
    }

    pub fn is_crane(&self) -> bool {
        matches!(self, PhaseId::CranesPads | PhaseId::CranesGeneral)
    }

    /// Translation key for the display title, `None` for unknown phases.
    pub fn title_key(&self) -> Option<&'static str> {
        Some(match self {
            PhaseId::Reception => "phase.reception",
            PhaseId::Preparation => "phase.preparation",
            PhaseId::PreAssembly => "phase.pre_assembly",
            PhaseId::Assembly => "phase.assembly",
            PhaseId::TorqueTensioning => "phase.torque",
            PhaseId::FinalPhases => "phase.final",
            PhaseId::CranesPads => "phase.cranes_pads",
            PhaseId::CranesGeneral => "phase.cranes_general",
            PhaseId::Other(_) => return None,
        })
    }
}

impl Serialize for PhaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Records of one phase.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseRecords {
    Installation(Vec<InstallationRecord>),
    Crane(Vec<CraneEvent>),
}

impl PhaseRecords {
    pub fn len(&self) -> usize {
        match self {
            PhaseRecords::Installation(records) => records.len(),
            PhaseRecords::Crane(events) => events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One phase and its records.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseData {
    pub id: PhaseId,
    pub records: PhaseRecords,
}

impl PhaseData {
    pub fn installation(&self) -> &[InstallationRecord] {
        match &self.records {
            PhaseRecords::Installation(records) => records,
            PhaseRecords::Crane(_) => &[],
        }
    }

    pub fn crane(&self) -> &[CraneEvent] {
        match &self.records {
            PhaseRecords::Crane(events) => events,
            PhaseRecords::Installation(_) => &[],
        }
    }
}

/// The whole phase-keyed record collection, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectData {
    phases: Vec<PhaseData>,
}

impl ProjectData {
    /// Normalize the raw `dataByPhase` object.
    ///
    /// Keys that alias the same phase are merged. A phase whose value is not
    /// an array contributes no records.
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        let mut data = Self::default();
        for (key, value) in raw {
            let id = PhaseId::from_key(&key);
            let items = match value {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                other => {
                    tracing::warn!(phase = %key, value = %other, "phase data is not an array; ignoring it");
                    Vec::new()
                }
            };
            tracing::debug!(phase = %key, records = items.len(), "normalizing phase");
            data.push(id, items);
        }
        data
    }

    fn push(&mut self, id: PhaseId, items: Vec<Value>) {
        let records = if id.is_crane() {
            PhaseRecords::Crane(items.into_iter().map(CraneEvent::from_value).collect())
        } else {
            PhaseRecords::Installation(
                items
                    .into_iter()
                    .map(|item| InstallationRecord::from_value(&id, item))
                    .collect(),
            )
        };

        match self.phases.iter_mut().find(|phase| phase.id == id) {
            Some(existing) => match (&mut existing.records, records) {
                (PhaseRecords::Installation(into), PhaseRecords::Installation(from)) => into.extend(from),
                (PhaseRecords::Crane(into), PhaseRecords::Crane(from)) => into.extend(from),
                _ => {}
            },
            None => self.phases.push(PhaseData { id, records }),
        }
    }

    pub fn phases(&self) -> &[PhaseData] {
        &self.phases
    }

    pub fn phase(&self, id: &PhaseId) -> Option<&PhaseData> {
        self.phases.iter().find(|phase| &phase.id == id)
    }

    /// Installation phases with their records, in input order.
    pub fn installation_phases(&self) -> impl Iterator<Item = (&PhaseId, &[InstallationRecord])> {
        self.phases
            .iter()
            .filter(|phase| !phase.id.is_crane())
            .map(|phase| (&phase.id, phase.installation()))
    }

    /// Every installation record across all phases, in input order.
    pub fn installation_records(&self) -> impl Iterator<Item = (&PhaseId, &InstallationRecord)> {
        self.installation_phases()
            .flat_map(|(id, records)| records.iter().map(move |record| (id, record)))
    }

    /// Every crane event across both crane logs.
    pub fn crane_events(&self) -> impl Iterator<Item = &CraneEvent> {
        self.phases.iter().flat_map(|phase| phase.crane().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn phase_keys_round_trip() {
        for id in PhaseId::INSTALLATION {
            assert_eq!(PhaseId::from_key(id.key()), id);
        }
        assert_eq!(PhaseId::from_key("fasesFinal"), PhaseId::FinalPhases);
        assert_eq!(PhaseId::from_key("gruasPads"), PhaseId::CranesPads);
        assert_eq!(PhaseId::from_key("custom"), PhaseId::Other("custom".into()));
    }

    #[test]
    fn preserves_input_order() {
        let data = ProjectData::from_raw(raw(json!({
            "assemblagem": [{"turbina": "T1"}],
            "recepcao": [{"turbina": "T1"}],
            "gruasPads": [{"tipo": "Trabalho", "duracao": "2h"}]
        })));

        let order: Vec<_> = data.phases().iter().map(|p| p.id.clone()).collect();
        assert_eq!(order, vec![PhaseId::Assembly, PhaseId::Reception, PhaseId::CranesPads]);
        assert_eq!(data.crane_events().count(), 1);
        assert_eq!(data.installation_records().count(), 2);
    }

    #[test]
    fn aliased_keys_merge() {
        let data = ProjectData::from_raw(raw(json!({
            "fasesFinais": [{"turbina": "T1"}],
            "fasesFinal": [{"turbina": "T2"}]
        })));

        assert_eq!(data.phases().len(), 1);
        assert_eq!(data.phase(&PhaseId::FinalPhases).unwrap().records.len(), 2);
    }

    #[test]
    fn non_array_phase_is_empty() {
        let data = ProjectData::from_raw(raw(json!({"recepcao": "oops"})));
        assert!(data.phase(&PhaseId::Reception).unwrap().records.is_empty());
    }
}
