//! Append-only per-document ledger of provenance records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::ProvenanceRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("provenance record {0} already exists")]
    Duplicate(String),
}

/// Records in insertion order with lookup by id.
///
/// There is no removal or mutation; serialises as a plain list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ProvenanceRecord>", into = "Vec<ProvenanceRecord>")]
pub struct ProvenanceLedger {
    records: Vec<ProvenanceRecord>,
    index: HashMap<String, usize>,
}

impl ProvenanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record`, returning its id.
    pub fn append(&mut self, record: ProvenanceRecord) -> Result<String, LedgerError> {
        if self.index.contains_key(&record.id) {
            return Err(LedgerError::Duplicate(record.id));
        }
        let id = record.id.clone();
        self.index.insert(id.clone(), self.records.len());
        self.records.push(record);
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<&ProvenanceRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProvenanceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<ProvenanceRecord>> for ProvenanceLedger {
    fn from(records: Vec<ProvenanceRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            if let Err(e) = ledger.append(record) {
                log::warn!("provenance: {e}, keeping the first occurrence");
            }
        }
        ledger
    }
}

impl From<ProvenanceLedger> for Vec<ProvenanceRecord> {
    fn from(ledger: ProvenanceLedger) -> Self {
        ledger.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::ConfigSnapshot;
    use crate::prompts::PromptInfo;

    fn record() -> ProvenanceRecord {
        let prompt = PromptInfo {
            kind: "dependency".into(),
            profile: "default".into(),
            version: "1.0".into(),
            variant: None,
            text: String::new(),
            digest: "abc".into(),
        };
        let config = ConfigSnapshot::capture(&serde_json::json!({"model": "m"})).unwrap();
        ProvenanceRecord::new("Mistral", "m", &prompt, &config)
    }

    #[test]
    fn append_and_lookup() {
        let mut ledger = ProvenanceLedger::new();
        let first = record();
        let id = ledger.append(first.clone()).unwrap();
        assert_eq!(ledger.get(&id), Some(&first));
        assert!(ledger.contains(&id));
        assert!(ledger.get("missing").is_none());
    }

    #[test]
    fn duplicate_id_is_rejected_and_ledger_unchanged() {
        let mut ledger = ProvenanceLedger::new();
        let r = record();
        ledger.append(r.clone()).unwrap();
        assert_eq!(ledger.append(r.clone()), Err(LedgerError::Duplicate(r.id)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn serialises_as_list_and_rebuilds_index() {
        let mut ledger = ProvenanceLedger::new();
        let a = ledger.append(record()).unwrap();
        let b = ledger.append(record()).unwrap();

        let json = serde_json::to_value(&ledger).unwrap();
        assert!(json.is_array());

        let back: ProvenanceLedger = serde_json::from_value(json).unwrap();
        let ids: Vec<_> = back.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![a.as_str(), b.as_str()]);
        assert!(back.contains(&b));
    }
}
