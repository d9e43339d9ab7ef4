//! Read-side view of the uploaded dataset, shaped for dropdown pickers.
use serde::Serialize;
use std::collections::HashSet;

use super::Record;

/// Longest label shown for a finding or impression before it is cut.
pub const LABEL_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    pub value: String,
    pub label: String,
}

impl OptionEntry {
    fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: truncate_label(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetOverview {
    pub genders: Vec<String>,
    pub findings: Vec<OptionEntry>,
    pub human_impressions: Vec<OptionEntry>,
    #[serde(rename = "totalRecords")]
    pub total_records: usize,
}

impl DatasetOverview {
    pub fn from_records(records: &[Record]) -> Self {
        let mut seen = HashSet::new();
        let genders = records
            .iter()
            .map(|r| r.gender.as_str())
            .filter(|g| !g.is_empty() && seen.insert(*g))
            .map(str::to_string)
            .collect();

        Self {
            genders,
            findings: option_entries(records.iter().map(|r| r.findings.as_str())),
            human_impressions: option_entries(records.iter().map(|r| r.human_impression.as_str())),
            total_records: records.len(),
        }
    }
}

fn option_entries<'a>(values: impl Iterator<Item = &'a str>) -> Vec<OptionEntry> {
    values
        .filter(|v| !v.is_empty())
        .map(OptionEntry::new)
        .collect()
}

fn truncate_label(value: &str) -> String {
    match value.char_indices().nth(LABEL_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}
