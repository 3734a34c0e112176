//! Derived groupings for the rendering layer
//!
//! Read-only projections over a record collection. Nothing here mutates a
//! record; callers get borrowed views that refresh when the collection does.

use crate::record::{LogEntry, Record};
use crate::types::{Industry, Layer, RecordId, Status};
use indexmap::IndexMap;

/// Records per layer; every layer present, in pipeline order
#[must_use]
pub fn group_by_layer<'a, I>(records: I) -> IndexMap<Layer, Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: IndexMap<Layer, Vec<&'a Record>> =
        Layer::ALL.into_iter().map(|layer| (layer, Vec::new())).collect();
    for record in records {
        groups.entry(record.layer()).or_default().push(record);
    }
    groups
}

/// Records per industry; every industry present
#[must_use]
pub fn group_by_industry<'a, I>(records: I) -> IndexMap<Industry, Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: IndexMap<Industry, Vec<&'a Record>> = Industry::ALL
        .into_iter()
        .map(|industry| (industry, Vec::new()))
        .collect();
    for record in records {
        groups.entry(record.state.industry).or_default().push(record);
    }
    groups
}

/// Records per status; only occupied statuses, in lifecycle order
#[must_use]
pub fn group_by_status<'a, I>(records: I) -> IndexMap<Status, Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: IndexMap<Status, Vec<&'a Record>> = IndexMap::new();
    for record in records {
        groups.entry(record.status()).or_default().push(record);
    }
    groups.sort_keys();
    groups
}

/// Records waiting on a human decision
#[must_use]
pub fn manual_review_queue<'a, I>(records: I) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|record| record.status() == Status::ManualHold)
        .collect()
}

/// One log line in the cross-record audit feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditLine<'a> {
    pub record_id: RecordId,
    pub case_type: &'a str,
    pub entry: &'a LogEntry,
}

/// All log entries across records, newest first
#[must_use]
pub fn audit_feed<'a, I>(records: I) -> Vec<AuditLine<'a>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut lines: Vec<AuditLine<'a>> = records
        .into_iter()
        .flat_map(|record| {
            record.state.logs.iter().map(move |entry| AuditLine {
                record_id: record.id(),
                case_type: &record.state.case_type,
                entry,
            })
        })
        .collect();
    lines.sort_by(|a, b| b.entry.timestamp.cmp(&a.entry.timestamp));
    lines
}

/// Occupancy counts per group key
#[must_use]
pub fn counts<K>(groups: &IndexMap<K, Vec<&Record>>) -> IndexMap<K, usize>
where
    K: Copy + std::hash::Hash + Eq,
{
    groups.iter().map(|(key, items)| (*key, items.len())).collect()
}
