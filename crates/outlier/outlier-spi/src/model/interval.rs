//! Calendar interval labels and the record grouping they induce.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::RecordId;

/// One-based index of the fixed-width calendar interval a record falls in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IntervalLabel(pub u32);

impl IntervalLabel {
    /// The first interval of every series.
    pub const FIRST: IntervalLabel = IntervalLabel(1);

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for IntervalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interval assignment for every record of a series.
///
/// `labels[i]` is the interval of `RecordId(i)`; `groups` maps each interval
/// to its members in series order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    interval_days: i64,
    labels: Vec<IntervalLabel>,
    groups: BTreeMap<IntervalLabel, Vec<RecordId>>,
}

impl Segmentation {
    /// Build a segmentation from per-record labels.
    pub fn from_labels(interval_days: i64, labels: Vec<IntervalLabel>) -> Self {
        let mut groups: BTreeMap<IntervalLabel, Vec<RecordId>> = BTreeMap::new();
        for (i, &label) in labels.iter().enumerate() {
            groups.entry(label).or_default().push(RecordId(i));
        }
        Self {
            interval_days,
            labels,
            groups,
        }
    }

    /// Interval width in days.
    pub fn interval_days(&self) -> i64 {
        self.interval_days
    }

    pub fn labels(&self) -> &[IntervalLabel] {
        &self.labels
    }

    pub fn groups(&self) -> &BTreeMap<IntervalLabel, Vec<RecordId>> {
        &self.groups
    }

    /// Members of one interval.
    pub fn group(&self, label: IntervalLabel) -> &[RecordId] {
        self.groups.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty intervals.
    pub fn interval_count(&self) -> usize {
        self.groups.len()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labels_groups_in_order() {
        let labels = vec![IntervalLabel(1), IntervalLabel(1), IntervalLabel(3)];
        let seg = Segmentation::from_labels(7, labels);
        assert_eq!(seg.interval_days(), 7);
        assert_eq!(seg.interval_count(), 2);
        assert_eq!(seg.group(IntervalLabel(1)), &[RecordId(0), RecordId(1)]);
        assert_eq!(seg.group(IntervalLabel(3)), &[RecordId(2)]);
        // gaps are tolerated and yield empty groups
        assert!(seg.group(IntervalLabel(2)).is_empty());
    }

    #[test]
    fn test_interval_label_display() {
        assert_eq!(IntervalLabel::FIRST.to_string(), "1");
        assert_eq!(IntervalLabel(12).get(), 12);
    }
}
