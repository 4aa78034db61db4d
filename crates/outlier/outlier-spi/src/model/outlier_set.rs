//! Sets of records flagged as anomalous.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordId};
use super::series::Series;
use super::target::TargetColumn;

/// How an [`OutlierSet`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Mahalanobis distance far from the mean distance
    Distributional,
    /// Price/volume regression residual too large
    Relational(TargetColumn),
    /// Intersection of other sets
    Merged,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionMethod::Distributional => write!(f, "distributional"),
            DetectionMethod::Relational(target) => write!(f, "relational ({})", target),
            DetectionMethod::Merged => write!(f, "merged"),
        }
    }
}

/// Record identities flagged by one detection method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierSet {
    method: DetectionMethod,
    ids: BTreeSet<RecordId>,
}

impl OutlierSet {
    pub fn new(method: DetectionMethod, ids: impl IntoIterator<Item = RecordId>) -> Self {
        Self {
            method,
            ids: ids.into_iter().collect(),
        }
    }

    pub fn empty(method: DetectionMethod) -> Self {
        Self {
            method,
            ids: BTreeSet::new(),
        }
    }

    pub fn method(&self) -> DetectionMethod {
        self.method
    }

    pub fn ids(&self) -> &BTreeSet<RecordId> {
        &self.ids
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.ids.iter().copied()
    }

    /// Records flagged in both sets; the result is tagged [`DetectionMethod::Merged`].
    pub fn intersection(&self, other: &OutlierSet) -> OutlierSet {
        OutlierSet {
            method: DetectionMethod::Merged,
            ids: self.ids.intersection(&other.ids).copied().collect(),
        }
    }

    pub fn is_subset(&self, other: &OutlierSet) -> bool {
        self.ids.is_subset(&other.ids)
    }

    /// Resolve identities back into the series. Ids outside the series are skipped.
    pub fn resolve<'a>(&self, series: &'a Series) -> Vec<(RecordId, &'a Record)> {
        self.ids
            .iter()
            .filter_map(|&id| series.get(id).map(|record| (id, record)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[usize]) -> OutlierSet {
        OutlierSet::new(
            DetectionMethod::Distributional,
            ids.iter().map(|&i| RecordId(i)),
        )
    }

    #[test]
    fn test_new_dedups_and_sorts() {
        let s = set(&[5, 1, 5, 3]);
        assert_eq!(s.len(), 3);
        let ids: Vec<usize> = s.iter().map(RecordId::index).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_intersection() {
        let a = set(&[1, 2, 3, 8]);
        let b = OutlierSet::new(
            DetectionMethod::Relational(TargetColumn::VolumeBtc),
            [RecordId(2), RecordId(8), RecordId(9)],
        );
        let merged = a.intersection(&b);
        assert_eq!(merged.method(), DetectionMethod::Merged);
        assert!(merged.contains(RecordId(2)));
        assert!(merged.contains(RecordId(8)));
        assert_eq!(merged.len(), 2);
        assert!(merged.is_subset(&a));
        assert!(merged.is_subset(&b));
    }

    #[test]
    fn test_empty() {
        let s = OutlierSet::empty(DetectionMethod::Merged);
        assert!(s.is_empty());
        assert!(!s.contains(RecordId(0)));
    }

    #[test]
    fn test_resolve_skips_unknown_ids() {
        let series = Series::new(vec![
            Record::new(0, 1.0, 1.0, 1.0),
            Record::new(60, 2.0, 1.0, 2.0),
        ])
        .unwrap();
        let resolved = set(&[1, 7]).resolve(&series);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0, RecordId(1));
        assert_eq!(resolved[0].1.price, 2.0);
    }

    #[test]
    fn test_method_display_and_serde() {
        let method = DetectionMethod::Relational(TargetColumn::VolumeUsd);
        assert_eq!(method.to_string(), "relational (Volume USD)");
        let json = serde_json::to_string(&method).unwrap();
        assert_eq!(json, r#"{"kind":"relational","target":"volume_usd"}"#);
        let json = serde_json::to_string(&DetectionMethod::Merged).unwrap();
        assert_eq!(json, r#"{"kind":"merged"}"#);
    }
}
