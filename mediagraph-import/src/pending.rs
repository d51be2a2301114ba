//! Studios waiting for their parent to be imported.

use std::collections::BTreeMap;

use mediagraph_catalog::StudioRecord;

/// A studio record held back because its parent did not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingStudio {
    /// Report key (the manifest checksum).
    pub key: String,
    pub record: StudioRecord,
}

/// Deferred children keyed by the name of the parent they wait for. Only
/// lives for the duration of one studio pass.
#[derive(Debug, Default)]
pub struct PendingParents {
    by_parent: BTreeMap<String, Vec<PendingStudio>>,
}

impl PendingParents {
    pub fn defer(&mut self, parent: String, studio: PendingStudio) {
        self.by_parent.entry(parent).or_default().push(studio);
    }

    /// Remove and return every studio waiting on `parent`, in deferral order.
    pub fn take_children(&mut self, parent: &str) -> Vec<PendingStudio> {
        self.by_parent.remove(parent).unwrap_or_default()
    }

    /// Remove the entry with the smallest parent name.
    pub fn pop_first(&mut self) -> Option<(String, Vec<PendingStudio>)> {
        self.by_parent.pop_first()
    }

    pub fn is_empty(&self) -> bool {
        self.by_parent.is_empty()
    }

    /// Number of deferred studios across all parents.
    pub fn len(&self) -> usize {
        self.by_parent.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn studio(name: &str) -> PendingStudio {
        PendingStudio {
            key: name.to_lowercase(),
            record: StudioRecord {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn children_are_grouped_by_parent() {
        let mut pending = PendingParents::default();
        pending.defer("A".into(), studio("B"));
        pending.defer("A".into(), studio("C"));
        pending.defer("B".into(), studio("D"));
        assert_eq!(pending.len(), 3);

        let children = pending.take_children("A");
        let names: Vec<_> = children.iter().map(|s| s.record.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
        assert!(pending.take_children("A").is_empty());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn pop_first_is_ordered_by_parent_name() {
        let mut pending = PendingParents::default();
        pending.defer("Zeta".into(), studio("z1"));
        pending.defer("Alpha".into(), studio("a1"));
        assert_eq!(pending.pop_first().unwrap().0, "Alpha");
        assert_eq!(pending.pop_first().unwrap().0, "Zeta");
        assert!(pending.pop_first().is_none());
        assert!(pending.is_empty());
    }
}
