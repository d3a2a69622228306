//! The relation lookup table and its immutable snapshots.

/// One entry of the relations database, as cached locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationOption {
    /// Remote page identifier, the value records link against.
    pub id: String,
    /// Display name, taken from the relation's title property.
    pub name: String,
}

/// One generation of the relation cache.
///
/// A snapshot is built from a single remote query and never mutated;
/// refreshes install a whole new generation. A handler that grabbed a
/// snapshot keeps seeing a consistent table for its entire command, no
/// matter what concurrent refreshes do.
#[derive(Debug, Clone, Default)]
pub struct RelationSnapshot {
    options: Vec<RelationOption>,
}

impl RelationSnapshot {
    #[must_use]
    pub fn new(options: Vec<RelationOption>) -> Self {
        Self { options }
    }

    /// Case-insensitive exact match against the cached names.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RelationOption> {
        let needle = name.trim().to_lowercase();
        self.options
            .iter()
            .find(|option| option.name.trim().to_lowercase() == needle)
    }

    /// Display names in query order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RelationSnapshot {
        RelationSnapshot::new(vec![
            RelationOption {
                id: "R1".into(),
                name: "Monday".into(),
            },
            RelationOption {
                id: "R2".into(),
                name: "Tuesday".into(),
            },
        ])
    }

    #[test]
    fn find_ignores_case() {
        let snap = snapshot();
        assert_eq!(snap.find("monday").unwrap().id, "R1");
        assert_eq!(snap.find("MONDAY").unwrap().id, "R1");
        assert_eq!(snap.find("Monday").unwrap().id, "R1");
    }

    #[test]
    fn find_trims_the_needle() {
        assert_eq!(snapshot().find("  tuesday ").unwrap().id, "R2");
    }

    #[test]
    fn missing_name_is_none() {
        assert!(snapshot().find("Friday").is_none());
    }

    #[test]
    fn names_keep_query_order() {
        let snap = snapshot();
        let names: Vec<&str> = snap.names().collect();
        assert_eq!(names, ["Monday", "Tuesday"]);
    }

    #[test]
    fn default_snapshot_is_empty() {
        let snap = RelationSnapshot::default();
        assert!(snap.is_empty());
        assert_eq!(snap.len(), 0);
    }
}
