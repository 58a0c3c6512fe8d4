//! Access to the records that Relation fields point at.

use async_trait::async_trait;
use contracts::enums::RelationModel;
use serde::Serialize;

/// A record that a Relation value can reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedRecord {
    pub id: i64,
    pub model: RelationModel,
    pub description: String,
    pub metadata_description: Option<String>,
}

impl RelatedRecord {
    /// Human-readable rendering: the dedicated metadata description when the
    /// record has one, a generic "description (model)" otherwise.
    pub fn display_string(&self) -> String {
        match self
            .metadata_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        {
            Some(description) => description.to_string(),
            None => format!("{} ({})", self.description, self.model.label()),
        }
    }
}

/// Lookup of referenceable records by type
#[async_trait]
pub trait RecordResolver: Send + Sync {
    /// All records of a type, used as Relation candidates
    async fn candidates(&self, model: RelationModel) -> anyhow::Result<Vec<RelatedRecord>>;

    /// One record by primary key; `Ok(None)` when it does not exist
    async fn find(&self, model: RelationModel, id: i64) -> anyhow::Result<Option<RelatedRecord>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory resolver for tests
    #[derive(Default)]
    pub struct MemoryResolver {
        pub records: Vec<RelatedRecord>,
    }

    impl MemoryResolver {
        pub fn with(mut self, id: i64, model: RelationModel, description: &str) -> Self {
            self.records.push(RelatedRecord {
                id,
                model,
                description: description.to_string(),
                metadata_description: None,
            });
            self
        }

        pub fn with_metadata_description(mut self, id: i64, text: &str) -> Self {
            if let Some(record) = self.records.iter_mut().find(|r| r.id == id) {
                record.metadata_description = Some(text.to_string());
            }
            self
        }
    }

    #[async_trait]
    impl RecordResolver for MemoryResolver {
        async fn candidates(&self, model: RelationModel) -> anyhow::Result<Vec<RelatedRecord>> {
            Ok(self
                .records
                .iter()
                .filter(|r| r.model == model)
                .cloned()
                .collect())
        }

        async fn find(
            &self,
            model: RelationModel,
            id: i64,
        ) -> anyhow::Result<Option<RelatedRecord>> {
            Ok(self
                .records
                .iter()
                .find(|r| r.model == model && r.id == id)
                .cloned())
        }
    }

    #[test]
    fn test_display_string() {
        let resolver = MemoryResolver::default()
            .with(1, RelationModel::Province, "North")
            .with(2, RelationModel::Province, "South")
            .with_metadata_description(2, "Southern province");
        assert_eq!(resolver.records[0].display_string(), "North (Province)");
        assert_eq!(resolver.records[1].display_string(), "Southern province");
    }
}
