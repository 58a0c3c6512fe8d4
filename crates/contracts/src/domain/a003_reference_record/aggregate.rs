use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, EntityMetadata};
use crate::enums::RelationModel;

crate::aggregate_id!(
    /// Первичный ключ записи, на которую ссылается поле Relation
    ReferenceRecordId
);

/// Запись одного из типов, допустимых для полей Relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: ReferenceRecordId,
    pub model: RelationModel,
    pub description: String,
    /// Специальное описание для вывода в метаданных (если задано)
    pub metadata_description: Option<String>,
    pub metadata: EntityMetadata,
}

impl ReferenceRecord {
    pub fn new_for_insert(
        model: RelationModel,
        description: String,
        metadata_description: Option<String>,
    ) -> Self {
        Self {
            id: ReferenceRecordId::unsaved(),
            model,
            description,
            metadata_description,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn update(&mut self, dto: &ReferenceRecordDto) {
        self.model = dto.model;
        self.description = dto.description.clone();
        self.metadata_description = dto.metadata_description.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.metadata.touch();
    }

    /// Строка для отображения в отформатированных метаданных
    pub fn display_string(&self) -> String {
        match self
            .metadata_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        {
            Some(description) => description.to_string(),
            None => self.to_string(),
        }
    }
}

impl std::fmt::Display for ReferenceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description, self.model.label())
    }
}

impl AggregateRoot for ReferenceRecord {
    type Id = ReferenceRecordId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "reference_record"
    }

    fn element_name() -> &'static str {
        "Reference record"
    }

    fn list_name() -> &'static str {
        "Reference records"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecordDto {
    pub id: Option<i64>,
    pub model: RelationModel,
    pub description: String,
    #[serde(default)]
    pub metadata_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_string_prefers_metadata_description() {
        let mut record =
            ReferenceRecord::new_for_insert(RelationModel::Market, "Central".into(), None);
        assert_eq!(record.display_string(), "Central (Market)");

        record.metadata_description = Some("Central market, hall 2".into());
        assert_eq!(record.display_string(), "Central market, hall 2");

        record.metadata_description = Some("  ".into());
        assert_eq!(record.display_string(), "Central (Market)");
    }
}
