use contracts::domain::common::AggregateRoot;
use contracts::shared::validation::FieldErrors;
use thiserror::Error;

/// Ошибки слоя динамических метаданных
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Атрибуты виджета не прошли форму проверки атрибутов
    #[error("Invalid widget attributes: {0}")]
    InvalidAttributes(FieldErrors),

    /// Значения element_metadata не прошли динамическую форму
    #[error("Invalid element metadata: {0}")]
    InvalidElementMetadata(FieldErrors),

    /// Поле нельзя построить из его атрибутов (неизвестный или некорректный атрибут)
    #[error("Cannot build field '{field}': {reason}")]
    FieldBuild { field: String, reason: String },

    /// Встраивающий тип не переопределил `element_type()`
    #[error("Every implementor of ElementMetadataContainer ('{0}') must implement element_type() to return its metadata collection")]
    ElementTypeNotImplemented(&'static str),

    #[error("{0}")]
    Validation(String),

    /// Запись, на которую ссылается запрос, не найдена
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl MetadataError {
    pub fn field_build(field: &str, reason: impl Into<String>) -> Self {
        MetadataError::FieldBuild {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found<A: AggregateRoot>(id: i64) -> Self {
        MetadataError::NotFound {
            entity: A::element_name(),
            id,
        }
    }
}
