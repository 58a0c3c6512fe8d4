use std::sync::Arc;

use crate::domain::a003_reference_record::resolver::DbRecordResolver;
use crate::shared::dynamic_fields::{FieldKindRegistry, RecordResolver};

/// Общее состояние обработчиков: реестр видов полей и поиск связанных записей
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FieldKindRegistry>,
    pub resolver: Arc<dyn RecordResolver>,
}

impl AppState {
    pub fn new(registry: FieldKindRegistry, resolver: Arc<dyn RecordResolver>) -> Self {
        Self {
            registry: Arc::new(registry),
            resolver,
        }
    }

    /// Стандартный реестр и поиск записей по БД
    pub fn standard() -> Self {
        Self::new(FieldKindRegistry::standard(), Arc::new(DbRecordResolver))
    }
}
