use serde::{Deserialize, Serialize};

/// Тип динамического поля метаданных
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaType {
    Text,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Integer,
    Decimal,
    Relation,
    Json,
    Choice,
}

impl MetaType {
    /// Код типа (как хранится в БД и передаётся по API)
    pub fn code(&self) -> &'static str {
        match self {
            MetaType::Text => "text",
            MetaType::Date => "date",
            MetaType::DateTime => "datetime",
            MetaType::Integer => "integer",
            MetaType::Decimal => "decimal",
            MetaType::Relation => "relation",
            MetaType::Json => "json",
            MetaType::Choice => "choice",
        }
    }

    /// Человекочитаемое название для админки
    pub fn display_name(&self) -> &'static str {
        match self {
            MetaType::Text => "Text",
            MetaType::Date => "Date",
            MetaType::DateTime => "DateTime",
            MetaType::Integer => "Integer",
            MetaType::Decimal => "Decimal Number",
            MetaType::Relation => "Relation",
            MetaType::Json => "JSON Data",
            MetaType::Choice => "Normal Select",
        }
    }

    pub fn all() -> Vec<MetaType> {
        vec![
            MetaType::Text,
            MetaType::Date,
            MetaType::DateTime,
            MetaType::Integer,
            MetaType::Decimal,
            MetaType::Relation,
            MetaType::Json,
            MetaType::Choice,
        ]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().into_iter().find(|t| t.code() == code)
    }

    /// Числовые типы, которые форматируются с разделителями разрядов
    pub fn is_numeric(&self) -> bool {
        matches!(self, MetaType::Integer | MetaType::Decimal)
    }
}

impl std::fmt::Display for MetaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
