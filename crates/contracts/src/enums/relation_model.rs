use serde::{Deserialize, Serialize};

/// Типы записей, на которые может ссылаться поле типа Relation.
///
/// Список фиксирован и не настраивается извне.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationModel {
    #[serde(rename = "market.Market")]
    Market,
    #[serde(rename = "market.Product")]
    Product,
    #[serde(rename = "main.PtProvince")]
    Province,
}

impl RelationModel {
    pub fn key(&self) -> &'static str {
        match self {
            RelationModel::Market => "market.Market",
            RelationModel::Product => "market.Product",
            RelationModel::Province => "main.PtProvince",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelationModel::Market => "Market",
            RelationModel::Product => "Product",
            RelationModel::Province => "Province",
        }
    }

    pub fn all() -> Vec<RelationModel> {
        vec![
            RelationModel::Market,
            RelationModel::Product,
            RelationModel::Province,
        ]
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|m| m.key() == key)
    }
}

impl std::fmt::Display for RelationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
