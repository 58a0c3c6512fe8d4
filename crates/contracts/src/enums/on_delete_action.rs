use serde::{Deserialize, Serialize};

/// Действие при удалении связанной записи (для полей типа Relation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnDeleteAction {
    Cascade,
    DoNothing,
    SetNull,
    Protect,
}

impl OnDeleteAction {
    pub fn key(&self) -> &'static str {
        match self {
            OnDeleteAction::Cascade => "CASCADE",
            OnDeleteAction::DoNothing => "DO_NOTHING",
            OnDeleteAction::SetNull => "SET_NULL",
            OnDeleteAction::Protect => "PROTECT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OnDeleteAction::Cascade => "Cascade",
            OnDeleteAction::DoNothing => "Do Nothing",
            OnDeleteAction::SetNull => "Set Null",
            OnDeleteAction::Protect => "Protect",
        }
    }

    pub fn all() -> Vec<OnDeleteAction> {
        vec![
            OnDeleteAction::Cascade,
            OnDeleteAction::DoNothing,
            OnDeleteAction::SetNull,
            OnDeleteAction::Protect,
        ]
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|a| a.key() == key)
    }
}
