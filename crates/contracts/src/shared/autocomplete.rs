use serde::{Deserialize, Serialize};

/// Вид справочника для автодополнения в редакторе атрибутов Relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocompleteSource {
    Models,
    OnDelete,
}

impl AutocompleteSource {
    /// Сегмент пути `/metadata/autocomplete/{el_type}/`
    pub fn el_type(&self) -> &'static str {
        match self {
            AutocompleteSource::Models => "models",
            AutocompleteSource::OnDelete => "on_delete",
        }
    }

    pub fn from_el_type(el_type: &str) -> Option<Self> {
        match el_type {
            "models" => Some(AutocompleteSource::Models),
            "on_delete" => Some(AutocompleteSource::OnDelete),
            _ => None,
        }
    }

    /// URL обработчика, который подставляется в схему виджета
    pub fn handler_url(&self) -> String {
        format!("/metadata/autocomplete/{}/", self.el_type())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteItem {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    pub results: Vec<AutocompleteItem>,
}
