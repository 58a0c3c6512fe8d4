use contracts::domain::a002_metadata_collection::aggregate::MetadataCollectionId;
use contracts::domain::a004_element::aggregate::{Element, ElementMetadata};

use crate::shared::dynamic_fields::{ElementMetadataContainer, MetadataError};

impl ElementMetadataContainer for Element {
    fn element_metadata(&self) -> Option<&ElementMetadata> {
        self.element_metadata.as_ref()
    }

    fn element_metadata_mut(&mut self) -> &mut Option<ElementMetadata> {
        &mut self.element_metadata
    }

    fn element_type(&self) -> Result<Option<MetadataCollectionId>, MetadataError> {
        Ok(self.element_type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_exposes_its_collection() {
        let mut element = Element::new_for_insert(
            "EL-1".into(),
            "Pallet".into(),
            None,
            Some(MetadataCollectionId(2)),
            None,
        );
        assert_eq!(element.element_type().unwrap(), Some(MetadataCollectionId(2)));
        assert!(!element.has_metadata());

        *element.element_metadata_mut() = json!({"weight": 12}).as_object().cloned();
        assert!(element.has_metadata());
    }
}
