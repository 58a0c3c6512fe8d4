pub mod a001_metadata_definition;
pub mod a002_metadata_collection;
pub mod a003_reference_record;
pub mod a004_element;
