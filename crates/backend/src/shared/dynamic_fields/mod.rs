//! Dynamic metadata fields
//!
//! Turns runtime-defined `MetadataDefinition`s into value fields, validation
//! forms and UI JSON schemas, and validates/renders the `element_metadata`
//! dictionaries of records that carry them.
//!
//! Everything is driven by an explicit [`FieldKindRegistry`] built once at
//! startup and passed by reference.

pub mod attrs;
pub mod container;
pub mod error;
pub mod form;
pub mod registry;
pub mod resolver;
pub mod ui_schema;
pub mod value_field;

pub use container::ElementMetadataContainer;
pub use error::MetadataError;
pub use form::DynamicForm;
pub use registry::FieldKindRegistry;
pub use resolver::{RecordResolver, RelatedRecord};
pub use value_field::ValueField;
