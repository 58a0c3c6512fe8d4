pub mod autocomplete;
pub mod validation;
