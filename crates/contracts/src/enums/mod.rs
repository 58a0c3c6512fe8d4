pub mod meta_type;
pub mod on_delete_action;
pub mod relation_model;

pub use meta_type::MetaType;
pub use on_delete_action::OnDeleteAction;
pub use relation_model::RelationModel;
