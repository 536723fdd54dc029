pub mod occurrence;
pub mod slot_template;
pub mod slot_template_registry;
