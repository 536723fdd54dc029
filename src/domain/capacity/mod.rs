pub mod capacity_validator;
pub mod validation;
