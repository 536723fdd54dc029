pub mod assignment;
pub mod assignment_manager;
pub mod assignment_store;
